use axum::{extract::Query, http::Uri};
use axum_bookstore_api::{
    response::{ApiResponse, Meta},
    routes::params::{MAX_PAGE, MAX_PAGE_SIZE, Pagination, ProductQuery, ReportQuery},
};

#[test]
fn defaults_to_first_page_of_ten() {
    assert_eq!(Pagination::default().normalize(), (1, 10, 0));
}

#[test]
fn offset_skips_previous_pages() {
    assert_eq!(Pagination::new(3, 20).normalize(), (3, 20, 40));
}

#[test]
fn out_of_range_values_are_clamped() {
    assert_eq!(Pagination::new(0, 0).normalize(), (1, 1, 0));
    let (_, limit, _) = Pagination::new(1, 10_000).normalize();
    assert_eq!(limit, MAX_PAGE_SIZE);
}

#[test]
fn huge_page_numbers_do_not_overflow() {
    let uri: Uri = "/api/orders?page=18446744073709551615&limit=100"
        .parse()
        .expect("uri");
    let Query(pagination) = Query::<Pagination>::try_from_uri(&uri).expect("query");
    let (page, limit, offset) = pagination.normalize();
    assert_eq!(page, MAX_PAGE);
    assert_eq!(limit, 100);
    assert_eq!(offset, (MAX_PAGE - 1) * 100);
    assert!(offset <= i64::MAX as u64);
}

#[test]
fn total_pages_rounds_up() {
    let meta = Meta::new(21, 1, 10);
    assert_eq!(meta.total_pages, 3);
    assert_eq!(Meta::new(20, 2, 10).total_pages, 2);
    assert_eq!(Meta::new(0, 1, 10).total_pages, 0);
}

#[test]
fn list_envelope_uses_camel_case_meta() {
    let body = ApiResponse::page("Products", vec![1, 2, 3], Meta::new(3, 1, 10));
    let json = serde_json::to_value(&body).expect("serialize");
    assert_eq!(json["meta"]["totalPages"], 1);
    assert_eq!(json["data"].as_array().map(Vec::len), Some(3));
}

#[test]
fn product_query_reads_camel_case_params() {
    let uri: Uri = "/api/products?page=2&limit=5&search=rust&minPrice=10.5&sortBy=price&sortOrder=asc"
        .parse()
        .expect("uri");
    let Query(query) = Query::<ProductQuery>::try_from_uri(&uri).expect("parse query");
    assert_eq!(query.pagination().normalize(), (2, 5, 5));
    assert_eq!(query.search.as_deref(), Some("rust"));
    assert_eq!(query.min_price.map(|p| p.to_string()), Some("10.5".to_string()));
}

#[test]
fn report_days_default_and_bounds() {
    assert_eq!(ReportQuery::default().days(), 30);
    assert_eq!(ReportQuery { days: Some(0) }.days(), 1);
    assert_eq!(ReportQuery { days: Some(7) }.days(), 7);
    assert_eq!(ReportQuery { days: Some(5000) }.days(), 366);
}
