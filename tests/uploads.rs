use axum::body::Bytes;
use axum_bookstore_api::{
    dto::products::{parse_category_ids, parse_price},
    error::AppError,
    upload::{UploadedFile, file_extension, store_file},
};
use uuid::Uuid;

#[test]
fn extension_is_lowercased_and_sanitized() {
    assert_eq!(file_extension("cover.PNG"), ".png");
    assert_eq!(file_extension("archive.tar.gz"), ".gz");
    assert_eq!(file_extension("noext"), "");
    assert_eq!(file_extension("weird.p/ng"), "");
}

#[test]
fn category_ids_accept_lists() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    assert_eq!(parse_category_ids(&a.to_string()).expect("single"), vec![a]);
    assert_eq!(
        parse_category_ids(&format!("{a}, {b}")).expect("comma"),
        vec![a, b]
    );
    assert_eq!(
        parse_category_ids(&format!("[\"{a}\",\"{b}\"]")).expect("array"),
        vec![a, b]
    );
    assert!(parse_category_ids("").expect("empty").is_empty());
    assert!(matches!(
        parse_category_ids("nope"),
        Err(AppError::BadRequest(_))
    ));
}

#[test]
fn price_must_be_a_decimal() {
    assert_eq!(parse_price(" 12.50 ").expect("price").to_string(), "12.50");
    assert!(parse_price("cheap").is_err());
}

#[tokio::test]
async fn store_file_writes_under_folder() {
    let dir = std::env::temp_dir().join(format!("uploads-{}", Uuid::new_v4()));
    let upload_dir = dir.to_string_lossy().to_string();
    let file = UploadedFile {
        file_name: "cover.JPG".into(),
        content_type: Some("image/jpeg".into()),
        bytes: Bytes::from_static(b"not really a jpeg"),
    };

    let public_path = store_file(&upload_dir, "products", &file)
        .await
        .expect("stored");
    assert!(public_path.starts_with("/uploads/products/"));
    assert!(public_path.ends_with(".jpg"));

    let stored = dir.join(public_path.trim_start_matches("/uploads/"));
    let contents = tokio::fs::read(&stored).await.expect("read back");
    assert_eq!(contents, b"not really a jpeg");

    tokio::fs::remove_dir_all(&dir).await.ok();
}

#[tokio::test]
async fn empty_file_is_rejected() {
    let file = UploadedFile {
        file_name: "empty.png".into(),
        content_type: None,
        bytes: Bytes::new(),
    };
    let err = store_file("unused", "products", &file)
        .await
        .expect_err("empty");
    assert!(matches!(err, AppError::BadRequest(_)));
}
