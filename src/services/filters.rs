//! Predicate builders shared by every listing path.
//!
//! Each builder starts from the soft-delete clause and only adds a clause for
//! filter fields that are present, so an empty filter constrains nothing else.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sea_orm::sea_query::{Expr, Query, SimpleExpr, extension::postgres::PgExpr};
use sea_orm::{ColumnTrait, Condition};
use uuid::Uuid;

use crate::{
    entity::{
        ProductCategories,
        enums::EntityState,
        orders::Column as OrderCol,
        payments::Column as PaymentCol,
        product_categories::Column as ProductCategoryCol,
        products::Column as ProdCol,
    },
    routes::params::{OrderFilterQuery, PaymentFilterQuery, ProductQuery},
};

/// The "not soft-deleted" clause for any table carrying a `state` column.
pub fn live<C: ColumnTrait>(state_col: C) -> SimpleExpr {
    state_col.eq(EntityState::Active)
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Adds `from <= col < to + 1 day`; both ends are whole UTC days.
pub fn created_within<C: ColumnTrait>(
    mut condition: Condition,
    col: C,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Condition {
    if let Some(from) = from {
        condition = condition.add(col.gte(start_of_day(from)));
    }
    if let Some(end) = to.and_then(|to| to.checked_add_days(Days::new(1))) {
        condition = condition.add(col.lt(start_of_day(end)));
    }
    condition
}

pub fn order_condition(filter: &OrderFilterQuery) -> Condition {
    let mut condition = Condition::all().add(live(OrderCol::State));
    if let Some(user_id) = filter.user_id {
        condition = condition.add(OrderCol::UserId.eq(user_id));
    }
    if let Some(status) = filter.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }
    created_within(condition, OrderCol::CreatedAt, filter.date_from, filter.date_to)
}

pub fn payment_condition(filter: &PaymentFilterQuery) -> Condition {
    let mut condition = Condition::all();
    if let Some(status) = filter.status {
        condition = condition.add(PaymentCol::Status.eq(status));
    }
    created_within(
        condition,
        PaymentCol::CreatedAt,
        filter.date_from,
        filter.date_to,
    )
}

/// Customer-facing listings only see active products; admins also see inactive ones.
pub fn product_condition(filter: &ProductQuery, include_inactive: bool) -> Condition {
    let mut condition = Condition::all().add(live(ProdCol::State));
    if !include_inactive {
        condition = condition.add(ProdCol::IsActive.eq(true));
    }

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(Expr::col(ProdCol::Title).ilike(pattern));
    }

    if let Some(min_price) = filter.min_price {
        condition = condition.add(ProdCol::Price.gte(min_price));
    }

    if let Some(max_price) = filter.max_price {
        condition = condition.add(ProdCol::Price.lte(max_price));
    }

    if let Some(category_id) = filter.category_id {
        condition = condition.add(in_category(category_id));
    }

    condition
}

pub fn in_category(category_id: Uuid) -> SimpleExpr {
    ProdCol::Id.in_subquery(
        Query::select()
            .column(ProductCategoryCol::ProductId)
            .from(ProductCategories)
            .and_where(ProductCategoryCol::CategoryId.eq(category_id))
            .to_owned(),
    )
}
