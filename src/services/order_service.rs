use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::orders::CreateOrderRequest,
    entity::{
        OrderItems, Orders, Payments, Products, Users,
        enums::{EntityState, OrderStatus},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Model as OrderModel},
        payments::Column as PaymentCol,
        products::Column as ProdCol,
        users::Column as UserCol,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderDetail, OrderItem, Payment, ProductSummary, UserSummary},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::filters::live,
    state::AppState,
};

/// Places an order from `(productId, quantity)` lines, snapshotting current prices.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;

    let mut product_ids: Vec<Uuid> = payload.items.iter().map(|line| line.product_id).collect();
    product_ids.sort();
    product_ids.dedup();

    let prices: HashMap<Uuid, Decimal> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .filter(ProdCol::IsActive.eq(true))
        .filter(live(ProdCol::State))
        .all(&txn)
        .await?
        .into_iter()
        .map(|product| (product.id, product.price))
        .collect();

    let order_id = Uuid::new_v4();
    let mut total_price = Decimal::ZERO;
    let mut items = Vec::with_capacity(payload.items.len());
    for line in &payload.items {
        let price = *prices.get(&line.product_id).ok_or_else(|| {
            AppError::NotFound(format!("Product not found: {}", line.product_id))
        })?;
        total_price = price
            .checked_mul(Decimal::from(line.quantity))
            .and_then(|line_total| total_price.checked_add(line_total))
            .ok_or_else(|| AppError::BadRequest("Order total is too large".into()))?;
        items.push(OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            price: Set(price),
        });
    }

    ensure_total_in_range(total_price)?;

    let now = Utc::now();
    let order = OrderActive {
        id: Set(order_id),
        user_id: Set(user.user_id),
        total_price: Set(total_price),
        status: Set(OrderStatus::Pending),
        state: Set(EntityState::Active),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    OrderItems::insert_many(items)
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        user_id = %user.user_id,
        total = %order.total_price,
        "order created"
    );

    let detail = hydrate_one(&state.orm, order, false).await?;
    Ok(ApiResponse::success("Order created", detail, None))
}

/// The caller's live orders, newest first.
pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<OrderDetail>>> {
    let condition = Condition::all()
        .add(OrderCol::UserId.eq(user.user_id))
        .add(live(OrderCol::State));
    page_orders(state, condition, pagination, false).await
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = find_owned_order(state, user, id).await?;
    let detail = hydrate_one(&state.orm, order, false).await?;
    Ok(ApiResponse::success("Order", detail, None))
}

pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = find_owned_order(state, user, id).await?;
    ensure_cancellable(order.status)?;

    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Cancelled);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    tracing::info!(order_id = %order.id, user_id = %user.user_id, "order cancelled");
    let detail = hydrate_one(&state.orm, order, false).await?;
    Ok(ApiResponse::success("Order cancelled", detail, None))
}

/// Largest amount a `NUMERIC(12, 2)` money column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

pub fn ensure_total_in_range(total: Decimal) -> AppResult<()> {
    if total > MAX_AMOUNT {
        return Err(AppError::BadRequest(format!(
            "Order total must not exceed {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

pub fn ensure_cancellable(status: OrderStatus) -> AppResult<()> {
    if status.is_cancellable() {
        Ok(())
    } else {
        Err(AppError::InvalidState(
            "Cannot cancel shipped or delivered orders".into(),
        ))
    }
}

/// Absent, deleted and foreign orders all look the same to the caller.
async fn find_owned_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<OrderModel> {
    Orders::find_by_id(id)
        .filter(OrderCol::UserId.eq(user.user_id))
        .filter(live(OrderCol::State))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))
}

/// Paginates orders matching `condition`, newest first, and hydrates each page.
pub async fn page_orders(
    state: &AppState,
    condition: Condition,
    pagination: Pagination,
    include_user: bool,
) -> AppResult<ApiResponse<Vec<OrderDetail>>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt)
        .order_by_asc(OrderCol::Id);

    let total = finder.clone().count(&state.orm).await?;
    let orders = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?;
    let items = hydrate_orders(&state.orm, orders, include_user).await?;

    Ok(ApiResponse::page(
        "Orders",
        items,
        Meta::new(total, page, limit),
    ))
}

pub async fn hydrate_one<C: ConnectionTrait>(
    db: &C,
    order: OrderModel,
    include_user: bool,
) -> AppResult<OrderDetail> {
    hydrate_orders(db, vec![order], include_user)
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Order"))
}

/// Attaches items (with product summaries), the payment and optionally the owner.
/// Runs a fixed number of queries regardless of how many orders are passed.
pub async fn hydrate_orders<C: ConnectionTrait>(
    db: &C,
    orders: Vec<OrderModel>,
    include_user: bool,
) -> AppResult<Vec<OrderDetail>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

    let mut items_by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids.clone()))
        .find_also_related(Products)
        .all(db)
        .await?;
    for (item, product) in rows {
        let mut item = OrderItem::from(item);
        item.product = product.map(ProductSummary::from);
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    let mut payments: HashMap<Uuid, Payment> = Payments::find()
        .filter(PaymentCol::OrderId.is_in(order_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.order_id, Payment::from(p)))
        .collect();

    let mut users: HashMap<Uuid, UserSummary> = HashMap::new();
    if include_user {
        let mut user_ids: Vec<Uuid> = orders.iter().map(|o| o.user_id).collect();
        user_ids.sort();
        user_ids.dedup();
        users = Users::find()
            .filter(UserCol::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();
    }

    Ok(orders
        .into_iter()
        .map(|model| {
            let user = users.get(&model.user_id).cloned();
            OrderDetail {
                items: items_by_order.remove(&model.id).unwrap_or_default(),
                payment: payments.remove(&model.id),
                user,
                order: Order::from(model),
            }
        })
        .collect())
}
