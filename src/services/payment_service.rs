use chrono::Utc;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use sea_orm::sea_query::{Expr, LockType, Query};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::payments::{PaymentReceipt, PaymentResult, ProcessPaymentRequest},
    entity::{
        Orders, Payments,
        enums::{OrderStatus, PaymentStatus},
        orders::{ActiveModel as OrderActive, Column as OrderCol},
        payments::{ActiveModel as PaymentActive, Column as PaymentCol},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Payment,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::filters::live,
    state::AppState,
};

pub const CARD_NUMBER_LEN: usize = 16;
const TRANSACTION_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const TRANSACTION_SUFFIX_LEN: usize = 8;

/// Strips whitespace and requires exactly sixteen ASCII digits.
pub fn normalize_card_number(raw: &str) -> AppResult<String> {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() != CARD_NUMBER_LEN || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::BadRequest("Invalid card number".into()));
    }
    Ok(digits)
}

/// Simulated gateway decision for a normalized card number.
// TODO: decide whether the last digit's parity should decline cards; every
// well-formed number is approved until that rule is confirmed.
pub fn card_outcome(_card_number: &str) -> PaymentStatus {
    PaymentStatus::Success
}

/// `TRX-` followed by eight upper-case base-36 characters.
pub fn generate_transaction_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..TRANSACTION_SUFFIX_LEN)
        .map(|_| TRANSACTION_ALPHABET[rng.gen_range(0..TRANSACTION_ALPHABET.len())] as char)
        .collect();
    format!("TRX-{suffix}")
}

/// Charges an order at most once. The order row stays locked for the whole
/// attempt; a retry is only allowed over a FAILED payment.
pub async fn process_payment(
    state: &AppState,
    user: &AuthUser,
    payload: ProcessPaymentRequest,
) -> AppResult<ApiResponse<PaymentResult>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(payload.order_id)
        .filter(OrderCol::UserId.eq(user.user_id))
        .filter(live(OrderCol::State))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let existing = Payments::find()
        .filter(PaymentCol::OrderId.eq(order.id))
        .one(&txn)
        .await?;

    if existing.is_some() && order.status != OrderStatus::PaymentFailed {
        return Err(AppError::Conflict(
            "Payment already exists for this order".into(),
        ));
    }

    if payload.amount != order.total_price {
        return Err(AppError::BadRequest(
            "Payment amount does not match order total".into(),
        ));
    }

    let card_number = normalize_card_number(&payload.card_number)?;
    let status = card_outcome(&card_number);
    let transaction_id = generate_transaction_id();
    let now = Utc::now();

    let payment = match existing {
        Some(previous) => {
            let result = Payments::update_many()
                .col_expr(PaymentCol::Status, Expr::value(status))
                .col_expr(PaymentCol::Amount, Expr::value(payload.amount))
                .col_expr(
                    PaymentCol::PaymentMethod,
                    Expr::value(payload.payment_method.clone()),
                )
                .col_expr(
                    PaymentCol::TransactionId,
                    Expr::value(Some(transaction_id.clone())),
                )
                .col_expr(PaymentCol::UpdatedAt, Expr::value(now))
                .filter(PaymentCol::Id.eq(previous.id))
                .filter(PaymentCol::Status.eq(PaymentStatus::Failed))
                .exec(&txn)
                .await?;
            if result.rows_affected == 0 {
                return Err(AppError::Conflict(
                    "Payment already exists for this order".into(),
                ));
            }
            Payments::find_by_id(previous.id)
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::not_found("Payment"))?
        }
        // The unique order_id constraint turns a lost insert race into Conflict.
        None => {
            PaymentActive {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                amount: Set(payload.amount),
                status: Set(status),
                payment_method: Set(payload.payment_method.clone()),
                transaction_id: Set(Some(transaction_id)),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(&txn)
            .await?
        }
    };

    let success = payment.status == PaymentStatus::Success;
    let mut active: OrderActive = order.into();
    active.status = Set(if success {
        OrderStatus::Paid
    } else {
        OrderStatus::PaymentFailed
    });
    active.updated_at = Set(now.into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        payment_id = %payment.id,
        status = ?payment.status,
        transaction_id = payment.transaction_id.as_deref().unwrap_or("-"),
        "payment processed"
    );

    let result = PaymentResult {
        success,
        payment: PaymentReceipt {
            id: payment.id,
            status: payment.status,
            amount: payment.amount,
            transaction_id: payment.transaction_id,
        },
        message: if success {
            "Payment successful".into()
        } else {
            "Payment failed".into()
        },
    };
    Ok(ApiResponse::success("Payment processed", result, None))
}

/// The payment of one of the caller's orders.
pub async fn get_by_order_id(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<Payment>> {
    Orders::find_by_id(order_id)
        .filter(OrderCol::UserId.eq(user.user_id))
        .filter(live(OrderCol::State))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let payment = Payments::find()
        .filter(PaymentCol::OrderId.eq(order_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Payment"))?;

    Ok(ApiResponse::success("Payment", Payment::from(payment), None))
}

pub async fn list_my_payments(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<Payment>>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Payments::find()
        .filter(
            PaymentCol::OrderId.in_subquery(
                Query::select()
                    .column(OrderCol::Id)
                    .from(Orders)
                    .and_where(OrderCol::UserId.eq(user.user_id))
                    .to_owned(),
            ),
        )
        .order_by_desc(PaymentCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Payment::from)
        .collect();

    Ok(ApiResponse::page(
        "Payments",
        items,
        Meta::new(total, page, limit),
    ))
}
