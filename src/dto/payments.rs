use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entity::enums::PaymentStatus;

pub const DEFAULT_PAYMENT_METHOD: &str = "CARD";

fn default_payment_method() -> String {
    DEFAULT_PAYMENT_METHOD.to_string()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentRequest {
    pub order_id: Uuid,
    #[validate(length(min = 1, message = "Card number is required"))]
    pub card_number: String,
    #[validate(length(min = 3, max = 4, message = "CVV must be 3 or 4 digits"))]
    pub cvv: String,
    #[validate(length(min = 1, message = "Expiry date is required"))]
    pub expiry_date: String,
    #[schema(value_type = String)]
    pub amount: Decimal,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub id: Uuid,
    pub status: PaymentStatus,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub transaction_id: Option<String>,
}

/// Outcome of a payment attempt. A declined card is still a 200 with `success = false`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResult {
    pub success: bool,
    pub payment: PaymentReceipt,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub status: PaymentStatus,
}
