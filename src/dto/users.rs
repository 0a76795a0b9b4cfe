use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::auth::password_strength,
    models::{Order, User},
};

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 2, max = 50, message = "Name must be 2-50 characters"))]
    pub name: Option<String>,
    #[validate(
        length(min = 6, max = 20, message = "Password must be 6-20 characters"),
        custom(function = "password_strength")
    )]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockUserRequest {
    pub is_active: bool,
}

/// The caller's account with their live orders, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct Profile {
    pub user: User,
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserWithOrderCount {
    #[serde(flatten)]
    pub user: User,
    pub orders_count: u64,
}
