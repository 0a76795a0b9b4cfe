pub mod admin_order_service;
pub mod admin_payment_service;
pub mod admin_service;
pub mod auth_service;
pub mod category_service;
pub mod filters;
pub mod order_service;
pub mod payment_service;
pub mod product_service;
pub mod reporting;
pub mod user_service;
