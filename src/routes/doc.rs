use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest},
        categories::CategoryRequest,
        orders::{CreateOrderRequest, OrderLineRequest, UpdateOrderStatusRequest},
        payments::{PaymentReceipt, PaymentResult, ProcessPaymentRequest, UpdatePaymentStatusRequest},
        products::ProductUpload,
        reports::{
            DailyOrderReport, DailyOrderStats, DailyPaymentReport, DailyPaymentStats,
            OrderStatistics, PaymentStatistics, Statistics, StatusCounts, TopProduct,
        },
        users::{BlockUserRequest, Profile, UpdateUserRequest, UserWithOrderCount},
    },
    entity::enums::{OrderStatus, PaymentStatus, Role},
    models::{
        Category, Order, OrderDetail, OrderItem, Payment, PaymentDetail, Product, ProductSummary,
        User, UserSummary,
    },
    response::{ErrorBody, Meta},
    routes::{
        admin::{self, categories as admin_categories, orders as admin_orders,
            payments as admin_payments, products as admin_products},
        auth, categories, health, orders, payments, products, users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::refresh,
        auth::me,
        users::profile,
        users::update_user,
        users::delete_user,
        products::list_products,
        products::list_by_category,
        products::get_product,
        categories::list_categories,
        categories::get_category,
        categories::category_products,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::cancel_order,
        payments::process_payment,
        payments::get_by_order,
        payments::list_my_payments,
        admin::statistics,
        admin::list_users,
        admin::set_user_active,
        admin_categories::create_category,
        admin_categories::list_categories,
        admin_categories::get_category,
        admin_categories::update_category,
        admin_categories::delete_category,
        admin_categories::category_products,
        admin_products::create_product,
        admin_products::list_products,
        admin_products::get_product,
        admin_products::update_product,
        admin_products::delete_product,
        admin_orders::list_orders,
        admin_orders::statistics,
        admin_orders::daily_report,
        admin_orders::orders_by_user,
        admin_orders::orders_by_product,
        admin_orders::get_order,
        admin_orders::update_status,
        admin_orders::delete_order,
        admin_payments::list_payments,
        admin_payments::statistics,
        admin_payments::daily_report,
        admin_payments::payments_by_user,
        admin_payments::get_payment,
        admin_payments::update_status
    ),
    components(
        schemas(
            Role,
            OrderStatus,
            PaymentStatus,
            User,
            UserSummary,
            Category,
            Product,
            ProductSummary,
            Order,
            OrderItem,
            OrderDetail,
            Payment,
            PaymentDetail,
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            AuthResponse,
            Profile,
            UpdateUserRequest,
            BlockUserRequest,
            UserWithOrderCount,
            CategoryRequest,
            ProductUpload,
            CreateOrderRequest,
            OrderLineRequest,
            UpdateOrderStatusRequest,
            ProcessPaymentRequest,
            PaymentReceipt,
            PaymentResult,
            UpdatePaymentStatusRequest,
            Statistics,
            StatusCounts,
            TopProduct,
            OrderStatistics,
            DailyOrderStats,
            DailyOrderReport,
            PaymentStatistics,
            DailyPaymentStats,
            DailyPaymentReport,
            Meta,
            ErrorBody
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and tokens"),
        (name = "Users", description = "Own account"),
        (name = "Products", description = "Public catalog"),
        (name = "Categories", description = "Public categories"),
        (name = "Orders", description = "Customer orders"),
        (name = "Payments", description = "Payment simulator"),
        (name = "Admin", description = "Dashboard and users"),
        (name = "Admin Categories", description = "Category management"),
        (name = "Admin Products", description = "Product management"),
        (name = "Admin Orders", description = "Order management and reports"),
        (name = "Admin Payments", description = "Payment management and reports"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
