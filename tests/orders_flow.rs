use axum_bookstore_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        orders::{CreateOrderRequest, OrderLineRequest, UpdateOrderStatusRequest},
        payments::{DEFAULT_PAYMENT_METHOD, ProcessPaymentRequest, UpdatePaymentStatusRequest},
    },
    entity::{
        Payments,
        enums::{EntityState, OrderStatus, PaymentStatus, Role},
        payments::Column as PaymentCol,
        products::{ActiveModel as ProductActive, Model as ProductModel},
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    services::{admin_order_service, admin_payment_service, order_service, payment_service},
    state::AppState,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

// Order placement, payment and cancellation against a real database.
// Skipped unless TEST_DATABASE_URL or DATABASE_URL is set.
#[tokio::test]
async fn order_payment_and_cancellation_flow() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let customer = create_user(&state, Role::User).await?;
    let admin = create_user(&state, Role::Admin).await?;
    let book = create_product(&state, Decimal::new(10, 0), true).await?;
    let pamphlet = create_product(&state, Decimal::new(5, 0), true).await?;

    // 2 x 10 + 2 x 5
    let order = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            items: vec![
                OrderLineRequest {
                    product_id: book.id,
                    quantity: 2,
                },
                OrderLineRequest {
                    product_id: pamphlet.id,
                    quantity: 2,
                },
            ],
        },
    )
    .await?
    .data
    .expect("order detail");
    assert_eq!(order.order.total_price, Decimal::new(30, 0));
    assert_eq!(order.order.status, OrderStatus::Pending);
    assert_eq!(order.items.len(), 2);
    let order_id = order.order.id;

    // Underpaying is rejected and leaves the order untouched.
    let err = payment_service::process_payment(&state, &customer, payment(order_id, 25))
        .await
        .expect_err("amount mismatch");
    assert!(matches!(err, AppError::BadRequest(_)));
    let reloaded = order_service::get_order(&state, &customer, order_id)
        .await?
        .data
        .expect("order");
    assert_eq!(reloaded.order.status, OrderStatus::Pending);
    assert!(reloaded.payment.is_none());

    let paid = payment_service::process_payment(&state, &customer, payment(order_id, 30))
        .await?
        .data
        .expect("payment result");
    assert!(paid.success);
    assert_eq!(paid.payment.status, PaymentStatus::Success);
    assert!(
        paid.payment
            .transaction_id
            .as_deref()
            .is_some_and(|id| id.starts_with("TRX-"))
    );

    let reloaded = order_service::get_order(&state, &customer, order_id)
        .await?
        .data
        .expect("order");
    assert_eq!(reloaded.order.status, OrderStatus::Paid);
    assert!(reloaded.payment.is_some());

    // A second charge for the same order is refused.
    let err = payment_service::process_payment(&state, &customer, payment(order_id, 30))
        .await
        .expect_err("duplicate payment");
    assert!(matches!(err, AppError::Conflict(_)));

    // Someone else cannot see the payment.
    let stranger = create_user(&state, Role::User).await?;
    let err = payment_service::get_by_order_id(&state, &stranger, order_id)
        .await
        .expect_err("foreign order");
    assert!(matches!(err, AppError::NotFound(_)));

    // Later price changes do not touch the snapshot.
    let mut repriced: ProductActive = book.into();
    repriced.price = Set(Decimal::new(99, 0));
    repriced.update(&state.orm).await?;
    let reloaded = order_service::get_order(&state, &customer, order_id)
        .await?
        .data
        .expect("order");
    assert_eq!(reloaded.order.total_price, Decimal::new(30, 0));
    assert!(
        reloaded
            .items
            .iter()
            .any(|item| item.price == Decimal::new(10, 0))
    );

    let cancelled = order_service::cancel_order(&state, &customer, order_id)
        .await?
        .data
        .expect("order");
    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);

    // Shipped orders are past the point of cancelling.
    let second = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            items: vec![OrderLineRequest {
                product_id: pamphlet.id,
                quantity: 1,
            }],
        },
    )
    .await?
    .data
    .expect("order");
    admin_order_service::update_status(
        &state,
        &admin,
        second.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Shipped,
        },
    )
    .await?;
    let err = order_service::cancel_order(&state, &customer, second.order.id)
        .await
        .expect_err("shipped");
    assert!(matches!(err, AppError::InvalidState(_)));
    let err = admin_order_service::update_status(
        &state,
        &admin,
        second.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Cancelled,
        },
    )
    .await
    .expect_err("shipped");
    assert!(matches!(err, AppError::InvalidState(_)));

    // Customers cannot reach admin services.
    let err = admin_order_service::daily_report(&state, &customer, 7)
        .await
        .expect_err("not admin");
    assert!(matches!(err, AppError::Forbidden));

    let report = admin_order_service::daily_report(&state, &admin, 7)
        .await?
        .data
        .expect("report");
    assert_eq!(report.days, 7);
    assert_eq!(report.data.len(), 7);
    let today = Utc::now().date_naive();
    assert_eq!(report.data.last().map(|day| day.date), Some(today));
    assert!(report.data.last().is_some_and(|day| day.total >= 2));

    Ok(())
}

#[tokio::test]
async fn failed_payment_is_retried_in_place() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let customer = create_user(&state, Role::User).await?;
    let admin = create_user(&state, Role::Admin).await?;
    let book = create_product(&state, Decimal::new(15, 0), true).await?;
    let order_id = place_order(&state, &customer, book.id, 2).await?;

    let first = payment_service::process_payment(&state, &customer, payment(order_id, 30))
        .await?
        .data
        .expect("payment result")
        .payment;

    let failed = admin_payment_service::update_status(
        &state,
        &admin,
        first.id,
        UpdatePaymentStatusRequest {
            status: PaymentStatus::Failed,
        },
    )
    .await?
    .data
    .expect("payment");
    assert_eq!(failed.status, PaymentStatus::Failed);
    let reloaded = order_service::get_order(&state, &customer, order_id)
        .await?
        .data
        .expect("order");
    assert_eq!(reloaded.order.status, OrderStatus::PaymentFailed);

    let retried = payment_service::process_payment(&state, &customer, payment(order_id, 30))
        .await?
        .data
        .expect("payment result");
    assert!(retried.success);
    assert_eq!(retried.payment.id, first.id);
    assert_eq!(retried.payment.status, PaymentStatus::Success);
    assert!(retried.payment.transaction_id.is_some());
    assert_ne!(retried.payment.transaction_id, first.transaction_id);

    let reloaded = order_service::get_order(&state, &customer, order_id)
        .await?
        .data
        .expect("order");
    assert_eq!(reloaded.order.status, OrderStatus::Paid);

    let rows = Payments::find()
        .filter(PaymentCol::OrderId.eq(order_id))
        .count(&state.orm)
        .await?;
    assert_eq!(rows, 1);

    Ok(())
}

#[tokio::test]
async fn retry_needs_a_failed_payment() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let customer = create_user(&state, Role::User).await?;
    let admin = create_user(&state, Role::Admin).await?;
    let book = create_product(&state, Decimal::new(15, 0), true).await?;
    let order_id = place_order(&state, &customer, book.id, 2).await?;

    let first = payment_service::process_payment(&state, &customer, payment(order_id, 30))
        .await?
        .data
        .expect("payment result")
        .payment;

    // FAILED moves the order to PAYMENT_FAILED; PENDING then leaves the order alone.
    for status in [PaymentStatus::Failed, PaymentStatus::Pending] {
        admin_payment_service::update_status(
            &state,
            &admin,
            first.id,
            UpdatePaymentStatusRequest { status },
        )
        .await?;
    }

    let err = payment_service::process_payment(&state, &customer, payment(order_id, 30))
        .await
        .expect_err("payment is not failed");
    assert!(matches!(err, AppError::Conflict(_)));

    let reloaded = order_service::get_order(&state, &customer, order_id)
        .await?
        .data
        .expect("order");
    assert_eq!(reloaded.order.status, OrderStatus::PaymentFailed);
    assert_eq!(
        reloaded.payment.map(|p| p.status),
        Some(PaymentStatus::Pending)
    );

    Ok(())
}

#[tokio::test]
async fn inactive_products_cannot_be_ordered() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let customer = create_user(&state, Role::User).await?;
    let hidden = create_product(&state, Decimal::new(12, 0), false).await?;

    let err = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            items: vec![OrderLineRequest {
                product_id: hidden.id,
                quantity: 1,
            }],
        },
    )
    .await
    .expect_err("inactive product");
    assert!(matches!(err, AppError::NotFound(_)));

    let err = order_service::create_order(&state, &customer, CreateOrderRequest { items: vec![] })
        .await
        .expect_err("empty order");
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run it.");
                return Ok(None);
            }
        };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        access_token_ttl: 900,
        refresh_token_ttl: 3600,
        upload_dir: std::env::temp_dir().to_string_lossy().to_string(),
        max_upload_bytes: 1024 * 1024,
        admin_email: "admin@example.com".into(),
        admin_password: "Admin123".into(),
        admin_name: "Admin".into(),
    };
    Ok(Some(AppState::new(orm, config)))
}

async fn create_user(state: &AppState, role: Role) -> anyhow::Result<AuthUser> {
    let id = Uuid::new_v4();
    let email = format!("{id}@example.com");
    UserActive {
        id: Set(id),
        email: Set(email.clone()),
        password_hash: Set("not-a-real-hash".into()),
        name: Set("Flow Tester".into()),
        role: Set(role),
        is_active: Set(true),
        state: Set(EntityState::Active),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: id,
        email,
        role,
    })
}

async fn create_product(
    state: &AppState,
    price: Decimal,
    is_active: bool,
) -> anyhow::Result<ProductModel> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        title: Set(format!("Flow Book {}", Uuid::new_v4())),
        price: Set(price),
        description: Set("A book for testing".into()),
        image: Set(None),
        is_active: Set(is_active),
        state: Set(EntityState::Active),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(product)
}

async fn place_order(
    state: &AppState,
    customer: &AuthUser,
    product_id: Uuid,
    quantity: i32,
) -> anyhow::Result<Uuid> {
    let order = order_service::create_order(
        state,
        customer,
        CreateOrderRequest {
            items: vec![OrderLineRequest {
                product_id,
                quantity,
            }],
        },
    )
    .await?
    .data
    .expect("order");
    Ok(order.order.id)
}

fn payment(order_id: Uuid, amount: i64) -> ProcessPaymentRequest {
    ProcessPaymentRequest {
        order_id,
        card_number: "4111 1111 1111 1111".into(),
        cvv: "123".into(),
        expiry_date: "12/30".into(),
        amount: Decimal::new(amount, 0),
        payment_method: DEFAULT_PAYMENT_METHOD.into(),
    }
}
