use axum::extract::{Query, State};
use canteen_api::{
    config::MomoConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        cart::AddToCartRequest,
        items::{CreateCategoryRequest, UpdateItemRequest},
        orders::PlaceOrderRequest,
        payments::CreatePaymentRequest,
    },
    entity::{items::ActiveModel as ItemActive, users::ActiveModel as UserActive},
    error::AppError,
    middleware::auth::AuthUser,
    models::OrderStatus,
    notify::CatalogNotifier,
    routes::admin::{PromoteUserRequest, UpdateOrderStatusRequest},
    routes::catalog,
    routes::params::{MenuQuery, Pagination},
    services::{admin_service, cart_service, order_service, payment_service},
    state::AppState,
};
use rust_decimal_macros::dec;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Integration flow: fill the cart, checkout with price snapshots, exercise
// the cancellation guard and the admin override.
#[tokio::test]
async fn cart_checkout_and_lifecycle_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let user_id = create_user(&state, "user@canteen.test", false, false).await?;
    let staff_id = create_user(&state, "staff@canteen.test", true, false).await?;
    let root_id = create_user(&state, "root@canteen.test", true, true).await?;

    let chapati = create_item(&state, "Chapati", dec!(1000.00)).await?;
    let tea = create_item(&state, "African Tea", dec!(500.00)).await?;

    let customer = AuthUser {
        user_id,
        is_staff: false,
        is_superuser: false,
    };
    let staff = AuthUser {
        user_id: staff_id,
        is_staff: true,
        is_superuser: false,
    };
    let root = AuthUser {
        user_id: root_id,
        is_staff: true,
        is_superuser: true,
    };

    // Adding the same item twice accumulates the quantity.
    add(&state, &customer, chapati, 2).await?;
    add(&state, &customer, chapati, 3).await?;
    let stored: (i32,) =
        sqlx::query_as("SELECT quantity FROM cart_entries WHERE user_id = $1 AND item_id = $2")
            .bind(user_id)
            .bind(chapati)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(stored.0, 5);

    // Reset to the checkout scenario: 2 x 1000.00 + 1 x 500.00.
    cart_service::remove_from_cart(&state.pool, &customer, chapati).await?;
    add(&state, &customer, chapati, 2).await?;
    add(&state, &customer, tea, 1).await?;
    let view = cart_service::view_cart(&state.pool, &customer).await?;
    let view = view.data.unwrap();
    assert_eq!(view.lines.len(), 2);
    assert_eq!(view.total, dec!(2500.00));

    // Removing an item that is not in the cart changes nothing.
    cart_service::remove_from_cart(&state.pool, &customer, Uuid::new_v4()).await?;
    let view = cart_service::view_cart(&state.pool, &customer).await?;
    assert_eq!(view.data.unwrap().lines.len(), 2);

    // Checkout snapshots unit prices and clears the cart.
    let placed = order_service::place_order(
        &state,
        &customer,
        PlaceOrderRequest {
            full_name: "Test Customer".into(),
            phone: "0788000000".into(),
            address: "Campus".into(),
        },
    )
    .await?;
    let placed = placed.data.unwrap();
    assert_eq!(placed.order.total_price, dec!(2500.00));
    assert_eq!(placed.items.len(), 2);
    let mut snapshots: Vec<_> = placed.items.iter().map(|i| i.price).collect();
    snapshots.sort();
    assert_eq!(snapshots, vec![dec!(500.00), dec!(1000.00)]);

    let view = cart_service::view_cart(&state.pool, &customer).await?;
    assert!(view.data.unwrap().lines.is_empty());

    // A later price change must not touch the recorded order.
    sqlx::query("UPDATE items SET price = $1 WHERE id = $2")
        .bind(dec!(9999.00))
        .bind(chapati)
        .execute(&state.pool)
        .await?;
    let fetched = order_service::get_order(&state, &customer, placed.order.id).await?;
    let fetched = fetched.data.unwrap();
    assert_eq!(fetched.order.total_price, dec!(2500.00));
    assert!(fetched.items.iter().any(|i| i.price == dec!(1000.00)));

    // Payment attempts snapshot the order total; several per order are fine.
    let first = payment_service::create_payment(
        &state,
        &customer,
        placed.order.id,
        CreatePaymentRequest {
            method: "momo".into(),
        },
    )
    .await?;
    let first = first.data.unwrap();
    assert_eq!(first.amount, dec!(2500.00));
    assert_eq!(first.currency, "RWF");
    assert_eq!(first.status, "pending");

    let second = payment_service::create_payment(
        &state,
        &customer,
        placed.order.id,
        CreatePaymentRequest {
            method: "cash".into(),
        },
    )
    .await?;
    assert_ne!(first.id, second.data.unwrap().id);

    // Another user's order is invisible to the payment path.
    let not_mine = payment_service::create_payment(
        &state,
        &staff,
        placed.order.id,
        CreatePaymentRequest {
            method: "momo".into(),
        },
    )
    .await;
    assert!(matches!(not_mine, Err(AppError::NotFound)));

    let blank_method = payment_service::create_payment(
        &state,
        &customer,
        placed.order.id,
        CreatePaymentRequest { method: "  ".into() },
    )
    .await;
    assert!(matches!(blank_method, Err(AppError::BadRequest(_))));

    // Checkout with an empty cart creates nothing.
    let empty = order_service::place_order(
        &state,
        &customer,
        PlaceOrderRequest {
            full_name: "Test Customer".into(),
            phone: "0788000000".into(),
            address: "Campus".into(),
        },
    )
    .await;
    assert!(matches!(empty, Err(AppError::BadRequest(_))));
    let orders = order_service::list_orders(
        &state,
        &customer,
        canteen_api::routes::params::OrderListQuery {
            pagination: canteen_api::routes::params::Pagination {
                page: None,
                per_page: None,
            },
            status: None,
            sort_order: None,
        },
    )
    .await?;
    assert_eq!(orders.data.unwrap().items.len(), 1);

    // Pending orders can be cancelled exactly once.
    let cancelled = order_service::cancel_order(&state, &customer, placed.order.id).await?;
    assert_eq!(
        cancelled.data.unwrap().status,
        OrderStatus::Cancelled.as_str()
    );
    let again = order_service::cancel_order(&state, &customer, placed.order.id).await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    // Staff override can set any enumerated status, but nothing else.
    let delivered = admin_service::update_order_status(
        &state,
        &staff,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: "delivered".into(),
        },
    )
    .await?;
    assert_eq!(delivered.data.unwrap().status, "delivered");

    let invalid = admin_service::update_order_status(
        &state,
        &staff,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: "shipped".into(),
        },
    )
    .await;
    assert!(matches!(invalid, Err(AppError::BadRequest(_))));

    // Delivered orders are terminal for the customer path.
    let rejected = order_service::cancel_order(&state, &customer, placed.order.id).await;
    assert!(matches!(rejected, Err(AppError::BadRequest(_))));

    // Unavailable items stay hidden from plain callers even when requested.
    sqlx::query("UPDATE items SET available = FALSE WHERE id = $1")
        .bind(tea)
        .execute(&state.pool)
        .await?;
    let menu = catalog::list_menu(State(state.clone()), None, Query(menu_query(true))).await?;
    let menu = menu.0.data.unwrap();
    assert!(menu.items.iter().all(|i| i.id != tea));

    let menu = catalog::list_menu(
        State(state.clone()),
        Some(staff.clone()),
        Query(menu_query(true)),
    )
    .await?;
    assert!(menu.0.data.unwrap().items.iter().any(|i| i.id == tea));

    // An explicit null clears a nullable field; an absent key keeps it.
    let updated = admin_service::update_item(
        &state,
        &staff,
        chapati,
        UpdateItemRequest {
            name: None,
            description: Some(Some("Fresh chapati".into())),
            price: None,
            category_id: None,
            available: None,
            image: None,
        },
    )
    .await?;
    assert_eq!(
        updated.data.unwrap().description.as_deref(),
        Some("Fresh chapati")
    );

    let cleared = admin_service::update_item(
        &state,
        &staff,
        chapati,
        UpdateItemRequest {
            name: None,
            description: Some(None),
            price: None,
            category_id: None,
            available: None,
            image: None,
        },
    )
    .await?;
    let cleared = cleared.data.unwrap();
    assert!(cleared.description.is_none());
    assert_eq!(cleared.name, "Chapati");

    // Duplicate category names are reported as a bad request.
    admin_service::create_category(
        &state,
        &staff,
        CreateCategoryRequest {
            name: "Drinks".into(),
        },
    )
    .await?;
    let duplicate = admin_service::create_category(
        &state,
        &staff,
        CreateCategoryRequest {
            name: "Drinks".into(),
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::BadRequest(_))));

    // Customers cannot reach the admin surface; superusers promote.
    let forbidden = admin_service::list_all_orders(
        &state,
        &customer,
        canteen_api::routes::params::OrderListQuery {
            pagination: canteen_api::routes::params::Pagination {
                page: None,
                per_page: None,
            },
            status: None,
            sort_order: None,
        },
    )
    .await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    let promote_denied = admin_service::promote_user(
        &state,
        &staff,
        user_id,
        PromoteUserRequest {
            role: "staff".into(),
        },
    )
    .await;
    assert!(matches!(promote_denied, Err(AppError::Forbidden)));

    let promoted = admin_service::promote_user(
        &state,
        &root,
        user_id,
        PromoteUserRequest {
            role: "staff".into(),
        },
    )
    .await?;
    assert!(promoted.data.unwrap().is_staff);

    Ok(())
}

fn menu_query(include_unavailable: bool) -> MenuQuery {
    MenuQuery {
        pagination: Pagination {
            page: None,
            per_page: None,
        },
        q: None,
        category_id: None,
        include_unavailable,
        sort_by: None,
        sort_order: None,
    }
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(database_url).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, cart_entries, payments, audit_logs, items, categories, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        pool,
        orm,
        http: reqwest::Client::new(),
        notifier: CatalogNotifier::disabled(),
        momo: MomoConfig {
            api_user: None,
            api_key: None,
            subscription_key: None,
            base_url: "https://sandbox.momodeveloper.mtn.com".into(),
        },
    })
}

async fn create_user(
    state: &AppState,
    email: &str,
    is_staff: bool,
    is_superuser: bool,
) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        is_staff: Set(is_staff),
        is_superuser: Set(is_superuser),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

async fn create_item(
    state: &AppState,
    name: &str,
    price: rust_decimal::Decimal,
) -> anyhow::Result<Uuid> {
    let item = ItemActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(None),
        name: Set(name.to_string()),
        description: Set(None),
        price: Set(price),
        available: Set(true),
        image: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(item.id)
}

async fn add(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    quantity: i32,
) -> anyhow::Result<()> {
    cart_service::add_to_cart(&state.pool, user, AddToCartRequest { item_id, quantity }).await?;
    Ok(())
}
