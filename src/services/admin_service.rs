use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, LoaderTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::{
        items::{CreateCategoryRequest, CreateItemRequest, UpdateItemRequest},
        orders::{AdminOrderList, OrderWithItems},
    },
    entity::orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    error::{AppError, AppResult},
    middleware::auth::{Action, AuthUser, authorize},
    models::{Category, Item, Order, OrderStatus, User},
    response::{ApiResponse, Meta},
    routes::admin::{PromoteUserRequest, UpdateOrderStatusRequest, UserList},
    routes::params::{OrderListQuery, SortOrder},
    services::order_service::{order_from_entity, order_item_from_entity},
    state::AppState,
};

pub async fn create_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateItemRequest,
) -> AppResult<ApiResponse<Item>> {
    authorize(user, Action::ManageCatalog)?;

    if let Some(category_id) = payload.category_id {
        ensure_category_exists(state, category_id).await?;
    }

    let item: Item = sqlx::query_as(
        r#"
        INSERT INTO items (id, category_id, name, description, price, available, image)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.category_id)
    .bind(payload.name)
    .bind(payload.description)
    .bind(payload.price)
    .bind(payload.available.unwrap_or(true))
    .bind(payload.image)
    .fetch_one(&state.pool)
    .await?;

    // Post-commit mirror push; never blocks or fails the write.
    state.notifier.item_saved(&item);

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "item_create",
        Some("items"),
        Some(serde_json::json!({ "item_id": item.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Item created", item, Some(Meta::empty())))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateItemRequest,
) -> AppResult<ApiResponse<Item>> {
    authorize(user, Action::ManageCatalog)?;

    let existing: Option<Item> = sqlx::query_as("SELECT * FROM items WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let existing = match existing {
        Some(item) => item,
        None => return Err(AppError::NotFound),
    };

    if let Some(Some(category_id)) = payload.category_id {
        ensure_category_exists(state, category_id).await?;
    }

    // Absent nullable fields keep the stored value; an explicit null clears it.
    let name = payload.name.unwrap_or(existing.name);
    let description = payload.description.unwrap_or(existing.description);
    let price = payload.price.unwrap_or(existing.price);
    let category_id = payload.category_id.unwrap_or(existing.category_id);
    let available = payload.available.unwrap_or(existing.available);
    let image = payload.image.unwrap_or(existing.image);

    let item: Item = sqlx::query_as(
        r#"
        UPDATE items
        SET category_id = $2, name = $3, description = $4, price = $5, available = $6, image = $7
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(category_id)
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(available)
    .bind(image)
    .fetch_one(&state.pool)
    .await?;

    state.notifier.item_saved(&item);

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "item_update",
        Some("items"),
        Some(serde_json::json!({ "item_id": item.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Item updated", item, Some(Meta::empty())))
}

pub async fn delete_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    authorize(user, Action::ManageCatalog)?;

    let result = sqlx::query("DELETE FROM items WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "item_delete",
        Some("items"),
        Some(serde_json::json!({ "item_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Item deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    authorize(user, Action::ManageCatalog)?;

    // The unique index is the duplicate check; a racing insert surfaces the
    // same way as a plain duplicate.
    let result: Result<Category, sqlx::Error> =
        sqlx::query_as("INSERT INTO categories (id, name) VALUES ($1, $2) RETURNING *")
            .bind(Uuid::new_v4())
            .bind(payload.name)
            .fetch_one(&state.pool)
            .await;
    let category = match result {
        Ok(category) => category,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(AppError::BadRequest("Category already exists".into()));
        }
        Err(err) => return Err(err.into()),
    };

    Ok(ApiResponse::success(
        "Category created",
        category,
        Some(Meta::empty()),
    ))
}

/// Items keep existing with no category; the FK clears their reference.
pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    authorize(user, Action::ManageCatalog)?;

    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Category deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<AdminOrderList>> {
    authorize(user, Action::ManageOrders)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let mut finder = Orders::find().filter(condition);

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let line_items = orders
        .load_many(crate::entity::OrderItems, &state.orm)
        .await?;

    let items = orders
        .into_iter()
        .zip(line_items)
        .map(|(order, items)| OrderWithItems {
            order: order_from_entity(order),
            items: items.into_iter().map(order_item_from_entity).collect(),
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        AdminOrderList { items },
        Some(meta),
    ))
}

/// Staff may set any enumerated status. This intentionally bypasses the
/// customer cancellation guard as an administrative override.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    authorize(user, Action::ManageOrders)?;
    let status = OrderStatus::parse(&payload.status)
        .ok_or_else(|| AppError::BadRequest("Invalid order status".into()))?;

    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let mut active: OrderActive = existing.into();
    active.status = Set(status.as_str().to_string());
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    authorize(user, Action::ManageOrders)?;

    let result = Orders::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_delete",
        Some("orders"),
        Some(serde_json::json!({ "order_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_users(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserList>> {
    authorize(user, Action::ManageUsers)?;

    let users: Vec<User> = sqlx::query_as("SELECT * FROM users ORDER BY created_at")
        .fetch_all(&state.pool)
        .await?;

    Ok(ApiResponse::success(
        "Users",
        UserList { items: users },
        Some(Meta::empty()),
    ))
}

/// Promote a user to staff or superuser. Superuser promotion grants staff as
/// well, matching the meaning of the tiers.
pub async fn promote_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: PromoteUserRequest,
) -> AppResult<ApiResponse<User>> {
    authorize(user, Action::ManageUsers)?;

    let (is_staff, is_superuser) = match payload.role.as_str() {
        "staff" => (true, false),
        "superuser" => (true, true),
        _ => return Err(AppError::BadRequest("Invalid role".into())),
    };

    let promoted: Option<User> = sqlx::query_as(
        r#"
        UPDATE users
        SET is_staff = $2, is_superuser = is_superuser OR $3
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(is_staff)
    .bind(is_superuser)
    .fetch_optional(&state.pool)
    .await?;
    let promoted = match promoted {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "user_promote",
        Some("users"),
        Some(serde_json::json!({ "user_id": promoted.id, "role": payload.role })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User promoted",
        promoted,
        Some(Meta::empty()),
    ))
}

async fn ensure_category_exists(state: &AppState, category_id: Uuid) -> AppResult<()> {
    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE id = $1")
        .bind(category_id)
        .fetch_optional(&state.pool)
        .await?;
    if exist.is_none() {
        return Err(AppError::BadRequest("Category not found".into()));
    }
    Ok(())
}
