use uuid::Uuid;

use crate::{
    audit::log_audit,
    cart::{self, Cart},
    db::DbPool,
    dto::cart::{AddToCartRequest, CartView},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartEntry, Item},
    response::{ApiResponse, Meta},
};

/// Resolve the persisted entries against the live menu. The cart is rebuilt
/// as a value object on every request; entries whose item has been deleted
/// are skipped.
pub async fn view_cart(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let rows: Vec<(Uuid, i32)> =
        sqlx::query_as("SELECT item_id, quantity FROM cart_entries WHERE user_id = $1")
            .bind(user.user_id)
            .fetch_all(pool)
            .await?;
    let item_ids: Vec<Uuid> = rows.iter().map(|(id, _)| *id).collect();
    let cart = Cart::from_entries(rows);

    let items: Vec<Item> = sqlx::query_as("SELECT * FROM items WHERE id = ANY($1)")
        .bind(&item_ids)
        .fetch_all(pool)
        .await?;

    let lines = cart.snapshot(&items);
    let total = cart::total(&lines);

    Ok(ApiResponse::success(
        "OK",
        CartView { lines, total },
        Some(Meta::empty()),
    ))
}

/// Add an item, incrementing the stored quantity when the entry already
/// exists.
pub async fn add_to_cart(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartEntry>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let item_exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM items WHERE id = $1")
        .bind(payload.item_id)
        .fetch_optional(pool)
        .await?;
    if item_exist.is_none() {
        return Err(AppError::NotFound);
    }

    let entry: CartEntry = sqlx::query_as(
        r#"
        INSERT INTO cart_entries (id, user_id, item_id, quantity)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, item_id)
        DO UPDATE SET quantity = cart_entries.quantity + EXCLUDED.quantity
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(payload.item_id)
    .bind(payload.quantity)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_add",
        Some("cart_entries"),
        Some(serde_json::json!({ "item_id": payload.item_id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Added to cart", entry, None))
}

/// Delete the entry for an item. Removing an absent key succeeds without
/// changing anything.
pub async fn remove_from_cart(
    pool: &DbPool,
    user: &AuthUser,
    item_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    sqlx::query("DELETE FROM cart_entries WHERE item_id = $1 AND user_id = $2")
        .bind(item_id)
        .bind(user.user_id)
        .execute(pool)
        .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_entries"),
        Some(serde_json::json!({ "item_id": item_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
