use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::items::{CategoryList, ItemList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Category, Item},
    response::{ApiResponse, Meta},
    routes::params::{ItemSortBy, MenuQuery, SortOrder},
    state::AppState,
};

pub fn menu_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_menu))
        .route("/{id}", get(item_detail))
}

pub fn category_router() -> Router<AppState> {
    Router::new().route("/", get(list_categories))
}

#[utoipa::path(
    get,
    path = "/api/menu",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Substring filter on name/description"),
        ("category_id" = Option<Uuid>, Query, description = "Filter by category"),
        ("include_unavailable" = Option<bool>, Query, description = "Also list unavailable items (staff only; ignored otherwise)"),
        ("sort_by" = Option<String>, Query, description = "Sort by: name, price, created_at"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc"),
    ),
    responses(
        (status = 200, description = "List menu items", body = ApiResponse<ItemList>)
    ),
    tag = "Catalog"
)]
pub async fn list_menu(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<ApiResponse<ItemList>>> {
    let (page, limit, offset) = query.pagination.normalize();
    let sort_by = query.sort_by.unwrap_or(ItemSortBy::Name).as_sql();
    let sort_order = query.sort_order.unwrap_or(SortOrder::Asc).as_sql();

    // Only staff get to see unavailable items; the flag is ignored otherwise.
    let staff_caller = user.is_some_and(|u| u.is_staff || u.is_superuser);
    let include_unavailable = query.include_unavailable && staff_caller;

    let filter = r#"
        WHERE ($1 OR available = TRUE)
          AND ($2::uuid IS NULL OR category_id = $2)
          AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%' OR description ILIKE '%' || $3 || '%')
    "#;

    let sql = format!(
        "SELECT * FROM items {filter} ORDER BY {sort_by} {sort_order} LIMIT $4 OFFSET $5"
    );
    let items = sqlx::query_as::<_, Item>(&sql)
        .bind(include_unavailable)
        .bind(query.category_id)
        .bind(query.q.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    let count_sql = format!("SELECT count(*) FROM items {filter}");
    let total: (i64,) = sqlx::query_as(&count_sql)
        .bind(include_unavailable)
        .bind(query.category_id)
        .bind(query.q.as_deref())
        .fetch_one(&state.pool)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(Json(ApiResponse::success(
        "Menu",
        ItemList { items },
        Some(meta),
    )))
}

#[utoipa::path(
    get,
    path = "/api/menu/{id}",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Get item", body = ApiResponse<Item>),
        (status = 404, description = "Item not found"),
    ),
    tag = "Catalog"
)]
pub async fn item_detail(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Item>>> {
    let result = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let result = match result {
        Some(item) => item,
        None => return Err(AppError::NotFound),
    };
    Ok(Json(ApiResponse::success("Item", result, None)))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let items = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(ApiResponse::success(
        "Categories",
        CategoryList { items },
        None,
    )))
}
