use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemSortBy {
    Name,
    Price,
    CreatedAt,
}

impl ItemSortBy {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ItemSortBy::Name => "name",
            ItemSortBy::Price => "price",
            ItemSortBy::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MenuQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    /// Substring match on name or description.
    pub q: Option<String>,
    pub category_id: Option<Uuid>,
    /// Unavailable items are hidden unless explicitly requested.
    #[serde(default)]
    pub include_unavailable: bool,
    pub sort_by: Option<ItemSortBy>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub status: Option<String>,
    pub sort_order: Option<SortOrder>,
}
