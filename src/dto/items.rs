use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Category, Item};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub available: Option<bool>,
    /// Reference into the external image store, not the file itself.
    pub image: Option<String>,
}

/// Partial update. For the nullable fields an absent key keeps the stored
/// value while an explicit `null` clears it.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,
    pub available: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub image: Option<Option<String>>,
}

// Wraps the parsed value so an explicit null arrives as `Some(None)` while a
// missing key stays `None` via the field default.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct ItemList {
    pub items: Vec<Item>,
}

#[derive(Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

#[cfg(test)]
mod tests {
    use super::UpdateItemRequest;

    #[test]
    fn update_request_distinguishes_null_from_absent() {
        let req: UpdateItemRequest = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(req.description, Some(None));
        assert_eq!(req.image, None);

        let req: UpdateItemRequest = serde_json::from_str(r#"{"description": "Fresh"}"#).unwrap();
        assert_eq!(req.description, Some(Some("Fresh".to_string())));
        assert_eq!(req.category_id, None);
    }
}
