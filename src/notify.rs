//! Best-effort mirroring of catalog writes to an external datastore.
//!
//! Item create/update call [`CatalogNotifier::item_saved`] after their own
//! commit; the push happens on a spawned task and a failure is logged, never
//! surfaced to the caller.

use uuid::Uuid;

use crate::models::Item;

#[derive(Clone)]
pub struct CatalogNotifier {
    http: reqwest::Client,
    base_url: Option<String>,
}

impl CatalogNotifier {
    pub fn new(http: reqwest::Client, base_url: Option<String>) -> Self {
        Self { http, base_url }
    }

    /// Notifier that never pushes anywhere; used when no mirror is configured
    /// and by tests.
    pub fn disabled() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: None,
        }
    }

    pub fn item_saved(&self, item: &Item) {
        let Some(base) = self.base_url.as_ref() else {
            tracing::debug!(item_id = %item.id, "catalog mirror disabled, skipping push");
            return;
        };

        let url = mirror_url(base, item.id);
        let http = self.http.clone();
        let payload = mirror_payload(item);

        tokio::spawn(async move {
            let result = http.put(&url).json(&payload).send().await;
            match result {
                Ok(resp) if resp.status().is_success() => {
                    tracing::debug!(%url, "item mirrored");
                }
                Ok(resp) => {
                    tracing::warn!(%url, status = %resp.status(), "item mirror push rejected");
                }
                Err(err) => {
                    tracing::warn!(%url, error = %err, "item mirror push failed");
                }
            }
        });
    }
}

fn mirror_url(base: &str, item_id: Uuid) -> String {
    format!("{}/items/{}.json", base.trim_end_matches('/'), item_id)
}

fn mirror_payload(item: &Item) -> serde_json::Value {
    serde_json::json!({
        "id": item.id,
        "name": item.name,
        "description": item.description,
        "price": item.price,
        "available": item.available,
        "category_id": item.category_id,
        "image": item.image,
        "created_at": item.created_at,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::{CatalogNotifier, mirror_payload, mirror_url};
    use crate::models::Item;

    fn item() -> Item {
        Item {
            id: Uuid::new_v4(),
            category_id: None,
            name: "Chapati".into(),
            description: Some("Fresh chapati".into()),
            price: dec!(300.00),
            available: true,
            image: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn mirror_url_trims_trailing_slash() {
        let id = Uuid::new_v4();
        assert_eq!(
            mirror_url("https://mirror.example/", id),
            format!("https://mirror.example/items/{id}.json")
        );
    }

    #[test]
    fn mirror_payload_carries_the_catalog_fields() {
        let item = item();
        let payload = mirror_payload(&item);
        assert_eq!(payload["id"], serde_json::json!(item.id));
        assert_eq!(payload["name"], "Chapati");
        assert_eq!(payload["available"], true);
        assert!(payload["category_id"].is_null());
        assert!(payload.get("price").is_some());
    }

    #[tokio::test]
    async fn disabled_notifier_skips_the_push() {
        // No base URL configured; the call must return without spawning.
        CatalogNotifier::disabled().item_saved(&item());
    }
}
