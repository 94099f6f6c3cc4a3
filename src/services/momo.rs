//! MTN MoMo collection token retrieval.
//!
//! One token-exchange request per call: no retry, no caching, no expiry
//! tracking. Failures come back as values; the HTTP layer decides how to
//! present them.

use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use thiserror::Error;

use crate::config::MomoConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("missing MoMo credentials (api user, api key, subscription key)")]
    MissingCredentials,

    #[error("token request failed with status {0}")]
    Status(reqwest::StatusCode),

    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    access_token: String,
}

/// Exchange the configured credentials for a bearer token. Credentials are
/// checked before any network traffic happens.
pub async fn fetch_access_token(
    http: &reqwest::Client,
    config: &MomoConfig,
) -> Result<String, TokenError> {
    let (api_user, api_key, subscription_key) =
        config.credentials().ok_or(TokenError::MissingCredentials)?;

    let url = format!("{}/collection/token/", config.base_url.trim_end_matches('/'));

    let resp = http
        .post(&url)
        .basic_auth(api_user, Some(api_key))
        .header("Ocp-Apim-Subscription-Key", subscription_key)
        .header(CACHE_CONTROL, "no-cache")
        .send()
        .await?;

    if !resp.status().is_success() {
        return Err(TokenError::Status(resp.status()));
    }

    let body: TokenBody = resp.json().await?;
    Ok(body.access_token)
}

#[cfg(test)]
mod tests {
    use super::{TokenError, fetch_access_token};
    use crate::config::MomoConfig;

    fn config(subscription_key: Option<&str>) -> MomoConfig {
        MomoConfig {
            api_user: Some("sandbox-user".into()),
            api_key: Some("sandbox-key".into()),
            subscription_key: subscription_key.map(str::to_string),
            base_url: "https://sandbox.momodeveloper.mtn.com".into(),
        }
    }

    #[tokio::test]
    async fn missing_subscription_key_fails_before_any_network_call() {
        // A client that cannot connect anywhere; the call must not reach it.
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(1))
            .build()
            .unwrap();

        let result = fetch_access_token(&http, &config(None)).await;
        assert!(matches!(result, Err(TokenError::MissingCredentials)));
    }
}
