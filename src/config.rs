use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub momo: MomoConfig,
    pub mirror_base_url: Option<String>,
}

/// MTN MoMo collection credentials. All three secrets are optional at startup;
/// token retrieval reports a configuration error when any is absent.
#[derive(Debug, Clone)]
pub struct MomoConfig {
    pub api_user: Option<String>,
    pub api_key: Option<String>,
    pub subscription_key: Option<String>,
    pub base_url: String,
}

impl MomoConfig {
    pub fn from_env() -> Self {
        Self {
            api_user: env::var("MOMO_API_USER").ok(),
            api_key: env::var("MOMO_API_KEY").ok(),
            subscription_key: env::var("MOMO_SUBSCRIPTION_KEY").ok(),
            base_url: env::var("MOMO_BASE_URL")
                .unwrap_or_else(|_| "https://sandbox.momodeveloper.mtn.com".to_string()),
        }
    }

    pub fn credentials(&self) -> Option<(&str, &str, &str)> {
        match (
            self.api_user.as_deref(),
            self.api_key.as_deref(),
            self.subscription_key.as_deref(),
        ) {
            (Some(user), Some(key), Some(subscription)) => Some((user, key, subscription)),
            _ => None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        Ok(Self {
            port,
            database_url,
            host,
            momo: MomoConfig::from_env(),
            mirror_base_url: env::var("MIRROR_BASE_URL").ok(),
        })
    }
}
