use crate::{
    config::MomoConfig,
    db::{DbPool, OrmConn},
    notify::CatalogNotifier,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub http: reqwest::Client,
    pub notifier: CatalogNotifier,
    pub momo: MomoConfig,
}
