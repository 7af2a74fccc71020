use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{auth::jwt::TokenIssuer, config::AppConfig, db};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub tokens: TokenIssuer,
}

impl AppState {
    /// Build everything the handlers need from an already-loaded config.
    /// Bad JWT settings fail here, before the listener is bound.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let tokens = TokenIssuer::new(&config.jwt)?;
        let db = db::connect(&config.database_url).await?;
        Ok(Self {
            db,
            config: Arc::new(config),
            tokens,
        })
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>, tokens: TokenIssuer) -> Self {
        Self { db, config, tokens }
    }
}
