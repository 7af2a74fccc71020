use anyhow::Context;
use axum::extract::FromRef;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        jwt::TokenIssuer,
        password::{dummy_hash, hash_password, verify_password},
        repo::StoreError,
        repo_types::User,
    },
    error::AuthError,
    state::AppState,
};

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AuthError::EmailAlreadyRegistered,
            StoreError::Database(e) => AuthError::Internal(anyhow::Error::new(e).context("database")),
        }
    }
}

/// Register/login orchestration over the user store, hasher and token issuer.
#[derive(Clone)]
pub struct AuthService {
    db: SqlitePool,
    tokens: TokenIssuer,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.db.clone(), state.tokens.clone())
    }
}

impl AuthService {
    pub fn new(db: SqlitePool, tokens: TokenIssuer) -> Self {
        Self { db, tokens }
    }

    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = normalize_email(email);

        if User::find_by_email(&self.db, &email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(AuthError::EmailAlreadyRegistered);
        }

        let plain = password.to_owned();
        let hash = tokio::task::spawn_blocking(move || hash_password(&plain))
            .await
            .context("hash task panicked")??;

        let user = User::create(&self.db, &email, &hash).await.map_err(|e| {
            if matches!(e, StoreError::DuplicateEmail) {
                warn!(email = %email, "email registered concurrently");
            }
            AuthError::from(e)
        })?;

        let token = self.tokens.issue(&user.email)?;
        info!(user_id = user.id, email = %user.email, "user registered");
        Ok(token)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = normalize_email(email);

        let user = User::find_by_email(&self.db, &email).await?;

        // Unknown emails still pay for one argon2 verify.
        let plain = password.to_owned();
        let stored = user
            .as_ref()
            .map_or_else(|| dummy_hash().to_owned(), |u| u.password_hash.clone());
        let ok = tokio::task::spawn_blocking(move || verify_password(&plain, &stored))
            .await
            .context("verify task panicked")?;

        let Some(user) = user else {
            warn!(email = %email, "login unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !ok {
            warn!(email = %email, user_id = user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.email)?;
        info!(user_id = user.id, email = %user.email, "user logged in");
        Ok(token)
    }
}
