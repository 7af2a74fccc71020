use std::{str::FromStr, sync::Arc, time::Duration};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::config::{ConfigError, JwtConfig, MAX_TTL_MINUTES};

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Signs bearer tokens with a symmetric secret. Built once at startup.
#[derive(Clone)]
pub struct TokenIssuer {
    keys: Arc<Keys>,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(cfg: &JwtConfig) -> Result<Self, ConfigError> {
        let algorithm = Algorithm::from_str(cfg.algorithm.trim())
            .ok()
            .filter(|a| matches!(a, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512))
            .ok_or_else(|| ConfigError::UnsupportedAlgorithm(cfg.algorithm.clone()))?;
        let ttl_secs = Some(cfg.ttl_minutes)
            .filter(|m| (1..=MAX_TTL_MINUTES).contains(m))
            .and_then(|m| m.checked_mul(60))
            .ok_or_else(|| ConfigError::InvalidTtl(cfg.ttl_minutes.to_string()))?;

        Ok(Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
                decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            }),
            algorithm,
            ttl: Duration::from_secs(ttl_secs as u64),
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, subject: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now
            .checked_add(TimeDuration::seconds(self.ttl.as_secs() as i64))
            .ok_or_else(|| anyhow::anyhow!("token expiry out of range"))?;
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.keys.encoding)?;
        debug!(sub = %subject, alg = ?self.algorithm, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let validation = Validation::new(self.algorithm);
        let data = decode::<Claims>(token, &self.keys.decoding, &validation)?;
        Ok(data.claims)
    }
}
