use std::{collections::HashSet, sync::Arc, time::Duration};

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::{config::JwtConfig, state::AppState};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing secret unavailable")]
    SecretUnavailable,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("token expired")]
    Expired,
}

/// Source of the HMAC key shared by issue and verify.
pub trait SecretProvider: Send + Sync {
    fn secret(&self) -> Option<Vec<u8>>;
}

/// Secret fixed at startup from configuration.
pub struct StaticSecret(Option<String>);

impl StaticSecret {
    pub fn new(secret: Option<String>) -> Self {
        Self(secret.filter(|s| !s.is_empty()))
    }
}

impl SecretProvider for StaticSecret {
    fn secret(&self) -> Option<Vec<u8>> {
        self.0.as_ref().map(|s| s.as_bytes().to_vec())
    }
}

#[derive(Clone)]
pub struct JwtKeys {
    secrets: Arc<dyn SecretProvider>,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl JwtKeys {
    pub fn new(secrets: Arc<dyn SecretProvider>, ttl: Duration) -> Self {
        Self { secrets, ttl }
    }

    pub fn from_config(cfg: &JwtConfig) -> Self {
        let hours = cfg.ttl_hours.max(1) as u64;
        Self::new(
            Arc::new(StaticSecret::new(cfg.secret.clone())),
            Duration::from_secs(hours * 60 * 60),
        )
    }

    fn secret(&self) -> Result<Vec<u8>, TokenError> {
        self.secrets.secret().ok_or(TokenError::SecretUnavailable)
    }

    pub fn expires_at(&self, now: OffsetDateTime) -> OffsetDateTime {
        now + TimeDuration::seconds(self.ttl.as_secs() as i64)
    }

    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, subject: &str, now: OffsetDateTime) -> Result<String, TokenError> {
        let secret = self.secret()?;
        let claims = Claims {
            iss: subject.to_string(),
            exp: self.expires_at(now).unix_timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&secret),
        )
        .map_err(TokenError::Signing)?;
        debug!(subject, "jwt signed");
        Ok(token)
    }

    /// Returns the subject carried in `iss`.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<String, TokenError> {
        let secret = self.secret()?;
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is checked below against `now`, without leeway
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string(), "iss".to_string()]);

        let data = decode::<Claims>(token, &DecodingKey::from_secret(&secret), &validation)
            .map_err(TokenError::Invalid)?;
        if now.unix_timestamp() > data.claims.exp {
            return Err(TokenError::Expired);
        }
        debug!(subject = %data.claims.iss, "jwt verified");
        Ok(data.claims.iss)
    }
}
