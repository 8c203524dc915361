use anyhow::Context;
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::Claims;
use crate::{config::JwtConfig, state::AppState};

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: TimeDuration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: TimeDuration::seconds(cfg.ttl_minutes.max(0).saturating_mul(60)),
        }
    }

    pub fn sign(&self, user_id: Uuid, email: &str) -> anyhow::Result<String> {
        self.sign_at(user_id, email, OffsetDateTime::now_utc())
    }

    pub fn sign_at(
        &self,
        user_id: Uuid,
        email: &str,
        issued_at: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let exp = issued_at
            .checked_add(self.ttl)
            .context("token expiry out of range")?;
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: issued_at.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// Expiry is checked here against `now` with no leeway; the library check
    /// is disabled so the boundary does not depend on the wall clock.
    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        if now.unix_timestamp() >= data.claims.exp as i64 {
            anyhow::bail!("token expired");
        }
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}
