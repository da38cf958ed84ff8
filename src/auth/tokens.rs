use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::config::ResetTokenConfig;
use crate::error::AuthError;
use crate::state::AppState;

/// Purpose label baked into every reset token; a token minted for any other
/// purpose never verifies here.
pub const RESET_PURPOSE: &str = "password-reset";

/// Claims carried by a password-reset token.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetClaims {
    pub sub: String,     // email the token was issued for
    pub iat: usize,      // issued at (unix timestamp)
    pub exp: usize,      // expires at (unix timestamp)
    pub iss: String,     // issuer
    pub purpose: String, // fixed purpose label
}

/// Holds signing and verification keys for reset tokens.
#[derive(Clone)]
pub struct ResetTokenKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for ResetTokenKeys {
    fn from_ref(state: &AppState) -> Self {
        let ResetTokenConfig {
            secret,
            issuer,
            ttl_secs,
        } = state.config.reset.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl: Duration::from_secs(ttl_secs),
        }
    }
}

impl ResetTokenKeys {
    pub fn sign(&self, email: &str) -> Result<String, AuthError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = ResetClaims {
            sub: email.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            purpose: RESET_PURPOSE.to_string(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(%email, "reset token signed");
        Ok(token)
    }

    /// Verifies signature, issuer, purpose, and expiry (no leeway), and
    /// returns the email the token was issued for. Expiry is the only
    /// failure reported as [`AuthError::TokenExpired`]; everything else is
    /// [`AuthError::TokenInvalid`].
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data =
            decode::<ResetClaims>(token, &self.decoding, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::TokenInvalid,
                }
            })?;
        if data.claims.purpose != RESET_PURPOSE {
            return Err(AuthError::TokenInvalid);
        }
        debug!(email = %data.claims.sub, "reset token verified");
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod token_tests {
    use super::*;

    fn make_keys() -> ResetTokenKeys {
        let state = AppState::fake();
        ResetTokenKeys::from_ref(&state)
    }

    fn claims_at(keys: &ResetTokenKeys, iat: OffsetDateTime, exp: OffsetDateTime) -> ResetClaims {
        ResetClaims {
            sub: "a@x.com".into(),
            iat: iat.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: keys.issuer.clone(),
            purpose: RESET_PURPOSE.into(),
        }
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let token = keys.sign("a@x.com").expect("sign");
        let email = keys.verify(&token).expect("verify");
        assert_eq!(email, "a@x.com");
    }

    #[tokio::test]
    async fn token_past_its_window_is_expired() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc();
        let claims = claims_at(&keys, now - TimeDuration::seconds(1900), now - TimeDuration::seconds(100));
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");

        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn tampered_token_is_invalid_not_expired() {
        let keys = make_keys();
        let token = format!("{}x", keys.sign("a@x.com").expect("sign"));

        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[tokio::test]
    async fn wrong_purpose_is_rejected() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc();
        let mut claims = claims_at(&keys, now, now + TimeDuration::seconds(1800));
        claims.purpose = "email-confirm".into();
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");

        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[tokio::test]
    async fn wrong_issuer_is_rejected() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc();
        let mut claims = claims_at(&keys, now, now + TimeDuration::seconds(1800));
        claims.iss = "someone-else".into();
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");

        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }
}
