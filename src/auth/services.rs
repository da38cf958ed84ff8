use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::FromRef;
use rand::rngs::OsRng;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{error, warn};

use crate::auth::dto::SignupForm;
use crate::auth::repo_types::User;
use crate::auth::tokens::ResetTokenKeys;
use crate::error::AuthError;
use crate::mailer::Mailer;
use crate::state::AppState;

pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            AuthError::Hash(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        AuthError::Hash(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Creates the user record for a signup, after the confirmation-equality
/// check and the (race-prone, application-level) duplicate-email check.
pub async fn register(db: &PgPool, form: &SignupForm) -> Result<User, AuthError> {
    if form.password != form.confirm_password {
        return Err(AuthError::PasswordMismatch);
    }
    if User::find_by_email(db, &form.email).await?.is_some() {
        return Err(AuthError::EmailTaken);
    }
    let hash = hash_password(&form.password)?;
    let user = User::create(db, &form.full_name, &form.email, &hash).await?;
    Ok(user)
}

/// Looks the user up by email and verifies the password against the stored
/// hash. An absent user and a failed verify collapse into the same outcome.
pub async fn authenticate(db: &PgPool, email: &str, password: &str) -> Result<User, AuthError> {
    let user = User::find_by_email(db, email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(user)
}

/// Mints a reset token for a known email and mails the reset link. Tokens
/// are not tracked: several valid ones can coexist for the same email.
pub async fn start_password_reset(state: &AppState, email: &str) -> Result<(), AuthError> {
    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or(AuthError::UnknownEmail)?;

    let keys = ResetTokenKeys::from_ref(state);
    let token = keys.sign(&user.email)?;
    let link = format!(
        "{}/reset_password/{}",
        state.config.base_url.trim_end_matches('/'),
        token
    );

    state
        .mailer
        .send(&user.email, "Password Reset Request", &reset_email_body(&link, keys.ttl))
        .await
        .map_err(|e| AuthError::Mail(e.to_string()))?;
    Ok(())
}

/// Overwrites the stored hash for a verified reset. The token is not
/// invalidated by use; it stays valid until it expires.
pub async fn reset_password(
    db: &PgPool,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), AuthError> {
    if password != confirm_password {
        return Err(AuthError::PasswordMismatch);
    }
    let hash = hash_password(password)?;
    let updated = User::update_password(db, email, &hash).await?;
    if updated == 0 {
        // Token outlived the record it was issued for.
        warn!(%email, "password reset matched no user record");
    }
    Ok(())
}

pub fn reset_email_body(link: &str, ttl: Duration) -> String {
    format!(
        "Your link to reset the password is {}. The link is valid for {} minutes.",
        link,
        ttl.as_secs() / 60
    )
}

#[cfg(test)]
mod password_tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn hashing_twice_yields_different_salts() {
        let a = hash_password("p1").expect("hash");
        let b = hash_password("p1").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(matches!(err, AuthError::Hash(_)));
    }
}

#[cfg(test)]
mod mail_body_tests {
    use super::*;

    #[test]
    fn reset_body_carries_link_and_window() {
        let body = reset_email_body(
            "http://localhost:8080/reset_password/tok",
            Duration::from_secs(1800),
        );
        assert!(body.contains("http://localhost:8080/reset_password/tok"));
        assert!(body.contains("valid for 30 minutes"));
    }
}
