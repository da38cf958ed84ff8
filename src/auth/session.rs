//! Session keys, flash messages, and the logged-in-user extractor.
//!
//! The session is the sole authorization signal: a request with `user_id`
//! present is authenticated, anything else is not.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::warn;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::error::AuthError;

/// Key for storing the user ID in the session.
pub const USER_ID_KEY: &str = "user_id";
/// Key for storing the user's display name in the session.
pub const USER_NAME_KEY: &str = "user_name";

const FLASH_KEY: &str = "_flashes";

/// Severity of a flash message; rendered as a CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Info,
    Success,
    Danger,
}

impl FlashLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            FlashLevel::Info => "info",
            FlashLevel::Success => "success",
            FlashLevel::Danger => "danger",
        }
    }
}

/// One-shot message queued in the session and drained by the next page view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub text: String,
}

impl Flash {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            text: text.into(),
        }
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Danger,
            text: text.into(),
        }
    }
}

pub async fn push_flash(session: &Session, flash: Flash) -> Result<(), AuthError> {
    let mut queued: Vec<Flash> = session.get(FLASH_KEY).await?.unwrap_or_default();
    queued.push(flash);
    session.insert(FLASH_KEY, queued).await?;
    Ok(())
}

/// Drains the flash queue; a second call returns nothing.
pub async fn take_flashes(session: &Session) -> Vec<Flash> {
    session
        .remove::<Vec<Flash>>(FLASH_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Replaces whatever the session held with the freshly logged-in user.
pub async fn sign_in(session: &Session, user: &User) -> Result<(), AuthError> {
    session.clear().await;
    session.insert(USER_ID_KEY, user.id).await?;
    session.insert(USER_NAME_KEY, user.full_name.clone()).await?;
    Ok(())
}

pub async fn session_user_id(session: &Session) -> Option<Uuid> {
    session.get::<Uuid>(USER_ID_KEY).await.ok().flatten()
}

/// Extracts the logged-in user from the session, redirecting to the login
/// page when there is none.
pub struct CurrentUser {
    pub user_id: Uuid,
    pub user_name: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|rejection| rejection.into_response())?;

        let user_id = session.get::<Uuid>(USER_ID_KEY).await.ok().flatten();
        let user_name = session.get::<String>(USER_NAME_KEY).await.ok().flatten();

        match (user_id, user_name) {
            (Some(user_id), Some(user_name)) => Ok(CurrentUser { user_id, user_name }),
            _ => {
                warn!("dashboard access denied, no user in session");
                let _ = push_flash(
                    &session,
                    Flash::danger("Please log in to access the dashboard."),
                )
                .await;
                Err(Redirect::to("/login").into_response())
            }
        }
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;
    use std::sync::Arc;
    use time::OffsetDateTime;
    use tower_sessions::{MemoryStore, Session};

    fn test_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "unused".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn flash_queue_drains_once() {
        let session = test_session();
        push_flash(&session, Flash::success("Saved")).await.unwrap();
        push_flash(&session, Flash::danger("Oops")).await.unwrap();

        let flashes = take_flashes(&session).await;
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].level, FlashLevel::Success);
        assert_eq!(flashes[1].text, "Oops");

        assert!(take_flashes(&session).await.is_empty());
    }

    #[tokio::test]
    async fn sign_in_replaces_prior_session_state() {
        let session = test_session();
        session.insert("stale", 42).await.unwrap();

        let user = test_user();
        sign_in(&session, &user).await.unwrap();

        assert_eq!(session_user_id(&session).await, Some(user.id));
        assert_eq!(
            session.get::<String>(USER_NAME_KEY).await.unwrap(),
            Some("Ada Lovelace".into())
        );
        assert_eq!(session.get::<i32>("stale").await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_leaves_no_user_behind() {
        let session = test_session();
        sign_in(&session, &test_user()).await.unwrap();

        session.clear().await;
        assert_eq!(session_user_id(&session).await, None);
    }
}
