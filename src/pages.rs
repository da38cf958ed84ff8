use axum::{response::Html, routing::get, Router};
use tower_sessions::Session;
use tracing::{debug, instrument};

use crate::auth::session::{take_flashes, CurrentUser};
use crate::state::AppState;
use crate::views;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/dashboard", get(dashboard))
}

#[instrument(skip(session))]
pub async fn home(session: Session) -> Html<String> {
    Html(views::home(&take_flashes(&session).await))
}

#[instrument(skip(session, user))]
pub async fn dashboard(user: CurrentUser, session: Session) -> Html<String> {
    debug!(user_id = %user.user_id, user_name = %user.user_name, "dashboard rendered");
    Html(views::dashboard(&take_flashes(&session).await, &user.user_name))
}
