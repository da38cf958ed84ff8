use axum::{
    extract::{FromRef, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use tower_sessions::Session;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{ForgotPasswordForm, LoginForm, ResetPasswordForm, SignupForm},
        services,
        session::{push_flash, session_user_id, sign_in, take_flashes, Flash},
        tokens::ResetTokenKeys,
    },
    error::AuthError,
    state::AppState,
    views,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", get(signup_page).post(signup))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/forgot_password", get(forgot_password_page).post(forgot_password))
        .route("/reset_password/:token", get(reset_password_page).post(reset_password))
}

#[instrument(skip(session))]
pub async fn signup_page(session: Session) -> Response {
    if session_user_id(&session).await.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    Html(views::signup(&take_flashes(&session).await)).into_response()
}

#[instrument(skip(state, session, form))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Redirect, AuthError> {
    if session_user_id(&session).await.is_some() {
        return Ok(Redirect::to("/dashboard"));
    }
    match services::register(&state.db, &form).await {
        Ok(user) => {
            info!(user_id = %user.id, email = %user.email, "user registered");
            push_flash(&session, Flash::success("Signup successful! Please log in.")).await?;
            Ok(Redirect::to("/login"))
        }
        Err(AuthError::PasswordMismatch) => {
            warn!(email = %form.email, "signup password confirmation mismatch");
            push_flash(&session, Flash::danger("Passwords do not match!")).await?;
            Ok(Redirect::to("/signup"))
        }
        Err(AuthError::EmailTaken) => {
            warn!(email = %form.email, "signup email already registered");
            push_flash(
                &session,
                Flash::danger("An account with this email already exists."),
            )
            .await?;
            Ok(Redirect::to("/signup"))
        }
        Err(e @ (AuthError::Storage(_) | AuthError::Hash(_))) => {
            error!(error = %e, "create user failed");
            push_flash(&session, Flash::danger("Signup failed! Please try again.")).await?;
            Ok(Redirect::to("/login"))
        }
        Err(e) => Err(e),
    }
}

#[instrument(skip(session))]
pub async fn login_page(session: Session) -> Response {
    if session_user_id(&session).await.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    Html(views::login(&take_flashes(&session).await)).into_response()
}

#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AuthError> {
    if session_user_id(&session).await.is_some() {
        return Ok(Redirect::to("/dashboard"));
    }
    match services::authenticate(&state.db, &form.email, &form.password).await {
        Ok(user) => {
            sign_in(&session, &user).await?;
            push_flash(&session, Flash::success("Login successful!")).await?;
            info!(user_id = %user.id, email = %user.email, "user logged in");
            Ok(Redirect::to("/dashboard"))
        }
        Err(AuthError::InvalidCredentials) => {
            warn!(email = %form.email, "login invalid email or password");
            push_flash(&session, Flash::danger("Invalid email or password!")).await?;
            Ok(Redirect::to("/login"))
        }
        Err(e @ (AuthError::Storage(_) | AuthError::Hash(_))) => {
            error!(error = %e, "login lookup failed");
            push_flash(
                &session,
                Flash::danger("Something went wrong. Please try again."),
            )
            .await?;
            Ok(Redirect::to("/login"))
        }
        Err(e) => Err(e),
    }
}

#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect, AuthError> {
    session.clear().await;
    push_flash(&session, Flash::success("You have been logged out.")).await?;
    info!("user logged out");
    Ok(Redirect::to("/login"))
}

#[instrument(skip(session))]
pub async fn forgot_password_page(session: Session) -> Html<String> {
    Html(views::forgot_password(&take_flashes(&session).await))
}

#[instrument(skip(state, session, form))]
pub async fn forgot_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ForgotPasswordForm>,
) -> Result<Redirect, AuthError> {
    match services::start_password_reset(&state, &form.email).await {
        Ok(()) => {
            info!(email = %form.email, "reset link sent");
            push_flash(
                &session,
                Flash::info("Password reset link has been sent to your email."),
            )
            .await?;
        }
        Err(AuthError::UnknownEmail) => {
            warn!(email = %form.email, "reset requested for unknown email");
            push_flash(&session, Flash::danger("No account found with this email!")).await?;
        }
        Err(e @ AuthError::Mail(_)) => {
            error!(error = %e, "reset mail send failed");
            push_flash(
                &session,
                Flash::danger("Could not send the reset email. Please try again."),
            )
            .await?;
        }
        Err(e @ (AuthError::Storage(_) | AuthError::TokenSign(_))) => {
            error!(error = %e, "password reset request failed");
            push_flash(
                &session,
                Flash::danger("Something went wrong. Please try again."),
            )
            .await?;
        }
        Err(e) => return Err(e),
    }
    Ok(Redirect::to("/forgot_password"))
}

#[instrument(skip(state, session, token))]
pub async fn reset_password_page(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
) -> Result<Response, AuthError> {
    let keys = ResetTokenKeys::from_ref(&state);
    match keys.verify(&token) {
        Ok(_) => {
            Ok(Html(views::reset_password(&take_flashes(&session).await, &token)).into_response())
        }
        Err(e) => Ok(reject_bad_token(&session, e).await?.into_response()),
    }
}

#[instrument(skip(state, session, token, form))]
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Redirect, AuthError> {
    let keys = ResetTokenKeys::from_ref(&state);
    let email = match keys.verify(&token) {
        Ok(email) => email,
        Err(e) => return reject_bad_token(&session, e).await,
    };

    match services::reset_password(&state.db, &email, &form.password, &form.confirm_password).await
    {
        Ok(()) => {
            info!(%email, "password updated via reset token");
            push_flash(&session, Flash::success("Your password has been updated!")).await?;
            Ok(Redirect::to("/login"))
        }
        Err(AuthError::PasswordMismatch) => {
            warn!(%email, "reset password confirmation mismatch");
            push_flash(&session, Flash::danger("Passwords do not match!")).await?;
            Ok(Redirect::to(&format!("/reset_password/{token}")))
        }
        Err(e @ (AuthError::Storage(_) | AuthError::Hash(_))) => {
            error!(error = %e, "update password failed");
            push_flash(
                &session,
                Flash::danger("Error updating password. Please try again."),
            )
            .await?;
            Ok(Redirect::to("/login"))
        }
        Err(e) => Err(e),
    }
}

/// Expired and invalid tokens both restart the flow at the forgot-password
/// page, with distinct messages.
async fn reject_bad_token(session: &Session, err: AuthError) -> Result<Redirect, AuthError> {
    match err {
        AuthError::TokenExpired => {
            warn!("reset token expired");
            push_flash(session, Flash::danger("The token is expired!")).await?;
            Ok(Redirect::to("/forgot_password"))
        }
        AuthError::TokenInvalid => {
            warn!("reset token invalid");
            push_flash(session, Flash::danger("The reset link is invalid.")).await?;
            Ok(Redirect::to("/forgot_password"))
        }
        other => Err(other),
    }
}
