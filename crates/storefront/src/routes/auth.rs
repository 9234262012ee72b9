//! Authentication route handlers.
//!
//! Username/password accounts; the logged-in user is kept in the session.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use outfitter_core::{User, UserId};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalUser, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
    pub password_confirm: String,
}

/// The logged-in account.
#[derive(Debug, Serialize)]
pub struct AccountView {
    pub id: UserId,
    pub username: String,
}

impl From<&User> for AccountView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &CurrentUser::from(user))
        .await
        .map_err(|e| AppError::Internal(format!("failed to set session: {e}")))?;
    set_sentry_user(&user.id, Some(&user.username));
    Ok(())
}

/// Create an account and log it in.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<RegisterForm>,
) -> Result<(StatusCode, Json<AccountView>)> {
    if form.password != form.password_confirm {
        return Err(AppError::BadRequest("Passwords do not match".to_owned()));
    }

    let user = AuthService::new(state.pool())
        .register_with_password(&form.username, form.email.as_deref(), &form.password)
        .await
        .inspect_err(|e| tracing::warn!("Registration failed: {e}"))?;

    start_session(&session, &user).await?;
    Ok((StatusCode::CREATED, Json(AccountView::from(&user))))
}

/// Log in with username and password.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<AccountView>> {
    let user = AuthService::new(state.pool())
        .login_with_password(&form.username, &form.password)
        .await
        .inspect_err(|e| tracing::warn!("Login failed: {e}"))?;

    start_session(&session, &user).await?;
    Ok(Json(AccountView::from(&user)))
}

/// Log out and discard the session.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to flush session: {e}")))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// Who is logged in, if anyone.
pub async fn me(OptionalUser(user): OptionalUser) -> Result<Json<AccountView>> {
    let user = user.ok_or_else(|| AppError::Unauthorized("login required".to_owned()))?;
    Ok(Json(AccountView {
        id: user.id,
        username: user.username,
    }))
}
