//! Shopper account commands.
//!
//! ```bash
//! outfitter user create -u alice -e alice@example.com
//! ```
//!
//! The password is read from `OUTFITTER_USER_PASSWORD` so it never lands in
//! shell history.

use secrecy::{ExposeSecret, SecretString};

use outfitter_core::User;
use outfitter_storefront::services::auth::AuthService;

use super::{CliError, connect};

/// Environment variable holding the new account's password.
pub const PASSWORD_ENV: &str = "OUTFITTER_USER_PASSWORD";

/// Create a username/password account.
pub async fn create(username: &str, email: Option<&str>) -> Result<User, CliError> {
    let pool = connect().await?;
    let password = std::env::var(PASSWORD_ENV)
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar(PASSWORD_ENV))?;

    let user = AuthService::new(&pool)
        .register_with_password(username, email, password.expose_secret())
        .await?;

    tracing::info!("User created! ID: {}, Username: {}", user.id, user.username);
    Ok(user)
}
