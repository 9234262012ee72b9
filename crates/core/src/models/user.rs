//! Storefront accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, UserId};

/// A shopper account.
///
/// Orders, billing addresses and payments are attributed to users; they
/// display as the owner's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<Email>,
    pub date_joined: DateTime<Utc>,
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.username)
    }
}

/// Displays who owns a record: the username, or `"deleted user"` once the
/// account is gone (payments outlive their user).
#[derive(Debug, Clone, Copy)]
pub struct OwnerName<'a>(pub Option<&'a User>);

impl std::fmt::Display for OwnerName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(user) => f.write_str(&user.username),
            None => f.write_str("deleted user"),
        }
    }
}
