//! Order reference codes.
//!
//! A reference code is handed to the customer once an order is placed and is
//! what they quote when asking for a refund.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Errors that can occur when parsing a [`RefCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RefCodeError {
    #[error("reference code must be exactly {expected} characters (got {actual})")]
    WrongLength { expected: usize, actual: usize },
    #[error("reference code may only contain lowercase letters and digits")]
    InvalidChar,
}

/// A 20-character lowercase alphanumeric order reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefCode(String);

impl RefCode {
    pub const LENGTH: usize = 20;

    /// Generate a fresh code.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..Self::LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..ALPHABET.len());
                ALPHABET.get(idx).copied().map_or('0', char::from)
            })
            .collect();
        Self(code)
    }

    /// Parse a code quoted by a customer. Input is trimmed and lower-cased.
    ///
    /// # Errors
    ///
    /// Returns a [`RefCodeError`] if the code has the wrong length or
    /// contains characters outside `[a-z0-9]`.
    pub fn parse(s: &str) -> Result<Self, RefCodeError> {
        let normalized = s.trim().to_ascii_lowercase();
        if normalized.len() != Self::LENGTH {
            return Err(RefCodeError::WrongLength {
                expected: Self::LENGTH,
                actual: normalized.chars().count(),
            });
        }
        if !normalized.bytes().all(|b| ALPHABET.contains(&b)) {
            return Err(RefCodeError::InvalidChar);
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RefCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RefCode {
    type Err = RefCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RefCode {
    type Error = RefCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RefCode> for String {
    fn from(code: RefCode) -> Self {
        code.0
    }
}
