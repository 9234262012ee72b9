//! Core types for Outfitter.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod country;
pub mod email;
pub mod id;
pub mod money;
pub mod ref_code;
pub mod slug;
pub mod status;

pub use catalog::{Category, ChoiceError, Label};
pub use country::{CountryCode, CountryError};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
pub use ref_code::{RefCode, RefCodeError};
pub use slug::{Slug, SlugError};
pub use status::*;
