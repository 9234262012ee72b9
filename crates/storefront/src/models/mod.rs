//! Storefront-only models.
//!
//! Domain entities live in `outfitter-core`; this module holds what only
//! the web layer needs.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
