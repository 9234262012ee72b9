//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Username/password registration and login

pub mod auth;
