//! Outfitter Core - Storefront domain library.
//!
//! This crate provides the types shared by every Outfitter component:
//! - `storefront` - Public-facing shop (JSON over HTTP, Postgres-backed)
//! - `cli` - Command-line tools for migrations, seeding and back-office tasks
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. Price arithmetic and order lifecycle rules live
//! here so they can be tested without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, slugs, countries,
//!   reference codes, catalog choices and order flags
//! - [`models`] - Storefront entities and their derived prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
