//! Build script for storefront crate.
//!
//! `sqlx::migrate!` embeds `migrations/` at compile time; Cargo doesn't
//! watch that directory on its own, so a new migration file would otherwise
//! be missed until something else triggers a rebuild.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
