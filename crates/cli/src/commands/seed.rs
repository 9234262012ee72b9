//! Seed the catalog and coupons from a YAML file.
//!
//! Rows whose slug or code already exists are skipped, so the command can
//! be re-run against a populated database.
//!
//! ```yaml
//! items:
//!   - title: Linen Shirt
//!     price: "39.00"
//!     discount_price: "29.00"
//!     category: S
//!     label: P
//! coupons:
//!   - code: WELCOME5
//!     amount: "5.00"
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use outfitter_core::{Money, NewItem};
use outfitter_storefront::db::{CouponRepository, ItemRepository, RepositoryError};

use super::{CliError, connect};

/// A coupon entry in the seed file.
#[derive(Debug, Deserialize)]
pub struct SeedCoupon {
    pub code: String,
    pub amount: Money,
}

/// Seed file contents.
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub items: Vec<NewItem>,
    #[serde(default)]
    pub coupons: Vec<SeedCoupon>,
}

impl SeedFile {
    /// Parse a seed file and validate every item before touching the database.
    pub fn parse(content: &str) -> Result<Self, CliError> {
        let seed: Self = serde_yaml::from_str(content)?;
        for item in &seed.items {
            item.validate()
                .map_err(|e| CliError::InvalidSeed(format!("item {:?}: {e}", item.title)))?;
        }
        Ok(seed)
    }
}

/// Counts reported after seeding.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedResult {
    pub inserted: usize,
    pub skipped: usize,
}

/// Seed from a YAML file.
pub async fn run(file_path: &str) -> Result<(), CliError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading seed file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io {
            path: file_path.to_owned(),
            source,
        })?;
    let seed = SeedFile::parse(&content)?;
    info!(
        items = seed.items.len(),
        coupons = seed.coupons.len(),
        "Parsed seed file"
    );

    let pool = connect().await?;
    let mut result = SeedResult::default();

    let items = ItemRepository::new(&pool);
    for new in &seed.items {
        match items.create(new).await {
            Ok(item) => {
                info!(slug = %item.slug, "Inserted item");
                result.inserted += 1;
            }
            Err(RepositoryError::Conflict(msg)) => {
                warn!(title = %new.title, "Skipped item: {msg}");
                result.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let coupons = CouponRepository::new(&pool);
    for coupon in &seed.coupons {
        match coupons.create(&coupon.code, coupon.amount).await {
            Ok(_) => result.inserted += 1,
            Err(RepositoryError::Conflict(msg)) => {
                warn!(code = %coupon.code, "Skipped coupon: {msg}");
                result.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!("Seeding complete!");
    info!("  Rows inserted: {}", result.inserted);
    info!("  Rows skipped (already exist): {}", result.skipped);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use outfitter_core::{Category, Label};

    #[test]
    fn test_parse_seed_file() {
        let seed = SeedFile::parse(
            r#"
items:
  - title: Linen Shirt
    price: "39.00"
    discount_price: "29.00"
    category: S
    label: P
  - title: Rain Shell
    price: "120.00"
    category: OW
    label: D
    slug: rain-shell-2
coupons:
  - code: WELCOME5
    amount: "5.00"
"#,
        )
        .unwrap();

        assert_eq!(seed.items.len(), 2);
        assert_eq!(seed.items[0].category, Category::Shirt);
        assert_eq!(seed.items[1].label, Label::Danger);
        assert!(seed.items[0].slug.is_none());
        assert_eq!(seed.coupons[0].amount, "5.00".parse().unwrap());
    }

    #[test]
    fn test_parse_rejects_invalid_item() {
        let result = SeedFile::parse(
            r#"
items:
  - title: "   "
    price: "10.00"
    category: S
    label: P
"#,
        );
        assert!(matches!(result, Err(CliError::InvalidSeed(_))));
    }

    #[test]
    fn test_parse_rejects_unknown_category() {
        let result = SeedFile::parse(
            r#"
items:
  - title: Hat
    price: "10.00"
    category: HAT
    label: P
"#,
        );
        assert!(matches!(result, Err(CliError::Yaml(_))));
    }

    #[test]
    fn test_empty_file_sections_default() {
        let seed = SeedFile::parse("coupons: []").unwrap();
        assert!(seed.items.is_empty());
    }
}
