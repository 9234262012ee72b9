//! Catalog items.

use serde::{Deserialize, Serialize};

use crate::types::{Category, ItemId, Label, Money, Slug};

/// Maximum length of an item title.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Validation errors for new or edited items.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("title must be at most {MAX_TITLE_LENGTH} characters")]
    TitleTooLong,
    #[error("price cannot be negative")]
    NegativePrice,
    #[error("discount price cannot be negative")]
    NegativeDiscount,
}

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub price: Money,
    /// Sale price; when set (and non-zero) it replaces `price` at checkout.
    pub discount_price: Option<Money>,
    pub category: Category,
    pub label: Label,
    pub slug: Slug,
    pub description: String,
    /// Image path relative to the media root.
    pub image: String,
}

impl Item {
    /// The sale price if the item is on sale.
    ///
    /// A zero discount price is treated as "not on sale".
    #[must_use]
    pub fn effective_discount(&self) -> Option<Money> {
        self.discount_price.filter(|d| !d.is_zero())
    }

    /// Unit price a customer pays.
    #[must_use]
    pub fn unit_price(&self) -> Money {
        self.effective_discount().unwrap_or(self.price)
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Input for creating an item (seeding, back-office).
#[derive(Debug, Clone, Deserialize)]
pub struct NewItem {
    pub title: String,
    pub price: Money,
    #[serde(default)]
    pub discount_price: Option<Money>,
    pub category: Category,
    pub label: Label,
    /// Derived from the title when omitted.
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl NewItem {
    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns the first [`ItemError`] found.
    pub fn validate(&self) -> Result<(), ItemError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ItemError::EmptyTitle);
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(ItemError::TitleTooLong);
        }
        if self.price.is_negative() {
            return Err(ItemError::NegativePrice);
        }
        if self.discount_price.is_some_and(|d| d.is_negative()) {
            return Err(ItemError::NegativeDiscount);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_item(title: &str, price: &str, discount: Option<&str>) -> NewItem {
        NewItem {
            title: title.to_owned(),
            price: price.parse().unwrap(),
            discount_price: discount.map(|d| d.parse().unwrap()),
            category: Category::Shirt,
            label: Label::Primary,
            slug: None,
            description: String::new(),
            image: String::new(),
        }
    }

    #[test]
    fn test_validate_ok() {
        assert_eq!(new_item("Tee", "10.00", Some("8.00")).validate(), Ok(()));
    }

    #[test]
    fn test_validate_title() {
        assert_eq!(
            new_item("   ", "1", None).validate(),
            Err(ItemError::EmptyTitle)
        );
        assert_eq!(
            new_item(&"t".repeat(101), "1", None).validate(),
            Err(ItemError::TitleTooLong)
        );
    }

    #[test]
    fn test_validate_amounts() {
        assert_eq!(
            new_item("Tee", "-1", None).validate(),
            Err(ItemError::NegativePrice)
        );
        assert_eq!(
            new_item("Tee", "1", Some("-0.01")).validate(),
            Err(ItemError::NegativeDiscount)
        );
    }

    #[test]
    fn test_zero_discount_is_not_a_sale() {
        let item = Item {
            id: ItemId::new(1),
            title: "Cap".to_owned(),
            price: "12.00".parse().unwrap(),
            discount_price: Some(Money::ZERO),
            category: Category::SportsWear,
            label: Label::Secondary,
            slug: Slug::parse("cap").unwrap(),
            description: String::new(),
            image: String::new(),
        };
        assert_eq!(item.effective_discount(), None);
        assert_eq!(item.unit_price(), "12.00".parse().unwrap());
        assert_eq!(item.to_string(), "Cap");
    }
}
