//! Catalog choice fields: item category and badge label.
//!
//! Both are stored as short codes in the database and shown to customers by
//! their display name.

use serde::{Deserialize, Serialize};

/// Error returned when a stored code does not match any choice.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field} code: {code:?}")]
pub struct ChoiceError {
    pub field: &'static str,
    pub code: String,
}

/// Item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Category {
    Shirt,
    SportsWear,
    Outwear,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::Shirt, Self::SportsWear, Self::Outwear];

    /// Stored code (`S`, `SW`, `OW`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Shirt => "S",
            Self::SportsWear => "SW",
            Self::Outwear => "OW",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Shirt => "Shirt",
            Self::SportsWear => "Sports wear",
            Self::Outwear => "Outwear",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for Category {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == s)
            .ok_or_else(|| ChoiceError {
                field: "category",
                code: s.to_owned(),
            })
    }
}

impl TryFrom<String> for Category {
    type Error = ChoiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for &'static str {
    fn from(category: Category) -> Self {
        category.code()
    }
}

/// Badge shown on an item card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Label {
    Primary,
    Secondary,
    Danger,
}

impl Label {
    pub const ALL: [Self; 3] = [Self::Primary, Self::Secondary, Self::Danger];

    /// Stored code (`P`, `S`, `D`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Primary => "P",
            Self::Secondary => "S",
            Self::Danger => "D",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Danger => "danger",
        }
    }

    /// Badge colour class used by front-ends (same as the display name).
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        self.display_name()
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for Label {
    type Err = ChoiceError;

    // Legacy rows stored primary as lowercase "p".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|l| l.code() == upper)
            .ok_or_else(|| ChoiceError {
                field: "label",
                code: s.to_owned(),
            })
    }
}

impl TryFrom<String> for Label {
    type Error = ChoiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Label> for &'static str {
    fn from(label: Label) -> Self {
        label.code()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_codes_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.code().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::SportsWear.to_string(), "Sports wear");
    }

    #[test]
    fn test_category_unknown_code() {
        let err = "XL".parse::<Category>().unwrap_err();
        assert_eq!(err.field, "category");
        assert_eq!(err.to_string(), "invalid category code: \"XL\"");
    }

    #[test]
    fn test_label_accepts_legacy_lowercase_primary() {
        assert_eq!("p".parse::<Label>().unwrap(), Label::Primary);
        assert_eq!("D".parse::<Label>().unwrap(), Label::Danger);
        assert!("x".parse::<Label>().is_err());
    }

    #[test]
    fn test_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Category::Outwear).unwrap(), "\"OW\"");
        assert_eq!(serde_json::to_string(&Label::Secondary).unwrap(), "\"S\"");
        let label: Label = serde_json::from_str("\"S\"").unwrap();
        assert_eq!(label, Label::Secondary);
    }
}
