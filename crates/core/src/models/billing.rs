//! Billing addresses, payments, coupons and refunds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    BillingAddressId, CountryCode, CouponId, Email, Money, OrderId, PaymentId, RefundId, UserId,
};

/// Maximum length of each free-text address line.
pub const MAX_ADDRESS_FIELD_LENGTH: usize = 100;
/// Maximum length of a gateway charge id.
pub const MAX_CHARGE_ID_LENGTH: usize = 50;
/// Maximum length of a coupon code.
pub const MAX_COUPON_CODE_LENGTH: usize = 15;

/// A shipping/billing destination owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingAddress {
    pub id: BillingAddressId,
    pub user_id: UserId,
    pub street_address: String,
    pub house_address: String,
    pub country: CountryCode,
    pub zip: String,
}

/// Checkout form input for a billing address.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBillingAddress {
    pub street_address: String,
    #[serde(default)]
    pub house_address: String,
    pub country: CountryCode,
    pub zip: String,
}

impl NewBillingAddress {
    /// Trim fields and check lengths.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending field.
    pub fn normalized(self) -> Result<Self, String> {
        let street_address = self.street_address.trim().to_owned();
        let house_address = self.house_address.trim().to_owned();
        let zip = self.zip.trim().to_owned();

        if street_address.is_empty() {
            return Err("street_address is required".to_owned());
        }
        if zip.is_empty() {
            return Err("zip is required".to_owned());
        }
        for (name, value) in [
            ("street_address", &street_address),
            ("house_address", &house_address),
            ("zip", &zip),
        ] {
            if value.chars().count() > MAX_ADDRESS_FIELD_LENGTH {
                return Err(format!(
                    "{name} must be at most {MAX_ADDRESS_FIELD_LENGTH} characters"
                ));
            }
        }

        Ok(Self {
            street_address,
            house_address,
            country: self.country,
            zip,
        })
    }
}

/// Record of a charge made through the external payment gateway.
///
/// Payments outlive their user: deleting the user nulls `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub stripe_charge_id: String,
    pub user_id: Option<UserId>,
    pub amount: Money,
    pub timestamp: DateTime<Utc>,
}

/// A fixed-amount discount code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub amount: Money,
}

impl Coupon {
    /// Normalize a code typed by a customer: trimmed and upper-cased.
    #[must_use]
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }
}

impl std::fmt::Display for Coupon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code)
    }
}

/// A customer's request to reverse the payment on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub id: RefundId,
    pub order_id: OrderId,
    pub reason: String,
    pub accepted: bool,
    pub email: Email,
}

impl std::fmt::Display for Refund {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address(street: &str, zip: &str) -> NewBillingAddress {
        NewBillingAddress {
            street_address: street.to_owned(),
            house_address: " Apt 4 ".to_owned(),
            country: CountryCode::parse("GB").unwrap(),
            zip: zip.to_owned(),
        }
    }

    #[test]
    fn test_address_normalized_trims() {
        let a = address(" 1 High St ", " SW1A 1AA ").normalized().unwrap();
        assert_eq!(a.street_address, "1 High St");
        assert_eq!(a.house_address, "Apt 4");
        assert_eq!(a.zip, "SW1A 1AA");
    }

    #[test]
    fn test_address_requires_street_and_zip() {
        assert!(address("  ", "123").normalized().is_err());
        assert!(address("Main", "").normalized().is_err());
    }

    #[test]
    fn test_address_length_limit() {
        let err = address(&"x".repeat(101), "1").normalized().unwrap_err();
        assert!(err.starts_with("street_address"));
    }

    #[test]
    fn test_coupon_code_normalization() {
        assert_eq!(Coupon::normalize_code("  spring10 "), "SPRING10");
    }

    #[test]
    fn test_display() {
        let coupon = Coupon {
            id: CouponId::new(2),
            code: "WELCOME".to_owned(),
            amount: Money::from_cents(500),
        };
        assert_eq!(coupon.to_string(), "WELCOME");

        let refund = Refund {
            id: RefundId::new(31),
            order_id: OrderId::new(4),
            reason: "Too small".to_owned(),
            accepted: false,
            email: Email::parse("a@b.co").unwrap(),
        };
        assert_eq!(refund.to_string(), "31");
    }
}
