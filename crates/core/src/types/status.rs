//! Order lifecycle flags.
//!
//! An order moves through its life by flipping independent booleans rather
//! than a single status column:
//!
//! ```text
//! cart ──place──▶ ordered ──▶ being_delivered ──▶ received
//!                    │
//!                    └──request_refund──▶ refund_requested ──grant──▶ refund_granted
//! ```
//!
//! [`OrderFlags`] holds the booleans and guards each transition;
//! [`OrderStage`] is the single most relevant stage derived from them.

use serde::{Deserialize, Serialize};

/// Reasons a lifecycle transition is refused.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("order has already been placed")]
    AlreadyOrdered,
    #[error("order has not been placed yet")]
    NotOrdered,
    #[error("cart is empty")]
    EmptyCart,
    #[error("order has no billing address")]
    MissingBillingAddress,
    #[error("a refund has already been requested for this order")]
    RefundAlreadyRequested,
    #[error("no refund has been requested for this order")]
    RefundNotRequested,
    #[error("refund has already been granted")]
    RefundAlreadyGranted,
}

/// The five lifecycle booleans stored on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderFlags {
    pub ordered: bool,
    pub being_delivered: bool,
    pub received: bool,
    pub refund_requested: bool,
    pub refund_granted: bool,
}

impl OrderFlags {
    /// Mark the cart as ordered.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyOrdered`] if the order was already placed.
    pub const fn place(&mut self) -> Result<(), LifecycleError> {
        if self.ordered {
            return Err(LifecycleError::AlreadyOrdered);
        }
        self.ordered = true;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`LifecycleError::NotOrdered`] for an unplaced cart.
    pub const fn mark_being_delivered(&mut self) -> Result<(), LifecycleError> {
        if !self.ordered {
            return Err(LifecycleError::NotOrdered);
        }
        self.being_delivered = true;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`LifecycleError::NotOrdered`] for an unplaced cart.
    pub const fn mark_received(&mut self) -> Result<(), LifecycleError> {
        if !self.ordered {
            return Err(LifecycleError::NotOrdered);
        }
        self.received = true;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`LifecycleError::NotOrdered`] for an unplaced cart and
    /// [`LifecycleError::RefundAlreadyRequested`] on a second request.
    pub const fn request_refund(&mut self) -> Result<(), LifecycleError> {
        if !self.ordered {
            return Err(LifecycleError::NotOrdered);
        }
        if self.refund_requested {
            return Err(LifecycleError::RefundAlreadyRequested);
        }
        self.refund_requested = true;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`LifecycleError::RefundNotRequested`] if no refund is pending
    /// and [`LifecycleError::RefundAlreadyGranted`] if it was already granted.
    pub const fn grant_refund(&mut self) -> Result<(), LifecycleError> {
        if !self.refund_requested {
            return Err(LifecycleError::RefundNotRequested);
        }
        if self.refund_granted {
            return Err(LifecycleError::RefundAlreadyGranted);
        }
        self.refund_granted = true;
        Ok(())
    }

    #[must_use]
    pub const fn stage(&self) -> OrderStage {
        if self.refund_granted {
            OrderStage::RefundGranted
        } else if self.refund_requested {
            OrderStage::RefundRequested
        } else if !self.ordered {
            OrderStage::Cart
        } else if self.received {
            OrderStage::Received
        } else if self.being_delivered {
            OrderStage::BeingDelivered
        } else {
            OrderStage::Ordered
        }
    }
}

/// Where an order is in its life, derived from [`OrderFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStage {
    Cart,
    Ordered,
    BeingDelivered,
    Received,
    RefundRequested,
    RefundGranted,
}

impl std::fmt::Display for OrderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Cart => "cart",
            Self::Ordered => "ordered",
            Self::BeingDelivered => "being_delivered",
            Self::Received => "received",
            Self::RefundRequested => "refund_requested",
            Self::RefundGranted => "refund_granted",
        };
        f.write_str(s)
    }
}
