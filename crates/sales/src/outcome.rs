//! Outcome values for counter transactions.
//!
//! A declined operation is a normal, recoverable answer for the caller — the
//! till shows the message and moves on. Hard `DomainError`s are reserved for
//! broken invariants and unknown entities.

use ventapos_core::{Money, ProductId};

/// Why an operation was declined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclineReason {
    InsufficientBalance { required: Money, available: Money },
    OutOfStock { product: String },
    InsufficientCommission { required: Money, available: Money },
}

impl core::fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DeclineReason::InsufficientBalance {
                required,
                available,
            } => write!(
                f,
                "insufficient balance: {required} required, {available} available"
            ),
            DeclineReason::OutOfStock { product } => {
                write!(f, "no stock available for product {product}")
            }
            DeclineReason::InsufficientCommission {
                required,
                available,
            } => write!(
                f,
                "insufficient commission: {required} required, {available} available"
            ),
        }
    }
}

/// What a completed sale settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleReceipt {
    pub product_id: ProductId,
    pub net_price: Money,
    pub commission: Money,
}

/// Result of a sale attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleOutcome {
    Completed(SaleReceipt),
    Declined(DeclineReason),
}

impl SaleOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SaleOutcome::Completed(_))
    }
}

/// Result of a product exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The swap went through; `charged` is the (signed) price difference
    /// debited from the customer.
    Exchanged { charged: Money },
    Declined(DeclineReason),
}

/// Result of a return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnOutcome {
    Accepted { refund: Money },
    /// Items in bad condition are not taken back.
    Rejected,
}

/// Result of a commission redemption between two sellers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedemptionOutcome {
    Redeemed { cost: Money },
    Declined(DeclineReason),
}
