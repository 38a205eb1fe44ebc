//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business/domain failures (validation,
/// invariants, conflicts). Infrastructure concerns belong elsewhere.
///
/// `OutOfStock` and `WrongSupplier` are structural failures of the stock
/// contract: callers that run a sale or a supply delivery catch them and turn
/// them into declined outcomes instead of letting them escape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested entity was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (e.g. duplicate registration).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A sale or stock withdrawal hit an empty shelf.
    #[error("no stock available for product {0}")]
    OutOfStock(String),

    /// Stock was offered by a supplier that does not supply the product.
    #[error("product {0} is not supplied by this supplier")]
    WrongSupplier(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn out_of_stock(product: impl Into<String>) -> Self {
        Self::OutOfStock(product.into())
    }

    pub fn wrong_supplier(product: impl Into<String>) -> Self {
        Self::WrongSupplier(product.into())
    }
}
