//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// ownership, uniqueness, stock). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The entity exists but belongs to another seller.
    #[error("you do not have access to this {0}")]
    Forbidden(&'static str),

    /// A unique field collided with an existing record.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The record changed between read and write; the caller may retry.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An order line asked for more units than the product has left.
    #[error("the article {product} exceeds the available stock (requested {requested}, available {available})")]
    InsufficientStock {
        product: String,
        requested: u64,
        available: u64,
    },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound(entity)
    }

    pub fn forbidden(entity: &'static str) -> Self {
        Self::Forbidden(entity)
    }

    pub fn insufficient_stock(product: impl Into<String>, requested: u64, available: u64) -> Self {
        Self::InsufficientStock {
            product: product.into(),
            requested,
            available,
        }
    }
}
