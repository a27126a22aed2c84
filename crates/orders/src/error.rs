//! Order workflow error taxonomy.

use thiserror::Error;

use greengrocer_core::{CustomerOrderId, ItemId, UserId};

pub type OrderResult<T> = Result<T, OrderError>;

/// The record an order operation could not find.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MissingEntity {
    User(UserId),
    Item(ItemId),
    CustomerOrder(CustomerOrderId),
}

impl core::fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MissingEntity::User(id) => write!(f, "user {id}"),
            MissingEntity::Item(id) => write!(f, "item {id}"),
            MissingEntity::CustomerOrder(id) => write!(f, "customer order {id}"),
        }
    }
}

/// Failure of an order operation. None of these are retried by the workflow.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrderError {
    /// Malformed or mismatched request shape.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(MissingEntity),

    /// Requested quantity exceeds what is available (or the item is gone).
    #[error("insufficient quantity for item {item_id}")]
    InsufficientStock { item_id: ItemId },
}

impl OrderError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Stable machine-readable code for presentation layers.
    pub fn code(&self) -> &'static str {
        match self {
            OrderError::InvalidInput(_) => "invalid_input",
            OrderError::NotFound(_) => "not_found",
            OrderError::InsufficientStock { .. } => "insufficient_stock",
        }
    }
}
