//! Presentation-neutral error bodies: `{"error": code, "message": text}`.

use serde_json::{Value, json};

use greengrocer_infra::{ConfigError, StoreError, WorkflowError};
use greengrocer_orders::OrderError;

/// An error with a stable machine-readable code.
pub trait ErrorCode: core::fmt::Display {
    fn code(&self) -> &'static str;
}

impl ErrorCode for OrderError {
    fn code(&self) -> &'static str {
        OrderError::code(self)
    }
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        StoreError::code(self)
    }
}

impl ErrorCode for WorkflowError {
    fn code(&self) -> &'static str {
        WorkflowError::code(self)
    }
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        "config_error"
    }
}

pub fn error_body<E: ErrorCode + ?Sized>(err: &E) -> Value {
    json_error(err.code(), err.to_string())
}

pub fn json_error(code: &str, message: impl Into<String>) -> Value {
    json!({
        "error": code,
        "message": message.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use greengrocer_core::{CustomerOrderId, ItemId};
    use greengrocer_orders::MissingEntity;

    #[test]
    fn workflow_errors_render_code_and_message() {
        let err = WorkflowError::Order(OrderError::InsufficientStock {
            item_id: ItemId::new(3),
        });
        assert_eq!(
            error_body(&err),
            json!({
                "error": "insufficient_stock",
                "message": "insufficient quantity for item 3",
            })
        );

        let err = WorkflowError::Order(OrderError::NotFound(MissingEntity::CustomerOrder(
            CustomerOrderId::new(8),
        )));
        assert_eq!(error_body(&err)["error"], "not_found");
        assert_eq!(error_body(&err)["message"], "customer order 8 not found");
    }

    #[test]
    fn store_errors_render_their_own_codes() {
        let err = StoreError::Conflict("email already registered".to_string());
        assert_eq!(error_body(&err)["error"], "conflict");

        let err = WorkflowError::Store(StoreError::backend("connection reset"));
        assert_eq!(error_body(&err)["error"], "store_error");
    }
}
