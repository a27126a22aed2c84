use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use greengrocer_accounts::{NewUser, User};
use greengrocer_catalog::{Category, Item, ItemListing, ItemUpdate, NewItem};
use greengrocer_core::{CustomerOrderId, DomainError, ItemId, UserId};
use greengrocer_orders::{CustomerOrder, NewCustomerOrder, NewOrderLine, OrderAggregate, OrderLine};

/// Store-level errors shared by every backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(String),

    /// Lock poisoning, connection loss, undecodable rows and similar.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<i64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "not_found",
            StoreError::Conflict(_) => "conflict",
            StoreError::Validation(_) => "validation_error",
            StoreError::Backend(_) => "store_error",
        }
    }
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity, id } => StoreError::NotFound { entity, id },
            DomainError::Conflict(msg) => StoreError::Conflict(msg),
            DomainError::Validation(msg)
            | DomainError::InvalidId(msg)
            | DomainError::InvariantViolation(msg) => StoreError::Validation(msg),
        }
    }
}

/// Result of a compare-and-decrement on an item's quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decrement {
    /// The quantity covered the request and has been reduced.
    Applied { remaining: f64 },
    /// The item exists but holds less than requested; nothing changed.
    Insufficient { available: f64 },
    /// No such item.
    Missing,
}

/// Quantity accessor over catalog items, scoped to one transaction.
///
/// This is the only catalog surface the order workflow touches.
#[async_trait::async_trait]
pub trait CatalogQuantities: Send {
    /// Current quantity, or `None` if the item does not exist.
    async fn item_quantity(&mut self, item_id: ItemId) -> Result<Option<f64>, StoreError>;

    /// Subtract `amount` only if the current quantity is at least `amount`.
    ///
    /// Check and write happen as one step: no other transaction can observe or
    /// change the quantity in between.
    async fn try_decrement(&mut self, item_id: ItemId, amount: f64)
    -> Result<Decrement, StoreError>;

    /// Add `amount` back. Returns `false` if the item no longer exists.
    async fn increment(&mut self, item_id: ItemId, amount: f64) -> Result<bool, StoreError>;

    /// Hold the given items exclusively until the transaction ends.
    ///
    /// Locks are taken in ascending id order whatever order `item_ids` is in,
    /// so two transactions over the same items never wait on each other in a
    /// cycle. Unknown ids are ignored.
    async fn lock_items(&mut self, item_ids: &[ItemId]) -> Result<(), StoreError>;
}

/// One unit of work over orders and item quantities.
///
/// Nothing written through a transaction is visible to others until
/// [`commit`](OrderTransaction::commit). Dropping a transaction without
/// committing discards every change.
#[async_trait::async_trait]
pub trait OrderTransaction: CatalogQuantities + Sized {
    async fn insert_customer_order(
        &mut self,
        header: NewCustomerOrder,
    ) -> Result<CustomerOrder, StoreError>;

    async fn insert_order_line(&mut self, line: NewOrderLine) -> Result<OrderLine, StoreError>;

    /// Load an order and hold it exclusively until the transaction ends.
    ///
    /// A second transaction locking the same order waits, and then sees `None`
    /// if the first one deleted it.
    async fn lock_customer_order(
        &mut self,
        id: CustomerOrderId,
    ) -> Result<Option<OrderAggregate>, StoreError>;

    /// Delete every line of an order; returns how many were removed.
    async fn delete_order_lines(&mut self, id: CustomerOrderId) -> Result<u64, StoreError>;

    async fn delete_customer_order(&mut self, id: CustomerOrderId) -> Result<bool, StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}

/// Order persistence plus the read paths the retrieval views need.
#[async_trait::async_trait]
pub trait OrderStore: Send + Sync {
    type Tx: OrderTransaction + 'static;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    async fn user_exists(&self, user_id: UserId) -> Result<bool, StoreError>;

    /// Every order line of every order, in line-id order.
    async fn order_lines(&self) -> Result<Vec<OrderLine>, StoreError>;

    async fn customer_order(
        &self,
        id: CustomerOrderId,
    ) -> Result<Option<OrderAggregate>, StoreError>;

    /// Orders owned by `user_id`, in order-id order.
    async fn customer_orders_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderAggregate>, StoreError>;

    /// Names of the given items that still exist.
    async fn item_names(&self, ids: &[ItemId]) -> Result<HashMap<ItemId, String>, StoreError>;
}

/// Catalog management.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn create_category(&self, name: &str) -> Result<Category, StoreError>;

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// Fails with `NotFound` when the category does not exist.
    async fn create_item(&self, item: NewItem) -> Result<Item, StoreError>;

    async fn update_item(&self, id: ItemId, update: ItemUpdate) -> Result<Item, StoreError>;

    /// Hard delete. Order lines that reference the item are left in place.
    async fn delete_item(&self, id: ItemId) -> Result<(), StoreError>;

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError>;

    async fn list_items(&self) -> Result<Vec<ItemListing>, StoreError>;
}

/// Customer accounts.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `Conflict` when the email or phone number is already taken.
    async fn register_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;
}

#[async_trait::async_trait]
impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    type Tx = S::Tx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        (**self).begin().await
    }

    async fn user_exists(&self, user_id: UserId) -> Result<bool, StoreError> {
        (**self).user_exists(user_id).await
    }

    async fn order_lines(&self) -> Result<Vec<OrderLine>, StoreError> {
        (**self).order_lines().await
    }

    async fn customer_order(
        &self,
        id: CustomerOrderId,
    ) -> Result<Option<OrderAggregate>, StoreError> {
        (**self).customer_order(id).await
    }

    async fn customer_orders_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderAggregate>, StoreError> {
        (**self).customer_orders_for_user(user_id).await
    }

    async fn item_names(&self, ids: &[ItemId]) -> Result<HashMap<ItemId, String>, StoreError> {
        (**self).item_names(ids).await
    }
}

#[async_trait::async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn create_category(&self, name: &str) -> Result<Category, StoreError> {
        (**self).create_category(name).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        (**self).list_categories().await
    }

    async fn create_item(&self, item: NewItem) -> Result<Item, StoreError> {
        (**self).create_item(item).await
    }

    async fn update_item(&self, id: ItemId, update: ItemUpdate) -> Result<Item, StoreError> {
        (**self).update_item(id, update).await
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), StoreError> {
        (**self).delete_item(id).await
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        (**self).get_item(id).await
    }

    async fn list_items(&self) -> Result<Vec<ItemListing>, StoreError> {
        (**self).list_items().await
    }
}

#[async_trait::async_trait]
impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    async fn register_user(&self, user: NewUser) -> Result<User, StoreError> {
        (**self).register_user(user).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).get_user(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_onto_store_errors() {
        let err: StoreError = DomainError::not_found("category", 4).into();
        assert_eq!(err, StoreError::not_found("category", 4));
        assert_eq!(err.to_string(), "category 4 not found");

        let err: StoreError = DomainError::validation("name cannot be empty").into();
        assert_eq!(err.code(), "validation_error");

        let err: StoreError = DomainError::conflict("email already registered").into();
        assert_eq!(err.code(), "conflict");
    }
}
