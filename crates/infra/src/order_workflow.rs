//! Order placement and cancellation.
//!
//! Both operations run inside one store transaction and either apply every
//! stock change or none of them.
//!
//! ## Placement
//!
//! ```text
//! PlaceOrder (shape already checked)
//!   ↓
//! 1. begin transaction
//!   ↓
//! 2. lock every distinct item of the order, in ascending id order
//!   ↓
//! 3. for each line, in request order: compare-and-decrement the item
//!      (absent or short item → roll back, InsufficientStock)
//!   ↓
//! 4. insert the CustomerOrder header, then one OrderLine per request line
//!   ↓
//! 5. commit
//! ```
//!
//! Lines naming the same item are checked one after another against the
//! running quantity, so their sum is what must be covered.
//!
//! ## Cancellation
//!
//! ```text
//! 1. begin transaction, lock the header (absent → NotFound)
//! 2. lock the order's items, in ascending id order
//! 3. add each line's quantity back to its item (deleted items are skipped)
//! 4. delete the lines, then the header
//! 5. commit
//! ```
//!
//! This module contains no IO itself; it composes the store traits.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, instrument, warn};

use greengrocer_core::{CustomerOrderId, ItemId, UserId};
use greengrocer_orders::view::referenced_items;
use greengrocer_orders::{
    CancelledOrder, CustomerOrderView, MissingEntity, OrderAggregate, OrderError, OrderLine,
    PlaceOrder,
};

use crate::store::{Decrement, OrderStore, OrderTransaction, StoreError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    /// Business-level rejection; nothing was changed.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The store failed; the transaction was rolled back.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::Order(e) => e.code(),
            WorkflowError::Store(e) => e.code(),
        }
    }

    pub fn order_error(&self) -> Option<&OrderError> {
        match self {
            WorkflowError::Order(e) => Some(e),
            WorkflowError::Store(_) => None,
        }
    }
}

/// Order workflow over any [`OrderStore`].
#[derive(Debug, Clone)]
pub struct OrderWorkflow<S> {
    store: S,
}

impl<S> OrderWorkflow<S>
where
    S: OrderStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Place an order: decrement stock for every line and record the
    /// aggregate, atomically.
    #[instrument(
        skip(self, request),
        fields(user_id = %request.user_id(), lines = request.lines().len()),
        err(level = "warn")
    )]
    pub async fn place_order(&self, request: PlaceOrder) -> Result<OrderAggregate, WorkflowError> {
        let mut tx = self.store.begin().await?;

        match apply_placement(&mut tx, &request).await {
            Ok(aggregate) => {
                tx.commit().await?;
                info!(
                    customer_order_id = %aggregate.header.id,
                    total_amount = aggregate.header.total_amount,
                    "order placed"
                );
                Ok(aggregate)
            }
            Err(err) => {
                discard(tx).await;
                Err(err)
            }
        }
    }

    /// Parallel-column form of [`place_order`](Self::place_order).
    pub async fn place_order_from_columns(
        &self,
        user_id: UserId,
        total_amount: f64,
        item_ids: &[ItemId],
        quantities: &[f64],
        unit_prices: &[f64],
        placed_at: DateTime<Utc>,
    ) -> Result<OrderAggregate, WorkflowError> {
        let request = PlaceOrder::from_columns(
            user_id,
            total_amount,
            item_ids,
            quantities,
            unit_prices,
            placed_at,
        )
        .inspect_err(|e| warn!(user_id = %user_id, error = %e, "order request rejected"))?;
        self.place_order(request).await
    }

    /// Cancel an order: hand its quantities back and delete it, atomically.
    #[instrument(skip(self), fields(customer_order_id = %id), err(level = "warn"))]
    pub async fn cancel_order(&self, id: CustomerOrderId) -> Result<CancelledOrder, WorkflowError> {
        let mut tx = self.store.begin().await?;

        match apply_cancellation(&mut tx, id).await {
            Ok(cancelled) => {
                tx.commit().await?;
                info!(
                    lines = cancelled.aggregate.lines.len(),
                    skipped = cancelled.skipped_items.len(),
                    "order cancelled"
                );
                Ok(cancelled)
            }
            Err(err) => {
                discard(tx).await;
                Err(err)
            }
        }
    }

    /// Every order line across all orders, unfiltered.
    pub async fn order_lines(&self) -> Result<Vec<OrderLine>, WorkflowError> {
        Ok(self.store.order_lines().await?)
    }

    /// All orders of one user as nested views, in order-id order.
    ///
    /// An unknown user is `NotFound`; a known user with no orders gets an
    /// empty list.
    #[instrument(skip(self), fields(user_id = %user_id), err)]
    pub async fn orders_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CustomerOrderView>, WorkflowError> {
        if !self.store.user_exists(user_id).await? {
            return Err(OrderError::NotFound(MissingEntity::User(user_id)).into());
        }
        let aggregates = self.store.customer_orders_for_user(user_id).await?;
        let items: Vec<ItemId> = referenced_items(&aggregates).into_iter().collect();
        let names = self.store.item_names(&items).await?;
        Ok(CustomerOrderView::build_all(&aggregates, &names))
    }

    /// One order as a nested view.
    pub async fn customer_order(
        &self,
        id: CustomerOrderId,
    ) -> Result<CustomerOrderView, WorkflowError> {
        let aggregate = self
            .store
            .customer_order(id)
            .await?
            .ok_or(OrderError::NotFound(MissingEntity::CustomerOrder(id)))?;
        let items: Vec<ItemId> = referenced_items(std::slice::from_ref(&aggregate))
            .into_iter()
            .collect();
        let names = self.store.item_names(&items).await?;
        Ok(CustomerOrderView::build(&aggregate, &names))
    }
}

async fn apply_placement<T>(
    tx: &mut T,
    request: &PlaceOrder,
) -> Result<OrderAggregate, WorkflowError>
where
    T: OrderTransaction,
{
    lock_in_id_order(tx, request.lines().iter().map(|l| l.item_id)).await?;

    for line in request.lines() {
        match tx.try_decrement(line.item_id, line.quantity).await? {
            Decrement::Applied { .. } => {}
            Decrement::Insufficient { available } => {
                warn!(
                    item_id = %line.item_id,
                    requested = line.quantity,
                    available,
                    "insufficient quantity"
                );
                return Err(OrderError::InsufficientStock {
                    item_id: line.item_id,
                }
                .into());
            }
            Decrement::Missing => {
                warn!(item_id = %line.item_id, "ordered item does not exist");
                return Err(OrderError::InsufficientStock {
                    item_id: line.item_id,
                }
                .into());
            }
        }
    }

    let header = tx.insert_customer_order(request.header()).await?;
    let mut lines = Vec::with_capacity(request.lines().len());
    for record in request.line_records(header.id) {
        lines.push(tx.insert_order_line(record).await?);
    }
    Ok(OrderAggregate { header, lines })
}

async fn apply_cancellation<T>(
    tx: &mut T,
    id: CustomerOrderId,
) -> Result<CancelledOrder, WorkflowError>
where
    T: OrderTransaction,
{
    let aggregate = tx
        .lock_customer_order(id)
        .await?
        .ok_or(OrderError::NotFound(MissingEntity::CustomerOrder(id)))?;
    lock_in_id_order(tx, aggregate.restorations().map(|(item_id, _)| item_id)).await?;

    let mut skipped_items = Vec::new();
    for (item_id, quantity) in aggregate.restorations() {
        let restored = match tx.item_quantity(item_id).await? {
            Some(_) => tx.increment(item_id, quantity).await?,
            None => false,
        };
        if !restored {
            warn!(item_id = %item_id, quantity, "item no longer exists; quantity not restored");
            skipped_items.push(item_id);
        }
    }

    tx.delete_order_lines(id).await?;
    tx.delete_customer_order(id).await?;
    Ok(CancelledOrder {
        aggregate,
        skipped_items,
    })
}

async fn lock_in_id_order<T>(
    tx: &mut T,
    item_ids: impl Iterator<Item = ItemId>,
) -> Result<(), StoreError>
where
    T: OrderTransaction,
{
    let ids: Vec<ItemId> = item_ids.collect::<BTreeSet<_>>().into_iter().collect();
    tx.lock_items(&ids).await
}

async fn discard<T: OrderTransaction>(tx: T) {
    if let Err(e) = tx.rollback().await {
        // Dropping the transaction still discards the staged work.
        warn!(error = %e, "rollback failed");
    }
}
