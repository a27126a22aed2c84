use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use greengrocer_core::{CustomerOrderId, Entity, ItemId, OrderLineId, UserId};

/// Order aggregate header.
///
/// `total_amount` is whatever the caller declared; it is not reconciled with
/// the line totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrder {
    pub id: CustomerOrderId,
    pub user_id: UserId,
    pub total_amount: f64,
    pub order_date: DateTime<Utc>,
}

/// One item/quantity/price triple of an order. Lives only while its header does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub item_id: ItemId,
    pub customer_order_id: CustomerOrderId,
    pub quantity: f64,
    pub unit_price: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomerOrder {
    pub user_id: UserId,
    pub total_amount: f64,
    pub order_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub item_id: ItemId,
    pub customer_order_id: CustomerOrderId,
    pub quantity: f64,
    pub unit_price: f64,
    pub created_at: DateTime<Utc>,
}

impl CustomerOrder {
    pub fn from_new(id: CustomerOrderId, new: NewCustomerOrder) -> Self {
        Self {
            id,
            user_id: new.user_id,
            total_amount: new.total_amount,
            order_date: new.order_date,
        }
    }
}

impl OrderLine {
    pub fn from_new(id: OrderLineId, new: NewOrderLine) -> Self {
        Self {
            id,
            item_id: new.item_id,
            customer_order_id: new.customer_order_id,
            quantity: new.quantity,
            unit_price: new.unit_price,
            created_at: new.created_at,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

impl Entity for CustomerOrder {
    type Id = CustomerOrderId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Entity for OrderLine {
    type Id = OrderLineId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// A header together with its lines, in line-id order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAggregate {
    pub header: CustomerOrder,
    pub lines: Vec<OrderLine>,
}

impl OrderAggregate {
    /// Assemble an aggregate, keeping only lines owned by `header`.
    pub fn assemble(header: CustomerOrder, lines: impl IntoIterator<Item = OrderLine>) -> Self {
        let mut lines: Vec<OrderLine> = lines
            .into_iter()
            .filter(|l| l.customer_order_id == header.id)
            .collect();
        lines.sort_by_key(|l| l.id);
        Self { header, lines }
    }

    /// Quantities to hand back to the catalog when this order is cancelled,
    /// one entry per line (an item appearing on two lines appears twice).
    pub fn restorations(&self) -> impl Iterator<Item = (ItemId, f64)> + '_ {
        self.lines.iter().map(|l| (l.item_id, l.quantity))
    }

    /// Sum of `quantity * unit_price` over all lines.
    pub fn computed_total(&self) -> f64 {
        self.lines.iter().map(OrderLine::line_total).sum()
    }
}

/// Outcome of a successful cancellation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelledOrder {
    /// The aggregate as it was just before deletion.
    pub aggregate: OrderAggregate,
    /// Items whose quantity could not be restored because they no longer exist.
    pub skipped_items: Vec<ItemId>,
}

impl Entity for OrderAggregate {
    type Id = CustomerOrderId;

    fn id(&self) -> Self::Id {
        self.header.id
    }
}
