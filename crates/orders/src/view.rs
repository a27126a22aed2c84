//! Read views over order aggregates.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use greengrocer_core::{CustomerOrderId, ItemId};

use crate::order::OrderAggregate;

/// One line as shown to the customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedItemView {
    pub item_id: ItemId,
    /// `None` when the item has since been deleted from the catalog.
    pub item_name: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
}

/// One order with its lines resolved to item names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrderView {
    pub customer_order_id: CustomerOrderId,
    pub order_date: DateTime<Utc>,
    pub total_amount: f64,
    pub items: Vec<OrderedItemView>,
}

impl CustomerOrderView {
    pub fn build(aggregate: &OrderAggregate, item_names: &HashMap<ItemId, String>) -> Self {
        Self {
            customer_order_id: aggregate.header.id,
            order_date: aggregate.header.order_date,
            total_amount: aggregate.header.total_amount,
            items: aggregate
                .lines
                .iter()
                .map(|l| OrderedItemView {
                    item_id: l.item_id,
                    item_name: item_names.get(&l.item_id).cloned(),
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                })
                .collect(),
        }
    }

    /// Views for many aggregates, ordered by order id.
    pub fn build_all(
        aggregates: &[OrderAggregate],
        item_names: &HashMap<ItemId, String>,
    ) -> Vec<Self> {
        let mut views: Vec<Self> = aggregates
            .iter()
            .map(|agg| Self::build(agg, item_names))
            .collect();
        views.sort_by_key(|v| v.customer_order_id);
        views
    }
}

/// Distinct item ids referenced by any line of `aggregates`.
pub fn referenced_items(aggregates: &[OrderAggregate]) -> BTreeSet<ItemId> {
    aggregates
        .iter()
        .flat_map(|agg| agg.lines.iter().map(|l| l.item_id))
        .collect()
}
