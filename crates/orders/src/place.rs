//! Order placement request.
//!
//! Callers describe an order as three parallel columns (item ids, quantities,
//! unit prices). `PlaceOrder` zips them into line requests once the shape has
//! been checked, so the workflow never sees a ragged request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use greengrocer_core::{CustomerOrderId, ItemId, UserId};

use crate::error::{OrderError, OrderResult};
use crate::order::{NewCustomerOrder, NewOrderLine};

/// One requested line, in request order.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRequest {
    pub item_id: ItemId,
    pub quantity: f64,
    pub unit_price: f64,
}

/// A shape-checked order placement request.
///
/// Not checked: `total_amount` against the line totals, `unit_price` against
/// any price list, and the sign of requested quantities. Those stay the
/// caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrder {
    user_id: UserId,
    total_amount: f64,
    lines: Vec<LineRequest>,
    placed_at: DateTime<Utc>,
}

impl PlaceOrder {
    /// Build a request from parallel columns.
    ///
    /// Fails with `InvalidInput` when the three columns differ in length.
    pub fn from_columns(
        user_id: UserId,
        total_amount: f64,
        item_ids: &[ItemId],
        quantities: &[f64],
        unit_prices: &[f64],
        placed_at: DateTime<Utc>,
    ) -> OrderResult<Self> {
        if item_ids.len() != quantities.len() || quantities.len() != unit_prices.len() {
            return Err(OrderError::invalid_input(format!(
                "item_id, quantity and unit_price must have the same length (got {}, {}, {})",
                item_ids.len(),
                quantities.len(),
                unit_prices.len()
            )));
        }

        let lines = item_ids
            .iter()
            .zip(quantities)
            .zip(unit_prices)
            .map(|((&item_id, &quantity), &unit_price)| LineRequest {
                item_id,
                quantity,
                unit_price,
            })
            .collect();

        Self::new(user_id, total_amount, lines, placed_at)
    }

    /// Build a request from already-paired lines.
    ///
    /// Numbers must be finite; NaN would slip through every stock comparison.
    pub fn new(
        user_id: UserId,
        total_amount: f64,
        lines: Vec<LineRequest>,
        placed_at: DateTime<Utc>,
    ) -> OrderResult<Self> {
        if !total_amount.is_finite() {
            return Err(OrderError::invalid_input("total_amount must be a finite number"));
        }
        for (idx, line) in lines.iter().enumerate() {
            if !line.quantity.is_finite() {
                return Err(OrderError::invalid_input(format!(
                    "quantity at index {idx} must be a finite number"
                )));
            }
            if !line.unit_price.is_finite() {
                return Err(OrderError::invalid_input(format!(
                    "unit_price at index {idx} must be a finite number"
                )));
            }
        }

        Ok(Self {
            user_id,
            total_amount,
            lines,
            placed_at,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    pub fn lines(&self) -> &[LineRequest] {
        &self.lines
    }

    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    pub fn header(&self) -> NewCustomerOrder {
        NewCustomerOrder {
            user_id: self.user_id,
            total_amount: self.total_amount,
            order_date: self.placed_at,
        }
    }

    /// Line records for a header that has been assigned `customer_order_id`.
    pub fn line_records(&self, customer_order_id: CustomerOrderId) -> Vec<NewOrderLine> {
        self.lines
            .iter()
            .map(|l| NewOrderLine {
                item_id: l.item_id,
                customer_order_id,
                quantity: l.quantity,
                unit_price: l.unit_price,
                created_at: self.placed_at,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(raw: &[i64]) -> Vec<ItemId> {
        raw.iter().copied().map(ItemId::new).collect()
    }

    #[test]
    fn zips_columns_in_request_order() {
        let req = PlaceOrder::from_columns(
            UserId::new(7),
            75.0,
            &ids(&[1, 1]),
            &[10.0, 5.0],
            &[2.0, 2.0],
            Utc::now(),
        )
        .unwrap();

        assert_eq!(req.lines().len(), 2);
        assert_eq!(req.lines()[0].quantity, 10.0);
        assert_eq!(req.lines()[1].quantity, 5.0);
        assert_eq!(req.header().total_amount, 75.0);

        let records = req.line_records(CustomerOrderId::new(3));
        assert!(records.iter().all(|r| r.customer_order_id == CustomerOrderId::new(3)));
        assert!(records.iter().all(|r| r.created_at == req.placed_at()));
    }

    #[test]
    fn mismatched_columns_are_invalid_input() {
        let err = PlaceOrder::from_columns(
            UserId::new(7),
            10.0,
            &ids(&[1, 2]),
            &[1.0],
            &[2.0, 2.0],
            Utc::now(),
        )
        .unwrap_err();
        match err {
            OrderError::InvalidInput(msg) if msg.contains("same length") => {}
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_numbers_are_invalid_input() {
        let err = PlaceOrder::from_columns(
            UserId::new(7),
            10.0,
            &ids(&[1]),
            &[f64::NAN],
            &[2.0],
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.code(), "invalid_input");

        let err = PlaceOrder::new(UserId::new(7), f64::INFINITY, vec![], Utc::now()).unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn caller_declared_total_is_kept_verbatim() {
        // 10 * 2.0 = 20.0, but the caller says 999.0.
        let req = PlaceOrder::from_columns(
            UserId::new(1),
            999.0,
            &ids(&[1]),
            &[10.0],
            &[2.0],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(req.total_amount(), 999.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any length mismatch among the columns is rejected.
        #[test]
        fn any_length_mismatch_is_rejected(
            a in 0usize..6,
            b in 0usize..6,
            c in 0usize..6,
        ) {
            prop_assume!(!(a == b && b == c));
            let items: Vec<ItemId> = (0..a as i64).map(ItemId::new).collect();
            let quantities = vec![1.0; b];
            let prices = vec![1.0; c];
            let result = PlaceOrder::from_columns(
                UserId::new(1),
                1.0,
                &items,
                &quantities,
                &prices,
                Utc::now(),
            );
            prop_assert!(matches!(result, Err(OrderError::InvalidInput(_))));
        }
    }
}
