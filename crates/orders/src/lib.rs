//! Customer orders domain module.
//!
//! An order is an aggregate: one `CustomerOrder` header owning its `OrderLine`
//! records. This crate holds the request validation, the aggregate records and
//! the read views; the stock-moving workflow that persists them lives in
//! `greengrocer-infra` (no IO here).

pub mod error;
pub mod order;
pub mod place;
pub mod view;

pub use error::{MissingEntity, OrderError, OrderResult};
pub use order::{
    CancelledOrder, CustomerOrder, NewCustomerOrder, NewOrderLine, OrderAggregate, OrderLine,
};
pub use place::{LineRequest, PlaceOrder};
pub use view::{CustomerOrderView, OrderedItemView};
