//! Storage boundary.
//!
//! The traits in [`r#trait`] describe what the workflow needs from a store
//! without assuming a backend. Two implementations ship:
//!
//! - [`InMemoryStore`]: one process-wide lock, for tests and local runs
//! - [`PostgresStore`]: sqlx-backed, with row-level locking inside Postgres

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::{InMemoryStore, InMemoryTransaction};
pub use postgres::{PostgresStore, PostgresTransaction};
pub use r#trait::{
    AccountStore, CatalogQuantities, CatalogStore, Decrement, OrderStore, OrderTransaction,
    StoreError,
};
