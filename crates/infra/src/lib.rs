//! Infrastructure layer: storage backends, the order workflow, config.
//!
//! Domain crates stay pure; everything that touches a database, a lock or the
//! environment lives here.

pub mod config;
pub mod order_workflow;
pub mod store;

pub use config::{ConfigError, PostgresConfig, StoreBackend, StoreConfig};
pub use order_workflow::{OrderWorkflow, WorkflowError};
pub use store::{
    AccountStore, CatalogQuantities, CatalogStore, Decrement, InMemoryStore, OrderStore,
    OrderTransaction, PostgresStore, StoreError,
};
