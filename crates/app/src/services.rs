//! Service facade over the configured backend.
//!
//! `AppServices` owns one store and the order workflow wired to it. Every
//! operation delegates to whichever backend was selected at bootstrap.

use anyhow::Context;
use chrono::Utc;
use tracing::info;

use greengrocer_accounts::{NewUser, User};
use greengrocer_catalog::{Category, Item, ItemListing, ItemUpdate, NewItem};
use greengrocer_core::{CustomerOrderId, ItemId, UserId};
use greengrocer_infra::store::{
    AccountStore, CatalogQuantities, CatalogStore, InMemoryStore, OrderStore, OrderTransaction,
    PostgresStore, StoreError,
};
use greengrocer_infra::{OrderWorkflow, StoreBackend, WorkflowError};
use greengrocer_orders::{CancelledOrder, CustomerOrderView, OrderAggregate, OrderLine, PlaceOrder};

use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub enum AppServices {
    InMemory {
        store: InMemoryStore,
        orders: OrderWorkflow<InMemoryStore>,
    },
    Persistent {
        store: PostgresStore,
        orders: OrderWorkflow<PostgresStore>,
    },
}

/// Run `$body` against the active backend, binding its store and workflow.
macro_rules! on_backend {
    ($services:expr, |$store:ident, $orders:ident| $body:expr) => {
        match $services {
            AppServices::InMemory {
                store: $store,
                orders: $orders,
            } => $body,
            AppServices::Persistent {
                store: $store,
                orders: $orders,
            } => $body,
        }
    };
}

/// Initialize logging, then connect (and migrate) the configured backend.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    greengrocer_observability::init_with(&config.log);

    match &config.store.backend {
        StoreBackend::InMemory => {
            info!(backend = "in_memory", "building services");
            Ok(AppServices::in_memory(InMemoryStore::new()))
        }
        StoreBackend::Postgres(pg) => {
            info!(
                backend = "postgres",
                max_connections = pg.max_connections,
                "building services"
            );
            let store = PostgresStore::connect(pg)
                .await
                .context("connecting to postgres")?;
            if pg.run_migrations {
                store.migrate().await.context("applying schema migrations")?;
            }
            Ok(AppServices::persistent(store))
        }
    }
}

impl AppServices {
    pub fn in_memory(store: InMemoryStore) -> Self {
        AppServices::InMemory {
            orders: OrderWorkflow::new(store.clone()),
            store,
        }
    }

    pub fn persistent(store: PostgresStore) -> Self {
        AppServices::Persistent {
            orders: OrderWorkflow::new(store.clone()),
            store,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            AppServices::InMemory { .. } => "in_memory",
            AppServices::Persistent { .. } => "postgres",
        }
    }

    // Orders

    pub async fn place_order(&self, request: PlaceOrder) -> Result<OrderAggregate, WorkflowError> {
        on_backend!(self, |_store, orders| orders.place_order(request).await)
    }

    /// Place an order from parallel columns, stamped with the current time.
    pub async fn place_order_columns(
        &self,
        user_id: UserId,
        total_amount: f64,
        item_ids: &[ItemId],
        quantities: &[f64],
        unit_prices: &[f64],
    ) -> Result<OrderAggregate, WorkflowError> {
        let now = Utc::now();
        on_backend!(self, |_store, orders| {
            orders
                .place_order_from_columns(
                    user_id,
                    total_amount,
                    item_ids,
                    quantities,
                    unit_prices,
                    now,
                )
                .await
        })
    }

    pub async fn cancel_order(&self, id: CustomerOrderId) -> Result<CancelledOrder, WorkflowError> {
        on_backend!(self, |_store, orders| orders.cancel_order(id).await)
    }

    pub async fn list_order_lines(&self) -> Result<Vec<OrderLine>, WorkflowError> {
        on_backend!(self, |_store, orders| orders.order_lines().await)
    }

    pub async fn orders_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CustomerOrderView>, WorkflowError> {
        on_backend!(self, |_store, orders| orders.orders_for_user(user_id).await)
    }

    pub async fn get_customer_order(
        &self,
        id: CustomerOrderId,
    ) -> Result<CustomerOrderView, WorkflowError> {
        on_backend!(self, |_store, orders| orders.customer_order(id).await)
    }

    /// Current quantity of an item, read through a short transaction.
    pub async fn item_quantity(&self, item_id: ItemId) -> Result<Option<f64>, StoreError> {
        on_backend!(self, |store, _orders| {
            let mut tx = store.begin().await?;
            let quantity = tx.item_quantity(item_id).await?;
            tx.rollback().await?;
            Ok(quantity)
        })
    }

    // Catalog

    pub async fn create_category(&self, name: &str) -> Result<Category, StoreError> {
        on_backend!(self, |store, _orders| store.create_category(name).await)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        on_backend!(self, |store, _orders| store.list_categories().await)
    }

    pub async fn create_item(&self, item: NewItem) -> Result<Item, StoreError> {
        on_backend!(self, |store, _orders| store.create_item(item).await)
    }

    pub async fn update_item(&self, id: ItemId, update: ItemUpdate) -> Result<Item, StoreError> {
        on_backend!(self, |store, _orders| store.update_item(id, update).await)
    }

    pub async fn delete_item(&self, id: ItemId) -> Result<(), StoreError> {
        on_backend!(self, |store, _orders| store.delete_item(id).await)
    }

    pub async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        on_backend!(self, |store, _orders| store.get_item(id).await)
    }

    pub async fn list_items(&self) -> Result<Vec<ItemListing>, StoreError> {
        on_backend!(self, |store, _orders| store.list_items().await)
    }

    // Accounts

    pub async fn register_user(&self, user: NewUser) -> Result<User, StoreError> {
        on_backend!(self, |store, _orders| store.register_user(user).await)
    }

    pub async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        on_backend!(self, |store, _orders| store.get_user(id).await)
    }
}
