//! Order workflow against a live Postgres.
//!
//! Ignored by default. Run with:
//!
//! ```text
//! DATABASE_URL=postgres://localhost/greengrocer_test \
//!     cargo test -p greengrocer-infra --test postgres_order_workflow -- --ignored
//! ```
//!
//! Every test creates its own category and items, so tests can share one
//! database and run in parallel.

use std::sync::OnceLock;

use chrono::Utc;
use tokio::sync::Mutex;

use greengrocer_catalog::NewItem;
use greengrocer_core::{ItemId, UserId};
use greengrocer_infra::{
    CatalogStore, OrderStore, OrderWorkflow, PostgresConfig, PostgresStore, WorkflowError,
};
use greengrocer_orders::{LineRequest, OrderError, PlaceOrder};

static MIGRATED: OnceLock<Mutex<bool>> = OnceLock::new();

async fn store() -> PostgresStore {
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database");
    let store = PostgresStore::connect(&PostgresConfig {
        database_url,
        max_connections: 8,
        run_migrations: true,
    })
    .await
    .expect("connect to postgres");

    let mut migrated = MIGRATED.get_or_init(|| Mutex::new(false)).lock().await;
    if !*migrated {
        store.migrate().await.expect("apply schema");
        *migrated = true;
    }
    store
}

async fn setup(quantities: &[f64]) -> (OrderWorkflow<PostgresStore>, Vec<ItemId>) {
    let store = store().await;
    let category = store.create_category("Root vegetables").await.unwrap();
    let mut items = Vec::new();
    for (idx, &quantity) in quantities.iter().enumerate() {
        let item = store
            .create_item(NewItem {
                name: format!("Beet {idx}"),
                description: String::new(),
                quantity,
                category_id: category.id,
            })
            .await
            .unwrap();
        items.push(item.id);
    }
    (OrderWorkflow::new(store), items)
}

fn order(lines: &[(ItemId, f64)]) -> PlaceOrder {
    let lines = lines
        .iter()
        .map(|&(item_id, quantity)| LineRequest {
            item_id,
            quantity,
            unit_price: 1.5,
        })
        .collect();
    PlaceOrder::new(UserId::new(1), 30.0, lines, Utc::now()).unwrap()
}

async fn quantity(workflow: &OrderWorkflow<PostgresStore>, item: ItemId) -> Option<f64> {
    workflow
        .store()
        .get_item(item)
        .await
        .unwrap()
        .map(|i| i.quantity)
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn place_and_cancel_round_trip() {
    let (workflow, items) = setup(&[100.0]).await;

    let placed = workflow
        .place_order(order(&[(items[0], 30.0)]))
        .await
        .unwrap();
    assert_eq!(quantity(&workflow, items[0]).await, Some(70.0));
    assert_eq!(placed.lines.len(), 1);

    let cancelled = workflow.cancel_order(placed.header.id).await.unwrap();
    assert!(cancelled.skipped_items.is_empty());
    assert_eq!(quantity(&workflow, items[0]).await, Some(100.0));
    let gone = workflow.store().customer_order(placed.header.id).await;
    assert!(gone.unwrap().is_none());
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn failed_second_line_rolls_back_the_first() {
    let (workflow, items) = setup(&[10.0, 1.0]).await;

    let err = workflow
        .place_order(order(&[(items[0], 5.0), (items[1], 3.0)]))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        WorkflowError::Order(OrderError::InsufficientStock { item_id: items[1] })
    );
    assert_eq!(quantity(&workflow, items[0]).await, Some(10.0));
    assert_eq!(quantity(&workflow, items[1]).await, Some(1.0));
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn cancelling_twice_restores_once() {
    let (workflow, items) = setup(&[20.0]).await;
    let placed = workflow
        .place_order(order(&[(items[0], 8.0)]))
        .await
        .unwrap();

    workflow.cancel_order(placed.header.id).await.unwrap();
    let err = workflow.cancel_order(placed.header.id).await.unwrap_err();

    assert_eq!(err.code(), "not_found");
    assert_eq!(quantity(&workflow, items[0]).await, Some(20.0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs DATABASE_URL"]
async fn racing_orders_for_the_same_stock_never_oversell() {
    let (workflow, items) = setup(&[100.0]).await;

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let workflow = workflow.clone();
            let item = items[0];
            tokio::spawn(async move { workflow.place_order(order(&[(item, 60.0)])).await })
        })
        .collect();

    let mut placed = 0;
    let mut rejected = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => placed += 1,
            Err(err) => {
                assert_eq!(err.code(), "insufficient_stock");
                rejected += 1;
            }
        }
    }

    assert_eq!((placed, rejected), (1, 1));
    assert_eq!(quantity(&workflow, items[0]).await, Some(40.0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs DATABASE_URL"]
async fn crossed_line_orders_all_succeed() {
    let (workflow, items) = setup(&[1.0e9, 1.0e9]).await;
    let (a, b) = (items[0], items[1]);
    let rounds = 25;

    for _ in 0..rounds {
        let forward = {
            let workflow = workflow.clone();
            tokio::spawn(async move { workflow.place_order(order(&[(a, 1.0), (b, 1.0)])).await })
        };
        let backward = {
            let workflow = workflow.clone();
            tokio::spawn(async move { workflow.place_order(order(&[(b, 1.0), (a, 1.0)])).await })
        };
        forward.await.unwrap().unwrap();
        backward.await.unwrap().unwrap();
    }

    let expected = 1.0e9 - 2.0 * rounds as f64;
    assert_eq!(quantity(&workflow, a).await, Some(expected));
    assert_eq!(quantity(&workflow, b).await, Some(expected));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs DATABASE_URL"]
async fn crossed_cancellations_all_succeed() {
    let (workflow, items) = setup(&[1.0e6, 1.0e6]).await;
    let (a, b) = (items[0], items[1]);

    for _ in 0..10 {
        let first = workflow
            .place_order(order(&[(a, 2.0), (b, 2.0)]))
            .await
            .unwrap();
        let second = workflow
            .place_order(order(&[(b, 3.0), (a, 3.0)]))
            .await
            .unwrap();

        let tasks: Vec<_> = [first.header.id, second.header.id]
            .into_iter()
            .map(|id| {
                let workflow = workflow.clone();
                tokio::spawn(async move { workflow.cancel_order(id).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
    }

    assert_eq!(quantity(&workflow, a).await, Some(1.0e6));
    assert_eq!(quantity(&workflow, b).await, Some(1.0e6));
}
