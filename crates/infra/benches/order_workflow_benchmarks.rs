use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use greengrocer_catalog::NewItem;
use greengrocer_core::{ItemId, UserId};
use greengrocer_infra::order_workflow::OrderWorkflow;
use greengrocer_infra::store::{CatalogStore, InMemoryStore};
use greengrocer_orders::{LineRequest, PlaceOrder};
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread().build().unwrap()
}

/// Store with `count` items, each stocked high enough to never run out.
fn stocked_workflow(rt: &Runtime, count: usize) -> (OrderWorkflow<InMemoryStore>, Vec<ItemId>) {
    rt.block_on(async {
        let store = InMemoryStore::new();
        let category = store.create_category("Vegetables").await.unwrap();
        let mut items = Vec::with_capacity(count);
        for idx in 0..count {
            let item = store
                .create_item(NewItem {
                    name: format!("Item {idx}"),
                    description: String::new(),
                    quantity: 1.0e12,
                    category_id: category.id,
                })
                .await
                .unwrap();
            items.push(item.id);
        }
        (OrderWorkflow::new(store), items)
    })
}

fn request(items: &[ItemId]) -> PlaceOrder {
    let lines = items
        .iter()
        .map(|&item_id| LineRequest {
            item_id,
            quantity: 1.0,
            unit_price: 2.5,
        })
        .collect();
    PlaceOrder::new(UserId::new(1), 2.5 * items.len() as f64, lines, Utc::now()).unwrap()
}

fn bench_place_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("place_order");
    let rt = runtime();

    for line_count in [1usize, 10, 50].iter() {
        group.throughput(Throughput::Elements(*line_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(line_count),
            line_count,
            |b, &line_count| {
                let (workflow, items) = stocked_workflow(&rt, line_count);
                b.iter(|| {
                    let placed = rt.block_on(workflow.place_order(request(&items))).unwrap();
                    black_box(placed);
                });
            },
        );
    }

    group.finish();
}

fn bench_place_then_cancel(c: &mut Criterion) {
    let mut group = c.benchmark_group("place_then_cancel");
    let rt = runtime();
    let (workflow, items) = stocked_workflow(&rt, 10);

    group.bench_function("ten_lines", |b| {
        b.iter(|| {
            rt.block_on(async {
                let placed = workflow.place_order(request(&items)).await.unwrap();
                let cancelled = workflow.cancel_order(placed.header.id).await.unwrap();
                black_box(cancelled);
            })
        });
    });

    group.finish();
}

fn bench_rejected_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("rejected_order");
    let rt = runtime();
    let (workflow, mut items) = stocked_workflow(&rt, 9);
    items.push(ItemId::new(-1));

    group.bench_function("missing_last_line", |b| {
        b.iter(|| {
            let result = rt.block_on(workflow.place_order(request(&items)));
            black_box(result.is_err());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_place_order,
    bench_place_then_cancel,
    bench_rejected_order
);
criterion_main!(benches);
