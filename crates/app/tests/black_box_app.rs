use greengrocer_accounts::NewUser;
use greengrocer_app::{AppConfig, AppServices, build_services, error_body};
use greengrocer_catalog::{ItemStatus, ItemUpdate, NewItem};
use greengrocer_core::{CustomerOrderId, ItemId, UserId};
use serde_json::json;

async fn services() -> AppServices {
    build_services(&AppConfig::in_memory())
        .await
        .expect("in-memory services always build")
}

async fn stocked(services: &AppServices, quantities: &[f64]) -> Vec<ItemId> {
    let category = services.create_category("Leafy greens").await.unwrap();
    let mut items = Vec::new();
    for (idx, &quantity) in quantities.iter().enumerate() {
        let item = services
            .create_item(NewItem {
                name: format!("Greens {idx}"),
                description: "Fresh".to_string(),
                quantity,
                category_id: category.id,
            })
            .await
            .unwrap();
        items.push(item.id);
    }
    items
}

async fn customer(services: &AppServices) -> UserId {
    services
        .register_user(NewUser {
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            phone_no: "9000000001".to_string(),
            address: "4 Orchard Lane".to_string(),
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn order_lifecycle_through_the_facade() {
    let services = services().await;
    assert_eq!(services.backend_name(), "in_memory");
    let items = stocked(&services, &[50.0]).await;
    let user = customer(&services).await;

    let placed = services
        .place_order_columns(user, 75.0, &[items[0], items[0]], &[10.0, 5.0], &[5.0, 5.0])
        .await
        .unwrap();
    assert_eq!(services.item_quantity(items[0]).await.unwrap(), Some(35.0));

    let views = services.orders_for_user(user).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].total_amount, 75.0);
    assert_eq!(views[0].items.len(), 2);
    assert_eq!(views[0].items[0].item_name.as_deref(), Some("Greens 0"));

    services.cancel_order(placed.header.id).await.unwrap();
    assert_eq!(services.item_quantity(items[0]).await.unwrap(), Some(50.0));
    assert!(services.list_order_lines().await.unwrap().is_empty());
    assert!(services.orders_for_user(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_orders_render_error_bodies() {
    let services = services().await;
    let items = stocked(&services, &[5.0]).await;

    let err = services
        .place_order_columns(UserId::new(1), 10.0, &[items[0]], &[10.0], &[1.0])
        .await
        .unwrap_err();
    assert_eq!(
        error_body(&err),
        json!({
            "error": "insufficient_stock",
            "message": format!("insufficient quantity for item {}", items[0]),
        })
    );

    let err = services
        .place_order_columns(UserId::new(1), 10.0, &[items[0]], &[1.0, 2.0], &[1.0])
        .await
        .unwrap_err();
    assert_eq!(error_body(&err)["error"], "invalid_input");

    let err = services
        .cancel_order(CustomerOrderId::new(123))
        .await
        .unwrap_err();
    assert_eq!(error_body(&err)["error"], "not_found");

    let err = services.orders_for_user(UserId::new(404)).await.unwrap_err();
    assert_eq!(error_body(&err)["message"], "user 404 not found");

    assert_eq!(services.item_quantity(items[0]).await.unwrap(), Some(5.0));
    assert_eq!(services.item_quantity(ItemId::new(999)).await.unwrap(), None);
}

#[tokio::test]
async fn catalog_management_round_trip() {
    let services = services().await;
    let items = stocked(&services, &[3.0, 8.0]).await;

    let categories = services.list_categories().await.unwrap();
    assert_eq!(categories.len(), 1);

    let updated = services
        .update_item(
            items[1],
            ItemUpdate {
                name: "Kale".to_string(),
                description: "Curly".to_string(),
                quantity: 9.0,
                category_id: categories[0].id,
                status: Some(ItemStatus::Deactive),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, ItemStatus::Deactive);

    services.delete_item(items[0]).await.unwrap();
    let listings = services.list_items().await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].item.name, "Kale");
    assert_eq!(listings[0].category_name.as_deref(), Some("Leafy greens"));
    assert!(services.get_item(items[0]).await.unwrap().is_none());
}

#[tokio::test]
async fn registration_rules_are_enforced() {
    let services = services().await;
    let user = customer(&services).await;
    assert_eq!(
        services.get_user(user).await.unwrap().map(|u| u.email),
        Some("ravi@example.com".to_string())
    );

    let err = services
        .register_user(NewUser {
            name: "Ravi again".to_string(),
            email: "ravi@example.com".to_string(),
            phone_no: "9000000002".to_string(),
            address: String::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(error_body(&err)["error"], "conflict");

    let err = services
        .register_user(NewUser {
            name: "Meera".to_string(),
            email: "meera.example.com".to_string(),
            phone_no: "9000000003".to_string(),
            address: String::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(error_body(&err)["error"], "validation_error");
}

#[tokio::test]
async fn deleted_items_show_without_a_name() {
    let services = services().await;
    let items = stocked(&services, &[10.0]).await;
    let user = customer(&services).await;

    let placed = services
        .place_order_columns(user, 4.0, &[items[0]], &[2.0], &[2.0])
        .await
        .unwrap();
    services.delete_item(items[0]).await.unwrap();

    let view = services.get_customer_order(placed.header.id).await.unwrap();
    assert_eq!(view.items[0].item_id, items[0]);
    assert_eq!(view.items[0].item_name, None);

    let cancelled = services.cancel_order(placed.header.id).await.unwrap();
    assert_eq!(cancelled.skipped_items, vec![items[0]]);
}
