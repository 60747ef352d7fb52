//! Postgres-backed stores and the hub running on them.
//! Run with: TEST_DATABASE_URL=postgresql://... cargo test --test postgres_store_test -- --include-ignored --test-threads=1

use std::sync::Arc;

use storefront_api::config::ChatIdentity;
use storefront_api::error::StoreError;
use storefront_api::models::{NewChatMessage, ProductPatch};
use storefront_api::storage::{
    CatalogStore, ChatLogStore, PgCatalogStore, PgChatLogStore, PgUserStore, UserStore,
};
use storefront_api::websocket::{ClientCommand, Hub, ServerEvent};

use test_helpers::*;

#[tokio::test]
#[ignore]
async fn catalog_round_trip_preserves_insertion_order() {
    let pool = Arc::new(setup_test_db().await);
    let catalog = PgCatalogStore::new(pool);

    let mut first = widget();
    first.code = Some("A".into());
    let mut second = widget();
    second.code = Some("B".into());
    let a = catalog.add_product(first).await.unwrap();
    let b = catalog.add_product(second).await.unwrap();

    let codes: Vec<_> = catalog
        .get_products()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.code)
        .collect();
    assert_eq!(codes, vec!["A", "B"]);
    assert_ne!(a.id, b.id);
}

#[tokio::test]
#[ignore]
async fn delete_reports_whether_a_row_was_removed() {
    let pool = Arc::new(setup_test_db().await);
    let catalog = PgCatalogStore::new(pool);
    let product = catalog.add_product(widget()).await.unwrap();

    assert!(catalog.delete_product_by_id(&product.id).await.unwrap());
    assert!(!catalog.delete_product_by_id(&product.id).await.unwrap());
    assert!(catalog.get_products().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn partial_update_keeps_other_columns() {
    let pool = Arc::new(setup_test_db().await);
    let catalog = PgCatalogStore::new(pool);
    let product = catalog.add_product(widget()).await.unwrap();

    let patch = ProductPatch {
        price: Some(12.5),
        ..Default::default()
    };
    let updated = catalog.update_product(&product.id, patch).await.unwrap();
    assert_eq!(updated.price, 12.5);
    assert_eq!(updated.title, product.title);

    let missing = catalog
        .update_product("missing", ProductPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(missing, StoreError::NotFound { .. }));
}

#[tokio::test]
#[ignore]
async fn chat_log_appends_in_order() {
    let pool = Arc::new(setup_test_db().await);
    let chat = PgChatLogStore::new(pool);

    let first = chat.append(NewChatMessage::new("alice", "hi")).await.unwrap();
    let second = chat.append(NewChatMessage::new("bob", "hey")).await.unwrap();

    let all = chat.list_all().await.unwrap();
    assert_eq!(all, vec![first, second]);
    assert_eq!(all[0].user, "alice");
}

#[tokio::test]
#[ignore]
async fn duplicate_username_is_a_conflict() {
    let pool = Arc::new(setup_test_db().await);
    let users = PgUserStore::new(pool);

    let alice = users.create_user("alice", "hash").await.unwrap();
    assert!(matches!(
        users.create_user("alice", "hash").await,
        Err(StoreError::Conflict(_))
    ));
    assert_eq!(users.find_by_id(alice.id).await.unwrap().unwrap().username, "alice");
    assert!(users.set_password("alice", "new-hash").await.unwrap());
    assert!(!users.set_password("nobody", "hash").await.unwrap());
}

#[tokio::test]
#[ignore]
async fn hub_broadcasts_postgres_snapshot() {
    let pool = Arc::new(setup_test_db().await);
    let hub = Hub::new(
        Arc::new(PgCatalogStore::new(pool.clone())),
        Arc::new(PgChatLogStore::new(pool)),
        ChatIdentity::Client,
    );
    let mut c1 = hub.connect(None).await;
    drain(&mut c1.events);

    hub.handle_command(c1.id, ClientCommand::AddProduct(widget()))
        .await
        .unwrap();

    match drain(&mut c1.events).as_slice() {
        [ServerEvent::UpdateProducts(products)] => assert_eq!(products.len(), 1),
        other => panic!("unexpected events {:?}", other),
    }
}
