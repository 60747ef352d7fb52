// Storage failure paths of the broadcast hub, driven by mockall doubles.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use storefront_api::config::ChatIdentity;
use storefront_api::error::{StoreError, StoreResult};
use storefront_api::models::{ChatMessage, NewChatMessage, NewProduct, Product, ProductPatch};
use storefront_api::storage::{CatalogStore, ChatLogStore, MemoryCatalogStore, MemoryChatLogStore};
use storefront_api::websocket::{ClientCommand, CommandOutcome, Hub, HubError, ServerEvent};
use tokio_test::{assert_err, assert_ok};

use test_helpers::*;

mock! {
    pub Catalog {}

    #[async_trait]
    impl CatalogStore for Catalog {
        async fn add_product(&self, product: NewProduct) -> StoreResult<Product>;
        async fn get_products(&self) -> StoreResult<Vec<Product>>;
        async fn get_product_by_id(&self, id: &str) -> StoreResult<Product>;
        async fn update_product(&self, id: &str, patch: ProductPatch) -> StoreResult<Product>;
        async fn delete_product_by_id(&self, id: &str) -> StoreResult<bool>;
    }
}

mock! {
    pub ChatLog {}

    #[async_trait]
    impl ChatLogStore for ChatLog {
        async fn append(&self, entry: NewChatMessage) -> StoreResult<ChatMessage>;
        async fn list_all(&self) -> StoreResult<Vec<ChatMessage>>;
    }
}

fn offline() -> StoreError {
    StoreError::Storage("connection refused".to_string())
}

#[tokio::test]
async fn failed_insert_broadcasts_nothing() {
    let mut catalog = MockCatalog::new();
    catalog.expect_add_product().times(1).returning(|_| Err(offline()));
    catalog.expect_get_products().never();

    let hub = Hub::new(
        Arc::new(catalog),
        Arc::new(MemoryChatLogStore::default()),
        ChatIdentity::Client,
    );
    let mut c1 = hub.connect(None).await;
    drain(&mut c1.events);

    let err = assert_err!(hub.handle_command(c1.id, ClientCommand::AddProduct(widget())).await);
    assert!(matches!(err, HubError::Store(StoreError::Storage(_))));
    assert!(drain(&mut c1.events).is_empty());
}

#[tokio::test]
async fn failed_reread_after_insert_broadcasts_nothing() {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_add_product()
        .times(1)
        .returning(|p| Ok(p.validate().unwrap().into_product("p1".into())));
    catalog.expect_get_products().times(1).returning(|| Err(offline()));

    let hub = Hub::new(
        Arc::new(catalog),
        Arc::new(MemoryChatLogStore::default()),
        ChatIdentity::Client,
    );
    let mut c1 = hub.connect(None).await;
    drain(&mut c1.events);

    assert_err!(hub.handle_command(c1.id, ClientCommand::AddProduct(widget())).await);
    assert!(drain(&mut c1.events).is_empty());
}

#[tokio::test]
async fn delete_miss_never_rereads_catalog() {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_delete_product_by_id()
        .times(1)
        .returning(|_| Ok(false));
    catalog.expect_get_products().never();

    let hub = Hub::new(
        Arc::new(catalog),
        Arc::new(MemoryChatLogStore::default()),
        ChatIdentity::Client,
    );
    let c1 = hub.connect(None).await;

    let outcome = assert_ok!(
        hub.handle_command(c1.id, ClientCommand::DeleteProduct("ghost".into()))
            .await
    );
    assert_eq!(outcome, CommandOutcome::Unchanged);
}

#[tokio::test]
async fn failed_append_broadcasts_nothing() {
    let mut chat = MockChatLog::new();
    chat.expect_list_all().returning(|| Ok(vec![]));
    chat.expect_append().times(1).returning(|_| Err(offline()));

    let hub = Hub::new(
        Arc::new(MemoryCatalogStore::default()),
        Arc::new(chat),
        ChatIdentity::Client,
    );
    let mut c1 = hub.connect(None).await;
    let mut c2 = hub.connect(None).await;
    drain(&mut c1.events);
    drain(&mut c2.events);

    hub.dispatch(c1.id, ClientCommand::ChatMessage(NewChatMessage::new("alice", "hi")))
        .await;

    assert!(drain(&mut c1.events).is_empty());
    assert!(drain(&mut c2.events).is_empty());
}

#[tokio::test]
async fn failed_replay_still_registers_connection() {
    let mut chat = MockChatLog::new();
    chat.expect_list_all().times(1).returning(|| Err(offline()));

    let hub = Hub::new(
        Arc::new(MemoryCatalogStore::default()),
        Arc::new(chat),
        ChatIdentity::Client,
    );
    let mut c1 = hub.connect(None).await;

    assert!(hub.is_connected(c1.id));
    assert!(drain(&mut c1.events).is_empty());

    hub.broadcast(ServerEvent::UpdateProducts(vec![]));
    assert_eq!(drain(&mut c1.events), vec![ServerEvent::UpdateProducts(vec![])]);
}
