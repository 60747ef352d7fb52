//! Store traits for the catalog, the chat log and user accounts, with Postgres and in-memory
//! backends. The realtime hub and the HTTP handlers only see the traits.

use async_trait::async_trait;
use std::sync::Arc;

use crate::database::DatabasePool;
use crate::error::StoreResult;
use crate::models::{ChatMessage, NewChatMessage, NewProduct, Product, ProductPatch, User, UserId};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryCatalogStore, MemoryChatLogStore, MemoryUserStore};
pub use postgres::{PgCatalogStore, PgChatLogStore, PgUserStore};

/// Durable product id -> product mapping.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Validates the payload, assigns a fresh id and persists the record.
    async fn add_product(&self, product: NewProduct) -> StoreResult<Product>;

    /// Full catalog snapshot in insertion order.
    async fn get_products(&self) -> StoreResult<Vec<Product>>;

    /// Fails with `StoreError::NotFound` when the id is unknown.
    async fn get_product_by_id(&self, id: &str) -> StoreResult<Product>;

    /// Applies a partial update. Fails with `StoreError::NotFound` when the id is unknown.
    async fn update_product(&self, id: &str, patch: ProductPatch) -> StoreResult<Product>;

    /// Returns whether a record was removed. An unknown id is `Ok(false)`, not an error.
    async fn delete_product_by_id(&self, id: &str) -> StoreResult<bool>;
}

/// Append-only chat transcript.
#[async_trait]
pub trait ChatLogStore: Send + Sync {
    /// Rejects blank user or message, then persists and returns the stored record.
    async fn append(&self, entry: NewChatMessage) -> StoreResult<ChatMessage>;

    /// The whole transcript in append order. Each call starts from the beginning.
    async fn list_all(&self) -> StoreResult<Vec<ChatMessage>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `StoreError::Conflict` when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<User>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Returns whether a user with that name existed.
    async fn set_password(&self, username: &str, password_hash: &str) -> StoreResult<bool>;
}

/// The set of stores the application runs against.
#[derive(Clone)]
pub struct Stores {
    pub catalog: Arc<dyn CatalogStore>,
    pub chat: Arc<dyn ChatLogStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    pub fn postgres(pool: DatabasePool) -> Self {
        Self {
            catalog: Arc::new(PgCatalogStore::new(pool.clone())),
            chat: Arc::new(PgChatLogStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool)),
        }
    }

    pub fn memory() -> Self {
        Self {
            catalog: Arc::new(MemoryCatalogStore::default()),
            chat: Arc::new(MemoryChatLogStore::default()),
            users: Arc::new(MemoryUserStore::default()),
        }
    }
}
