//! Process-local stores for development and tests. Nothing survives a restart.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CatalogStore, ChatLogStore, UserStore};
use crate::error::{StoreError, StoreResult};
use crate::models::ids::new_product_id;
use crate::models::{ChatMessage, NewChatMessage, NewProduct, Product, ProductPatch, User, UserId};

#[derive(Default)]
pub struct MemoryCatalogStore {
    products: RwLock<Vec<Product>>,
}

impl MemoryCatalogStore {
    /// Starts with the given records, ids included.
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn add_product(&self, product: NewProduct) -> StoreResult<Product> {
        let product = product.validate()?.into_product(new_product_id());
        self.products.write().await.push(product.clone());
        Ok(product)
    }

    async fn get_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.products.read().await.clone())
    }

    async fn get_product_by_id(&self, id: &str) -> StoreResult<Product> {
        self.products
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "product",
                id: id.to_string(),
            })
    }

    async fn update_product(&self, id: &str, patch: ProductPatch) -> StoreResult<Product> {
        let patch = patch.validate()?;
        let mut products = self.products.write().await;
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "product",
                id: id.to_string(),
            })?;
        patch.apply_to(product);
        Ok(product.clone())
    }

    async fn delete_product_by_id(&self, id: &str) -> StoreResult<bool> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() != before)
    }
}

#[derive(Default)]
pub struct MemoryChatLogStore {
    messages: RwLock<Vec<ChatMessage>>,
}

#[async_trait]
impl ChatLogStore for MemoryChatLogStore {
    async fn append(&self, entry: NewChatMessage) -> StoreResult<ChatMessage> {
        let (user, message) = entry.validate()?;
        let mut messages = self.messages.write().await;
        let stored = ChatMessage {
            id: messages.last().map(|m| m.id + 1).unwrap_or(1),
            user,
            message,
            created_at: Utc::now(),
        };
        messages.push(stored.clone());
        Ok(stored)
    }

    async fn list_all(&self) -> StoreResult<Vec<ChatMessage>> {
        Ok(self.messages.read().await.clone())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == username) {
            return Err(StoreError::Conflict(format!("username '{}'", username)));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn set_password(&self, username: &str, password_hash: &str) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.username == username) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
