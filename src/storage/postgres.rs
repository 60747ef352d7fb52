use async_trait::async_trait;
use uuid::Uuid;

use super::{CatalogStore, ChatLogStore, UserStore};
use crate::database::DatabasePool;
use crate::error::{StoreError, StoreResult};
use crate::models::ids::new_product_id;
use crate::models::{ChatMessage, NewChatMessage, NewProduct, Product, ProductPatch, User, UserId};

const PRODUCT_COLUMNS: &str = "id, title, description, price, thumbnail, code, stock";

pub struct PgCatalogStore {
    pool: DatabasePool,
}

impl PgCatalogStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn add_product(&self, product: NewProduct) -> StoreResult<Product> {
        let draft = product.validate()?;
        let id = new_product_id();

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (id, title, description, price, thumbnail, code, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(&draft.thumbnail)
        .bind(&draft.code)
        .bind(draft.stock)
        .fetch_one(&*self.pool)
        .await?;

        tracing::debug!("Inserted product {} ({})", product.id, product.code);
        Ok(product)
    }

    async fn get_products(&self) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY seq ASC"
        ))
        .fetch_all(&*self.pool)
        .await?;
        Ok(products)
    }

    async fn get_product_by_id(&self, id: &str) -> StoreResult<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound {
            entity: "product",
            id: id.to_string(),
        })
    }

    async fn update_product(&self, id: &str, patch: ProductPatch) -> StoreResult<Product> {
        let patch = patch.validate()?;

        sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                thumbnail = COALESCE($5, thumbnail),
                code = COALESCE($6, code),
                stock = COALESCE($7, stock)
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.price)
        .bind(patch.thumbnail)
        .bind(patch.code)
        .bind(patch.stock)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound {
            entity: "product",
            id: id.to_string(),
        })
    }

    async fn delete_product_by_id(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct PgChatLogStore {
    pool: DatabasePool,
}

impl PgChatLogStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatLogStore for PgChatLogStore {
    async fn append(&self, entry: NewChatMessage) -> StoreResult<ChatMessage> {
        let (user, message) = entry.validate()?;

        let stored = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (author, message, created_at)
            VALUES ($1, $2, NOW())
            RETURNING id, author AS "user", message, created_at
            "#,
        )
        .bind(&user)
        .bind(&message)
        .fetch_one(&*self.pool)
        .await?;
        Ok(stored)
    }

    async fn list_all(&self) -> StoreResult<Vec<ChatMessage>> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"SELECT id, author AS "user", message, created_at FROM chat_messages ORDER BY id ASC"#,
        )
        .fetch_all(&*self.pool)
        .await?;
        Ok(messages)
    }
}

pub struct PgUserStore {
    pool: DatabasePool,
}

impl PgUserStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| StoreError::Conflict(format!("username '{}'", username)))
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(user)
    }

    async fn set_password(&self, username: &str, password_hash: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE username = $2")
            .bind(password_hash)
            .bind(username)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
