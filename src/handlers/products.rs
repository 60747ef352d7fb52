use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::models::{NewProduct, Product, ProductPatch};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub limit: Option<usize>,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let mut products = state.stores.catalog.get_products().await?;
    if let Some(limit) = query.limit {
        products.truncate(limit);
    }
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state.stores.catalog.get_product_by_id(&id).await?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.stores.catalog.add_product(payload).await?;
    tracing::info!("{} created product {} over HTTP", user.username, product.id);
    push_catalog(&state).await;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>, ApiError> {
    if patch.is_empty() {
        return Err(ApiError::bad_request("Nothing to update"));
    }
    let product = state.stores.catalog.update_product(&id, patch).await?;
    tracing::info!("{} updated product {} over HTTP", user.username, product.id);
    push_catalog(&state).await;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.stores.catalog.delete_product_by_id(&id).await? {
        return Err(ApiError::not_found(format!("product '{}' not found", id)));
    }
    tracing::info!("{} deleted product {} over HTTP", user.username, id);
    push_catalog(&state).await;
    Ok(StatusCode::NO_CONTENT)
}

/// The HTTP mutation already succeeded; a failed refresh only means realtime clients miss this
/// update, so it is logged rather than returned.
async fn push_catalog(state: &AppState) {
    if let Err(e) = state.hub.refresh_products().await {
        tracing::warn!("Catalog broadcast after HTTP mutation failed: {}", e);
    }
}
