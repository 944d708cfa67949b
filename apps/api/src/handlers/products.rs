//! Product handlers: catalog browsing for the storefront and dashboard.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use voltmart_core::Product;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for product listing.
#[derive(Debug, Deserialize)]
pub struct ListProductsParams {
    /// Maximum rows returned (default 100, capped at 500)
    pub limit: Option<u32>,
}

/// GET /api/v1/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListProductsParams>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let limit = params.limit.unwrap_or(100).min(500);
    let products = state.db.products().list_active(limit).await?;
    Ok(Json(products))
}

/// GET /api/v1/products/:id
///
/// Lookup is by business code (`PRD-NNNN`), matching how bills
/// reference products; a raw UUID works too.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let repo = state.db.products();
    let product = match repo.get_by_code(&id).await? {
        Some(product) => Some(product),
        None => repo.get_by_id(&id).await?,
    };

    product
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))
}
