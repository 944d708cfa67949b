//! Analytics handlers: read-only aggregates for the dashboard.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;

use voltmart_core::Product;
use voltmart_db::{CategorySales, DailySales, TopProduct};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the daily sales report.
#[derive(Debug, Deserialize)]
pub struct SalesParams {
    /// Inclusive start date (default: 29 days before end)
    #[serde(alias = "start_date")]
    pub start: Option<NaiveDate>,
    /// Inclusive end date (default: today, UTC)
    #[serde(alias = "end_date")]
    pub end: Option<NaiveDate>,
}

/// GET /api/v1/analytics/sales
pub async fn daily_sales(
    State(state): State<AppState>,
    Query(params): Query<SalesParams>,
) -> Result<Json<Vec<DailySales>>, ApiError> {
    let end = params.end.unwrap_or_else(|| Utc::now().date_naive());
    let start = params.start.unwrap_or(end - Duration::days(29));

    if start > end {
        return Err(ApiError::BadRequest(
            "start_date must not be after end_date".to_string(),
        ));
    }

    let rows = state.db.analytics().sales_over_range(start, end).await?;
    Ok(Json(rows))
}

/// Query parameters for the product ranking.
#[derive(Debug, Deserialize)]
pub struct TopProductsParams {
    /// Maximum rows returned (default 5, capped at 100)
    pub limit: Option<u32>,
}

/// GET /api/v1/analytics/top-products
pub async fn top_products(
    State(state): State<AppState>,
    Query(params): Query<TopProductsParams>,
) -> Result<Json<Vec<TopProduct>>, ApiError> {
    let limit = params.limit.unwrap_or(5).min(100);
    let rows = state.db.analytics().top_products(limit).await?;
    Ok(Json(rows))
}

/// GET /api/v1/analytics/by-category
pub async fn sales_by_category(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategorySales>>, ApiError> {
    let rows = state.db.analytics().sales_by_category().await?;
    Ok(Json(rows))
}

/// GET /api/v1/analytics/low-stock
///
/// The reorder report: active products at or below their threshold.
pub async fn low_stock(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.db.products().low_stock().await?;
    Ok(Json(products))
}
