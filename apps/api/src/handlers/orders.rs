//! Order handlers: billing, listing, detail, status transitions.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

use voltmart_core::validation::validate_search_query;
use voltmart_core::{Order, OrderItem, OrderStatus};
use voltmart_db::{BillRequest, BilledOrder, OrderFilter, SortDirection, SortKey};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// POST /api/v1/orders/bill
// =============================================================================

/// Creates an order from a bill request.
///
/// The whole request succeeds or fails as a unit; a 409 means stock was
/// insufficient and nothing was decremented.
pub async fn create_bill(
    State(state): State<AppState>,
    Json(request): Json<BillRequest>,
) -> Result<(StatusCode, Json<BilledOrder>), ApiError> {
    let billed = state.db.billing().create_bill(request).await?;
    Ok((StatusCode::CREATED, Json(billed)))
}

// =============================================================================
// GET /api/v1/orders
// =============================================================================

/// Query parameters for order listing.
///
/// Parameter names are camelCase to match the dashboard client; the
/// snake_case aliases are accepted as well.
#[derive(Debug, Deserialize)]
pub struct ListOrdersParams {
    /// Inclusive start date (YYYY-MM-DD)
    #[serde(rename = "startDate", alias = "start_date")]
    pub start_date: Option<NaiveDate>,
    /// Inclusive end date (YYYY-MM-DD)
    #[serde(rename = "endDate", alias = "end_date")]
    pub end_date: Option<NaiveDate>,
    /// Exact status: pending | completed | cancelled
    pub status: Option<String>,
    /// Substring over order number and customer name
    pub search: Option<String>,
    /// created_at | total | order_number | status (default created_at)
    #[serde(rename = "sortBy", alias = "sort")]
    pub sort: Option<String>,
    /// asc | desc (default desc)
    #[serde(rename = "order", alias = "direction")]
    pub direction: Option<String>,
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<ListOrdersParams>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let mut filter = OrderFilter::default();

    if let Some(start) = params.start_date {
        filter = filter.start_date(start);
    }
    if let Some(end) = params.end_date {
        filter = filter.end_date(end);
    }
    if let Some(ref status) = params.status {
        let status = OrderStatus::from_str(status)
            .map_err(|_| ApiError::BadRequest(format!("Unknown status: {status}")))?;
        filter = filter.status(status);
    }
    if let Some(ref search) = params.search {
        let search = validate_search_query(search)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        if !search.is_empty() {
            filter = filter.search(search);
        }
    }
    filter = filter.sort(
        params.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
        params
            .direction
            .as_deref()
            .map(SortDirection::parse)
            .unwrap_or_default(),
    );

    let orders = state.db.orders().list(&filter).await?;
    Ok(Json(orders))
}

// =============================================================================
// GET /api/v1/orders/:id
// =============================================================================

/// An order with its line items, for the detail view.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetail>, ApiError> {
    let order = state
        .db
        .orders()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order not found: {id}")))?;
    let items = state.db.orders().get_items(&order.id).await?;

    Ok(Json(OrderDetail { order, items }))
}

// =============================================================================
// PUT /api/v1/orders/:id/status
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target status: pending | completed | cancelled
    pub status: String,
}

/// Transitions an order's status.
///
/// Gated by the admin bearer token when one is configured; illegal
/// transitions come back as 409.
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    require_admin(&state, &headers)?;

    let status = OrderStatus::from_str(&request.status)
        .map_err(|_| ApiError::BadRequest(format!("Unknown status: {}", request.status)))?;

    let order = state.db.orders().update_status(&id, status).await?;
    info!(order_number = %order.order_number, status = %order.status, "Order status updated");
    Ok(Json(order))
}

/// Checks the admin bearer token, when one is configured.
fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(ref expected) = state.config.admin_token else {
        return Ok(());
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == expected => Ok(()),
        _ => Err(ApiError::Unauthorized(
            "Missing or invalid admin token".to_string(),
        )),
    }
}
