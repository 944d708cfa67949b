//! # HTTP Handlers
//!
//! Route table and handler modules.
//!
//! ## Surface
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          REST Surface                                   │
//! │                                                                         │
//! │  GET  /health                           liveness + db ping             │
//! │                                                                         │
//! │  POST /api/v1/orders/bill               atomic billing                 │
//! │  GET  /api/v1/orders                    filtered listing               │
//! │  GET  /api/v1/orders/:id                order + items                  │
//! │  PUT  /api/v1/orders/:id/status         status transition (admin)      │
//! │                                                                         │
//! │  GET  /api/v1/products                  active catalog                 │
//! │  GET  /api/v1/products/:code            lookup by PRD-NNNN             │
//! │                                                                         │
//! │  GET  /api/v1/analytics/sales           daily totals                   │
//! │  GET  /api/v1/analytics/top-products    units-sold ranking             │
//! │  GET  /api/v1/analytics/by-category     revenue per category           │
//! │  GET  /api/v1/analytics/low-stock       reorder report                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod analytics;
pub mod orders;
pub mod products;

use axum::extract::State;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the application router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/orders/bill", post(orders::create_bill))
        .route("/api/v1/orders", get(orders::list_orders))
        .route("/api/v1/orders/:id", get(orders::get_order))
        .route("/api/v1/orders/:id/status", put(orders::update_order_status))
        .route("/api/v1/products", get(products::list_products))
        .route("/api/v1/products/:id", get(products::get_product))
        .route("/api/v1/analytics/sales", get(analytics::daily_sales))
        .route("/api/v1/analytics/top-products", get(analytics::top_products))
        .route(
            "/api/v1/analytics/by-category",
            get(analytics::sales_by_category),
        )
        .route("/api/v1/analytics/low-stock", get(analytics::low_stock))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe: reports whether the database answers queries.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let db_ok = state.db.health_check().await;
    Json(json!({
        "status": if db_ok { "healthy" } else { "degraded" },
        "service": "voltmart-api",
        "database": db_ok,
    }))
}

// =============================================================================
// Handler Tests
// =============================================================================
