//! HTTP API server for the commerce checkout core.
//!
//! Exposes cart management and checkout endpoints over the pipeline,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use checkout::{
    CheckoutConfig, CheckoutPipeline, CheckoutServices, DummyGateway, EventBus, FormRegistry,
    GatewayRegistry, InMemoryCartProvider, InMemoryCouponDirectory, InMemoryCustomerDirectory,
    InMemoryStockLedger,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::carts::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/carts", post(routes::carts::create))
        .route("/carts/{session}", get(routes::carts::get))
        .route("/carts/{session}/items", post(routes::carts::add_item))
        .route("/carts/{session}/checkout", post(routes::carts::checkout))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state: in-memory services, the dummy
/// gateway, and the standard field whitelists.
pub fn create_default_state() -> Arc<AppState> {
    let carts = Arc::new(InMemoryCartProvider::new());
    let customers = Arc::new(InMemoryCustomerDirectory::new());
    let coupons = Arc::new(InMemoryCouponDirectory::new());
    let stock = Arc::new(InMemoryStockLedger::new());

    let mut gateways = GatewayRegistry::new();
    gateways.register(Arc::new(DummyGateway::new()));

    let services = CheckoutServices {
        carts: carts.clone(),
        customers: customers.clone(),
        coupons: coupons.clone(),
        stock: stock.clone(),
        gateways: Arc::new(gateways),
        events: Arc::new(EventBus::new()),
    };

    let pipeline = CheckoutPipeline::new(services, CheckoutConfig::default(), FormRegistry::new());

    Arc::new(AppState {
        pipeline,
        carts,
        customers,
        coupons,
        stock,
    })
}
