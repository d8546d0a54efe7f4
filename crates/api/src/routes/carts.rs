//! Cart and checkout endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::services::CartProvider;
use checkout::{
    CheckoutComplete, CheckoutPipeline, CheckoutRequest, InMemoryCartProvider,
    InMemoryCouponDirectory, InMemoryCustomerDirectory, InMemoryStockLedger,
};
use common::SessionId;
use domain::{LineItem, Money, Order};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub pipeline: CheckoutPipeline,
    pub carts: Arc<InMemoryCartProvider>,
    pub customers: Arc<InMemoryCustomerDirectory>,
    pub coupons: Arc<InMemoryCouponDirectory>,
    pub stock: Arc<InMemoryStockLedger>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct AddLineItemRequest {
    pub product_id: String,
    pub variant: Option<String>,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartCreatedResponse {
    pub session: SessionId,
    pub cart: Order,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub cart: Order,
}

// -- Handlers --

/// POST /carts — start a new cart bound to a fresh session key.
#[tracing::instrument(skip(state))]
pub async fn create(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<CartCreatedResponse>), ApiError> {
    let session = SessionId::new();
    let cart = state.carts.create_cart(session);

    tracing::info!(%session, order_id = %cart.id(), "cart created");

    Ok((StatusCode::CREATED, Json(CartCreatedResponse { session, cart })))
}

/// GET /carts/:session — the session's active cart.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let session = parse_session(&session)?;
    let cart = state.carts.current_cart(&session).await?;
    Ok(Json(CartResponse { cart }))
}

/// POST /carts/:session/items — add a line item to the cart.
#[tracing::instrument(skip(state, req))]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
    Json(req): Json<AddLineItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let session = parse_session(&session)?;
    let mut cart = state.carts.current_cart(&session).await?;

    let mut item = LineItem::new(
        req.product_id.as_str(),
        req.quantity,
        Money::from_cents(req.unit_price_cents),
    );
    if let Some(variant) = req.variant {
        item = item.with_variant(variant);
    }

    cart.add_line_item(item)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    state.carts.save(&cart).await?;

    Ok(Json(CartResponse { cart }))
}

/// POST /carts/:session/checkout — run the checkout pipeline on the raw
/// submission.
#[tracing::instrument(skip(state, body))]
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<CheckoutComplete>, ApiError> {
    let session = parse_session(&session)?;
    let request = CheckoutRequest::from_value(body)?;

    let complete = state.pipeline.checkout(&session, request).await?;

    Ok(Json(complete))
}

fn parse_session(raw: &str) -> Result<SessionId, ApiError> {
    raw.parse()
        .map(SessionId::from_uuid)
        .map_err(|_| ApiError::BadRequest(format!("Invalid session key: {raw}")))
}
