//! API error types with HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;

/// Shopper-facing message for the recoverable stock failure. By the time
/// this is sent, the offending line item has already been removed.
const STOCK_MESSAGE: &str = "Checkout failed. A product in your cart has no stock left. \
                             The product has been removed from your cart.";

/// API-level error type that maps to HTTP responses.
///
/// Field validation errors map to 422, business-rule rejections
/// (prevention, stock, declined payment) to 409, and gateway
/// configuration problems to 400.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Checkout pipeline failure.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => error_body(StatusCode::NOT_FOUND, &message),
            ApiError::BadRequest(message) => error_body(StatusCode::BAD_REQUEST, &message),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "internal server error");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, &message)
            }
        }
    }
}

fn checkout_error_to_response(err: CheckoutError) -> Response {
    match err {
        CheckoutError::Validation(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "errors": errors })),
        )
            .into_response(),
        CheckoutError::OutOfStock(_) => error_body(StatusCode::CONFLICT, STOCK_MESSAGE),
        CheckoutError::Prevented(message) => error_body(StatusCode::CONFLICT, &message),
        CheckoutError::Gateway(message) => error_body(StatusCode::CONFLICT, &message),
        CheckoutError::GatewayNotProvided | CheckoutError::UnknownGateway(_) => {
            error_body(StatusCode::BAD_REQUEST, &err.to_string())
        }
        CheckoutError::CartNotFound(_) | CheckoutError::OrderNotFound(_) => {
            error_body(StatusCode::NOT_FOUND, &err.to_string())
        }
        CheckoutError::Store(_) | CheckoutError::Domain(_) => {
            tracing::error!(error = %err, "checkout infrastructure failure");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout::ValidationErrors;
    use domain::ProductId;

    #[test]
    fn validation_maps_to_422() {
        let err = ApiError::Checkout(CheckoutError::Validation(ValidationErrors::single(
            "email", "bad",
        )));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn business_rules_map_to_409() {
        for err in [
            CheckoutError::OutOfStock(ProductId::new("p1")),
            CheckoutError::Prevented("no".to_string()),
            CheckoutError::Gateway("declined".to_string()),
        ] {
            assert_eq!(
                ApiError::Checkout(err).into_response().status(),
                StatusCode::CONFLICT
            );
        }
    }

    #[test]
    fn gateway_config_maps_to_400() {
        for err in [
            CheckoutError::GatewayNotProvided,
            CheckoutError::UnknownGateway("stripe".to_string()),
        ] {
            assert_eq!(
                ApiError::Checkout(err).into_response().status(),
                StatusCode::BAD_REQUEST
            );
        }
    }
}
