//! Request error type.
//!
//! Handlers return [`Result`]; failures map to a status code and a short
//! message for the visitor, and server-side failures are reported to Sentry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::cart::{CartError, StorageError};
use crate::catalog::CatalogError;
use crate::checkout::CheckoutError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart mutation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Checkout could not be prepared.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Catalog(_)
                | Self::Template(_)
                | Self::Internal(_)
                | Self::Cart(CartError::Serialize(_))
                | Self::Checkout(CheckoutError::Encode(_))
        )
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Cart(CartError::InvalidProduct(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Cart(CartError::Storage(StorageError::QuotaExceeded { .. })) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            Self::Checkout(CheckoutError::EmptyCart | CheckoutError::InvalidAmount(_))
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Catalog(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Cart(_) | Self::Checkout(_) | Self::Template(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text safe to show the visitor. Internal detail stays in the logs.
    fn client_message(&self) -> String {
        match self {
            Self::Cart(CartError::InvalidProduct(_)) => "Invalid product".into(),
            Self::Cart(CartError::Storage(StorageError::QuotaExceeded { .. })) => {
                "Your cart is too large to save".into()
            }
            Self::Catalog(_) => "Products are unavailable right now".into(),
            Self::Checkout(CheckoutError::EmptyCart) => "Your cart is empty".into(),
            Self::NotFound(_) | Self::BadRequest(_) => self.to_string(),
            _ => "Internal server error".into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        (self.status(), self.client_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Record a visitor action so it shows up in the trail of any later Sentry
/// report.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", &[("product_id", "ajay-hoodie")]);
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_owned()),
        message: Some(message.to_owned()),
        level: sentry::Level::Info,
        data: data
            .iter()
            .map(|(k, v)| ((*k).to_owned(), serde_json::Value::from(*v)))
            .collect(),
        ..Default::default()
    });
}
