//! Integration tests for the Ajay Experience storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ajay-experience-integration-tests
//! ```
//!
//! Tests drive the full storefront router in-process: every request passes
//! through the cookie, security header and CORS layers the binary uses, with
//! the catalog read from the bundled `products.json`.
//!
//! # Test Categories
//!
//! - `cart_routes` - Add, update and remove through the HTMX endpoints
//! - `checkout` - Checkout start, payment hand-off and confirmation
//! - `storefront` - Shop page, product API, health and headers

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use ajay_experience_storefront::{app, config::StorefrontConfig, state::AppState};

/// Catalog fixture shipped with the storefront crate.
pub const CATALOG_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../storefront/data/products.json"
);

/// A product from the fixture catalog with colour variants.
pub const HOODIE_ID: &str = "ajay-hoodie";

/// A product from the fixture catalog without variants.
pub const POSTER_ID: &str = "ajay-poster";

/// A storefront router plus the cookie a browser would be holding.
pub struct TestContext {
    router: Router,
    cart_cookie: Option<String>,
}

/// The parts of a response tests look at.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Parsed `HX-Trigger` header.
    #[must_use]
    pub fn trigger(&self) -> Option<Value> {
        self.headers
            .get("HX-Trigger")
            .and_then(|v| v.to_str().ok())
            .and_then(|raw| serde_json::from_str(raw).ok())
    }

    /// Messages carried by the `cart-notify` event, in order.
    #[must_use]
    pub fn notifications(&self) -> Vec<String> {
        self.trigger()
            .and_then(|t| t.get("cart-notify").cloned())
            .and_then(|n| n.get("notifications").cloned())
            .and_then(|n| n.as_array().cloned())
            .unwrap_or_default()
            .iter()
            .filter_map(|n| n.get("message").and_then(Value::as_str).map(str::to_string))
            .collect()
    }

    /// Item count carried by the `cart-updated` event.
    #[must_use]
    pub fn item_count(&self) -> Option<u64> {
        self.trigger()
            .and_then(|t| t.get("cart-updated").cloned())
            .and_then(|u| u.get("count").and_then(Value::as_u64))
    }

    /// Value of a header as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `cart` cookie value set by this response, if any.
    #[must_use]
    pub fn cart_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|raw| {
                let pair = raw.split(';').next()?;
                let value = pair.strip_prefix("cart=")?;
                Some(value.to_string())
            })
    }
}

impl TestContext {
    /// Storefront with default development config and the fixture catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_vars(&[])
    }

    /// Storefront with extra configuration variables.
    #[must_use]
    pub fn with_vars(vars: &[(&str, &str)]) -> Self {
        let mut vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        vars.entry("CATALOG_PATH".to_string())
            .or_insert_with(|| CATALOG_PATH.to_string());

        let config = StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
            .expect("test config should be valid");
        let state = AppState::new(config).expect("test state should build");

        Self {
            router: app(state),
            cart_cookie: None,
        }
    }

    /// Start with a raw cart cookie value, as if the browser already had one.
    #[must_use]
    pub fn with_cart_json(mut self, json: &str) -> Self {
        self.cart_cookie = Some(urlencoding::encode(json).into_owned());
        self
    }

    /// Start with a cookie value sent verbatim.
    #[must_use]
    pub fn with_raw_cookie(mut self, value: &str) -> Self {
        self.cart_cookie = Some(value.to_string());
        self
    }

    /// The cart JSON the browser currently holds.
    #[must_use]
    pub fn cart_json(&self) -> Option<Value> {
        let raw = self.cart_cookie.as_deref()?;
        let decoded = urlencoding::decode(raw).ok()?;
        serde_json::from_str(&decoded).ok()
    }

    /// Send a GET request.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.request("GET", uri).body(Body::empty());
        self.send(request.expect("valid request")).await
    }

    /// Send an HTMX form POST.
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("HX-Request", "true")
            .body(Body::from(body));
        self.send(request.expect("valid request")).await
    }

    /// Add one unit of a catalog product from the shop page.
    pub async fn add(
        &mut self,
        id: &str,
        name: &str,
        price: &str,
        variant: Option<&str>,
    ) -> TestResponse {
        let mut fields = vec![
            ("id", id),
            ("name", name),
            ("price", price),
            ("image", "/static/images/merch.jpg"),
            ("quantity", "1"),
            ("context", "sidebar"),
        ];
        if let Some(variant) = variant {
            fields.push(("variant", variant));
        }
        self.post_form("/cart/add", &fields).await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cart_cookie {
            Some(value) => builder.header(header::COOKIE, format!("cart={value}")),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");

        let response = TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        };

        if let Some(value) = response.cart_cookie() {
            self.cart_cookie = Some(value).filter(|v| !v.is_empty());
        }
        response
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
