//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS (configured origins only)
//! 4. Security headers (nosniff, frame denial, HSTS in production)
//! 5. Cookie manager (cart persistence)

pub mod cors;
pub mod security_headers;

pub use cors::cors_layer;
pub use security_headers::security_headers_middleware;
