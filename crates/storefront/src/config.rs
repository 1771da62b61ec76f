//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3003)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:3003>)
//! - `CATALOG_PATH` - Product catalog JSON file (default: crates/storefront/data/products.json)
//! - `CATALOG_API_URL` - Fetch the catalog from `{url}/api/products` instead of the file
//! - `CHECKOUT_URL` - Payment hand-off endpoint, absolute or relative to the base URL
//!   (default: /api/checkout)
//! - `ALLOWED_ORIGINS` - Comma-separated CORS origins
//!   (default: <http://127.0.0.1:5501>,<http://localhost:5501>)
//! - `APP_ENV` - `production` enables HSTS (default: development)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (default: `APP_ENV`)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

const DEFAULT_CATALOG_PATH: &str = "crates/storefront/data/products.json";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://127.0.0.1:5501,http://localhost:5501";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Where the product catalog comes from
    pub catalog: CatalogSource,
    /// Absolute URL of the payment hand-off endpoint
    pub checkout_url: Url,
    /// Origins allowed to make cross-origin requests
    pub allowed_origins: Vec<String>,
    /// Deployment environment
    pub environment: Environment,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Product catalog location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// A JSON file on disk.
    File(PathBuf),
    /// A remote storefront API serving `/api/products`.
    Api(Url),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let host = vars
            .get_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| invalid("STOREFRONT_HOST", e))?;
        let port = vars
            .get_or_default("STOREFRONT_PORT", "3003")
            .parse::<u16>()
            .map_err(|e| invalid("STOREFRONT_PORT", e))?;
        let base_url = vars
            .get_or_default("STOREFRONT_BASE_URL", "http://localhost:3003")
            .parse::<Url>()
            .map_err(|e| invalid("STOREFRONT_BASE_URL", e))?;

        let catalog = match vars.get_optional("CATALOG_API_URL") {
            Some(api) => CatalogSource::Api(
                api.parse::<Url>()
                    .map_err(|e| invalid("CATALOG_API_URL", e))?,
            ),
            None => CatalogSource::File(PathBuf::from(
                vars.get_or_default("CATALOG_PATH", DEFAULT_CATALOG_PATH),
            )),
        };

        let checkout_url = base_url
            .join(&vars.get_or_default("CHECKOUT_URL", "/api/checkout"))
            .map_err(|e| invalid("CHECKOUT_URL", e))?;

        let allowed_origins = parse_origins(&vars.get_or_default(
            "ALLOWED_ORIGINS",
            DEFAULT_ALLOWED_ORIGINS,
        ));

        let environment = match vars.get_or_default("APP_ENV", "development").as_str() {
            "production" => Environment::Production,
            "development" | "test" => Environment::Development,
            other => return Err(invalid("APP_ENV", format!("unknown environment `{other}`"))),
        };

        let sentry_dsn = vars.get_optional("SENTRY_DSN");
        let sentry_environment = vars
            .get_optional("SENTRY_ENVIRONMENT")
            .or_else(|| Some(environment.as_str().to_string()));

        Ok(Self {
            host,
            port,
            base_url,
            catalog,
            checkout_url,
            allowed_origins,
            environment,
            sentry_dsn,
            sentry_environment,
        })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

struct Vars<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }
}

fn invalid(key: &str, error: impl ToString) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), error.to_string())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
