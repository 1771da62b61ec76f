//! Product catalog client.
//!
//! The catalog is read either from a JSON file or from a remote storefront's
//! `/api/products` endpoint. Either way the parsed catalog is cached for
//! 5 minutes using `moka`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use ajay_experience_core::{Catalog, Product};

use crate::config::CatalogSource;

const CATALOG_CACHE_KEY: &str = "catalog";

/// Errors that can occur when loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Catalog file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Catalog document is not valid JSON.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Client for the product catalog.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    source: Source,
    cache: Cache<&'static str, Arc<Catalog>>,
}

enum Source {
    File(PathBuf),
    Api {
        client: reqwest::Client,
        endpoint: Url,
    },
}

impl CatalogClient {
    /// Create a client for the configured source.
    ///
    /// # Errors
    ///
    /// Returns an error if the API endpoint URL cannot be built.
    pub fn new(source: &CatalogSource) -> Result<Self, CatalogError> {
        let source = match source {
            CatalogSource::File(path) => Source::File(path.clone()),
            CatalogSource::Api(base) => Source::Api {
                client: reqwest::Client::new(),
                endpoint: base.join("/api/products")?,
            },
        };

        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(CatalogClientInner { source, cache }),
        })
    }

    /// The full catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be fetched or parsed.
    #[instrument(skip(self))]
    pub async fn catalog(&self) -> Result<Arc<Catalog>, CatalogError> {
        if let Some(catalog) = self.inner.cache.get(CATALOG_CACHE_KEY).await {
            debug!("Cache hit for catalog");
            return Ok(catalog);
        }

        let catalog = Arc::new(self.fetch().await?);
        debug!(products = catalog.products.len(), "Loaded catalog");

        self.inner
            .cache
            .insert(CATALOG_CACHE_KEY, Arc::clone(&catalog))
            .await;

        Ok(catalog)
    }

    /// Look up one product.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub async fn product(&self, id: &str) -> Result<Option<Product>, CatalogError> {
        Ok(self.catalog().await?.find(id).cloned())
    }

    async fn fetch(&self) -> Result<Catalog, CatalogError> {
        match &self.inner.source {
            Source::File(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| CatalogError::Io {
                        path: path.clone(),
                        source,
                    })?;
                Ok(serde_json::from_str(&raw)?)
            }
            Source::Api { client, endpoint } => {
                let response = client.get(endpoint.clone()).send().await?;
                let status = response.status();
                let body = response.text().await?;

                if !status.is_success() {
                    tracing::error!(
                        status = %status,
                        body = %body.chars().take(500).collect::<String>(),
                        "Catalog API returned non-success status"
                    );
                    return Err(CatalogError::Api {
                        status: status.as_u16(),
                        message: body.chars().take(200).collect(),
                    });
                }

                Ok(serde_json::from_str(&body)?)
            }
        }
    }
}
