//! Client-side persistence for the cart.
//!
//! The cart lives in the visitor's browser, never on the server. A
//! [`CartStorage`] is a small key-value store with the same contract as
//! browser local storage: string keys, string values, and writes that can
//! fail when the value is too large.

use std::borrow::Cow;
use std::collections::HashMap;

use thiserror::Error;
use tower_cookies::cookie::SameSite;
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};

/// Key the serialized cart is stored under.
pub const CART_STORAGE_KEY: &str = "cart";

/// Largest cookie a browser keeps, counting the name, `=` and the encoded
/// value.
pub const MAX_COOKIE_BYTES: usize = 4096;

/// Cart cookie lifetime (one year).
const CART_COOKIE_MAX_AGE_DAYS: i64 = 365;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The value does not fit in the backend.
    #[error("storage quota exceeded: {size} bytes (limit {limit})")]
    QuotaExceeded { size: usize, limit: usize },

    /// The stored value could not be decoded.
    #[error("stored value for `{key}` could not be decoded: {reason}")]
    Decode { key: String, reason: String },
}

/// A browser-scoped key-value store.
pub trait CartStorage {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored value exists but cannot be decoded.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`.
    fn remove_item(&mut self, key: &str);
}

impl<S: CartStorage + ?Sized> CartStorage for &mut S {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) {
        (**self).remove_item(key);
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-process storage, used for tests and headless use.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create an empty store with no quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject values longer than `bytes`.
    #[must_use]
    pub const fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Seed a value.
    #[must_use]
    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl CartStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(limit) = self.quota
            && value.len() > limit
        {
            return Err(StorageError::QuotaExceeded {
                size: value.len(),
                limit,
            });
        }
        self.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
    }
}

// =============================================================================
// CookieStorage
// =============================================================================

/// Storage backed by a browser cookie.
///
/// Values are percent-encoded so that JSON survives the cookie grammar.
/// Writes are queued on the request's cookie jar and sent back with the
/// response by `tower_cookies::CookieManagerLayer`.
#[derive(Clone)]
pub struct CookieStorage {
    cookies: Cookies,
    secure: bool,
}

impl CookieStorage {
    /// Wrap a request's cookie jar.
    ///
    /// `secure` marks written cookies `Secure` (use when serving over https).
    #[must_use]
    pub const fn new(cookies: Cookies, secure: bool) -> Self {
        Self { cookies, secure }
    }

    fn cookie(&self, key: &str, value: String) -> Cookie<'static> {
        Cookie::build((key.to_owned(), value))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(self.secure)
            .max_age(Duration::days(CART_COOKIE_MAX_AGE_DAYS))
            .build()
    }
}

impl std::fmt::Debug for CookieStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieStorage")
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

impl CartStorage for CookieStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let Some(cookie) = self.cookies.get(key) else {
            return Ok(None);
        };

        urlencoding::decode(cookie.value())
            .map(Cow::into_owned)
            .map(Some)
            .map_err(|e| StorageError::Decode {
                key: key.to_owned(),
                reason: e.to_string(),
            })
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let encoded = urlencoding::encode(value);
        let size = key.len() + 1 + encoded.len();
        if size > MAX_COOKIE_BYTES {
            return Err(StorageError::QuotaExceeded {
                size,
                limit: MAX_COOKIE_BYTES,
            });
        }

        let cookie = self.cookie(key, encoded.into_owned());
        self.cookies.add(cookie);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) {
        let cookie = self.cookie(key, String::new());
        self.cookies.remove(cookie);
    }
}
