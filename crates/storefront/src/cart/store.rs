//! The cart state machine.
//!
//! [`CartStore`] owns the in-memory cart and keeps three things in step with
//! it: the persisted copy in [`CartStorage`], every subscribed
//! [`CartRenderer`], and the visitor-facing [`Notifier`]. Every mutation
//! follows the same order: change memory, persist, re-render, then notify.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, error, warn};

use ajay_experience_core::{
    Cart, CartEntry, ProductId, ProductInput, ProductInputError, QuantityChange,
};

use super::notify::{LogNotifier, Notification, Notifier};
use super::render::CartRenderer;
use super::storage::{CART_STORAGE_KEY, CartStorage, StorageError};

/// Errors surfaced by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product object handed to `add` was malformed. The cart is
    /// unchanged.
    #[error("invalid product: {0}")]
    InvalidProduct(#[from] ProductInputError),

    /// The cart changed in memory but could not be persisted.
    #[error("failed to persist cart: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to serialize cart: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A visitor's cart, bound to its storage, views and notifier.
pub struct CartStore<S, N = LogNotifier> {
    cart: Cart,
    storage: S,
    notifier: N,
    renderers: Vec<Box<dyn CartRenderer>>,
}

impl<S, N> std::fmt::Debug for CartStore<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("renderers", &self.renderers.len())
            .finish_non_exhaustive()
    }
}

impl<S: CartStorage, N: Notifier> CartStore<S, N> {
    /// Create a store with an empty cart, without reading storage.
    pub fn new(storage: S, notifier: N) -> Self {
        Self {
            cart: Cart::new(),
            storage,
            notifier,
            renderers: Vec::new(),
        }
    }

    /// Create a store and load the persisted cart.
    pub fn open(storage: S, notifier: N) -> Self {
        let mut store = Self::new(storage, notifier);
        store.load();
        store
    }

    /// Subscribe a view. It is redrawn after every mutation and by
    /// [`render`](Self::render).
    pub fn subscribe(&mut self, renderer: impl CartRenderer + 'static) {
        self.renderers.push(Box::new(renderer));
    }

    /// Builder form of [`subscribe`](Self::subscribe).
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl CartRenderer + 'static) -> Self {
        self.subscribe(renderer);
        self
    }

    /// Replace the in-memory cart with the persisted one.
    ///
    /// Missing data yields an empty cart. Unreadable or malformed data is
    /// logged and also yields an empty cart; it is never propagated.
    pub fn load(&mut self) -> &Cart {
        self.cart = match self.storage.get_item(CART_STORAGE_KEY) {
            Ok(None) => Cart::new(),
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                error!("Failed to parse stored cart, starting empty: {e}");
                Cart::new()
            }),
            Err(e) => {
                error!("Failed to read stored cart, starting empty: {e}");
                Cart::new()
            }
        };
        debug!(entries = self.cart.len(), "Loaded cart");
        &self.cart
    }

    /// Persist the in-memory cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be serialized or the storage
    /// rejects the write. The in-memory cart is unaffected either way.
    pub fn save(&mut self) -> Result<(), CartError> {
        let json = serde_json::to_string(&self.cart)?;
        self.storage.set_item(CART_STORAGE_KEY, &json)?;
        Ok(())
    }

    /// Redraw every subscribed view from the in-memory cart.
    pub fn render(&self) {
        for renderer in &self.renderers {
            renderer.render(&self.cart);
        }
    }

    /// Add a product, merging with an existing line of the same identity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidProduct`] without touching the cart if the
    /// product is malformed, or a persistence error after the cart changed.
    pub fn add(&mut self, product: ProductInput) -> Result<&Cart, CartError> {
        let entry = product.into_entry().map_err(|e| {
            warn!("Rejected add to cart: {e}");
            CartError::InvalidProduct(e)
        })?;

        let added = entry.quantity;
        let name = entry.name.clone();
        let quantity = self.cart.insert(entry);
        debug!(added, quantity, "Added to cart");

        self.commit()?;
        self.notifier.notify(Notification::added(added, &name));
        Ok(&self.cart)
    }

    /// Remove the line with this identity. A missing line is a no-op, but
    /// the cart is still persisted and redrawn.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn remove(
        &mut self,
        product_id: &ProductId,
        variant: Option<&str>,
    ) -> Result<&Cart, CartError> {
        let removed = self.cart.remove(product_id, variant);

        self.commit()?;
        if let Some(entry) = removed {
            self.notifier.notify(Notification::removed(&entry.name));
        }
        Ok(&self.cart)
    }

    /// Overwrite a line's quantity. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn set_quantity(
        &mut self,
        product_id: &ProductId,
        variant: Option<&str>,
        quantity: i64,
    ) -> Result<&Cart, CartError> {
        let name = self.cart.get(product_id, variant).map(|e| e.name.clone());
        let change = self.cart.set_quantity(product_id, variant, quantity);

        self.commit()?;
        match (change, name) {
            (QuantityChange::Updated(quantity), Some(name)) => self
                .notifier
                .notify(Notification::quantity_updated(&name, quantity)),
            (QuantityChange::Removed, Some(name)) => {
                self.notifier.notify(Notification::removed(&name));
            }
            _ => {}
        }
        Ok(&self.cart)
    }

    /// Raise a line's quantity by one. A missing line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn increment(
        &mut self,
        product_id: &ProductId,
        variant: Option<&str>,
    ) -> Result<&Cart, CartError> {
        match self.cart.get(product_id, variant).map(|e| e.quantity) {
            Some(quantity) => {
                self.set_quantity(product_id, variant, i64::from(quantity) + 1)
            }
            None => Ok(&self.cart),
        }
    }

    /// Lower a line's quantity by one. A line at quantity one is left alone;
    /// use [`remove`](Self::remove) to drop it.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn decrement(
        &mut self,
        product_id: &ProductId,
        variant: Option<&str>,
    ) -> Result<&Cart, CartError> {
        match self.cart.get(product_id, variant).map(|e| e.quantity) {
            Some(quantity) if quantity > 1 => {
                self.set_quantity(product_id, variant, i64::from(quantity) - 1)
            }
            _ => Ok(&self.cart),
        }
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn clear(&mut self) -> Result<&Cart, CartError> {
        self.cart.clear();
        self.commit()?;
        Ok(&self.cart)
    }

    /// Sum of line totals, unrounded.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart.item_count()
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        self.cart.entries()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Persist then redraw. Views are redrawn even when the write fails so
    /// the page reflects the in-memory cart.
    fn commit(&mut self) -> Result<(), CartError> {
        let saved = self.save();
        self.render();
        saved.inspect_err(|e| error!("Failed to save cart: {e}"))
    }
}
