//! Core types for the Ajay Experience storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{Cart, CartEntry, QuantityChange};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use product::{
    Catalog, Category, MAX_SELECTABLE_QUANTITY, Product, ProductInput, ProductInputError,
    ProductVariant, normalize_variant,
};
