//! Ajay Experience Core - Shared types library.
//!
//! This crate provides the types shared by the storefront and its tests:
//! - the cart and its line items, including the identity and merge rules
//! - the add-to-cart product object and its validation
//! - the product catalog served to the shop page
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no I/O, no
//! storage, no HTTP clients. Persistence and rendering live in the
//! storefront crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, cart, and catalog types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
