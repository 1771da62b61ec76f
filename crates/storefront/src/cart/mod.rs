//! Browser-persisted shopping cart.
//!
//! - [`storage`]: where the cart is persisted between requests
//! - [`store`]: the cart state machine
//! - [`document`]: the page elements the cart draws into
//! - [`render`]: sidebar and cart page views
//! - [`notify`]: confirmation messages

pub mod document;
pub mod notify;
pub mod render;
pub mod storage;
pub mod store;

pub use document::{Document, Element, Target};
pub use notify::{LogNotifier, Notification, NotificationQueue, Notifier};
pub use render::{CartLineView, CartPageRenderer, CartRenderer, SidebarRenderer};
pub use storage::{CART_STORAGE_KEY, CartStorage, CookieStorage, MemoryStorage, StorageError};
pub use store::{CartError, CartStore};
