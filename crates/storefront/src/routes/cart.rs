//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the `cart` cookie; each request opens a
//! [`CartStore`] over that cookie, subscribes the view named by the form's
//! `context` field, and answers with every cart element as an out-of-band
//! swap plus an `HX-Trigger` header for the notification script.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, de};
use serde_json::{Map, Value, json};
use tower_cookies::Cookies;
use tracing::instrument;

use ajay_experience_core::{ProductId, ProductInput, normalize_variant};

use crate::cart::{
    CartPageRenderer, CartStore, CookieStorage, Document, Notification, NotificationQueue,
    SidebarRenderer, Target,
};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::state::AppState;

/// A cart store persisted in the visitor's cookie.
pub type CookieCart = CartStore<CookieStorage, NotificationQueue>;

/// Which view a cart request comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewContext {
    /// The slide-out sidebar on shop pages.
    #[default]
    Sidebar,
    /// The full cart page.
    Page,
}

/// A cart opened for one request, with the view for its context subscribed.
pub struct CartSession {
    pub store: CookieCart,
    pub document: Document,
    pub notifications: NotificationQueue,
}

impl CartSession {
    /// Load the visitor's cart and subscribe the view for `context`.
    pub fn open(state: &AppState, cookies: Cookies, context: ViewContext) -> Self {
        let storage = CookieStorage::new(cookies, state.config().secure_cookies());
        let notifications = NotificationQueue::new();
        let mut store = CartStore::open(storage, notifications.clone());

        let document = match context {
            ViewContext::Sidebar => {
                let document = Document::sidebar_page();
                store.subscribe(SidebarRenderer::new(document.clone()));
                document
            }
            ViewContext::Page => {
                let document = Document::cart_page();
                store.subscribe(CartPageRenderer::new(document.clone()));
                document
            }
        };

        Self {
            store,
            document,
            notifications,
        }
    }

    /// Handle for opening or closing the sidebar on this page.
    #[must_use]
    pub fn sidebar(&self) -> SidebarRenderer {
        SidebarRenderer::new(self.document.clone())
    }

    /// Render the current cart into the page's elements.
    pub fn render(&self) {
        self.store.render();
    }

    /// Redraw, then answer with out-of-band swaps and trigger events.
    ///
    /// # Errors
    ///
    /// Returns an error if an element template fails to render.
    pub fn respond(self) -> Result<Response> {
        self.render();
        let fragment = self.document.oob_fragment()?;
        let trigger = hx_trigger(
            self.store.item_count(),
            &self.notifications.drain(),
            self.sidebar().is_open(),
        );

        Ok((AppendHeaders([("HX-Trigger", trigger)]), Html(fragment)).into_response())
    }
}

/// Build the `HX-Trigger` header value.
///
/// `cart-updated` always fires with the new item count. `cart-notify`
/// carries any confirmation messages and `cart-open` asks the page to slide
/// the sidebar in.
#[must_use]
pub fn hx_trigger(item_count: u32, notifications: &[Notification], open_sidebar: bool) -> String {
    let mut events = Map::new();
    events.insert("cart-updated".to_string(), json!({ "count": item_count }));

    if !notifications.is_empty() {
        let messages: Vec<Value> = notifications.iter().map(Notification::to_event).collect();
        events.insert(
            "cart-notify".to_string(),
            json!({ "notifications": messages }),
        );
    }

    if open_sidebar {
        events.insert("cart-open".to_string(), Value::Bool(true));
    }

    Value::Object(events).to_string()
}

// =============================================================================
// Forms
// =============================================================================

/// A blank form value (`name=`) counts as absent.
fn blank_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

/// A quantity as a number input sends it. Fractions truncate toward zero
/// and values outside `i64` saturate.
fn whole_quantity<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Decimal> = blank_as_none(deserializer)?;
    Ok(value.map(|q| {
        q.trunc().to_i64().unwrap_or(if q.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        })
    }))
}

/// Add to cart form data: the product object plus the requesting view.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub price: Option<Decimal>,
    pub image: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub variant: Option<String>,
    /// Blank or below one means one.
    #[serde(default, deserialize_with = "whole_quantity")]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub context: ViewContext,
}

impl AddToCartForm {
    fn into_parts(self) -> (ProductInput, ViewContext) {
        let product = ProductInput {
            id: self.id,
            name: self.name,
            price: self.price,
            image: self.image,
            variant: self.variant,
            quantity: self
                .quantity
                .map(|q| u32::try_from(q.max(0)).unwrap_or(u32::MAX)),
        };
        (product, self.context)
    }
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    #[serde(default)]
    pub variant: Option<String>,
    /// Blank counts as zero, which removes the line.
    #[serde(default, deserialize_with = "whole_quantity")]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub context: ViewContext,
}

/// Form data naming one cart line.
#[derive(Debug, Deserialize)]
pub struct CartLineForm {
    pub id: String,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub context: ViewContext,
}

impl CartLineForm {
    fn identity(&self) -> (ProductId, Option<String>) {
        (
            ProductId::new(self.id.as_str()),
            normalize_variant(self.variant.clone()),
        )
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub badge: String,
    pub empty_state: String,
    pub page_items: String,
    pub page_summary: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, cookies))]
pub async fn show(State(state): State<AppState>, cookies: Cookies) -> Result<CartShowTemplate> {
    let session = CartSession::open(&state, cookies, ViewContext::Page);
    session.render();

    let doc = &session.document;
    Ok(CartShowTemplate {
        badge: doc.markup(Target::CartBadge)?,
        empty_state: doc.markup(Target::EmptyState)?,
        page_items: doc.markup(Target::PageItems)?,
        page_summary: doc.markup(Target::PageSummary)?,
    })
}

/// Sidebar elements as out-of-band swaps (HTMX).
#[instrument(skip(state, cookies))]
pub async fn sidebar(State(state): State<AppState>, cookies: Cookies) -> Result<Response> {
    CartSession::open(&state, cookies, ViewContext::Sidebar).respond()
}

/// Cart count badge fragment (HTMX).
#[instrument(skip(state, cookies))]
pub async fn count(State(state): State<AppState>, cookies: Cookies) -> Result<Html<String>> {
    let session = CartSession::open(&state, cookies, ViewContext::Sidebar);
    session.render();
    Ok(Html(session.document.markup(Target::CartBadge)?))
}

/// Add item to cart (HTMX).
///
/// Malformed product objects are rejected with 422 and leave the cart alone.
/// Adds from the sidebar context also slide the sidebar open.
#[instrument(skip(state, cookies))]
pub async fn add(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let (product, context) = form.into_parts();
    let product = complete_from_catalog(&state, product).await?;
    let product_id = product.id.clone().unwrap_or_default();

    let mut session = CartSession::open(&state, cookies, context);
    session.store.add(product)?;
    add_breadcrumb("cart", "Added to cart", &[("product_id", product_id.as_str())]);

    if context == ViewContext::Sidebar {
        session.sidebar().open();
    }

    session.respond()
}

/// A bare `{id, variant, quantity}` is filled in from the catalog. Anything
/// else is added as posted and validated by the store.
async fn complete_from_catalog(state: &AppState, product: ProductInput) -> Result<ProductInput> {
    let bare = product.name.is_none() && product.price.is_none() && product.image.is_none();
    let Some(id) = product.id.as_deref().filter(|_| bare) else {
        return Ok(product);
    };

    match state.catalog().product(id).await? {
        Some(found) => {
            Ok(found.cart_input(product.variant.as_deref(), product.requested_quantity()))
        }
        None => Ok(product),
    }
}

/// Set a line's quantity (HTMX). Zero or less removes the line.
#[instrument(skip(state, cookies))]
pub async fn update(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.id);
    let variant = normalize_variant(form.variant);

    let mut session = CartSession::open(&state, cookies, form.context);
    session
        .store
        .set_quantity(&product_id, variant.as_deref(), form.quantity.unwrap_or(0))?;
    session.respond()
}

/// Raise a line's quantity by one (HTMX).
#[instrument(skip(state, cookies))]
pub async fn increment(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<CartLineForm>,
) -> Result<Response> {
    let (product_id, variant) = form.identity();

    let mut session = CartSession::open(&state, cookies, form.context);
    session.store.increment(&product_id, variant.as_deref())?;
    session.respond()
}

/// Lower a line's quantity by one (HTMX). Lines at one are left alone.
#[instrument(skip(state, cookies))]
pub async fn decrement(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<CartLineForm>,
) -> Result<Response> {
    let (product_id, variant) = form.identity();

    let mut session = CartSession::open(&state, cookies, form.context);
    session.store.decrement(&product_id, variant.as_deref())?;
    session.respond()
}

/// Remove a line (HTMX).
#[instrument(skip(state, cookies))]
pub async fn remove(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<CartLineForm>,
) -> Result<Response> {
    let (product_id, variant) = form.identity();

    let mut session = CartSession::open(&state, cookies, form.context);
    session.store.remove(&product_id, variant.as_deref())?;
    session.respond()
}
