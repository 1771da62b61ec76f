//! Checkout route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;
use tracing::instrument;

use crate::cart::{Notification, Notifier, Target};
use crate::checkout::{CheckoutHandoff, parse_line_items};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::routes::cart::{CartSession, ViewContext};
use crate::state::AppState;

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub context: ViewContext,
}

/// Payment hand-off query.
#[derive(Debug, Deserialize)]
pub struct HandoffQuery {
    pub items: Option<String>,
}

/// Checkout confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct CheckoutSuccessTemplate {
    pub badge: String,
}

/// Start checkout (HTMX).
///
/// An empty cart only raises a notification. From the sidebar the visitor is
/// sent to the cart page to review; from the cart page they are handed to the
/// payment step with the line items attached.
#[instrument(skip(state, cookies))]
pub async fn start(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let session = CartSession::open(&state, cookies, form.context);

    if session.store.is_empty() {
        session.notifications.notify(Notification::empty_cart());
        return session.respond();
    }

    let location = match form.context {
        ViewContext::Sidebar => "/cart".to_string(),
        ViewContext::Page => {
            let handoff = CheckoutHandoff::from_cart(session.store.cart())?;
            tracing::info!(
                lines = handoff.line_items.len(),
                items = handoff.item_count(),
                total = %filters::format_money(handoff.total),
                total_cents = handoff.total_cents(),
                "Handing off to checkout"
            );
            add_breadcrumb("checkout", "Started checkout", &[]);
            handoff
                .redirect_url(&state.config().checkout_url)?
                .to_string()
        }
    };

    Ok(AppendHeaders([("HX-Redirect", location)]).into_response())
}

/// Default payment hand-off endpoint.
///
/// Validates the line items and forwards to the confirmation page.
#[instrument]
pub async fn handoff(Query(query): Query<HandoffQuery>) -> Result<Redirect> {
    let raw = query
        .items
        .filter(|items| !items.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("No items provided for checkout".to_string()))?;

    let line_items = parse_line_items(&raw)
        .map_err(|e| AppError::BadRequest(format!("Invalid checkout items: {e}")))?;
    if line_items.is_empty() {
        return Err(AppError::BadRequest(
            "No items provided for checkout".to_string(),
        ));
    }

    tracing::info!(lines = line_items.len(), "Checkout hand-off received");
    Ok(Redirect::to("/checkout/success"))
}

/// Checkout confirmation. Clears the cart.
#[instrument(skip(state, cookies))]
pub async fn success(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<CheckoutSuccessTemplate> {
    let mut session = CartSession::open(&state, cookies, ViewContext::Page);
    session.store.clear()?;

    Ok(CheckoutSuccessTemplate {
        badge: session.document.markup(Target::CartBadge)?,
    })
}
