//! Views that redraw cart elements whenever the cart changes.

use askama::Template;

use ajay_experience_core::{Cart, CartEntry};

use super::document::{Document, Target};
use crate::filters::{self, format_money};

/// Shown when an entry has no usable image.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.svg";

const EMPTY_CART_HTML: &str =
    r#"<p>Your cart is empty</p><a href="/shop" class="continue-shopping">Continue Shopping</a>"#;

/// A view subscribed to cart changes.
pub trait CartRenderer: Send + Sync {
    /// Redraw from the current cart.
    fn render(&self, cart: &Cart);
}

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: String,
    pub name: String,
    pub image: String,
    pub variant: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    pub can_decrement: bool,
}

impl From<&CartEntry> for CartLineView {
    fn from(entry: &CartEntry) -> Self {
        let image = if entry.image_url.trim().is_empty() {
            PLACEHOLDER_IMAGE.to_string()
        } else {
            entry.image_url.clone()
        };

        Self {
            id: entry.product_id.to_string(),
            name: entry.name.clone(),
            image,
            variant: entry.variant.clone(),
            quantity: entry.quantity,
            unit_price: entry.unit_price.to_string(),
            line_total: format_money(entry.line_total()),
            can_decrement: entry.quantity > 1,
        }
    }
}

fn line_views(cart: &Cart) -> Vec<CartLineView> {
    cart.iter().map(CartLineView::from).collect()
}

#[derive(Template)]
#[template(path = "partials/sidebar_items.html")]
struct SidebarItemsTemplate {
    lines: Vec<CartLineView>,
}

#[derive(Template)]
#[template(path = "partials/cart_page_items.html")]
struct PageItemsTemplate {
    lines: Vec<CartLineView>,
}

#[derive(Template)]
#[template(path = "partials/cart_summary.html")]
struct PageSummaryTemplate {
    item_count: u32,
    subtotal: rust_decimal::Decimal,
    total: rust_decimal::Decimal,
}

fn render_badge(document: &Document, cart: &Cart) {
    document.set_html(Target::CartBadge, cart.item_count().to_string());
    document.set_visible(Target::CartBadge, true);
}

fn write_template(document: &Document, target: Target, template: &impl Template) {
    match template.render() {
        Ok(html) => {
            document.set_html(target, html);
        }
        Err(e) => tracing::error!(target = target.dom_id(), "Failed to render cart element: {e}"),
    }
}

// =============================================================================
// Sidebar
// =============================================================================

/// The slide-out cart on every shop page: badge, item list and total.
#[derive(Debug, Clone)]
pub struct SidebarRenderer {
    document: Document,
}

impl SidebarRenderer {
    #[must_use]
    pub const fn new(document: Document) -> Self {
        Self { document }
    }

    /// Slide the sidebar in. Contents are untouched.
    pub fn open(&self) {
        self.document.set_visible(Target::SidebarPanel, true);
    }

    pub fn close(&self) {
        self.document.set_visible(Target::SidebarPanel, false);
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.document
            .is_visible(Target::SidebarPanel)
            .unwrap_or(false)
    }
}

impl CartRenderer for SidebarRenderer {
    fn render(&self, cart: &Cart) {
        render_badge(&self.document, cart);
        write_template(
            &self.document,
            Target::SidebarItems,
            &SidebarItemsTemplate {
                lines: line_views(cart),
            },
        );
        self.document
            .set_html(Target::SidebarTotal, format_money(cart.total()));
    }
}

// =============================================================================
// Cart page
// =============================================================================

/// The full cart page: editable rows and the order summary.
#[derive(Debug, Clone)]
pub struct CartPageRenderer {
    document: Document,
}

impl CartPageRenderer {
    #[must_use]
    pub const fn new(document: Document) -> Self {
        Self { document }
    }
}

impl CartRenderer for CartPageRenderer {
    fn render(&self, cart: &Cart) {
        let doc = &self.document;
        render_badge(doc, cart);

        if cart.is_empty() {
            doc.set_html(Target::EmptyState, EMPTY_CART_HTML);
            doc.set_visible(Target::EmptyState, true);
            doc.set_html(Target::PageItems, "");
            doc.set_visible(Target::PageItems, false);
            doc.set_html(Target::PageSummary, "");
            doc.set_visible(Target::PageSummary, false);
            return;
        }

        doc.set_visible(Target::EmptyState, false);
        doc.set_visible(Target::PageItems, true);
        doc.set_visible(Target::PageSummary, true);

        write_template(
            doc,
            Target::PageItems,
            &PageItemsTemplate {
                lines: line_views(cart),
            },
        );

        // No shipping or tax yet, so subtotal and total agree
        let total = cart.total();
        write_template(
            doc,
            Target::PageSummary,
            &PageSummaryTemplate {
                item_count: cart.item_count(),
                subtotal: total,
                total,
            },
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ajay_experience_core::{Price, ProductId};
    use rust_decimal::Decimal;

    fn entry(id: &str, variant: Option<&str>, quantity: u32) -> CartEntry {
        CartEntry {
            product_id: ProductId::new(id),
            name: "Shirt".to_string(),
            unit_price: Price::new(Decimal::new(1999, 2)),
            image_url: "shirt.jpg".to_string(),
            variant: variant.map(str::to_owned),
            quantity,
        }
    }

    #[test]
    fn test_sidebar_renders_badge_items_and_total() {
        let doc = Document::sidebar_page();
        let cart = Cart::from(vec![entry("p1", Some("Red"), 2)]);

        SidebarRenderer::new(doc.clone()).render(&cart);

        assert_eq!(doc.html(Target::CartBadge).as_deref(), Some("2"));
        assert_eq!(doc.html(Target::SidebarTotal).as_deref(), Some("$39.98"));
        let items = doc.html(Target::SidebarItems).unwrap();
        assert!(items.contains("Shirt"));
        assert!(items.contains("Red"));
        assert!(items.contains("$19.99"));
    }

    #[test]
    fn test_sidebar_empty_message_and_visible_zero_badge() {
        let doc = Document::sidebar_page();
        SidebarRenderer::new(doc.clone()).render(&Cart::new());

        assert_eq!(doc.html(Target::CartBadge).as_deref(), Some("0"));
        assert_eq!(doc.is_visible(Target::CartBadge), Some(true));
        assert_eq!(doc.html(Target::SidebarTotal).as_deref(), Some("$0.00"));
        assert!(doc
            .html(Target::SidebarItems)
            .unwrap()
            .contains("Your cart is empty"));
    }

    #[test]
    fn test_open_and_close_leave_contents_alone() {
        let doc = Document::sidebar_page();
        let sidebar = SidebarRenderer::new(doc.clone());
        sidebar.render(&Cart::from(vec![entry("p1", None, 1)]));
        let before = doc.html(Target::SidebarItems);

        sidebar.open();
        assert!(sidebar.is_open());
        assert_eq!(doc.html(Target::SidebarItems), before);

        sidebar.close();
        assert!(!sidebar.is_open());
    }

    #[test]
    fn test_cart_page_toggles_empty_state() {
        let doc = Document::cart_page();
        let page = CartPageRenderer::new(doc.clone());

        page.render(&Cart::new());
        assert_eq!(doc.is_visible(Target::EmptyState), Some(true));
        assert_eq!(doc.is_visible(Target::PageItems), Some(false));
        assert_eq!(doc.is_visible(Target::PageSummary), Some(false));

        page.render(&Cart::from(vec![entry("p1", None, 2)]));
        assert_eq!(doc.is_visible(Target::EmptyState), Some(false));
        assert_eq!(doc.is_visible(Target::PageItems), Some(true));
        assert!(doc.html(Target::PageSummary).unwrap().contains("$39.98"));
    }

    #[test]
    fn test_cart_page_disables_decrement_at_one() {
        let doc = Document::cart_page();
        CartPageRenderer::new(doc.clone())
            .render(&Cart::from(vec![entry("p1", None, 1)]));
        let items = doc.html(Target::PageItems).unwrap();
        assert!(items.contains("disabled"));
    }

    #[test]
    fn test_renderer_on_foreign_page_is_noop() {
        let doc = Document::cart_page();
        SidebarRenderer::new(doc.clone())
            .render(&Cart::from(vec![entry("p1", None, 3)]));
        // Badge is shared between pages, sidebar elements are not present
        assert_eq!(doc.html(Target::CartBadge).as_deref(), Some("3"));
        assert!(doc.html(Target::SidebarItems).is_none());
    }

    #[test]
    fn test_placeholder_image() {
        let mut e = entry("p1", None, 1);
        e.image_url = String::new();
        assert_eq!(CartLineView::from(&e).image, PLACEHOLDER_IMAGE);
    }
}
