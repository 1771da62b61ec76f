//! The set of page elements the cart renders into.
//!
//! A [`Document`] stands in for the live page: it holds the inner HTML and
//! visibility of each cart element present on the current page. Renderers
//! write into it, and handlers turn it into full markup for a page load or
//! into HTMX out-of-band swaps for a partial update.
//!
//! Pages differ in which elements they have. Writing to an element the page
//! does not have is a silent no-op, so renderers never need to check.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use askama::Template;

/// A cart element on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    /// Item-count badge on the navigation cart icon.
    CartBadge,
    /// The slide-out sidebar itself. Only its open state is tracked.
    SidebarPanel,
    /// Line items inside the sidebar.
    SidebarItems,
    /// Total at the foot of the sidebar.
    SidebarTotal,
    /// "Your cart is empty" block on the cart page.
    EmptyState,
    /// Line items on the cart page.
    PageItems,
    /// Subtotal, total and checkout button on the cart page.
    PageSummary,
}

impl Target {
    /// Elements on a page that carries the sidebar.
    pub const SIDEBAR_PAGE: &'static [Self] = &[
        Self::CartBadge,
        Self::SidebarPanel,
        Self::SidebarItems,
        Self::SidebarTotal,
    ];

    /// Elements on the full cart page.
    pub const CART_PAGE: &'static [Self] = &[
        Self::CartBadge,
        Self::EmptyState,
        Self::PageItems,
        Self::PageSummary,
    ];

    #[must_use]
    pub const fn dom_id(self) -> &'static str {
        match self {
            Self::CartBadge => "cartCount",
            Self::SidebarPanel => "cartSidebar",
            Self::SidebarItems => "cartItems",
            Self::SidebarTotal => "cartTotal",
            Self::EmptyState => "empty-cart",
            Self::PageItems => "cart-items",
            Self::PageSummary => "cart-summary",
        }
    }

    const fn tag(self) -> &'static str {
        match self {
            Self::CartBadge | Self::SidebarTotal => "span",
            Self::SidebarPanel => "aside",
            _ => "div",
        }
    }

    const fn class(self) -> &'static str {
        match self {
            Self::CartBadge => "cart-count",
            Self::SidebarPanel => "cart-sidebar",
            Self::SidebarItems => "cart-content",
            Self::SidebarTotal => "cart-total",
            Self::EmptyState => "empty-cart",
            Self::PageItems => "cart-page-items",
            Self::PageSummary => "cart-summary",
        }
    }

    const fn initially_visible(self) -> bool {
        !matches!(self, Self::SidebarPanel)
    }

    /// Whether the element is replaced wholesale on updates. The sidebar
    /// panel wraps other elements, so it only ever toggles open.
    const fn is_swappable(self) -> bool {
        !matches!(self, Self::SidebarPanel)
    }
}

/// Current state of one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub html: String,
    pub visible: bool,
}

#[derive(Template)]
#[template(path = "partials/element.html")]
struct ElementTemplate<'a> {
    tag: &'static str,
    id: &'static str,
    class: &'static str,
    html: &'a str,
    visible: bool,
    oob: bool,
}

/// Shared handle to a page's cart elements. Clones see the same page.
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Arc<Mutex<BTreeMap<Target, Element>>>,
}

impl Document {
    /// A page with the given elements, all empty.
    #[must_use]
    pub fn with_targets(targets: &[Target]) -> Self {
        let elements = targets
            .iter()
            .map(|&target| {
                (
                    target,
                    Element {
                        html: String::new(),
                        visible: target.initially_visible(),
                    },
                )
            })
            .collect();
        Self {
            elements: Arc::new(Mutex::new(elements)),
        }
    }

    #[must_use]
    pub fn sidebar_page() -> Self {
        Self::with_targets(Target::SIDEBAR_PAGE)
    }

    #[must_use]
    pub fn cart_page() -> Self {
        Self::with_targets(Target::CART_PAGE)
    }

    /// Replace an element's inner HTML. Returns false if the page lacks it.
    pub fn set_html(&self, target: Target, html: impl Into<String>) -> bool {
        self.lock()
            .get_mut(&target)
            .map(|element| element.html = html.into())
            .is_some()
    }

    /// Show or hide an element. Returns false if the page lacks it.
    pub fn set_visible(&self, target: Target, visible: bool) -> bool {
        self.lock()
            .get_mut(&target)
            .map(|element| element.visible = visible)
            .is_some()
    }

    #[must_use]
    pub fn element(&self, target: Target) -> Option<Element> {
        self.lock().get(&target).cloned()
    }

    #[must_use]
    pub fn html(&self, target: Target) -> Option<String> {
        self.element(target).map(|e| e.html)
    }

    #[must_use]
    pub fn is_visible(&self, target: Target) -> Option<bool> {
        self.element(target).map(|e| e.visible)
    }

    /// Outer markup of one element for a full page render.
    ///
    /// Elements the page lacks render as an empty string.
    ///
    /// # Errors
    ///
    /// Returns an error if the element template fails to render.
    pub fn markup(&self, target: Target) -> askama::Result<String> {
        self.element(target)
            .map_or_else(|| Ok(String::new()), |e| render_element(target, &e, false))
    }

    /// Every swappable element as an HTMX out-of-band fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if an element template fails to render.
    pub fn oob_fragment(&self) -> askama::Result<String> {
        let snapshot = self.lock().clone();
        let mut fragment = String::new();
        for (target, element) in snapshot.iter().filter(|(t, _)| t.is_swappable()) {
            fragment.push_str(&render_element(*target, element, true)?);
            fragment.push('\n');
        }
        Ok(fragment)
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<Target, Element>> {
        self.elements.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn render_element(target: Target, element: &Element, oob: bool) -> askama::Result<String> {
    ElementTemplate {
        tag: target.tag(),
        id: target.dom_id(),
        class: target.class(),
        html: &element.html,
        visible: element.visible,
        oob,
    }
    .render()
}
