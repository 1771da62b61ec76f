//! Shop route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tower_cookies::Cookies;
use tracing::instrument;

use ajay_experience_core::{Catalog, Category, MAX_SELECTABLE_QUANTITY, Product};

use crate::cart::Target;
use crate::error::Result;
use crate::filters;
use crate::routes::cart::{CartSession, ViewContext};
use crate::state::AppState;

/// Shop page query parameters.
#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    pub category: Option<String>,
}

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    /// Plain decimal posted with the add-to-cart form.
    pub price_value: String,
    pub image: String,
    pub colors: Vec<String>,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        let input = product.cart_input(None, 1);
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            price_value: product.price.amount().to_string(),
            image: input.image.unwrap_or_default(),
            colors: product.variants.iter().map(|v| v.color.clone()).collect(),
        }
    }
}

/// Category filter display data for templates.
#[derive(Clone)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub active: bool,
}

impl CategoryView {
    fn new(category: &Category, active: Option<&str>) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            active: active == Some(category.id.as_str()),
        }
    }
}

/// Shop page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct ShopTemplate {
    pub badge: String,
    pub sidebar_items: String,
    pub sidebar_total: String,
    pub sidebar_open: bool,
    pub products: Vec<ProductCardView>,
    pub categories: Vec<CategoryView>,
    pub all_active: bool,
    pub max_quantity: u32,
    pub error: Option<String>,
}

/// Display the product grid, optionally filtered by category.
///
/// Catalog failures render an error state with a retry link rather than an
/// error page; the cart is unaffected.
#[instrument(skip(state, cookies))]
pub async fn index(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<ShopQuery>,
) -> Result<ShopTemplate> {
    let session = CartSession::open(&state, cookies, ViewContext::Sidebar);
    session.render();

    let active = query.category.as_deref().filter(|c| !c.is_empty());
    let (products, categories, error) = match state.catalog().catalog().await {
        Ok(catalog) => {
            let products = match active {
                Some(category) => catalog
                    .in_category(category)
                    .map(ProductCardView::from)
                    .collect(),
                None => catalog.products.iter().map(ProductCardView::from).collect(),
            };
            let categories = catalog
                .categories
                .iter()
                .map(|c| CategoryView::new(c, active))
                .collect();
            (products, categories, None)
        }
        Err(e) => {
            tracing::error!("Failed to load catalog: {e}");
            (
                Vec::new(),
                Vec::new(),
                Some("Error loading products".to_string()),
            )
        }
    };

    let doc = &session.document;
    Ok(ShopTemplate {
        badge: doc.markup(Target::CartBadge)?,
        sidebar_items: doc.markup(Target::SidebarItems)?,
        sidebar_total: doc.markup(Target::SidebarTotal)?,
        sidebar_open: session.sidebar().is_open(),
        products,
        categories,
        all_active: active.is_none(),
        max_quantity: MAX_SELECTABLE_QUANTITY,
        error,
    })
}

/// Product catalog as JSON.
#[instrument(skip(state))]
pub async fn products(State(state): State<AppState>) -> Result<Json<Catalog>> {
    let catalog = state.catalog().catalog().await?;
    Ok(Json(Catalog::clone(&catalog)))
}
