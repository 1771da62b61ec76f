//! Catalog products and the add-to-cart product object.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::CartEntry;
use super::id::{CategoryId, ProductId};
use super::price::Price;

/// Largest quantity the shop's quantity selector allows per add.
pub const MAX_SELECTABLE_QUANTITY: u32 = 10;

/// Errors that can occur when turning a [`ProductInput`] into a cart entry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductInputError {
    /// A required field is absent or blank.
    #[error("product is missing required field `{0}`")]
    MissingField(&'static str),
    /// The price is zero or negative.
    #[error("product price must be positive (got {0})")]
    NonPositivePrice(Decimal),
    /// The price is above the largest unit price a cart line may carry.
    #[error("product price is too large (got {0})")]
    PriceTooLarge(Decimal),
}

/// The product object handed to the cart's add operation.
///
/// Every field is optional so that malformed requests can be described and
/// rejected rather than failing to deserialize. Field names match the shape
/// the shop page posts: `{id, name, price, image, variant, quantity}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl ProductInput {
    /// Set the requested quantity.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Set the selected variant.
    #[must_use]
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// The quantity this input asks for; missing or zero means one.
    #[must_use]
    pub fn requested_quantity(&self) -> u32 {
        match self.quantity {
            None | Some(0) => 1,
            Some(quantity) => quantity,
        }
    }

    /// Validate the input and build a cart entry from it.
    ///
    /// # Errors
    ///
    /// Returns an error if `id`, `name` or `image` is missing or blank, if
    /// `price` is missing, or if `price` is not strictly positive or is above
    /// [`Price::MAX`].
    pub fn into_entry(self) -> Result<CartEntry, ProductInputError> {
        let quantity = self.requested_quantity();
        let id = required(self.id, "id")?;
        let name = required(self.name, "name")?;
        let price = self.price.ok_or(ProductInputError::MissingField("price"))?;
        let image = required(self.image, "image")?;

        let price = Price::new(price);
        if !price.is_positive() {
            return Err(ProductInputError::NonPositivePrice(price.amount()));
        }
        if price > Price::MAX {
            return Err(ProductInputError::PriceTooLarge(price.amount()));
        }

        Ok(CartEntry {
            product_id: ProductId::new(id),
            name,
            unit_price: price,
            image_url: image,
            variant: normalize_variant(self.variant),
            quantity,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ProductInputError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ProductInputError::MissingField(field)),
    }
}

/// An empty variant string selects the same bucket as no variant at all.
#[must_use]
pub fn normalize_variant(variant: Option<String>) -> Option<String> {
    variant.filter(|v| !v.is_empty())
}

/// The catalog document served by `/api/products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Catalog {
    /// Look up a product by ID.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id.as_str() == id)
    }

    /// Products tagged with the given category, in catalog order.
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Product> {
        self.products
            .iter()
            .filter(move |p| p.categories.iter().any(|c| c.as_str() == category))
    }
}

/// A product listed in the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub categories: Vec<CategoryId>,
}

impl Product {
    /// First image, used as the cart thumbnail.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Build the add-to-cart object for this product.
    ///
    /// Without an explicit selection the first colour variant is used.
    /// The quantity is clamped to `1..=MAX_SELECTABLE_QUANTITY`.
    #[must_use]
    pub fn cart_input(&self, variant: Option<&str>, quantity: u32) -> ProductInput {
        let variant = variant
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .or_else(|| self.variants.first().map(|v| v.color.clone()));

        ProductInput {
            id: Some(self.id.as_str().to_owned()),
            name: Some(self.name.clone()),
            price: Some(self.price.amount()),
            image: self.primary_image().map(str::to_owned),
            variant,
            quantity: Some(quantity.clamp(1, MAX_SELECTABLE_QUANTITY)),
        }
    }
}

/// A selectable colour option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub color: String,
}

/// A shop category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
