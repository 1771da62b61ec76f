//! Hand-off from the cart to the payment step.
//!
//! The storefront never takes payment itself. It turns the cart into
//! processor-style line items (amounts in cents) and redirects the browser to
//! the configured checkout endpoint with those items attached.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use ajay_experience_core::{Cart, CartEntry, CurrencyCode};

/// Query parameter carrying the JSON-encoded line items.
pub const ITEMS_PARAM: &str = "items";

/// Errors that can occur when preparing checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Price of {0} cannot be expressed in cents")]
    InvalidAmount(String),

    #[error("Failed to encode line items: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One line as payment processors expect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLineItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unit price in the currency's minor unit.
    pub unit_amount: i64,
    pub currency: CurrencyCode,
    pub quantity: u32,
}

impl TryFrom<&CartEntry> for CheckoutLineItem {
    type Error = CheckoutError;

    fn try_from(entry: &CartEntry) -> Result<Self, Self::Error> {
        let unit_amount = entry
            .unit_price
            .to_cents()
            .ok_or_else(|| CheckoutError::InvalidAmount(entry.name.clone()))?;

        Ok(Self {
            name: entry.name.clone(),
            description: entry.variant.as_ref().map(|v| format!("Color: {v}")),
            unit_amount,
            currency: entry.unit_price.currency_code(),
            quantity: entry.quantity,
        })
    }
}

/// A non-empty cart ready to be handed to the payment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutHandoff {
    pub line_items: Vec<CheckoutLineItem>,
    pub total: Decimal,
}

impl CheckoutHandoff {
    /// Build line items from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for an empty cart, or
    /// [`CheckoutError::InvalidAmount`] if a price overflows.
    pub fn from_cart(cart: &Cart) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let line_items = cart
            .iter()
            .map(CheckoutLineItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            line_items,
            total: cart.total(),
        })
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.line_items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Total in cents, summed from the rounded unit amounts.
    #[must_use]
    pub fn total_cents(&self) -> i64 {
        self.line_items.iter().fold(0i64, |acc, item| {
            acc.saturating_add(item.unit_amount.saturating_mul(i64::from(item.quantity)))
        })
    }

    /// `checkout_url` with the line items attached as a query parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the line items cannot be encoded.
    pub fn redirect_url(&self, checkout_url: &Url) -> Result<Url, CheckoutError> {
        let items = serde_json::to_string(&self.line_items)?;
        let mut url = checkout_url.clone();
        url.query_pairs_mut().append_pair(ITEMS_PARAM, &items);
        Ok(url)
    }
}

/// Decode the line items carried by a hand-off URL.
///
/// # Errors
///
/// Returns an error if the value is not a JSON array of line items.
pub fn parse_line_items(raw: &str) -> Result<Vec<CheckoutLineItem>, CheckoutError> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use ajay_experience_core::{Price, ProductId};

    fn entry(variant: Option<&str>, price_cents: i64, quantity: u32) -> CartEntry {
        CartEntry {
            product_id: ProductId::new("p1"),
            name: "Shirt".to_string(),
            unit_price: Price::from_cents(price_cents),
            image_url: "shirt.jpg".to_string(),
            variant: variant.map(str::to_owned),
            quantity,
        }
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        assert!(matches!(
            CheckoutHandoff::from_cart(&Cart::new()),
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[test]
    fn test_line_items_use_cents_and_color_description() {
        let cart = Cart::from(vec![entry(Some("Red"), 1999, 2), entry(None, 500, 1)]);
        let handoff = CheckoutHandoff::from_cart(&cart).unwrap();

        assert_eq!(handoff.line_items.len(), 2);
        assert_eq!(handoff.line_items[0].unit_amount, 1999);
        assert_eq!(handoff.line_items[0].description.as_deref(), Some("Color: Red"));
        assert_eq!(handoff.line_items[0].currency, CurrencyCode::USD);
        assert_eq!(handoff.line_items[1].description, None);
        assert_eq!(handoff.item_count(), 3);
        assert_eq!(handoff.total, Decimal::new(4498, 2));
        assert_eq!(handoff.total_cents(), 4498);
    }

    #[test]
    fn test_redirect_url_round_trips_items() {
        let cart = Cart::from(vec![entry(Some("Blue"), 2500, 1)]);
        let handoff = CheckoutHandoff::from_cart(&cart).unwrap();
        let base = Url::parse("http://localhost:3003/api/checkout").unwrap();

        let url = handoff.redirect_url(&base).unwrap();
        assert_eq!(url.path(), "/api/checkout");

        let (_, raw) = url.query_pairs().find(|(k, _)| k == ITEMS_PARAM).unwrap();
        assert_eq!(parse_line_items(&raw).unwrap(), handoff.line_items);
    }

    #[test]
    fn test_line_item_json_shape() {
        let item = CheckoutLineItem::try_from(&entry(Some("Red"), 1999, 2)).unwrap();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["unit_amount"], 1999);
        assert_eq!(json["currency"], "usd");
        assert_eq!(json["quantity"], 2);
    }
}
