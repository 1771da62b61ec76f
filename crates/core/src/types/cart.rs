//! Cart entries and the identity/merge rules between them.
//!
//! A [`Cart`] is an ordered list of [`CartEntry`] values. Two entries are the
//! same logical line when their product ID and variant match exactly, with
//! "no variant" being its own bucket. The cart never holds two lines with the
//! same identity and never holds a line with a quantity of zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// One line item in the cart.
///
/// Serializes with the field names browser storage uses:
/// `{id, name, price, image, variant, quantity}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Price,
    #[serde(rename = "image")]
    pub image_url: String,
    #[serde(default)]
    pub variant: Option<String>,
    pub quantity: u32,
}

impl CartEntry {
    /// Whether this entry has the given identity.
    #[must_use]
    pub fn matches(&self, product_id: &ProductId, variant: Option<&str>) -> bool {
        self.product_id == *product_id && self.variant.as_deref() == variant
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.times(self.quantity)
    }
}

/// Outcome of [`Cart::set_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The entry now has this quantity.
    Updated(u32),
    /// The requested quantity was zero or less, so the entry was removed.
    Removed,
    /// No entry has that identity.
    Missing,
}

/// An ordered collection of cart entries with unique identities.
///
/// Deserializing normalizes the input: zero-quantity lines and lines whose
/// unit price is not positive or above [`Price::MAX`] are dropped, and
/// duplicate identities are merged into the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartEntry>", into = "Vec<CartEntry>")]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartEntry> {
        self.entries.iter()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct lines (not the item count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Find the entry with the given identity.
    #[must_use]
    pub fn get(&self, product_id: &ProductId, variant: Option<&str>) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.matches(product_id, variant))
    }

    fn position(&self, product_id: &ProductId, variant: Option<&str>) -> Option<usize> {
        self.entries.iter().position(|e| e.matches(product_id, variant))
    }

    /// Insert an entry, merging into an existing line with the same identity.
    ///
    /// A new identity is appended at the end. Returns the line's resulting
    /// quantity.
    pub fn insert(&mut self, entry: CartEntry) -> u32 {
        let existing = self
            .entries
            .iter_mut()
            .find(|e| e.matches(&entry.product_id, entry.variant.as_deref()));

        match existing {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(entry.quantity);
                existing.quantity
            }
            None => {
                let quantity = entry.quantity;
                self.entries.push(entry);
                quantity
            }
        }
    }

    /// Remove the entry with the given identity, returning it if present.
    pub fn remove(&mut self, product_id: &ProductId, variant: Option<&str>) -> Option<CartEntry> {
        self.position(product_id, variant)
            .map(|index| self.entries.remove(index))
    }

    /// Overwrite the quantity of an entry.
    ///
    /// Quantities of zero or less remove the entry. Quantities beyond
    /// `u32::MAX` saturate.
    pub fn set_quantity(
        &mut self,
        product_id: &ProductId,
        variant: Option<&str>,
        quantity: i64,
    ) -> QuantityChange {
        if quantity <= 0 {
            return match self.remove(product_id, variant) {
                Some(_) => QuantityChange::Removed,
                None => QuantityChange::Missing,
            };
        }

        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.matches(product_id, variant))
        else {
            return QuantityChange::Missing;
        };

        entry.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        QuantityChange::Updated(entry.quantity)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Sum of `unit_price * quantity` over all entries, saturating at
    /// `Decimal::MAX`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.entries
            .iter()
            .fold(Decimal::ZERO, |total, e| total.saturating_add(e.line_total()))
    }

    /// Sum of quantities over all entries.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |count, e| count.saturating_add(e.quantity))
    }
}

impl From<Vec<CartEntry>> for Cart {
    fn from(entries: Vec<CartEntry>) -> Self {
        let mut cart = Self::new();
        let usable = entries
            .into_iter()
            .filter(|e| e.quantity > 0 && e.unit_price.is_valid_unit_price());
        for entry in usable {
            cart.insert(entry);
        }
        cart
    }
}

impl From<Cart> for Vec<CartEntry> {
    fn from(cart: Cart) -> Self {
        cart.entries
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartEntry;
    type IntoIter = std::slice::Iter<'a, CartEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn entry(id: &str, variant: Option<&str>, cents: i64, quantity: u32) -> CartEntry {
        CartEntry {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            unit_price: Price::from_cents(cents),
            image_url: format!("{id}.jpg"),
            variant: variant.map(str::to_owned),
            quantity,
        }
    }

    #[test]
    fn test_insert_merges_same_identity() {
        let mut cart = Cart::new();
        cart.insert(entry("p1", None, 1999, 1));
        cart.insert(entry("p1", None, 1999, 1));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.entries()[0].quantity, 2);
        assert_eq!(cart.total(), Decimal::new(3998, 2));
    }

    #[test]
    fn test_variants_are_distinct_lines() {
        let mut cart = Cart::new();
        cart.insert(entry("p1", Some("Red"), 1999, 1));
        cart.insert(entry("p1", Some("Blue"), 1999, 1));
        cart.insert(entry("p1", None, 1999, 1));

        assert_eq!(cart.len(), 3);
        assert!(cart.get(&ProductId::new("p1"), None).is_some());
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut cart = Cart::new();
        cart.insert(entry("a", None, 100, 1));
        cart.insert(entry("b", None, 100, 1));
        cart.insert(entry("a", None, 100, 4));

        let ids: Vec<_> = cart.iter().map(|e| e.product_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_set_quantity_outcomes() {
        let mut cart = Cart::new();
        cart.insert(entry("p1", None, 1999, 3));
        let id = ProductId::new("p1");

        assert_eq!(cart.set_quantity(&id, None, 7), QuantityChange::Updated(7));
        assert_eq!(cart.item_count(), 7);
        assert_eq!(
            cart.set_quantity(&id, Some("Red"), 2),
            QuantityChange::Missing
        );
        assert_eq!(cart.set_quantity(&id, None, -4), QuantityChange::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_saturates() {
        let mut cart = Cart::new();
        cart.insert(entry("p1", None, 100, 1));
        let change = cart.set_quantity(&ProductId::new("p1"), None, i64::MAX);
        assert_eq!(change, QuantityChange::Updated(u32::MAX));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = Cart::new();
        cart.insert(entry("p1", None, 100, 1));
        let before = cart.clone();

        assert!(cart.remove(&ProductId::new("missing"), None).is_none());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let mut cart = Cart::new();
        cart.insert(entry("a", None, 100, 2));
        cart.insert(entry("b", None, 100, 5));
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), 7);
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = Cart::new();
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_serializes_as_storage_array() {
        let mut cart = Cart::new();
        cart.insert(entry("p1", Some("Red"), 1999, 2));

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "id": "p1",
                "name": "Product p1",
                "price": 19.99,
                "image": "p1.jpg",
                "variant": "Red",
                "quantity": 2
            }])
        );
    }

    #[test]
    fn test_deserialize_accepts_null_variant() {
        let json = r#"[{"id":"p1","name":"Shirt","price":19.99,"image":"shirt.jpg","variant":null,"quantity":1}]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.entries()[0].variant, None);
        assert_eq!(cart.total(), Decimal::new(1999, 2));
    }

    #[test]
    fn test_deserialize_normalizes_duplicates_and_zero_quantities() {
        let json = r#"[
            {"id":"p1","name":"Shirt","price":10,"image":"a.jpg","variant":null,"quantity":1},
            {"id":"p2","name":"Hat","price":5,"image":"b.jpg","variant":null,"quantity":0},
            {"id":"p1","name":"Shirt","price":10,"image":"a.jpg","variant":null,"quantity":2}
        ]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.entries()[0].quantity, 3);
    }

    #[test]
    fn test_deserialize_drops_out_of_range_prices() {
        let json = r#"[
            {"id":"x","name":"n","price":5e28,"image":"i","quantity":2},
            {"id":"y","name":"n","price":-3,"image":"i","quantity":1},
            {"id":"p1","name":"Shirt","price":10,"image":"a.jpg","quantity":2}
        ]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.entries()[0].product_id.as_str(), "p1");
        assert_eq!(cart.total(), Decimal::from(20));
    }

    #[test]
    fn test_total_saturates_instead_of_overflowing() {
        let mut cart = Cart::new();
        let mut big = entry("p1", None, 100, u32::MAX);
        big.unit_price = Price::new(Decimal::MAX);
        cart.insert(big);
        cart.insert(entry("p2", None, 100, 1));

        assert_eq!(cart.total(), Decimal::MAX);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn variant_strategy() -> impl Strategy<Value = Option<String>> {
            prop_oneof![Just(None), "[A-Z][a-z]{2,6}".prop_map(Some)]
        }

        fn entry_strategy() -> impl Strategy<Value = CartEntry> {
            (
                "[a-z][a-z0-9]{0,5}",
                variant_strategy(),
                1i64..100_000,
                1u32..50,
            )
                .prop_map(|(id, variant, cents, quantity)| {
                    entry(&id, variant.as_deref(), cents, quantity)
                })
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: repeated inserts of one identity collapse into one line.
            #[test]
            fn same_identity_sums_quantities(
                variant in variant_strategy(),
                quantities in proptest::collection::vec(1u32..20, 1..10)
            ) {
                let mut cart = Cart::new();
                for &quantity in &quantities {
                    cart.insert(entry("p1", variant.as_deref(), 500, quantity));
                }
                prop_assert_eq!(cart.len(), 1);
                prop_assert_eq!(cart.entries()[0].quantity, quantities.iter().sum::<u32>());
            }

            /// Property: set_quantity removes at or below zero and sets exactly otherwise.
            #[test]
            fn set_quantity_sets_or_removes(quantity in -20i64..20) {
                let mut cart = Cart::new();
                cart.insert(entry("p1", None, 500, 3));
                cart.set_quantity(&ProductId::new("p1"), None, quantity);

                if quantity <= 0 {
                    prop_assert!(cart.is_empty());
                } else {
                    prop_assert_eq!(cart.entries()[0].quantity, u32::try_from(quantity).unwrap());
                }
            }

            /// Property: totals are exact sums over the lines.
            #[test]
            fn totals_are_exact_sums(
                entries in proptest::collection::vec(entry_strategy(), 0..12)
            ) {
                let cart = Cart::from(entries);
                let expected: Decimal = cart
                    .iter()
                    .map(|e| e.unit_price.amount() * Decimal::from(e.quantity))
                    .sum();
                let count: u32 = cart.iter().map(|e| e.quantity).sum();

                prop_assert_eq!(cart.total(), expected);
                prop_assert_eq!(cart.item_count(), count);
            }

            /// Property: serialize then deserialize reproduces the cart.
            #[test]
            fn json_round_trip_preserves_cart(
                entries in proptest::collection::vec(entry_strategy(), 0..12)
            ) {
                let cart = Cart::from(entries);
                let json = serde_json::to_string(&cart).unwrap();
                let loaded: Cart = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(loaded, cart);
            }
        }
    }
}
