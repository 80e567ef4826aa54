//! The shopping cart.
//!
//! A cart is a list of lines keyed by product and size. It has no table of
//! its own: the storefront serializes the whole cart into the visitor's
//! session after every mutation.
//!
//! Invariants:
//! - no two lines share a [`CartLineKey`]
//! - every line has a quantity between one and [`MAX_LINE_QUANTITY`]

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{Money, ProductId};

/// Largest quantity a single line can hold. Order lines are stored as
/// `INTEGER`, so this is `i32::MAX`.
pub const MAX_LINE_QUANTITY: u32 = i32::MAX.unsigned_abs();

/// Errors that can occur when parsing a [`CartLineKey`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartLineKeyError {
    #[error("cart line key must look like <product_id>-<size>")]
    Malformed,
    #[error("invalid product id in cart line key")]
    InvalidProductId,
}

/// Identity of a cart line: product id plus size.
///
/// Rendered as `"{product_id}-{size}"`, which is also the form accepted in
/// URLs. Sizes may themselves contain dashes; only the first dash splits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartLineKey {
    pub product_id: ProductId,
    pub size: String,
}

impl CartLineKey {
    #[must_use]
    pub fn new(product_id: ProductId, size: impl Into<String>) -> Self {
        Self {
            product_id,
            size: size.into(),
        }
    }
}

impl fmt::Display for CartLineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.product_id, self.size)
    }
}

impl FromStr for CartLineKey {
    type Err = CartLineKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, size) = s.split_once('-').ok_or(CartLineKeyError::Malformed)?;
        if size.is_empty() {
            return Err(CartLineKeyError::Malformed);
        }
        let product_id = id
            .parse::<ProductId>()
            .map_err(|_| CartLineKeyError::InvalidProductId)?;
        Ok(Self::new(product_id, size))
    }
}

/// A product/size pair being added to the cart, with its price snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartLine {
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub size: String,
    pub unit_price: Money,
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub size: String,
    /// Price at the time the line was first added.
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub fn key(&self) -> CartLineKey {
        CartLineKey::new(self.product_id, self.size.clone())
    }

    fn matches(&self, key: &CartLineKey) -> bool {
        self.product_id == key.product_id && self.size == key.size
    }

    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// The cart held in a visitor's session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn get(&self, key: &CartLineKey) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.matches(key))
    }

    /// Add one unit of a product/size.
    ///
    /// An existing line for the same key has its quantity incremented; the
    /// price snapshot of that line is left untouched. Returns the line's
    /// quantity after the add, which never exceeds [`MAX_LINE_QUANTITY`].
    pub fn add(&mut self, item: NewCartLine) -> u32 {
        let key = CartLineKey::new(item.product_id, item.size.clone());
        if let Some(line) = self.lines.iter_mut().find(|line| line.matches(&key)) {
            line.quantity = line.quantity.saturating_add(1).min(MAX_LINE_QUANTITY);
            return line.quantity;
        }

        self.lines.push(CartLine {
            product_id: item.product_id,
            name: item.name,
            slug: item.slug,
            size: item.size,
            unit_price: item.unit_price,
            quantity: 1,
        });
        1
    }

    /// Remove a line entirely. Returns whether a line was removed.
    pub fn remove(&mut self, key: &CartLineKey) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| !line.matches(key));
        self.lines.len() != before
    }

    /// Set a line's quantity; zero or below removes the line and anything
    /// above [`MAX_LINE_QUANTITY`] is capped.
    ///
    /// Returns `false` when no line has the given key.
    pub fn update_quantity(&mut self, key: &CartLineKey, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(key);
        }

        let Some(line) = self.lines.iter_mut().find(|line| line.matches(key)) else {
            return false;
        };
        line.quantity =
            u32::try_from(quantity).map_or(MAX_LINE_QUANTITY, |q| q.min(MAX_LINE_QUANTITY));
        true
    }

    /// Take one unit off a line, removing the line when it was the last.
    pub fn decrement(&mut self, key: &CartLineKey) -> bool {
        let Some(quantity) = self.get(key).map(|line| line.quantity) else {
            return false;
        };
        self.update_quantity(key, i64::from(quantity) - 1)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub fn total_price(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn runner(size: &str) -> NewCartLine {
        NewCartLine {
            product_id: ProductId::new(1),
            name: "SLICK RUNNER V1".into(),
            slug: "slick-runner-v1".into(),
            size: size.into(),
            unit_price: Money::pesos(8999),
        }
    }

    fn air(size: &str) -> NewCartLine {
        NewCartLine {
            product_id: ProductId::new(2),
            name: "SLICK AIR".into(),
            slug: "slick-air".into(),
            size: size.into(),
            unit_price: Money::pesos(11_999),
        }
    }

    #[test]
    fn test_adding_same_product_and_size_increments_quantity() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(runner("9")), 1);
        assert_eq!(cart.add(runner("9")), 2);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_different_size_is_a_separate_line() {
        let mut cart = Cart::new();
        cart.add(runner("9"));
        cart.add(runner("10"));
        cart.add(air("9"));

        assert_eq!(cart.lines().len(), 3);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_removing_last_unit_removes_line() {
        let mut cart = Cart::new();
        cart.add(runner("9"));
        let key = CartLineKey::new(ProductId::new(1), "9");

        assert!(cart.decrement(&key));
        assert!(cart.get(&key).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrement_keeps_line_with_units_left() {
        let mut cart = Cart::new();
        cart.add(runner("9"));
        cart.add(runner("9"));
        let key = CartLineKey::new(ProductId::new(1), "9");

        assert!(cart.decrement(&key));
        assert_eq!(cart.get(&key).unwrap().quantity, 1);
    }

    #[test]
    fn test_update_quantity_zero_or_negative_removes() {
        let mut cart = Cart::new();
        cart.add(runner("9"));
        cart.add(air("8"));

        assert!(cart.update_quantity(&CartLineKey::new(ProductId::new(1), "9"), 0));
        assert!(cart.update_quantity(&CartLineKey::new(ProductId::new(2), "8"), -3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let mut cart = Cart::new();
        cart.add(air("8"));
        let key = CartLineKey::new(ProductId::new(2), "8");

        assert!(cart.update_quantity(&key, 4));
        assert_eq!(cart.get(&key).unwrap().quantity, 4);
        assert!(!cart.update_quantity(&CartLineKey::new(ProductId::new(9), "8"), 2));
    }

    #[test]
    fn test_update_quantity_caps_at_line_maximum() {
        let mut cart = Cart::new();
        cart.add(air("8"));
        let key = CartLineKey::new(ProductId::new(2), "8");

        assert!(cart.update_quantity(&key, i64::from(MAX_LINE_QUANTITY)));
        assert_eq!(cart.get(&key).unwrap().quantity, MAX_LINE_QUANTITY);

        assert!(cart.update_quantity(&key, 3_000_000_000));
        assert_eq!(cart.get(&key).unwrap().quantity, MAX_LINE_QUANTITY);

        assert!(cart.update_quantity(&key, i64::MAX));
        assert_eq!(cart.get(&key).unwrap().quantity, MAX_LINE_QUANTITY);
        assert!(i32::try_from(cart.get(&key).unwrap().quantity).is_ok());
    }

    #[test]
    fn test_add_stops_at_line_maximum() {
        let mut cart = Cart::new();
        cart.add(air("8"));
        let key = CartLineKey::new(ProductId::new(2), "8");
        assert!(cart.update_quantity(&key, i64::from(MAX_LINE_QUANTITY)));

        assert_eq!(cart.add(air("8")), MAX_LINE_QUANTITY);
        assert_eq!(cart.get(&key).unwrap().quantity, MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_remove_unknown_key() {
        let mut cart = Cart::new();
        cart.add(air("8"));
        assert!(!cart.remove(&CartLineKey::new(ProductId::new(2), "9")));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.add(runner("9"));
        cart.add(runner("9"));
        cart.add(air("10"));

        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Money::pesos(8999 * 2 + 11_999));

        cart.clear();
        assert_eq!(cart.total_price(), Money::ZERO);
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn test_add_keeps_original_price_snapshot() {
        let mut cart = Cart::new();
        cart.add(runner("9"));
        cart.add(NewCartLine {
            unit_price: Money::pesos(1),
            ..runner("9")
        });
        assert_eq!(cart.lines()[0].unit_price, Money::pesos(8999));
    }

    #[test]
    fn test_line_key_parse() {
        let key: CartLineKey = "12-9.5".parse().unwrap();
        assert_eq!(key, CartLineKey::new(ProductId::new(12), "9.5"));
        assert_eq!(key.to_string(), "12-9.5");

        let dashed: CartLineKey = "3-EU-42".parse().unwrap();
        assert_eq!(dashed.size, "EU-42");

        assert_eq!(
            "12".parse::<CartLineKey>(),
            Err(CartLineKeyError::Malformed)
        );
        assert_eq!(
            "12-".parse::<CartLineKey>(),
            Err(CartLineKeyError::Malformed)
        );
        assert_eq!(
            "x-9".parse::<CartLineKey>(),
            Err(CartLineKeyError::InvalidProductId)
        );
    }

    #[test]
    fn test_serde_round_trip_preserves_lines() {
        let mut cart = Cart::new();
        cart.add(runner("9"));
        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }
}
