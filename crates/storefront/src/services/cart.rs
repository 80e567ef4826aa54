//! The session-held cart.
//!
//! The whole [`Cart`] is serialized under one session key and rewritten after
//! every mutation, so concurrent tabs see last-writer-wins semantics.

use serde::Serialize;
use tower_sessions::Session;

use slick_core::{Cart, CartLine, Money};

use crate::models::session_keys;

/// Load the visitor's cart, or an empty one.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Persist the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn save(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Drop the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn clear(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<Cart>(session_keys::CART).await?;
    Ok(())
}

/// Cart line as returned by the API, with its key and total.
#[derive(Debug, Serialize)]
pub struct CartLineView<'a> {
    pub key: String,
    #[serde(flatten)]
    pub line: &'a CartLine,
    pub line_total: Money,
}

/// Cart as returned by the API.
#[derive(Debug, Serialize)]
pub struct CartView<'a> {
    pub lines: Vec<CartLineView<'a>>,
    pub total_items: u64,
    pub total_price: Money,
}

impl<'a> From<&'a Cart> for CartView<'a> {
    fn from(cart: &'a Cart) -> Self {
        Self {
            lines: cart
                .lines()
                .iter()
                .map(|line| CartLineView {
                    key: line.key().to_string(),
                    line,
                    line_total: line.line_total(),
                })
                .collect(),
            total_items: cart.total_items(),
            total_price: cart.total_price(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use slick_core::{NewCartLine, ProductId};

    #[test]
    fn test_cart_view_shape() {
        let mut cart = Cart::new();
        cart.add(NewCartLine {
            product_id: ProductId::new(4),
            name: "SLICK PRO".into(),
            slug: "slick-pro".into(),
            size: "10".into(),
            unit_price: Money::pesos(14_999),
        });
        cart.add(NewCartLine {
            product_id: ProductId::new(4),
            name: "SLICK PRO".into(),
            slug: "slick-pro".into(),
            size: "10".into(),
            unit_price: Money::pesos(14_999),
        });

        let json = serde_json::to_value(CartView::from(&cart)).unwrap();
        assert_eq!(json["total_items"], 2);
        assert_eq!(json["total_price"], "29998");
        assert_eq!(json["lines"][0]["key"], "4-10");
        assert_eq!(json["lines"][0]["quantity"], 2);
        assert_eq!(json["lines"][0]["line_total"], "29998");
    }
}
