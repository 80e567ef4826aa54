//! Placed orders, shared by the storefront's order history and the admin.
//!
//! With the `postgres` feature this module also carries the row shapes the
//! two servers select, and their conversion into the domain types. Rows with
//! a negative amount fail with [`OrderRowError`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    Money, OrderId, OrderItemId, OrderStatus, PaymentStatus, ShippingAddress, UserId,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: UserId,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    pub shipping_address: ShippingAddress,
    pub status_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Snapshot of a cart line taken at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_name: String,
    pub product_slug: String,
    pub product_price: Money,
    pub quantity: i32,
    pub size: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Pair each order with its items, keeping the order of both inputs.
///
/// Items whose order is not in `orders` are dropped; orders without items
/// get an empty list.
#[must_use]
pub fn group_items(
    orders: Vec<Order>,
    items: impl IntoIterator<Item = OrderItem>,
) -> Vec<OrderWithItems> {
    let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }

    orders
        .into_iter()
        .map(|order| {
            let items = by_order.remove(&order.id).unwrap_or_default();
            OrderWithItems { order, items }
        })
        .collect()
}

#[cfg(feature = "postgres")]
pub use rows::{ORDER_COLUMNS, ORDER_ITEM_COLUMNS, OrderItemRow, OrderRow, OrderRowError};

#[cfg(feature = "postgres")]
mod rows {
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;
    use sqlx::types::Json;

    use super::{Order, OrderItem};
    use crate::types::{
        Money, MoneyError, OrderId, OrderItemId, OrderStatus, PaymentStatus, ShippingAddress,
        UserId,
    };

    /// Columns matching [`OrderRow`], for `SELECT` and `RETURNING` lists.
    pub const ORDER_COLUMNS: &str = "id, order_number, user_id, total_amount, status, \
         payment_status, payment_method, shipping_address, status_note, created_at, updated_at";

    /// Columns matching [`OrderItemRow`].
    pub const ORDER_ITEM_COLUMNS: &str =
        "id, order_id, product_name, product_slug, product_price, quantity, size";

    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum OrderRowError {
        #[error("invalid total for order {id}: {source}")]
        Total { id: i32, source: MoneyError },

        #[error("invalid price for order item {id}: {source}")]
        ItemPrice { id: i32, source: MoneyError },
    }

    #[derive(Debug, sqlx::FromRow)]
    pub struct OrderRow {
        pub id: i32,
        pub order_number: String,
        pub user_id: i32,
        pub total_amount: Decimal,
        pub status: OrderStatus,
        pub payment_status: PaymentStatus,
        pub payment_method: String,
        pub shipping_address: Json<ShippingAddress>,
        pub status_note: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    impl TryFrom<OrderRow> for Order {
        type Error = OrderRowError;

        fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
            let total_amount = Money::new(row.total_amount).map_err(|source| {
                OrderRowError::Total { id: row.id, source }
            })?;

            Ok(Self {
                id: OrderId::new(row.id),
                order_number: row.order_number,
                user_id: UserId::new(row.user_id),
                total_amount,
                status: row.status,
                payment_status: row.payment_status,
                payment_method: row.payment_method,
                shipping_address: row.shipping_address.0,
                status_note: row.status_note,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
        }
    }

    #[derive(Debug, sqlx::FromRow)]
    pub struct OrderItemRow {
        pub id: i32,
        pub order_id: i32,
        pub product_name: String,
        pub product_slug: String,
        pub product_price: Decimal,
        pub quantity: i32,
        pub size: String,
    }

    impl TryFrom<OrderItemRow> for OrderItem {
        type Error = OrderRowError;

        fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
            let product_price = Money::new(row.product_price).map_err(|source| {
                OrderRowError::ItemPrice { id: row.id, source }
            })?;

            Ok(Self {
                id: OrderItemId::new(row.id),
                order_id: OrderId::new(row.order_id),
                product_name: row.product_name,
                product_slug: row.product_slug,
                product_price,
                quantity: row.quantity,
                size: row.size,
            })
        }
    }

}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::Email;
    use chrono::TimeZone;

    fn order(id: i32) -> Order {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
        Order {
            id: OrderId::new(id),
            order_number: format!("ORD-20261016-{id:04}"),
            user_id: UserId::new(1),
            total_amount: Money::pesos(100),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: "cash_on_delivery".into(),
            shipping_address: ShippingAddress {
                name: "Juan Dela Cruz".into(),
                email: Email::parse("juan@example.ph").unwrap(),
                address: "1 Rizal Ave".into(),
                city: "Manila".into(),
                state: "Metro Manila".into(),
                zip: "1000".into(),
                country: "Philippines".into(),
                phone: "09181234567".into(),
            },
            status_note: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn item(id: i32, order_id: i32) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(id),
            order_id: OrderId::new(order_id),
            product_name: "SLICK RUNNER V1".into(),
            product_slug: "slick-runner-v1".into(),
            product_price: Money::pesos(50),
            quantity: 2,
            size: "9".into(),
        }
    }

    #[test]
    fn test_group_items_keeps_order_and_item_sequence() {
        let grouped = group_items(
            vec![order(3), order(2), order(1)],
            vec![item(10, 1), item(11, 3), item(12, 1), item(13, 99)],
        );

        let ids: Vec<i32> = grouped.iter().map(|o| o.order.id.as_i32()).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        let items_of = |index: usize| -> Vec<i32> {
            grouped[index].items.iter().map(|i| i.id.as_i32()).collect()
        };
        assert_eq!(items_of(0), vec![11]);
        assert!(items_of(1).is_empty());
        assert_eq!(items_of(2), vec![10, 12]);
    }

    #[test]
    fn test_group_items_with_no_orders() {
        assert!(group_items(Vec::new(), vec![item(1, 1)]).is_empty());
    }
}
