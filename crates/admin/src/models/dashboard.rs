//! Dashboard statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use slick_core::{Money, OrderStatus};

use super::{Order, Product};

/// Orders the headline figures are computed over.
pub const STATS_WINDOW: usize = 10;
pub const RECENT_ORDERS: usize = 5;
const ACTIVITY_ORDERS: usize = 3;
const ACTIVITY_PRODUCTS: usize = 2;
const ACTIVITY_LIMIT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Order,
    Product,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub title: String,
    pub detail: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_revenue: Money,
    pub total_orders: usize,
    pub pending_orders: usize,
    pub shipped_orders: usize,
    pub delivered_orders: usize,
    pub new_customers: i64,
    pub products_in_stock: i64,
    pub recent_orders: Vec<Order>,
    pub recent_activity: Vec<ActivityEntry>,
}

impl DashboardStats {
    /// Assemble the dashboard from the newest orders and products.
    ///
    /// `orders` and `products` must be sorted newest first. Only the first
    /// [`STATS_WINDOW`] orders count towards the headline figures.
    #[must_use]
    pub fn compute(
        orders: &[Order],
        products: &[Product],
        new_customers: i64,
        products_in_stock: i64,
    ) -> Self {
        let window = orders.get(..STATS_WINDOW).unwrap_or(orders);
        let count = |status: OrderStatus| window.iter().filter(|o| o.status == status).count();

        let total_revenue = window
            .iter()
            .filter(|o| o.status.counts_as_revenue())
            .map(|o| o.total_amount)
            .sum();

        let mut recent_activity: Vec<ActivityEntry> = orders
            .iter()
            .take(ACTIVITY_ORDERS)
            .map(|o| ActivityEntry {
                kind: ActivityKind::Order,
                title: format!("Order {}", o.order_number),
                detail: format!("{} - {}", o.status, o.total_amount),
                at: o.created_at,
            })
            .chain(products.iter().take(ACTIVITY_PRODUCTS).map(|p| ActivityEntry {
                kind: ActivityKind::Product,
                title: p.name.clone(),
                detail: format!("{} - {}", p.status, p.price),
                at: p.created_at,
            }))
            .collect();
        recent_activity.sort_by(|a, b| b.at.cmp(&a.at));
        recent_activity.truncate(ACTIVITY_LIMIT);

        Self {
            total_revenue,
            total_orders: window.len(),
            pending_orders: count(OrderStatus::Pending),
            shipped_orders: count(OrderStatus::Shipped),
            delivered_orders: count(OrderStatus::Delivered),
            new_customers,
            products_in_stock,
            recent_orders: orders.iter().take(RECENT_ORDERS).cloned().collect(),
            recent_activity,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use slick_core::{
        Email, OrderId, PaymentStatus, ProductId, ProductStatus, ShippingAddress, UserId,
    };

    fn at(minutes_ago: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap() - Duration::minutes(minutes_ago)
    }

    fn order(id: i32, status: OrderStatus, pesos: u32, minutes_ago: i64) -> Order {
        Order {
            id: OrderId::new(id),
            order_number: format!("ORD-20261001-{id:04}"),
            user_id: UserId::new(1),
            total_amount: Money::pesos(pesos),
            status,
            payment_status: PaymentStatus::Pending,
            payment_method: "cash_on_delivery".into(),
            shipping_address: ShippingAddress {
                name: "Juan".into(),
                email: Email::parse("juan@example.ph").unwrap(),
                address: "1 Ayala".into(),
                city: "Makati".into(),
                state: String::new(),
                zip: String::new(),
                country: "Philippines".into(),
                phone: String::new(),
            },
            status_note: None,
            created_at: at(minutes_ago),
            updated_at: at(minutes_ago),
        }
    }

    fn product(id: i32, minutes_ago: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("SLICK {id}"),
            slug: format!("slick-{id}"),
            description: None,
            price: Money::pesos(8999),
            brand: Some("Slick".into()),
            status: ProductStatus::Active,
            image_url: None,
            created_at: at(minutes_ago),
            updated_at: at(minutes_ago),
        }
    }

    #[test]
    fn test_revenue_counts_paid_and_delivered_only() {
        let orders = vec![
            order(4, OrderStatus::Paid, 1000, 1),
            order(3, OrderStatus::Delivered, 2000, 2),
            order(2, OrderStatus::Pending, 4000, 3),
            order(1, OrderStatus::Shipped, 8000, 4),
        ];
        let stats = DashboardStats::compute(&orders, &[], 0, 0);
        assert_eq!(stats.total_revenue, Money::pesos(3000));
        assert_eq!(stats.total_orders, 4);
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.shipped_orders, 1);
        assert_eq!(stats.delivered_orders, 1);
    }

    #[test]
    fn test_window_is_ten_orders() {
        let orders: Vec<Order> = (0..15)
            .map(|i| order(i, OrderStatus::Paid, 100, i64::from(i)))
            .collect();
        let stats = DashboardStats::compute(&orders, &[], 0, 0);
        assert_eq!(stats.total_orders, 10);
        assert_eq!(stats.total_revenue, Money::pesos(1000));
        assert_eq!(stats.recent_orders.len(), RECENT_ORDERS);
    }

    #[test]
    fn test_activity_merges_by_time() {
        let orders = vec![
            order(3, OrderStatus::Pending, 100, 10),
            order(2, OrderStatus::Pending, 100, 30),
            order(1, OrderStatus::Pending, 100, 50),
        ];
        let products = vec![product(2, 20), product(1, 40)];

        let stats = DashboardStats::compute(&orders, &products, 0, 0);
        let titles: Vec<&str> = stats
            .recent_activity
            .iter()
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(
            titles,
            [
                "Order ORD-20261001-0003",
                "SLICK 2",
                "Order ORD-20261001-0002",
                "SLICK 1"
            ]
        );
    }

    #[test]
    fn test_empty_dashboard() {
        let stats = DashboardStats::compute(&[], &[], 3, 40);
        assert_eq!(stats.total_revenue, Money::ZERO);
        assert_eq!(stats.total_orders, 0);
        assert_eq!(stats.new_customers, 3);
        assert_eq!(stats.products_in_stock, 40);
        assert!(stats.recent_activity.is_empty());
    }
}
