//! Order repository for checkout and order history.

use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use slick_core::order::{ORDER_COLUMNS, ORDER_ITEM_COLUMNS, OrderItemRow, OrderRow};
use slick_core::{
    CartLine, Money, OrderId, OrderNumber, OrderStatus, PaymentMethod, ShippingAddress, UserId,
    group_items,
};

use super::RepositoryError;
use crate::models::{Order, OrderItem, OrderWithItems};

/// Everything needed to write an order and its items.
#[derive(Debug)]
pub struct NewOrder<'a> {
    pub user_id: UserId,
    pub order_number: &'a OrderNumber,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub shipping_address: &'a ShippingAddress,
    pub lines: &'a [CartLine],
}

/// `order_items.quantity` is an `INTEGER`.
fn line_quantity(line: &CartLine) -> Result<i32, RepositoryError> {
    i32::try_from(line.quantity).map_err(|_| {
        RepositoryError::DataCorruption(format!(
            "quantity {} of {} size {} does not fit an order line",
            line.quantity, line.slug, line.size
        ))
    })
}

pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and one item per cart line in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number is taken and
    /// `RepositoryError::DataCorruption` if a line quantity does not fit an
    /// order line. Returns `RepositoryError::Database` for other database
    /// errors; in every case nothing is written.
    #[instrument(skip(self, order), fields(order_number = %order.order_number, lines = order.lines.len()))]
    pub async fn create(&self, order: &NewOrder<'_>) -> Result<OrderWithItems, RepositoryError> {
        let quantities = order
            .lines
            .iter()
            .map(line_quantity)
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders
                (order_number, user_id, total_amount, status, payment_status,
                 payment_method, shipping_address)
            VALUES ($1, $2, $3, 'pending', 'pending', $4, $5)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(order.order_number.as_str())
        .bind(order.user_id)
        .bind(order.total_amount)
        .bind(order.payment_method.as_str())
        .bind(Json(order.shipping_address))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "order number already exists"))?;

        let mut items = Vec::with_capacity(order.lines.len());
        for (line, quantity) in order.lines.iter().zip(quantities) {
            let item = sqlx::query_as::<_, OrderItemRow>(&format!(
                r"
                INSERT INTO order_items
                    (order_id, product_name, product_slug, product_price, quantity, size)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {ORDER_ITEM_COLUMNS}
                "
            ))
            .bind(row.id)
            .bind(&line.name)
            .bind(&line.slug)
            .bind(line.unit_price)
            .bind(quantity)
            .bind(&line.size)
            .fetch_one(&mut *tx)
            .await?;

            items.push(OrderItem::try_from(item)?);
        }

        tx.commit().await?;

        Ok(OrderWithItems {
            order: Order::try_from(row)?,
            items,
        })
    }

    /// A customer's orders, newest first, each with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE user_id = $1
              AND ($2::order_status IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(user_id)
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        self.attach_items(orders).await
    }

    /// One of a customer's orders. Orders placed by others are `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        id: OrderId,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE id = $1 AND user_id = $2
            "
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut orders = self.attach_items(vec![Order::try_from(row)?]).await?;
        Ok(orders.pop())
    }

    async fn attach_items(
        &self,
        orders: Vec<Order>,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();
        let items = sqlx::query_as::<_, OrderItemRow>(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY id"
        ))
        .bind(&ids)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(OrderItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        Ok(group_items(orders, items))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use slick_core::{MAX_LINE_QUANTITY, ProductId};

    fn line(quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(4),
            name: "SLICK SLIDE".into(),
            slug: "slick-slide".into(),
            size: "10".into(),
            unit_price: Money::pesos(1),
            quantity,
        }
    }

    #[test]
    fn test_line_quantity_up_to_the_limit() {
        assert_eq!(line_quantity(&line(3)).unwrap(), 3);
        assert_eq!(line_quantity(&line(MAX_LINE_QUANTITY)).unwrap(), i32::MAX);
    }

    #[test]
    fn test_line_quantity_over_the_limit_is_refused() {
        let err = line_quantity(&line(3_000_000_000)).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(ref msg) if msg.contains("3000000000")));
        assert!(line_quantity(&line(u32::MAX)).is_err());
    }
}
