//! Checkout: turn the session cart into an order.
//!
//! Payment is cash on delivery, so an order is complete as soon as it and its
//! items are written. Both are written in one transaction.

use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use slick_core::{Cart, CheckoutForm, CheckoutFormError, OrderNumber, PaymentMethod};

use crate::db::orders::{NewOrder, OrderRepository};
use crate::db::RepositoryError;
use crate::models::{CurrentUser, OrderWithItems};

/// Attempts at finding an unused order number before giving up.
const ORDER_NUMBER_ATTEMPTS: usize = 5;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Form(#[from] CheckoutFormError),

    #[error("could not allocate a unique order number")]
    OrderNumberExhausted,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Generate an `ORD-YYYYMMDD-NNNN` number for `now` with a random suffix.
pub fn generate_order_number(now: DateTime<Utc>, rng: &mut impl Rng) -> OrderNumber {
    OrderNumber::new(now.date_naive(), rng.random_range(0..10_000))
}

pub struct CheckoutService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Place an order for everything in `cart`.
    ///
    /// The caller clears the cart once this returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` for an empty cart,
    /// `CheckoutError::Form` when required shipping fields are blank, and
    /// `CheckoutError::Repository` when the order cannot be written.
    pub async fn place_order(
        &self,
        user: &CurrentUser,
        cart: &Cart,
        form: &CheckoutForm,
    ) -> Result<OrderWithItems, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let shipping_address = form.validate()?;

        let orders = &self.orders;
        let shipping_address = &shipping_address;
        let order = insert_with_unique_number(
            || generate_order_number(Utc::now(), &mut rand::rng()),
            move |order_number| async move {
                orders
                    .create(&NewOrder {
                        user_id: user.id,
                        order_number: &order_number,
                        total_amount: cart.total_price(),
                        payment_method: PaymentMethod::CashOnDelivery,
                        shipping_address,
                        lines: cart.lines(),
                    })
                    .await
            },
        )
        .await?;

        info!(
            order_id = %order.order.id,
            order_number = %order.order.order_number,
            user_id = %user.id,
            total = %order.order.total_amount,
            "Order placed"
        );
        Ok(order)
    }
}

/// Run `insert` with numbers from `next_number` until one is not taken.
///
/// A `Conflict` from `insert` means the number is in use and another is
/// tried, up to [`ORDER_NUMBER_ATTEMPTS`] times. Any other error ends the
/// loop.
async fn insert_with_unique_number<T, N, F, Fut>(
    mut next_number: N,
    mut insert: F,
) -> Result<T, CheckoutError>
where
    N: FnMut() -> OrderNumber,
    F: FnMut(OrderNumber) -> Fut,
    Fut: Future<Output = Result<T, RepositoryError>>,
{
    for attempt in 1..=ORDER_NUMBER_ATTEMPTS {
        let order_number = next_number();
        match insert(order_number.clone()).await {
            Ok(inserted) => return Ok(inserted),
            Err(RepositoryError::Conflict(_)) => {
                warn!(%order_number, attempt, "Order number collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(CheckoutError::OrderNumberExhausted)
}
