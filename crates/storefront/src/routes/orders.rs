//! Order history handlers. Customers only ever see their own orders.

use axum::{Json, extract::State};
use serde::de::{Deserializer, IntoDeserializer};
use serde::Deserialize;
use tracing::instrument;

use slick_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiPath, ApiQuery};
use crate::middleware::RequireAuth;
use crate::models::OrderWithItems;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<OrderStatus>,
}

/// `?status=` is the same as no filter.
fn blank_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => T::deserialize(value.into_deserializer()).map(Some),
    }
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> Result<Json<Vec<OrderWithItems>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id, query.status)
        .await?;
    Ok(Json(orders))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderWithItems>> {
    OrderRepository::new(state.pool())
        .get_for_user(user.id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    fn parse(uri: &'static str) -> Option<OrderQuery> {
        Query::<OrderQuery>::try_from_uri(&Uri::from_static(uri))
            .ok()
            .map(|Query(query)| query)
    }

    #[test]
    fn test_status_filter() {
        let query = parse("/api/orders?status=shipped").unwrap();
        assert_eq!(query.status, Some(OrderStatus::Shipped));
    }

    #[test]
    fn test_empty_status_means_no_filter() {
        assert_eq!(parse("/api/orders?status=").unwrap().status, None);
        assert_eq!(parse("/api/orders?status=%20").unwrap().status, None);
        assert_eq!(parse("/api/orders").unwrap().status, None);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(parse("/api/orders?status=lost").is_none());
    }
}
