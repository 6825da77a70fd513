use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::{Cart, GeoPoint, LineItem, Populated, ResolvedLineItem, UserSummary};
use super::geo::LocationInput;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Forward-only lifecycle; delivered and cancelled are terminal.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Shipped)
                | (Confirmed, Cancelled)
                | (Shipped, Delivered)
        )
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(AppError::ValidationError(format!(
                "Unknown order status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Json<Vec<LineItem>>,
    pub promo_code: Option<String>,
    pub discount: Decimal,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub location: Json<GeoPoint>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Snapshot of a cart taken at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub items: Vec<LineItem>,
    pub promo_code: Option<String>,
    pub discount: Decimal,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub location: GeoPoint,
}

impl NewOrder {
    pub fn from_cart(cart: &Cart, location: GeoPoint) -> Self {
        Self {
            user_id: cart.user_id,
            items: cart.items.to_vec(),
            promo_code: cart.promo_code.clone(),
            discount: cart.discount,
            subtotal: cart.subtotal,
            total: cart.total,
            location,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    pub location: Option<LocationInput>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub user: Populated<UserSummary>,
    pub items: Vec<ResolvedLineItem>,
    pub promo_code: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub discount: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub subtotal: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total: Decimal,
    pub status: OrderStatus,
    pub location: GeoPoint,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderResponse {
    pub fn new(order: Order, user: Populated<UserSummary>, items: Vec<ResolvedLineItem>) -> Self {
        Self {
            id: order.id,
            user,
            items,
            promo_code: order.promo_code,
            discount: order.discount,
            subtotal: order.subtotal,
            total: order.total,
            status: order.status,
            location: order.location.0,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_parse_status() {
        assert_eq!("pending".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!(" Shipped ".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!(matches!(
            "lost".parse::<OrderStatus>(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_allowed_transitions() {
        use OrderStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));

        assert!(!Delivered.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Delivered));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(OrderStatus::Delivered).unwrap(),
            serde_json::json!("delivered")
        );
        assert_eq!(OrderStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_snapshot_copies_cart() {
        let mut cart = Cart::new(Uuid::new_v4());
        cart.items.push(LineItem {
            product: Uuid::new_v4(),
            product_owner: Uuid::new_v4(),
            quantity: 2,
            price: dec!(4.25),
            product_name: "Attiéké".to_string(),
            product_image: None,
        });
        cart.apply_promo(Some("PROMO"));

        let order = NewOrder::from_cart(&cart, GeoPoint::origin());

        assert_eq!(order.user_id, cart.user_id);
        assert_eq!(order.items, cart.items.to_vec());
        assert_eq!(order.subtotal, dec!(8.50));
        assert_eq!(order.discount, cart.discount);
        assert_eq!(order.total, cart.total);
        assert_eq!(order.promo_code.as_deref(), Some("PROMO"));
    }
}
