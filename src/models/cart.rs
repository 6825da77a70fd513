use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, dec};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::{Populated, Product, ProductSummary, UserSummary};
use crate::error::{AppError, Result};

/// Promo codes of exactly this many characters are accepted.
pub const PROMO_CODE_LENGTH: usize = 5;
pub const PROMO_DISCOUNT_RATE: Decimal = dec!(0.05);

/// One product line of a cart or order. Price, name and image are captured
/// when the line is created and never refreshed from the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product: Uuid,
    pub product_owner: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub product_name: String,
    pub product_image: Option<String>,
}

impl LineItem {
    pub fn snapshot(product: &Product, quantity: i32) -> Self {
        Self {
            product: product.id,
            product_owner: product.user_id,
            quantity,
            price: product.price,
            product_name: product.title.clone(),
            product_image: product.image.clone(),
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Json<Vec<LineItem>>,
    pub promo_code: Option<String>,
    pub discount: Decimal,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoRequest {
    pub promo_code: Option<String>,
}

pub fn validate_line_quantity(quantity: i32) -> Result<()> {
    if quantity < 1 {
        return Err(AppError::ValidationError(
            "Quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn is_valid_promo_code(code: &str) -> bool {
    code.chars().count() == PROMO_CODE_LENGTH
}

impl Cart {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            items: Json(Vec::new()),
            promo_code: None,
            discount: Decimal::ZERO,
            subtotal: Decimal::ZERO,
            total: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn line(&self, product_id: Uuid) -> Option<&LineItem> {
        self.items.iter().find(|item| item.product == product_id)
    }

    /// Adds `quantity` units of `product`, merging into an existing line.
    /// The cart is left untouched when any check fails.
    pub fn add_item(&mut self, buyer_id: Uuid, product: &Product, quantity: i32) -> Result<()> {
        validate_line_quantity(quantity)?;

        if product.user_id == buyer_id {
            return Err(AppError::InvalidOperation(
                "You cannot add your own products to the cart".to_string(),
            ));
        }

        let already = self.line(product.id).map_or(0, |item| item.quantity);
        let wanted = already.checked_add(quantity).ok_or_else(|| {
            AppError::ValidationError("Quantity is too large".to_string())
        })?;

        if wanted > product.quantity {
            return Err(AppError::InsufficientStock {
                product: product.title.clone(),
                remaining: product.quantity,
            });
        }

        match self.items.iter_mut().find(|item| item.product == product.id) {
            Some(item) => item.quantity = wanted,
            None => self.items.push(LineItem::snapshot(product, quantity)),
        }

        self.recalculate();
        Ok(())
    }

    /// Overwrites the quantity of the line for `product`.
    pub fn set_quantity(&mut self, product: &Product, quantity: i32) -> Result<()> {
        validate_line_quantity(quantity)?;

        if self.line(product.id).is_none() {
            return Err(AppError::NotFound(
                "Product not found in cart".to_string(),
            ));
        }

        if quantity > product.quantity {
            return Err(AppError::InsufficientStock {
                product: product.title.clone(),
                remaining: product.quantity,
            });
        }

        if let Some(item) = self.items.iter_mut().find(|item| item.product == product.id) {
            item.quantity = quantity;
        }

        self.recalculate();
        Ok(())
    }

    /// Returns whether a line was removed.
    pub fn remove_item(&mut self, product_id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product != product_id);
        let removed = self.items.len() != before;

        if removed {
            self.recalculate();
        }
        removed
    }

    /// Applies or clears the promo code. Returns whether a code is now set.
    pub fn apply_promo(&mut self, code: Option<&str>) -> bool {
        self.promo_code = code
            .filter(|c| is_valid_promo_code(c))
            .map(|c| c.to_string());
        self.recalculate();
        self.promo_code.is_some()
    }

    /// Re-derives subtotal, discount and total from the lines and promo code.
    pub fn recalculate(&mut self) {
        self.subtotal = self.items.iter().map(LineItem::line_total).sum();
        self.discount = match self.promo_code {
            Some(_) => self.subtotal * PROMO_DISCOUNT_RATE,
            None => Decimal::ZERO,
        };
        self.total = (self.subtotal - self.discount).max(Decimal::ZERO);
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.promo_code = None;
        self.discount = Decimal::ZERO;
        self.subtotal = Decimal::ZERO;
        self.total = Decimal::ZERO;
    }
}

/// Line item with its product and owner references resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLineItem {
    pub product: Populated<ProductSummary>,
    pub product_owner: Populated<UserSummary>,
    pub quantity: i32,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub product_name: String,
    pub product_image: Option<String>,
}

pub fn resolve_line_items(
    items: &[LineItem],
    products: &HashMap<Uuid, ProductSummary>,
    users: &HashMap<Uuid, UserSummary>,
) -> Vec<ResolvedLineItem> {
    items
        .iter()
        .map(|item| ResolvedLineItem {
            product: Populated::lookup(item.product, products),
            product_owner: Populated::lookup(item.product_owner, users),
            quantity: item.quantity,
            price: item.price,
            product_name: item.product_name.clone(),
            product_image: item.product_image.clone(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub id: Uuid,
    pub user: Uuid,
    pub items: Vec<ResolvedLineItem>,
    pub promo_code: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub discount: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub subtotal: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartResponse {
    pub fn new(cart: Cart, items: Vec<ResolvedLineItem>) -> Self {
        Self {
            id: cart.id,
            user: cart.user_id,
            items,
            promo_code: cart.promo_code,
            discount: cart.discount,
            subtotal: cart.subtotal,
            total: cart.total,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }
    }
}
