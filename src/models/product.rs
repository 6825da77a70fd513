use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub quantity: i32,
    pub image: Option<String>,
    pub category_id: Uuid,
    pub user_id: Uuid,
    pub user_full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product joined with its category title and owner name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    #[sqlx(flatten)]
    pub product: Product,
    pub category_title: Option<String>,
    pub owner_first_name: Option<String>,
    pub owner_last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRef {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub quantity: i32,
    pub image: Option<String>,
    pub category: CategoryRef,
    pub user: OwnerRef,
    pub user_full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductResponse {
    fn from(row: ProductRow) -> Self {
        let p = row.product;
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            price: p.price,
            quantity: p.quantity,
            image: p.image,
            category: CategoryRef {
                id: p.category_id,
                title: row.category_title,
            },
            user: OwnerRef {
                id: p.user_id,
                first_name: row.owner_first_name,
                last_name: row.owner_last_name,
            },
            user_full_name: p.user_full_name,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Referenced product as shown inside cart and order line items.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub image: Option<String>,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub active: Option<bool>,
    pub category: Option<Uuid>,
    pub owner: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub image: Option<String>,
    pub category_id: Uuid,
    pub user_id: Uuid,
    pub user_full_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub image: Option<String>,
    pub category_id: Option<Uuid>,
    pub user_full_name: Option<String>,
    pub is_active: Option<bool>,
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::ValidationError("Title is required".to_string()));
    }
    if title.chars().count() > 255 {
        return Err(AppError::ValidationError(
            "Title cannot exceed 255 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<()> {
    if price.is_sign_negative() {
        return Err(AppError::ValidationError(
            "Price cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity < 0 {
        return Err(AppError::ValidationError(
            "Quantity cannot be negative".to_string(),
        ));
    }
    Ok(())
}

impl CreateProductRequest {
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        validate_price(self.price)?;
        validate_quantity(self.quantity)
    }
}

impl UpdateProductRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref title) = self.title {
            validate_title(title)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(quantity) = self.quantity {
            validate_quantity(quantity)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn create_request() -> CreateProductRequest {
        CreateProductRequest {
            title: "Kente scarf".to_string(),
            description: String::new(),
            price: dec!(25.50),
            quantity: 4,
            image: None,
            category_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            user_full_name: None,
        }
    }

    #[test]
    fn test_create_validation() {
        assert!(create_request().validate().is_ok());

        let mut req = create_request();
        req.title = "   ".to_string();
        assert!(matches!(req.validate(), Err(AppError::ValidationError(_))));

        let mut req = create_request();
        req.price = dec!(-1);
        assert!(req.validate().is_err());

        let mut req = create_request();
        req.quantity = -3;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_patch_validates_only_present_fields() {
        assert!(UpdateProductRequest::default().validate().is_ok());

        let patch = UpdateProductRequest {
            quantity: Some(0),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());

        let patch = UpdateProductRequest {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_response_resolves_refs() {
        let now = Utc::now();
        let row = ProductRow {
            product: Product {
                id: Uuid::new_v4(),
                title: "Basket".to_string(),
                description: "Woven".to_string(),
                price: dec!(10),
                quantity: 2,
                image: None,
                category_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                user_full_name: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
            category_title: Some("Crafts".to_string()),
            owner_first_name: Some("Awa".to_string()),
            owner_last_name: Some("Diallo".to_string()),
        };

        let value = serde_json::to_value(ProductResponse::from(row)).unwrap();
        assert_eq!(value["category"]["title"], "Crafts");
        assert_eq!(value["user"]["firstName"], "Awa");
        assert_eq!(value["isActive"], true);
    }
}
