use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sellerdesk_core::{DomainError, DomainResult, Entity, ProductId};

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Units available for new orders. Never negative by construction.
    pub stock: u64,
    /// Price in smallest currency unit (e.g., cents).
    pub price: u64,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub stock: u64,
    pub price: u64,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub stock: Option<u64>,
    pub price: Option<u64>,
}

impl Product {
    pub fn create(id: ProductId, input: NewProduct, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = validate_name(&input.name)?;
        Ok(Self {
            id,
            name,
            stock: input.stock,
            price: input.price,
            created_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: ProductPatch) -> DomainResult<()> {
        // Validate before touching any field so a bad patch leaves the product intact.
        let name = patch.name.as_deref().map(validate_name).transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        Ok(())
    }

    /// Check-and-decrement for a single product.
    pub fn reserve(&mut self, quantity: u64) -> DomainResult<()> {
        if quantity > self.stock {
            return Err(DomainError::insufficient_stock(
                self.name.clone(),
                quantity,
                self.stock,
            ));
        }
        self.stock -= quantity;
        Ok(())
    }

    /// Return previously reserved units.
    pub fn release(&mut self, quantity: u64) {
        self.stock = self.stock.saturating_add(quantity);
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("product name cannot be empty"));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(stock: u64) -> Product {
        Product::create(
            ProductId::new(),
            NewProduct {
                name: "Widget".to_string(),
                stock,
                price: 1_250,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn create_trims_name() {
        let product = Product::create(
            ProductId::new(),
            NewProduct {
                name: "  Laptop  ".to_string(),
                stock: 3,
                price: 99_900,
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(product.name, "Laptop");
    }

    #[test]
    fn create_rejects_blank_name() {
        let err = Product::create(
            ProductId::new(),
            NewProduct {
                name: "   ".to_string(),
                stock: 1,
                price: 1,
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn reserve_decrements_when_enough_stock() {
        let mut p = widget(10);
        p.reserve(6).unwrap();
        assert_eq!(p.stock, 4);
        p.reserve(4).unwrap();
        assert_eq!(p.stock, 0);
    }

    #[test]
    fn reserve_rejects_overdraw_and_leaves_stock() {
        let mut p = widget(4);
        let err = p.reserve(7).unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock("Widget", 7, 4));
        assert_eq!(p.stock, 4);
    }

    #[test]
    fn bad_patch_is_all_or_nothing() {
        let mut p = widget(5);
        let before = p.clone();
        let err = p
            .apply_patch(ProductPatch {
                name: Some(String::new()),
                stock: Some(50),
                price: None,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(p, before);
    }

    #[test]
    fn release_returns_units() {
        let mut p = widget(2);
        p.reserve(2).unwrap();
        p.release(2);
        assert_eq!(p.stock, 2);
    }
}
