//! Catalog management and stock reservation.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use sellerdesk_catalog::{NewProduct, Product, ProductPatch, StockRequest};
use sellerdesk_core::{DomainError, ProductId};

use crate::error::ServiceResult;
use crate::store::CatalogStore;

/// Maximum number of products returned by a name search.
pub const SEARCH_LIMIT: usize = 10;

/// Shared catalog operations. Unscoped: any authenticated seller may manage products.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, input), err)]
    pub async fn create(&self, input: NewProduct) -> ServiceResult<Product> {
        let product = Product::create(ProductId::new(), input, Utc::now())?;
        self.store.insert(product.clone()).await?;
        tracing::info!(product_id = %product.id, stock = product.stock, "product created");
        Ok(product)
    }

    pub async fn get(&self, id: ProductId) -> ServiceResult<Product> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("product").into())
    }

    pub async fn list(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.store.list().await?)
    }

    /// Case-insensitive substring match on the name, at most [`SEARCH_LIMIT`] hits.
    pub async fn search(&self, text: &str) -> ServiceResult<Vec<Product>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::validation("search text must not be empty").into());
        }
        Ok(self.store.search(text, SEARCH_LIMIT).await?)
    }

    #[instrument(skip(self, patch), fields(product_id = %id), err)]
    pub async fn update(&self, id: ProductId, patch: ProductPatch) -> ServiceResult<Product> {
        let product = self
            .store
            .update(id, patch)
            .await?
            .ok_or(DomainError::not_found("product"))?;
        tracing::info!(product_id = %id, stock = product.stock, "product updated");
        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn delete(&self, id: ProductId) -> ServiceResult<()> {
        if !self.store.delete(id).await? {
            return Err(DomainError::not_found("product").into());
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Atomic check-and-decrement of a single product's stock.
    pub async fn reserve_stock(&self, product_id: ProductId, quantity: u64) -> ServiceResult<()> {
        let request = StockRequest::new(product_id, quantity)?;
        self.store.reserve(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryCatalogStore;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(InMemoryCatalogStore::new()))
    }

    fn new_product(name: &str, stock: u64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            stock,
            price: 250,
        }
    }

    #[tokio::test]
    async fn create_get_update_delete() {
        let catalog = service();
        let pen = catalog.create(new_product("  Pen ", 3)).await.unwrap();
        assert_eq!(pen.name, "Pen");
        assert_eq!(catalog.get(pen.id).await.unwrap(), pen);

        let updated = catalog
            .update(
                pen.id,
                ProductPatch {
                    stock: Some(9),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.stock, 9);
        assert_eq!(updated.name, "Pen");

        catalog.delete(pen.id).await.unwrap();
        let err = catalog.get(pen.id).await.unwrap_err();
        assert_eq!(err.domain(), Some(&DomainError::not_found("product")));
        let err = catalog.delete(pen.id).await.unwrap_err();
        assert_eq!(err.domain(), Some(&DomainError::not_found("product")));
    }

    #[tokio::test]
    async fn bad_patch_leaves_product_untouched() {
        let catalog = service();
        let pen = catalog.create(new_product("Pen", 3)).await.unwrap();
        let err = catalog
            .update(
                pen.id,
                ProductPatch {
                    name: Some("   ".to_string()),
                    stock: Some(0),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err.domain(), Some(DomainError::Validation(_))));
        assert_eq!(catalog.get(pen.id).await.unwrap(), pen);
    }

    #[tokio::test]
    async fn reserve_stock_never_goes_negative() {
        let catalog = service();
        let pen = catalog.create(new_product("Pen", 2)).await.unwrap();

        catalog.reserve_stock(pen.id, 2).await.unwrap();
        let err = catalog.reserve_stock(pen.id, 1).await.unwrap_err();
        assert_eq!(
            err.domain(),
            Some(&DomainError::insufficient_stock("Pen", 1, 0))
        );
        assert_eq!(catalog.get(pen.id).await.unwrap().stock, 0);

        let err = catalog.reserve_stock(ProductId::new(), 1).await.unwrap_err();
        assert_eq!(err.domain(), Some(&DomainError::not_found("product")));
        let err = catalog.reserve_stock(pen.id, 0).await.unwrap_err();
        assert!(matches!(err.domain(), Some(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn search_rejects_blank_text() {
        let catalog = service();
        catalog.create(new_product("Desk lamp", 1)).await.unwrap();
        assert_eq!(catalog.search("LAMP").await.unwrap().len(), 1);
        assert!(catalog.search("  ").await.is_err());
    }
}
