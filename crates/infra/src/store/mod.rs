//! Storage abstractions for catalog, clients, orders and sellers.
//!
//! Every entity is a record with a generated id. Two backends implement these
//! traits: `memory` (tests/dev) and `postgres` (behind the `postgres` feature).
//! Methods that enforce a business rule atomically with the write (stock
//! reservation, unique client email) return `ServiceResult` so the rule's typed
//! failure reaches the caller; plain reads/writes return `StoreResult`.

use std::sync::Arc;

use async_trait::async_trait;

use sellerdesk_catalog::{Product, ProductPatch, StockRequest};
use sellerdesk_clients::Client;
use sellerdesk_core::{ClientId, OrderId, ProductId, Seller, SellerId};
use sellerdesk_sales::{Order, OrderState};

use crate::error::{ServiceResult, StoreResult};

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::{InMemoryCatalogStore, InMemoryClientStore, InMemoryOrderStore, InMemorySellerDirectory};
#[cfg(feature = "postgres")]
pub use postgres::{
    PostgresCatalogStore, PostgresClientStore, PostgresOrderStore, PostgresSellerDirectory, connect,
};

/// Shared product catalog with atomic stock reservation.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert(&self, product: Product) -> StoreResult<()>;

    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>>;

    async fn list(&self) -> StoreResult<Vec<Product>>;

    /// Case-insensitive name match, ordered by name, at most `limit` rows.
    async fn search(&self, text: &str, limit: usize) -> StoreResult<Vec<Product>>;

    /// Apply a patch in place. `Ok(None)` if the product does not exist.
    async fn update(&self, id: ProductId, patch: ProductPatch) -> ServiceResult<Option<Product>>;

    async fn delete(&self, id: ProductId) -> StoreResult<bool>;

    /// Atomic check-and-decrement of one product's stock.
    async fn reserve(&self, request: StockRequest) -> ServiceResult<()>;

    /// Reserve every request or none of them.
    ///
    /// Requests are checked in order; the first that cannot be met determines
    /// the error and no stock is taken for any request.
    async fn reserve_all(&self, requests: &[StockRequest]) -> ServiceResult<()>;

    /// Give units back. Products that no longer exist are skipped.
    async fn release_all(&self, requests: &[StockRequest]) -> StoreResult<()>;
}

/// Client records with a registry-wide unique email.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Insert a new client; `AlreadyExists` if the email is taken.
    async fn insert(&self, client: Client) -> ServiceResult<()>;

    async fn get(&self, id: ClientId) -> StoreResult<Option<Client>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Client>>;

    async fn list(&self) -> StoreResult<Vec<Client>>;

    async fn list_by_seller(&self, seller: SellerId) -> StoreResult<Vec<Client>>;

    /// Overwrite an existing client. `Ok(false)` if it is gone; `AlreadyExists`
    /// if the new email belongs to another client.
    async fn replace(&self, client: Client) -> ServiceResult<bool>;

    async fn delete(&self, id: ClientId) -> StoreResult<bool>;
}

/// Order records.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> StoreResult<()>;

    async fn get(&self, id: OrderId) -> StoreResult<Option<Order>>;

    async fn list(&self) -> StoreResult<Vec<Order>>;

    async fn list_by_seller(
        &self,
        seller: SellerId,
        state: Option<OrderState>,
    ) -> StoreResult<Vec<Order>>;

    async fn list_by_state(&self, state: OrderState) -> StoreResult<Vec<Order>>;

    /// Overwrite an existing order only while its stored state is still
    /// `expected`. `Ok(false)` if it is gone or its state has moved on.
    async fn replace_if(&self, order: Order, expected: OrderState) -> StoreResult<bool>;

    async fn delete(&self, id: OrderId) -> StoreResult<bool>;
}

/// Seller display profiles, as last seen from the identity provider.
#[async_trait]
pub trait SellerDirectory: Send + Sync {
    async fn record(&self, seller: Seller) -> StoreResult<()>;

    async fn get(&self, id: SellerId) -> StoreResult<Option<Seller>>;
}

/// One handle per store, shared by the services.
#[derive(Clone)]
pub struct Stores {
    pub catalog: Arc<dyn CatalogStore>,
    pub clients: Arc<dyn ClientStore>,
    pub orders: Arc<dyn OrderStore>,
    pub sellers: Arc<dyn SellerDirectory>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            catalog: Arc::new(InMemoryCatalogStore::new()),
            clients: Arc::new(InMemoryClientStore::new()),
            orders: Arc::new(InMemoryOrderStore::new()),
            sellers: Arc::new(InMemorySellerDirectory::new()),
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            catalog: Arc::new(PostgresCatalogStore::new(pool.clone())),
            clients: Arc::new(PostgresClientStore::new(pool.clone())),
            orders: Arc::new(PostgresOrderStore::new(pool.clone())),
            sellers: Arc::new(PostgresSellerDirectory::new(pool)),
        }
    }
}
