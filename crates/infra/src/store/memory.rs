//! In-memory stores for tests/dev.
//!
//! Each store is one `RwLock<HashMap>` table. Operations that check and write
//! (stock reservation, email uniqueness) hold the write lock for the whole
//! check-then-write step, which is what makes them atomic.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use sellerdesk_catalog::{Product, ProductPatch, StockRequest, consolidate, plan_reservation};
use sellerdesk_clients::Client;
use sellerdesk_core::{ClientId, DomainError, OrderId, ProductId, Seller, SellerId};
use sellerdesk_sales::{Order, OrderState};

use super::{CatalogStore, ClientStore, OrderStore, SellerDirectory};
use crate::error::{ServiceResult, StoreError, StoreResult};

#[derive(Debug)]
struct Table<K, V> {
    name: &'static str,
    inner: RwLock<HashMap<K, V>>,
}

impl<K: Eq + Hash, V> Table<K, V> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<K, V>>> {
        self.inner.read().map_err(|_| StoreError::Poisoned(self.name))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<K, V>>> {
        self.inner.write().map_err(|_| StoreError::Poisoned(self.name))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct InMemoryCatalogStore {
    products: Table<ProductId, Product>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self {
            products: Table::new("products"),
        }
    }
}

impl Default for InMemoryCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert(&self, product: Product) -> StoreResult<()> {
        self.products.write()?.insert(product.id, product);
        Ok(())
    }

    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self.products.read()?.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        let mut items: Vec<Product> = self.products.read()?.values().cloned().collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn search(&self, text: &str, limit: usize) -> StoreResult<Vec<Product>> {
        let needle = text.to_lowercase();
        let mut hits: Vec<Product> = self
            .products
            .read()?
            .values()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn update(&self, id: ProductId, patch: ProductPatch) -> ServiceResult<Option<Product>> {
        let mut products = self.products.write()?;
        let Some(product) = products.get_mut(&id) else {
            return Ok(None);
        };
        product.apply_patch(patch)?;
        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: ProductId) -> StoreResult<bool> {
        Ok(self.products.write()?.remove(&id).is_some())
    }

    async fn reserve(&self, request: StockRequest) -> ServiceResult<()> {
        let mut products = self.products.write()?;
        let product = products
            .get_mut(&request.product_id)
            .ok_or(DomainError::not_found("product"))?;
        product.reserve(request.quantity)?;
        Ok(())
    }

    async fn reserve_all(&self, requests: &[StockRequest]) -> ServiceResult<()> {
        let mut products = self.products.write()?;
        let totals = plan_reservation(requests, |id| products.get(&id))?;
        for total in totals {
            if let Some(product) = products.get_mut(&total.product_id) {
                product.reserve(total.quantity)?;
            }
        }
        Ok(())
    }

    async fn release_all(&self, requests: &[StockRequest]) -> StoreResult<()> {
        let mut products = self.products.write()?;
        for req in consolidate(requests) {
            match products.get_mut(&req.product_id) {
                Some(product) => product.release(req.quantity),
                None => tracing::warn!(
                    product_id = %req.product_id,
                    quantity = req.quantity,
                    "released stock for a product that no longer exists"
                ),
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clients
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct InMemoryClientStore {
    clients: Table<ClientId, Client>,
}

impl InMemoryClientStore {
    pub fn new() -> Self {
        Self {
            clients: Table::new("clients"),
        }
    }
}

impl Default for InMemoryClientStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_clients<'a>(clients: impl Iterator<Item = &'a Client>) -> Vec<Client> {
    let mut items: Vec<Client> = clients.cloned().collect();
    items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    items
}

#[async_trait]
impl ClientStore for InMemoryClientStore {
    async fn insert(&self, client: Client) -> ServiceResult<()> {
        let mut clients = self.clients.write()?;
        if clients.values().any(|c| c.email == client.email) {
            return Err(DomainError::already_exists(format!(
                "client with email {} is already registered",
                client.email
            ))
            .into());
        }
        clients.insert(client.id, client);
        Ok(())
    }

    async fn get(&self, id: ClientId) -> StoreResult<Option<Client>> {
        Ok(self.clients.read()?.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Client>> {
        Ok(self
            .clients
            .read()?
            .values()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Client>> {
        Ok(sorted_clients(self.clients.read()?.values()))
    }

    async fn list_by_seller(&self, seller: SellerId) -> StoreResult<Vec<Client>> {
        Ok(sorted_clients(
            self.clients.read()?.values().filter(|c| c.seller() == seller),
        ))
    }

    async fn replace(&self, client: Client) -> ServiceResult<bool> {
        let mut clients = self.clients.write()?;
        if !clients.contains_key(&client.id) {
            return Ok(false);
        }
        if clients
            .values()
            .any(|c| c.id != client.id && c.email == client.email)
        {
            return Err(DomainError::already_exists(format!(
                "client with email {} is already registered",
                client.email
            ))
            .into());
        }
        clients.insert(client.id, client);
        Ok(true)
    }

    async fn delete(&self, id: ClientId) -> StoreResult<bool> {
        Ok(self.clients.write()?.remove(&id).is_some())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Orders
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct InMemoryOrderStore {
    orders: Table<OrderId, Order>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: Table::new("orders"),
        }
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_orders<'a>(orders: impl Iterator<Item = &'a Order>) -> Vec<Order> {
    let mut items: Vec<Order> = orders.cloned().collect();
    items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    items
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> StoreResult<()> {
        self.orders.write()?.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, id: OrderId) -> StoreResult<Option<Order>> {
        Ok(self.orders.read()?.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Order>> {
        Ok(sorted_orders(self.orders.read()?.values()))
    }

    async fn list_by_seller(
        &self,
        seller: SellerId,
        state: Option<OrderState>,
    ) -> StoreResult<Vec<Order>> {
        Ok(sorted_orders(self.orders.read()?.values().filter(|o| {
            o.seller() == seller && state.is_none_or(|s| o.state == s)
        })))
    }

    async fn list_by_state(&self, state: OrderState) -> StoreResult<Vec<Order>> {
        Ok(sorted_orders(
            self.orders.read()?.values().filter(|o| o.state == state),
        ))
    }

    async fn replace_if(&self, order: Order, expected: OrderState) -> StoreResult<bool> {
        let mut orders = self.orders.write()?;
        match orders.get_mut(&order.id) {
            Some(stored) if stored.state == expected => {
                *stored = order;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: OrderId) -> StoreResult<bool> {
        Ok(self.orders.write()?.remove(&id).is_some())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sellers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct InMemorySellerDirectory {
    sellers: Table<SellerId, Seller>,
}

impl InMemorySellerDirectory {
    pub fn new() -> Self {
        Self {
            sellers: Table::new("sellers"),
        }
    }
}

impl Default for InMemorySellerDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SellerDirectory for InMemorySellerDirectory {
    async fn record(&self, seller: Seller) -> StoreResult<()> {
        self.sellers.write()?.insert(seller.id, seller);
        Ok(())
    }

    async fn get(&self, id: SellerId) -> StoreResult<Option<Seller>> {
        Ok(self.sellers.read()?.get(&id).cloned())
    }
}
