//! Order engine.
//!
//! Orders are committed against shared stock. The reservation for an order's
//! lines is all-or-nothing and happens before the order record is written; if
//! the write fails the reservation is handed back.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use sellerdesk_auth::ensure_owner;
use sellerdesk_catalog::StockRequest;
use sellerdesk_core::{DomainError, OrderId, SellerId};
use sellerdesk_sales::{NewOrder, Order, OrderPatch, OrderState, StockChange};

use crate::error::ServiceResult;
use crate::services::ClientRegistry;
use crate::store::{CatalogStore, OrderStore};

#[derive(Clone)]
pub struct OrderEngine {
    catalog: Arc<dyn CatalogStore>,
    clients: ClientRegistry,
    orders: Arc<dyn OrderStore>,
}

impl OrderEngine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        clients: ClientRegistry,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        Self {
            catalog,
            clients,
            orders,
        }
    }

    /// Validate, authorize, reserve stock and persist a new `pending` order.
    #[instrument(skip(self, input), fields(seller_id = %caller, client_id = %input.client), err)]
    pub async fn place(&self, caller: SellerId, input: NewOrder) -> ServiceResult<Order> {
        let order = Order::place(OrderId::new(), caller, input, Utc::now())?;
        self.clients.resolve_owned(caller, order.client).await?;

        let requests = order.stock_requests();
        if let Err(err) = self.catalog.reserve_all(&requests).await {
            tracing::warn!(seller_id = %caller, error = %err, "order rejected");
            return Err(err);
        }

        if let Err(err) = self.orders.insert(order.clone()).await {
            tracing::error!(order_id = %order.id, error = %err, "order write failed; releasing stock");
            self.compensate(&requests).await;
            return Err(err.into());
        }

        tracing::info!(
            order_id = %order.id,
            seller_id = %caller,
            lines = order.lines.len(),
            total = order.total,
            "order placed"
        );
        Ok(order)
    }

    pub async fn get(&self, caller: SellerId, id: OrderId) -> ServiceResult<Order> {
        self.resolve_owned(caller, id).await
    }

    /// Apply a patch to an order the caller owns.
    ///
    /// The target client (new or existing) must belong to the caller. Stock moves
    /// as decided by [`Order::stock_change_to`]; any failure leaves the stored
    /// order as it was. The write only lands if the order is still in the state
    /// that was read, so of two racing transitions one gets a `Conflict` and
    /// moves no stock.
    #[instrument(skip(self, patch), fields(seller_id = %caller, order_id = %id), err)]
    pub async fn update(
        &self,
        caller: SellerId,
        id: OrderId,
        patch: OrderPatch,
    ) -> ServiceResult<Order> {
        let current = self.resolve_owned(caller, id).await?;
        let next = current.patched(&patch)?;
        self.clients.resolve_owned(caller, next.client).await?;

        match current.stock_change_to(&next, patch.lines.is_some()) {
            StockChange::None => {
                self.replace_from(&next, current.state).await?;
            }
            StockChange::Reserve(requests) => {
                self.catalog.reserve_all(&requests).await?;
                if let Err(err) = self.replace_from(&next, current.state).await {
                    self.compensate(&requests).await;
                    return Err(err);
                }
            }
            StockChange::Release(requests) => {
                self.replace_from(&next, current.state).await?;
                if let Err(err) = self.catalog.release_all(&requests).await {
                    tracing::error!(order_id = %id, error = %err, "stock release failed; restoring order");
                    if let Err(restore) = self.replace_from(&current, next.state).await {
                        tracing::error!(order_id = %id, error = %restore, "failed to restore order");
                    }
                    return Err(err.into());
                }
            }
        }

        tracing::info!(order_id = %id, seller_id = %caller, state = %next.state, "order updated");
        Ok(next)
    }

    /// Hard delete. Stock held by the order is not returned.
    #[instrument(skip(self), fields(seller_id = %caller, order_id = %id), err)]
    pub async fn delete(&self, caller: SellerId, id: OrderId) -> ServiceResult<()> {
        self.resolve_owned(caller, id).await?;
        if !self.orders.delete(id).await? {
            return Err(DomainError::not_found("order").into());
        }
        tracing::info!(order_id = %id, seller_id = %caller, "order deleted");
        Ok(())
    }

    /// The caller's orders, optionally restricted to one state.
    pub async fn list_mine(
        &self,
        caller: SellerId,
        state: Option<OrderState>,
    ) -> ServiceResult<Vec<Order>> {
        Ok(self.orders.list_by_seller(caller, state).await?)
    }

    /// Every order (administrative listing).
    pub async fn list_all(&self) -> ServiceResult<Vec<Order>> {
        Ok(self.orders.list().await?)
    }

    async fn resolve_owned(&self, caller: SellerId, id: OrderId) -> ServiceResult<Order> {
        let order = self
            .orders
            .get(id)
            .await?
            .ok_or(DomainError::not_found("order"))?;
        ensure_owner(&order, caller, "order")?;
        Ok(order)
    }

    /// Write `order` if the stored copy is still in `expected`; tell a vanished
    /// order apart from one another request has already moved.
    async fn replace_from(&self, order: &Order, expected: OrderState) -> ServiceResult<()> {
        if self.orders.replace_if(order.clone(), expected).await? {
            return Ok(());
        }
        match self.orders.get(order.id).await? {
            None => Err(DomainError::not_found("order").into()),
            Some(_) => {
                tracing::warn!(order_id = %order.id, expected = %expected, "order changed concurrently");
                Err(DomainError::conflict("order was modified by another request; retry").into())
            }
        }
    }

    async fn compensate(&self, requests: &[StockRequest]) {
        if let Err(err) = self.catalog.release_all(requests).await {
            tracing::error!(error = %err, lines = requests.len(), "failed to release reserved stock");
        }
    }
}
