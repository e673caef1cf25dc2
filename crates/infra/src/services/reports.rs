//! Revenue reports joined with client and seller details.

use std::sync::Arc;

use serde::Serialize;

use sellerdesk_clients::Client;
use sellerdesk_core::{ClientId, Seller, SellerId};
use sellerdesk_reporting::{TOP_SELLERS_LIMIT, top_clients, top_sellers};
use sellerdesk_sales::OrderState;

use crate::error::ServiceResult;
use crate::store::{ClientStore, OrderStore, SellerDirectory};

/// A client's summed spend over completed orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSpend {
    pub client_id: ClientId,
    pub total: u64,
    /// `None` when the client has since been deleted.
    pub client: Option<Client>,
}

/// A seller's summed revenue over completed orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerRevenue {
    pub seller_id: SellerId,
    pub total: u64,
    /// `None` when the seller has never been seen by this instance.
    pub seller: Option<Seller>,
}

#[derive(Clone)]
pub struct ReportingService {
    orders: Arc<dyn OrderStore>,
    clients: Arc<dyn ClientStore>,
    sellers: Arc<dyn SellerDirectory>,
}

impl ReportingService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        clients: Arc<dyn ClientStore>,
        sellers: Arc<dyn SellerDirectory>,
    ) -> Self {
        Self {
            orders,
            clients,
            sellers,
        }
    }

    /// Every client with completed orders, highest spend first.
    pub async fn top_clients(&self) -> ServiceResult<Vec<ClientSpend>> {
        let completed = self.orders.list_by_state(OrderState::Completed).await?;
        let ranked = top_clients(&completed);

        let mut report = Vec::with_capacity(ranked.len());
        for entry in ranked {
            report.push(ClientSpend {
                client_id: entry.key,
                total: entry.total,
                client: self.clients.get(entry.key).await?,
            });
        }
        Ok(report)
    }

    /// The best sellers by revenue, ranked over all sellers before the cut.
    pub async fn top_sellers(&self) -> ServiceResult<Vec<SellerRevenue>> {
        let completed = self.orders.list_by_state(OrderState::Completed).await?;
        let ranked = top_sellers(&completed, TOP_SELLERS_LIMIT);

        let mut report = Vec::with_capacity(ranked.len());
        for entry in ranked {
            report.push(SellerRevenue {
                seller_id: entry.key,
                total: entry.total,
                seller: self.sellers.get(entry.key).await?,
            });
        }
        Ok(report)
    }
}
