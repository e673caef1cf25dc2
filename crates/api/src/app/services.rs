//! Service wiring: pick a storage backend and build the services on top of it.

use std::sync::Arc;

use sellerdesk_infra::{
    CatalogService, ClientRegistry, OrderEngine, ReportingService, SellerDirectory, Stores,
};

use crate::config::AppConfig;

/// Everything the handlers need, shared behind an `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
    pub clients: ClientRegistry,
    pub orders: OrderEngine,
    pub reports: ReportingService,
    pub sellers: Arc<dyn SellerDirectory>,
}

impl AppServices {
    pub fn from_stores(stores: Stores) -> Self {
        let clients = ClientRegistry::new(stores.clients.clone());
        Self {
            catalog: CatalogService::new(stores.catalog.clone()),
            orders: OrderEngine::new(stores.catalog, clients.clone(), stores.orders.clone()),
            reports: ReportingService::new(stores.orders, stores.clients, stores.sellers.clone()),
            sellers: stores.sellers,
            clients,
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::from_stores(Stores::in_memory())
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::info!("DATABASE_URL not set; using in-memory stores");
        return Ok(AppServices::in_memory());
    };

    #[cfg(feature = "postgres")]
    {
        let pool =
            sellerdesk_infra::store::connect(database_url, config.database_max_connections).await?;
        tracing::info!("using postgres stores");
        Ok(AppServices::from_stores(Stores::postgres(pool)))
    }

    #[cfg(not(feature = "postgres"))]
    {
        let _ = database_url;
        tracing::warn!("DATABASE_URL set but postgres feature not enabled, falling back to in-memory");
        Ok(AppServices::in_memory())
    }
}
