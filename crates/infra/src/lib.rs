//! Infrastructure layer: stores (in-memory and PostgreSQL) and the application
//! services that enforce ownership and stock consistency on top of them.

pub mod error;
pub mod services;
pub mod store;

pub use error::{ServiceError, ServiceResult, StoreError, StoreResult};
pub use services::{
    CatalogService, ClientRegistry, ClientSpend, OrderEngine, ReportingService, SellerRevenue,
};
pub use store::{CatalogStore, ClientStore, OrderStore, SellerDirectory, Stores};

#[cfg(test)]
mod integration_tests;
