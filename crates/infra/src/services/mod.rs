//! Application services over the stores.
//!
//! Every scoped operation takes the caller's `SellerId` explicitly; ownership is
//! checked here (never in the stores) through `sellerdesk_auth::ensure_owner`.

pub mod catalog;
pub mod clients;
pub mod orders;
pub mod reports;

pub use catalog::{CatalogService, SEARCH_LIMIT};
pub use clients::ClientRegistry;
pub use orders::OrderEngine;
pub use reports::{ClientSpend, ReportingService, SellerRevenue};
