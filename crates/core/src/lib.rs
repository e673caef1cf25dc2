//! `sellerdesk-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod seller;

pub use entity::{Entity, Owned};
pub use error::{DomainError, DomainResult};
pub use id::{ClientId, OrderId, ProductId, SellerId};
pub use seller::Seller;
