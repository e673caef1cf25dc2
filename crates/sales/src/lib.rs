//! Sales orders domain module.
//!
//! This crate contains business rules for orders, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage). Stock is touched by
//! the order engine in infra; here we only decide *which* stock movement an
//! order change implies.

pub mod order;

pub use order::{NewOrder, Order, OrderLine, OrderPatch, OrderState, StockChange};
