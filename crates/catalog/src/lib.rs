//! Product catalog domain module.
//!
//! Products are shared by every seller. Stock is the one contended field: it is
//! only ever decremented through a reservation plan that checks every line
//! before any unit is taken (no IO, no HTTP, no storage here).

pub mod product;
pub mod reservation;

pub use product::{NewProduct, Product, ProductPatch};
pub use reservation::{StockRequest, consolidate, plan_reservation};
