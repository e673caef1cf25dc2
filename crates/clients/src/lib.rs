//! Clients domain module.
//!
//! A client is owned by exactly one seller for its whole lifetime; the owner is
//! fixed at creation and no patch type can carry a new one (no IO, no HTTP, no
//! storage here).

pub mod client;

pub use client::{Client, ClientPatch, NewClient, normalize_email};
