//! All-or-nothing stock reservation planning.
//!
//! A plan walks the requested lines in order against a snapshot of the catalog
//! and either accepts every line or reports the first one that cannot be met.
//! Nothing is decremented while planning; the caller applies the returned
//! per-product totals under the same lock (or transaction) it planned under.

use serde::{Deserialize, Serialize};

use sellerdesk_core::{DomainError, DomainResult, ProductId};

use crate::Product;

/// One line's worth of stock to take from a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRequest {
    pub product_id: ProductId,
    pub quantity: u64,
}

impl StockRequest {
    pub fn new(product_id: ProductId, quantity: u64) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(Self {
            product_id,
            quantity,
        })
    }
}

/// Sum quantities per product, keeping first-appearance order.
pub fn consolidate(requests: &[StockRequest]) -> Vec<StockRequest> {
    let mut totals: Vec<StockRequest> = Vec::with_capacity(requests.len());
    for req in requests {
        match totals.iter_mut().find(|t| t.product_id == req.product_id) {
            Some(total) => total.quantity = total.quantity.saturating_add(req.quantity),
            None => totals.push(*req),
        }
    }
    totals
}

/// Validate every request before any stock is taken.
///
/// Lines are checked in order; a product appearing on several lines is charged
/// cumulatively, so `available` in an `InsufficientStock` error is what is left
/// after the earlier lines of the same order. On success returns the
/// consolidated per-product totals to decrement.
pub fn plan_reservation<'p>(
    requests: &[StockRequest],
    lookup: impl Fn(ProductId) -> Option<&'p Product>,
) -> DomainResult<Vec<StockRequest>> {
    let mut claimed: Vec<StockRequest> = Vec::new();

    for req in requests {
        if req.quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let product = lookup(req.product_id).ok_or(DomainError::not_found("product"))?;

        let already = claimed
            .iter()
            .find(|c| c.product_id == req.product_id)
            .map(|c| c.quantity)
            .unwrap_or(0);
        let available = product.stock.saturating_sub(already);

        if req.quantity > available {
            return Err(DomainError::insufficient_stock(
                product.name.clone(),
                req.quantity,
                available,
            ));
        }

        match claimed.iter_mut().find(|c| c.product_id == req.product_id) {
            Some(c) => c.quantity += req.quantity,
            None => claimed.push(*req),
        }
    }

    Ok(claimed)
}
