use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sellerdesk_catalog::StockRequest;
use sellerdesk_core::{ClientId, DomainError, DomainResult, Entity, OrderId, Owned, ProductId, SellerId};

/// Order state label.
///
/// Not a workflow: any state may follow any other. The only behaviour attached
/// to it is that a cancelled order holds no stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Pending => "pending",
            OrderState::Completed => "completed",
            OrderState::Cancelled => "cancelled",
        }
    }

    pub fn holds_stock(&self) -> bool {
        !matches!(self, OrderState::Cancelled)
    }
}

impl core::fmt::Display for OrderState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(OrderState::Pending),
            "completed" | "complete" => Ok(OrderState::Completed),
            "cancelled" | "canceled" => Ok(OrderState::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown order state '{other}' (expected pending, completed or cancelled)"
            ))),
        }
    }
}

/// Order line: product reference and quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u64,
}

impl OrderLine {
    /// Build a line from untrusted input.
    pub fn new(product_id: ProductId, quantity: i64) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(Self {
            product_id,
            quantity: quantity as u64,
        })
    }

    pub fn stock_request(&self) -> StockRequest {
        StockRequest {
            product_id: self.product_id,
            quantity: self.quantity,
        }
    }
}

/// An order placed by a seller for one of its clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    seller: SellerId,
    pub client: ClientId,
    pub lines: Vec<OrderLine>,
    /// Total in smallest currency unit, as supplied by the seller.
    pub total: u64,
    pub state: OrderState,
    pub created_at: DateTime<Utc>,
}

/// Input for placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub client: ClientId,
    pub lines: Vec<OrderLine>,
    pub total: u64,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPatch {
    pub client: Option<ClientId>,
    pub lines: Option<Vec<OrderLine>>,
    pub total: Option<u64>,
    pub state: Option<OrderState>,
}

/// Stock movement implied by an order change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockChange {
    None,
    Reserve(Vec<StockRequest>),
    Release(Vec<StockRequest>),
}

impl Order {
    pub fn place(
        id: OrderId,
        seller: SellerId,
        input: NewOrder,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        validate_lines(&input.lines)?;
        Ok(Self {
            id,
            seller,
            client: input.client,
            lines: input.lines,
            total: input.total,
            state: OrderState::Pending,
            created_at: now,
        })
    }

    /// Rebuild a stored order (persistence adapters only).
    pub fn restore(
        id: OrderId,
        seller: SellerId,
        client: ClientId,
        lines: Vec<OrderLine>,
        total: u64,
        state: OrderState,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            seller,
            client,
            lines,
            total,
            state,
            created_at,
        }
    }

    pub fn seller(&self) -> SellerId {
        self.seller
    }

    pub fn stock_requests(&self) -> Vec<StockRequest> {
        self.lines.iter().map(OrderLine::stock_request).collect()
    }

    /// Apply a patch, returning the updated copy. `self` is untouched.
    pub fn patched(&self, patch: &OrderPatch) -> DomainResult<Self> {
        let mut next = self.clone();
        if let Some(client) = patch.client {
            next.client = client;
        }
        if let Some(lines) = &patch.lines {
            validate_lines(lines)?;
            next.lines = lines.clone();
        }
        if let Some(total) = patch.total {
            next.total = total;
        }
        if let Some(state) = patch.state {
            next.state = state;
        }
        Ok(next)
    }

    /// Decide the stock movement for replacing `self` with `next`.
    ///
    /// - still holding stock, new lines supplied: reserve the new lines (the old
    ///   reservation is kept, not returned first)
    /// - moving into `cancelled`: release the lines that were held
    /// - moving out of `cancelled`: reserve the lines the order will hold
    pub fn stock_change_to(&self, next: &Order, lines_supplied: bool) -> StockChange {
        match (self.state.holds_stock(), next.state.holds_stock()) {
            (true, true) if lines_supplied => StockChange::Reserve(next.stock_requests()),
            (true, true) => StockChange::None,
            (true, false) => StockChange::Release(self.stock_requests()),
            (false, true) => StockChange::Reserve(next.stock_requests()),
            (false, false) => StockChange::None,
        }
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> OrderId {
        self.id
    }
}

impl Owned for Order {
    fn owner(&self) -> SellerId {
        self.seller
    }
}

fn validate_lines(lines: &[OrderLine]) -> DomainResult<()> {
    if lines.is_empty() {
        return Err(DomainError::validation("an order needs at least one line"));
    }
    if lines.iter().any(|l| l.quantity == 0) {
        return Err(DomainError::validation("quantity must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i64) -> OrderLine {
        OrderLine::new(ProductId::new(), quantity).unwrap()
    }

    fn placed(lines: Vec<OrderLine>) -> Order {
        Order::place(
            OrderId::new(),
            SellerId::new(),
            NewOrder {
                client: ClientId::new(),
                lines,
                total: 500,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        assert!(matches!(
            OrderLine::new(ProductId::new(), 0),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            OrderLine::new(ProductId::new(), -3),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn place_requires_lines_and_starts_pending() {
        let err = Order::place(
            OrderId::new(),
            SellerId::new(),
            NewOrder {
                client: ClientId::new(),
                lines: vec![],
                total: 0,
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let order = placed(vec![line(2)]);
        assert_eq!(order.state, OrderState::Pending);
    }

    #[test]
    fn lines_keep_insertion_order() {
        let lines = vec![line(3), line(1), line(2)];
        let order = placed(lines.clone());
        let quantities: Vec<u64> = order.stock_requests().iter().map(|r| r.quantity).collect();
        assert_eq!(quantities, vec![3, 1, 2]);
        assert_eq!(order.lines, lines);
    }

    #[test]
    fn patch_never_changes_seller() {
        let order = placed(vec![line(1)]);
        let next = order
            .patched(&OrderPatch {
                client: Some(ClientId::new()),
                state: Some(OrderState::Completed),
                ..OrderPatch::default()
            })
            .unwrap();
        assert_eq!(next.seller(), order.seller());
        assert_eq!(next.state, OrderState::Completed);
    }

    #[test]
    fn state_parsing_accepts_legacy_spelling() {
        assert_eq!("Complete".parse::<OrderState>().unwrap(), OrderState::Completed);
        assert_eq!("CANCELLED".parse::<OrderState>().unwrap(), OrderState::Cancelled);
        assert!("shipped".parse::<OrderState>().is_err());
    }

    #[test]
    fn stock_change_follows_state_and_lines() {
        let order = placed(vec![line(2)]);
        let new_lines = vec![line(5)];

        let with_lines = order
            .patched(&OrderPatch {
                lines: Some(new_lines.clone()),
                ..OrderPatch::default()
            })
            .unwrap();
        assert_eq!(
            order.stock_change_to(&with_lines, true),
            StockChange::Reserve(vec![new_lines[0].stock_request()])
        );

        let completed = order
            .patched(&OrderPatch {
                state: Some(OrderState::Completed),
                ..OrderPatch::default()
            })
            .unwrap();
        assert_eq!(order.stock_change_to(&completed, false), StockChange::None);

        let cancelled = order
            .patched(&OrderPatch {
                state: Some(OrderState::Cancelled),
                lines: Some(new_lines.clone()),
                ..OrderPatch::default()
            })
            .unwrap();
        assert_eq!(
            order.stock_change_to(&cancelled, true),
            StockChange::Release(order.stock_requests())
        );

        let revived = cancelled
            .patched(&OrderPatch {
                state: Some(OrderState::Pending),
                ..OrderPatch::default()
            })
            .unwrap();
        assert_eq!(
            cancelled.stock_change_to(&revived, false),
            StockChange::Reserve(revived.stock_requests())
        );
        assert_eq!(cancelled.stock_change_to(&cancelled, true), StockChange::None);
    }
}
