//! Sales analytics over completed orders.
//!
//! Pure aggregation: callers hand in the orders and join the ranked keys with
//! client/seller details themselves. Ranking is by summed `total`, descending,
//! with ties broken by ascending key so results are stable.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use sellerdesk_core::{ClientId, SellerId};
use sellerdesk_sales::{Order, OrderState};

/// How many sellers the top-sellers report keeps.
pub const TOP_SELLERS_LIMIT: usize = 3;

/// One group of the revenue ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ranked<K> {
    pub key: K,
    pub total: u64,
}

/// Group completed orders by `key`, sum totals, sort descending.
pub fn revenue_by<'a, K, I, F>(orders: I, key: F) -> Vec<Ranked<K>>
where
    K: Copy + Eq + Hash + Ord,
    I: IntoIterator<Item = &'a Order>,
    F: Fn(&Order) -> K,
{
    let mut totals: HashMap<K, u64> = HashMap::new();
    for order in orders {
        if order.state != OrderState::Completed {
            continue;
        }
        let sum = totals.entry(key(order)).or_insert(0);
        *sum = sum.saturating_add(order.total);
    }

    let mut ranked: Vec<Ranked<K>> = totals
        .into_iter()
        .map(|(key, total)| Ranked { key, total })
        .collect();
    ranked.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.key.cmp(&b.key)));
    ranked
}

/// Every client with completed orders, ranked by spend.
pub fn top_clients<'a, I>(orders: I) -> Vec<Ranked<ClientId>>
where
    I: IntoIterator<Item = &'a Order>,
{
    revenue_by(orders, |o| o.client)
}

/// The `limit` best sellers by revenue. Sorted over all sellers first, then cut.
pub fn top_sellers<'a, I>(orders: I, limit: usize) -> Vec<Ranked<SellerId>>
where
    I: IntoIterator<Item = &'a Order>,
{
    let mut ranked = revenue_by(orders, |o| o.seller());
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;

    use sellerdesk_core::{OrderId, ProductId};
    use sellerdesk_sales::OrderLine;

    use super::*;

    fn order(seller: SellerId, client: ClientId, total: u64, state: OrderState) -> Order {
        Order::restore(
            OrderId::new(),
            seller,
            client,
            vec![OrderLine {
                product_id: ProductId::new(),
                quantity: 1,
            }],
            total,
            state,
            Utc::now(),
        )
    }

    #[test]
    fn top_sellers_sorts_before_limiting() {
        let sellers: Vec<SellerId> = (0..4).map(|_| SellerId::new()).collect();
        let client = ClientId::new();
        // Lowest revenue first, so cutting before sorting would keep the wrong three.
        let orders = vec![
            order(sellers[3], client, 10, OrderState::Completed),
            order(sellers[2], client, 30, OrderState::Completed),
            order(sellers[1], client, 50, OrderState::Completed),
            order(sellers[0], client, 100, OrderState::Completed),
        ];

        let top = top_sellers(&orders, TOP_SELLERS_LIMIT);
        assert_eq!(
            top,
            vec![
                Ranked { key: sellers[0], total: 100 },
                Ranked { key: sellers[1], total: 50 },
                Ranked { key: sellers[2], total: 30 },
            ]
        );
    }

    #[test]
    fn only_completed_orders_count() {
        let seller = SellerId::new();
        let a = ClientId::new();
        let b = ClientId::new();
        let orders = vec![
            order(seller, a, 40, OrderState::Completed),
            order(seller, a, 15, OrderState::Completed),
            order(seller, b, 900, OrderState::Pending),
            order(seller, b, 900, OrderState::Cancelled),
            order(seller, b, 20, OrderState::Completed),
        ];

        assert_eq!(
            top_clients(&orders),
            vec![Ranked { key: a, total: 55 }, Ranked { key: b, total: 20 }]
        );
    }

    #[test]
    fn top_clients_has_no_limit() {
        let seller = SellerId::new();
        let orders: Vec<Order> = (0..7)
            .map(|i| order(seller, ClientId::new(), i * 10, OrderState::Completed))
            .collect();
        assert_eq!(top_clients(&orders).len(), 7);
    }

    #[test]
    fn empty_input_yields_empty_reports() {
        let orders: Vec<Order> = Vec::new();
        assert!(top_clients(&orders).is_empty());
        assert!(top_sellers(&orders, TOP_SELLERS_LIMIT).is_empty());
    }

    proptest! {
        /// Property: the ranking is sorted descending and preserves the grand total.
        #[test]
        fn ranking_is_sorted_and_conserves_revenue(
            rows in proptest::collection::vec((0usize..5, 0u64..1_000, any::<bool>()), 0..40)
        ) {
            let sellers: Vec<SellerId> = (0..5).map(|_| SellerId::new()).collect();
            let orders: Vec<Order> = rows
                .iter()
                .map(|(s, total, done)| {
                    let state = if *done { OrderState::Completed } else { OrderState::Pending };
                    order(sellers[*s], ClientId::new(), *total, state)
                })
                .collect();

            let ranked = revenue_by(&orders, |o| o.seller());
            prop_assert!(ranked.windows(2).all(|w| w[0].total >= w[1].total));

            let expected: u64 = orders
                .iter()
                .filter(|o| o.state == OrderState::Completed)
                .map(|o| o.total)
                .sum();
            prop_assert_eq!(ranked.iter().map(|r| r.total).sum::<u64>(), expected);

            let top = top_sellers(&orders, TOP_SELLERS_LIMIT);
            prop_assert_eq!(&top[..], &ranked[..ranked.len().min(TOP_SELLERS_LIMIT)]);
        }
    }
}
