//! End-to-end tests of the services over the in-memory stores.
//!
//! Verifies:
//! - Stock never goes negative under concurrent order placement
//! - Failed orders leave stock and the order table untouched
//! - Racing cancels and reopens of one order move its stock exactly once per transition
//! - Ownership is enforced across services

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;

    use sellerdesk_catalog::{NewProduct, Product};
    use sellerdesk_clients::NewClient;
    use sellerdesk_core::{ClientId, DomainError, SellerId};
    use sellerdesk_sales::{NewOrder, OrderLine, OrderPatch, OrderState};

    use crate::services::{CatalogService, ClientRegistry, OrderEngine, ReportingService};
    use crate::store::Stores;

    struct App {
        catalog: CatalogService,
        clients: ClientRegistry,
        orders: OrderEngine,
        reports: ReportingService,
    }

    fn setup() -> App {
        let stores = Stores::in_memory();
        let clients = ClientRegistry::new(stores.clients.clone());
        App {
            catalog: CatalogService::new(stores.catalog.clone()),
            orders: OrderEngine::new(stores.catalog.clone(), clients.clone(), stores.orders.clone()),
            reports: ReportingService::new(stores.orders, stores.clients, stores.sellers),
            clients,
        }
    }

    async fn seed(app: &App, stock: u64) -> (SellerId, ClientId, Product) {
        let seller = SellerId::new();
        let client = app
            .clients
            .create(
                seller,
                NewClient {
                    name: "Ann".to_string(),
                    last_name: "Lee".to_string(),
                    company: None,
                    email: format!("{}@x.io", ClientId::new()),
                    phone: None,
                },
            )
            .await
            .unwrap();
        let product = app
            .catalog
            .create(NewProduct {
                name: "Widget".to_string(),
                stock,
                price: 100,
            })
            .await
            .unwrap();
        (seller, client.id, product)
    }

    fn order_of(client: ClientId, product: &Product, quantity: i64) -> NewOrder {
        NewOrder {
            client,
            lines: vec![OrderLine::new(product.id, quantity).unwrap()],
            total: 100 * quantity as u64,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_orders_of_six_and_seven_against_ten() {
        let app = Arc::new(setup());
        let (seller, client, product) = seed(&app, 10).await;

        let a = {
            let app = app.clone();
            let input = order_of(client, &product, 6);
            tokio::spawn(async move { app.orders.place(seller, input).await })
        };
        let b = {
            let app = app.clone();
            let input = order_of(client, &product, 7);
            tokio::spawn(async move { app.orders.place(seller, input).await })
        };
        let results = [a.await.unwrap(), b.await.unwrap()];

        let placed: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(placed.len(), 1, "exactly one order must win");

        let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert!(matches!(
            loser.domain(),
            Some(DomainError::InsufficientStock { available, .. }) if *available == 10 - placed[0].lines[0].quantity
        ));

        let left = app.catalog.get(product.id).await.unwrap().stock;
        assert_eq!(left, 10 - placed[0].lines[0].quantity);
        assert_eq!(app.orders.list_mine(seller, None).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn many_concurrent_orders_never_oversell() {
        let app = Arc::new(setup());
        let (seller, client, product) = seed(&app, 50).await;

        let mut handles = Vec::new();
        for i in 0..40 {
            let app = app.clone();
            let input = order_of(client, &product, (i % 3) + 1);
            handles.push(tokio::spawn(async move { app.orders.place(seller, input).await }));
        }

        let mut sold = 0;
        for handle in handles {
            if let Ok(order) = handle.await.unwrap() {
                sold += order.lines[0].quantity;
            }
        }

        let left = app.catalog.get(product.id).await.unwrap().stock;
        assert_eq!(left + sold, 50);
        let recorded: u64 = app
            .orders
            .list_mine(seller, None)
            .await
            .unwrap()
            .iter()
            .map(|o| o.lines[0].quantity)
            .sum();
        assert_eq!(recorded, sold);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn racing_cancels_and_reopens_conserve_stock() {
        let app = Arc::new(setup());
        let (seller, client, product) = seed(&app, 20).await;
        let id = app.orders.place(seller, order_of(client, &product, 6)).await.unwrap().id;

        let mut toggles = Vec::new();
        for i in 0..32 {
            let app = app.clone();
            let state = match i % 3 {
                0 => OrderState::Cancelled,
                1 => OrderState::Pending,
                _ => OrderState::Completed,
            };
            let patch = OrderPatch {
                state: Some(state),
                ..OrderPatch::default()
            };
            toggles.push(tokio::spawn(async move { app.orders.update(seller, id, patch).await }));
        }
        let mut placements = Vec::new();
        for _ in 0..8 {
            let app = app.clone();
            let input = order_of(client, &product, 2);
            placements.push(tokio::spawn(async move { app.orders.place(seller, input).await }));
        }

        for handle in toggles {
            if let Err(err) = handle.await.unwrap() {
                assert!(matches!(
                    err.domain(),
                    Some(DomainError::Conflict(_) | DomainError::InsufficientStock { .. })
                ));
            }
        }
        let mut sold = 0;
        for handle in placements {
            if let Ok(placed) = handle.await.unwrap() {
                sold += placed.lines[0].quantity;
            }
        }

        let held = if app.orders.get(seller, id).await.unwrap().state.holds_stock() {
            6
        } else {
            0
        };
        let left = app.catalog.get(product.id).await.unwrap().stock;
        assert_eq!(left + held + sold, 20);
    }

    #[tokio::test]
    async fn completed_orders_feed_reports() {
        let app = setup();
        let (seller, client, product) = seed(&app, 10).await;

        let first = app.orders.place(seller, order_of(client, &product, 2)).await.unwrap();
        app.orders.place(seller, order_of(client, &product, 1)).await.unwrap();
        app.orders
            .update(
                seller,
                first.id,
                OrderPatch {
                    state: Some(OrderState::Completed),
                    ..OrderPatch::default()
                },
            )
            .await
            .unwrap();

        let clients = app.reports.top_clients().await.unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!((clients[0].client_id, clients[0].total), (client, 200));

        let sellers = app.reports.top_sellers().await.unwrap();
        assert_eq!((sellers[0].seller_id, sellers[0].total), (seller, 200));
        // Nobody recorded the seller's profile in this setup.
        assert_eq!(sellers[0].seller, None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn sequential_orders_conserve_stock(
            stock in 0u64..30,
            quantities in prop::collection::vec(1i64..8, 1..12),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let app = setup();
                let (seller, client, product) = seed(&app, stock).await;

                let mut sold = 0u64;
                for q in &quantities {
                    let before = app.catalog.get(product.id).await.unwrap().stock;
                    match app.orders.place(seller, order_of(client, &product, *q)).await {
                        Ok(_) => sold += *q as u64,
                        Err(err) => {
                            prop_assert_eq!(
                                err.domain(),
                                Some(&DomainError::insufficient_stock("Widget", *q as u64, before))
                            );
                        }
                    }
                }

                let left = app.catalog.get(product.id).await.unwrap().stock;
                prop_assert_eq!(left + sold, stock);
                Ok::<(), TestCaseError>(())
            })?;
        }
    }
}
