//! Postgres-backed stores.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | Result |
//! |------------|----------------------|--------|
//! | Database (unique violation on `clients.email`) | `23505` | `DomainError::AlreadyExists` |
//! | Database (check constraint violation) | `23514` | `StoreError::Database` |
//! | Database (other) | Any other | `StoreError::Database` |
//! | PoolClosed / other | N/A | `StoreError::Database` |
//!
//! ## Stock Reservation
//!
//! `reserve_all` locks every referenced product row (`SELECT ... FOR UPDATE`,
//! ordered by id so concurrent reservations cannot deadlock), plans the
//! reservation against the locked snapshot and only then decrements. A failed
//! plan rolls the transaction back, so no row is touched.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use tracing::instrument;
use uuid::Uuid;

use sellerdesk_catalog::{Product, ProductPatch, StockRequest, consolidate, plan_reservation};
use sellerdesk_clients::Client;
use sellerdesk_core::{ClientId, DomainError, OrderId, ProductId, Seller, SellerId};
use sellerdesk_sales::{Order, OrderLine, OrderState};

use super::{CatalogStore, ClientStore, OrderStore, SellerDirectory};
use crate::error::{ServiceError, ServiceResult, StoreError, StoreResult};

/// Open a pool and bring the schema up to date.
pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| StoreError::Database {
            operation: "migrate",
            message: e.to_string(),
        })?;

    tracing::info!(max_connections, "postgres pool ready");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, stock, price, created_at";

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn insert(&self, product: Product) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, stock, price, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(to_db(product.stock, "stock")?)
        .bind(to_db(product.price, "price")?)
        .bind(product.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;
        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;
        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn search(&self, text: &str, limit: usize) -> StoreResult<Vec<Product>> {
        let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE lower(name) LIKE $1 ESCAPE '\'
            ORDER BY name, id
            LIMIT $2
            "#
        ))
        .bind(pattern)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("search_products", e))?;
        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self, patch), fields(product_id = %id), err)]
    async fn update(&self, id: ProductId, patch: ProductPatch) -> ServiceResult<Option<Product>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("lock_product", e))?;

        let Some(row) = row else {
            tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
            return Ok(None);
        };
        let mut product = product_from_row(&row)?;
        if let Err(err) = product.apply_patch(patch) {
            tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(err.into());
        }

        sqlx::query("UPDATE products SET name = $2, stock = $3, price = $4 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(&product.name)
            .bind(to_db(product.stock, "stock")?)
            .bind(to_db(product.price, "price")?)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_product", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(Some(product))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(product_id = %request.product_id, quantity = request.quantity), err)]
    async fn reserve(&self, request: StockRequest) -> ServiceResult<()> {
        self.reserve_all(std::slice::from_ref(&request)).await
    }

    #[instrument(skip(self, requests), fields(lines = requests.len()), err)]
    async fn reserve_all(&self, requests: &[StockRequest]) -> ServiceResult<()> {
        let mut ids: Vec<Uuid> = requests.iter().map(|r| r.product_id.as_uuid()).collect();
        ids.sort();
        ids.dedup();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE"
        ))
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("lock_products", e))?;

        let mut snapshot = HashMap::with_capacity(rows.len());
        for row in &rows {
            let product = product_from_row(row)?;
            snapshot.insert(product.id, product);
        }

        let totals = match plan_reservation(requests, |id| snapshot.get(&id)) {
            Ok(totals) => totals,
            Err(err) => {
                tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(err.into());
            }
        };

        for total in &totals {
            sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1")
                .bind(total.product_id.as_uuid())
                .bind(to_db(total.quantity, "quantity")?)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("reserve_stock", e))?;
        }

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(())
    }

    #[instrument(skip(self, requests), fields(lines = requests.len()), err)]
    async fn release_all(&self, requests: &[StockRequest]) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        for req in consolidate(requests) {
            sqlx::query("UPDATE products SET stock = stock + $2 WHERE id = $1")
                .bind(req.product_id.as_uuid())
                .bind(to_db(req.quantity, "quantity")?)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("release_stock", e))?;
        }
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(())
    }
}

fn product_from_row(row: &PgRow) -> StoreResult<Product> {
    Ok(Product {
        id: ProductId::from_uuid(column(row, "products", "id")?),
        name: column(row, "products", "name")?,
        stock: from_db(column(row, "products", "stock")?, "products", "stock")?,
        price: from_db(column(row, "products", "price")?, "products", "price")?,
        created_at: column(row, "products", "created_at")?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Clients
// ─────────────────────────────────────────────────────────────────────────────

pub struct PostgresClientStore {
    pool: PgPool,
}

impl PostgresClientStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_many(&self, operation: &'static str, seller: Option<SellerId>) -> StoreResult<Vec<Client>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {CLIENT_COLUMNS} FROM clients
            WHERE ($1::uuid IS NULL OR seller_id = $1)
            ORDER BY created_at, id
            "#
        ))
        .bind(seller.map(|s| s.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(operation, e))?;
        rows.iter().map(client_from_row).collect()
    }
}

const CLIENT_COLUMNS: &str = "id, seller_id, name, last_name, company, email, phone, created_at";

fn duplicate_email(email: &str) -> ServiceError {
    DomainError::already_exists(format!("client with email {email} is already registered")).into()
}

#[async_trait]
impl ClientStore for PostgresClientStore {
    #[instrument(skip(self, client), fields(client_id = %client.id), err)]
    async fn insert(&self, client: Client) -> ServiceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO clients (id, seller_id, name, last_name, company, email, phone, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(client.id.as_uuid())
        .bind(client.seller().as_uuid())
        .bind(&client.name)
        .bind(&client.last_name)
        .bind(&client.company)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(client.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_email(&client.email)
            } else {
                map_sqlx_error("insert_client", e).into()
            }
        })?;
        Ok(())
    }

    #[instrument(skip(self), fields(client_id = %id), err)]
    async fn get(&self, id: ClientId) -> StoreResult<Option<Client>> {
        let row = sqlx::query(&format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_client", e))?;
        row.as_ref().map(client_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Client>> {
        let row = sqlx::query(&format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_client_by_email", e))?;
        row.as_ref().map(client_from_row).transpose()
    }

    async fn list(&self) -> StoreResult<Vec<Client>> {
        self.fetch_many("list_clients", None).await
    }

    async fn list_by_seller(&self, seller: SellerId) -> StoreResult<Vec<Client>> {
        self.fetch_many("list_clients_by_seller", Some(seller)).await
    }

    #[instrument(skip(self, client), fields(client_id = %client.id), err)]
    async fn replace(&self, client: Client) -> ServiceResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET name = $2, last_name = $3, company = $4, email = $5, phone = $6
            WHERE id = $1
            "#,
        )
        .bind(client.id.as_uuid())
        .bind(&client.name)
        .bind(&client.last_name)
        .bind(&client.company)
        .bind(&client.email)
        .bind(&client.phone)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_email(&client.email)
            } else {
                map_sqlx_error("update_client", e).into()
            }
        })?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(client_id = %id), err)]
    async fn delete(&self, id: ClientId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_client", e))?;
        Ok(result.rows_affected() > 0)
    }
}

fn client_from_row(row: &PgRow) -> StoreResult<Client> {
    Ok(Client::restore(
        ClientId::from_uuid(column(row, "clients", "id")?),
        SellerId::from_uuid(column(row, "clients", "seller_id")?),
        column(row, "clients", "name")?,
        column(row, "clients", "last_name")?,
        column(row, "clients", "company")?,
        column(row, "clients", "email")?,
        column(row, "clients", "phone")?,
        column(row, "clients", "created_at")?,
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Orders
// ─────────────────────────────────────────────────────────────────────────────

pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_many(
        &self,
        operation: &'static str,
        seller: Option<SellerId>,
        state: Option<OrderState>,
    ) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE ($1::uuid IS NULL OR seller_id = $1)
              AND ($2::text IS NULL OR state = $2)
            ORDER BY created_at, id
            "#
        ))
        .bind(seller.map(|s| s.as_uuid()))
        .bind(state.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(operation, e))?;
        rows.iter().map(order_from_row).collect()
    }
}

const ORDER_COLUMNS: &str = "id, seller_id, client_id, lines, total, state, created_at";

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[instrument(skip(self, order), fields(order_id = %order.id), err)]
    async fn insert(&self, order: Order) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, seller_id, client_id, lines, total, state, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.seller().as_uuid())
        .bind(order.client.as_uuid())
        .bind(Json(&order.lines))
        .bind(to_db(order.total, "total")?)
        .bind(order.state.as_str())
        .bind(order.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(order_id = %id), err)]
    async fn get(&self, id: OrderId) -> StoreResult<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_order", e))?;
        row.as_ref().map(order_from_row).transpose()
    }

    async fn list(&self) -> StoreResult<Vec<Order>> {
        self.fetch_many("list_orders", None, None).await
    }

    async fn list_by_seller(
        &self,
        seller: SellerId,
        state: Option<OrderState>,
    ) -> StoreResult<Vec<Order>> {
        self.fetch_many("list_orders_by_seller", Some(seller), state).await
    }

    async fn list_by_state(&self, state: OrderState) -> StoreResult<Vec<Order>> {
        self.fetch_many("list_orders_by_state", None, Some(state)).await
    }

    #[instrument(skip(self, order), fields(order_id = %order.id), err)]
    async fn replace_if(&self, order: Order, expected: OrderState) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET client_id = $2, lines = $3, total = $4, state = $5
            WHERE id = $1 AND state = $6
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.client.as_uuid())
        .bind(Json(&order.lines))
        .bind(to_db(order.total, "total")?)
        .bind(order.state.as_str())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_order", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(order_id = %id), err)]
    async fn delete(&self, id: OrderId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_order", e))?;
        Ok(result.rows_affected() > 0)
    }
}

fn order_from_row(row: &PgRow) -> StoreResult<Order> {
    let Json(lines): Json<Vec<OrderLine>> = column(row, "orders", "lines")?;
    let state: String = column(row, "orders", "state")?;
    let state = state.parse::<OrderState>().map_err(|e| StoreError::CorruptRow {
        table: "orders",
        message: e.to_string(),
    })?;
    Ok(Order::restore(
        OrderId::from_uuid(column(row, "orders", "id")?),
        SellerId::from_uuid(column(row, "orders", "seller_id")?),
        ClientId::from_uuid(column(row, "orders", "client_id")?),
        lines,
        from_db(column(row, "orders", "total")?, "orders", "total")?,
        state,
        column(row, "orders", "created_at")?,
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Sellers
// ─────────────────────────────────────────────────────────────────────────────

pub struct PostgresSellerDirectory {
    pool: PgPool,
}

impl PostgresSellerDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SellerDirectory for PostgresSellerDirectory {
    #[instrument(skip(self, seller), fields(seller_id = %seller.id), err)]
    async fn record(&self, seller: Seller) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sellers (id, name, last_name, email)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                last_name = EXCLUDED.last_name,
                email = EXCLUDED.email,
                seen_at = NOW()
            "#,
        )
        .bind(seller.id.as_uuid())
        .bind(&seller.name)
        .bind(&seller.last_name)
        .bind(&seller.email)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("record_seller", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(seller_id = %id), err)]
    async fn get(&self, id: SellerId) -> StoreResult<Option<Seller>> {
        let row = sqlx::query("SELECT id, name, last_name, email FROM sellers WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_seller", e))?;
        row.as_ref()
            .map(|row| {
                Ok(Seller {
                    id: SellerId::from_uuid(column(row, "sellers", "id")?),
                    name: column(row, "sellers", "name")?,
                    last_name: column(row, "sellers", "last_name")?,
                    email: column(row, "sellers", "email")?,
                })
            })
            .transpose()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn column<'r, T>(row: &'r PgRow, table: &'static str, name: &str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name).map_err(|e| StoreError::CorruptRow {
        table,
        message: format!("{name}: {e}"),
    })
}

fn to_db(value: u64, field: &'static str) -> StoreResult<i64> {
    i64::try_from(value).map_err(|_| StoreError::Database {
        operation: "bind",
        message: format!("{field} {value} exceeds the BIGINT range"),
    })
}

fn from_db(value: i64, table: &'static str, field: &str) -> StoreResult<u64> {
    u64::try_from(value).map_err(|_| StoreError::CorruptRow {
        table,
        message: format!("{field} is negative ({value})"),
    })
}

fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    let message = match err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => format!("{} (code {code})", db_err.message()),
            None => db_err.message().to_string(),
        },
        sqlx::Error::PoolClosed => "connection pool closed".to_string(),
        other => other.to_string(),
    };
    StoreError::Database { operation, message }
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("cable"), "cable");
    }
}
