use serde::Deserialize;

use sellerdesk_catalog::{NewProduct, ProductPatch};
use sellerdesk_clients::{ClientPatch, NewClient};
use sellerdesk_core::{ClientId, DomainError, ProductId};
use sellerdesk_sales::{NewOrder, OrderLine, OrderPatch, OrderState};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub stock: i64,
    pub price: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub stock: Option<i64>,
    pub price: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    #[serde(alias = "lastName")]
    pub last_name: String,
    pub company: Option<String>,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    #[serde(alias = "lastName")]
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    #[serde(alias = "productId", alias = "product")]
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(alias = "clientId", alias = "client")]
    pub client_id: String,
    pub lines: Vec<OrderLineRequest>,
    pub total: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(alias = "clientId", alias = "client")]
    pub client_id: Option<String>,
    pub lines: Option<Vec<OrderLineRequest>>,
    pub total: Option<i64>,
    pub state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StateQuery {
    pub state: Option<String>,
}

// -------------------------
// Request → domain mapping
// -------------------------

type Mapped<T> = Result<T, axum::response::Response>;

fn non_negative(value: i64, field: &'static str) -> Mapped<u64> {
    u64::try_from(value).map_err(|_| {
        errors::domain_error_to_response(DomainError::validation(format!(
            "{field} must not be negative"
        )))
    })
}

fn non_negative_opt(value: Option<i64>, field: &'static str) -> Mapped<Option<u64>> {
    value.map(|v| non_negative(v, field)).transpose()
}

pub fn parse_state(raw: &str) -> Mapped<OrderState> {
    raw.parse().map_err(errors::domain_error_to_response)
}

impl CreateProductRequest {
    pub fn into_domain(self) -> Mapped<NewProduct> {
        Ok(NewProduct {
            name: self.name,
            stock: non_negative(self.stock, "stock")?,
            price: non_negative(self.price, "price")?,
        })
    }
}

impl UpdateProductRequest {
    pub fn into_domain(self) -> Mapped<ProductPatch> {
        Ok(ProductPatch {
            name: self.name,
            stock: non_negative_opt(self.stock, "stock")?,
            price: non_negative_opt(self.price, "price")?,
        })
    }
}

impl From<CreateClientRequest> for NewClient {
    fn from(body: CreateClientRequest) -> Self {
        NewClient {
            name: body.name,
            last_name: body.last_name,
            company: body.company,
            email: body.email,
            phone: body.phone,
        }
    }
}

impl From<UpdateClientRequest> for ClientPatch {
    fn from(body: UpdateClientRequest) -> Self {
        ClientPatch {
            name: body.name,
            last_name: body.last_name,
            company: body.company,
            email: body.email,
            phone: body.phone,
        }
    }
}

fn lines_into_domain(lines: Vec<OrderLineRequest>) -> Mapped<Vec<OrderLine>> {
    lines
        .into_iter()
        .map(|line| {
            let product_id: ProductId = errors::parse_id(&line.product_id, "product")?;
            OrderLine::new(product_id, line.quantity).map_err(errors::domain_error_to_response)
        })
        .collect()
}

impl CreateOrderRequest {
    pub fn into_domain(self) -> Mapped<NewOrder> {
        let client: ClientId = errors::parse_id(&self.client_id, "client")?;
        Ok(NewOrder {
            client,
            lines: lines_into_domain(self.lines)?,
            total: non_negative(self.total, "total")?,
        })
    }
}

impl UpdateOrderRequest {
    pub fn into_domain(self) -> Mapped<OrderPatch> {
        let client = self
            .client_id
            .as_deref()
            .map(|raw| errors::parse_id::<ClientId>(raw, "client"))
            .transpose()?;
        Ok(OrderPatch {
            client,
            lines: self.lines.map(lines_into_domain).transpose()?,
            total: non_negative_opt(self.total, "total")?,
            state: self.state.as_deref().map(parse_state).transpose()?,
        })
    }
}
