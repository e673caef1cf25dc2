use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sellerdesk_core::{ClientId, DomainError, DomainResult, Entity, Owned, SellerId};

/// A seller's client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub last_name: String,
    pub company: Option<String>,
    /// Normalized (trimmed, lowercase); unique across the registry.
    pub email: String,
    pub phone: Option<String>,
    seller: SellerId,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a client. The owner comes from the caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub email: String,
    pub phone: Option<String>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Client {
    pub fn register(
        id: ClientId,
        seller: SellerId,
        input: NewClient,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: required("name", &input.name)?,
            last_name: required("last_name", &input.last_name)?,
            company: optional(input.company),
            email: normalize_email(&input.email)?,
            phone: optional(input.phone),
            seller,
            created_at: now,
        })
    }

    /// Rebuild a stored client (persistence adapters only).
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: ClientId,
        seller: SellerId,
        name: String,
        last_name: String,
        company: Option<String>,
        email: String,
        phone: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            last_name,
            company,
            email,
            phone,
            seller,
            created_at,
        }
    }

    pub fn seller(&self) -> SellerId {
        self.seller
    }

    /// Apply a patch, returning the updated copy. `self` is untouched on error.
    pub fn patched(&self, patch: ClientPatch) -> DomainResult<Self> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = required("name", &name)?;
        }
        if let Some(last_name) = patch.last_name {
            next.last_name = required("last_name", &last_name)?;
        }
        if let Some(email) = patch.email {
            next.email = normalize_email(&email)?;
        }
        if patch.company.is_some() {
            next.company = optional(patch.company);
        }
        if patch.phone.is_some() {
            next.phone = optional(patch.phone);
        }
        Ok(next)
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> ClientId {
        self.id
    }
}

impl Owned for Client {
    fn owner(&self) -> SellerId {
        self.seller
    }
}

/// Trim + lowercase an email and check its basic shape.
pub fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(email)
        }
        _ => Err(DomainError::validation(format!("invalid email: {raw:?}"))),
    }
}

fn required(field: &str, value: &str) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
