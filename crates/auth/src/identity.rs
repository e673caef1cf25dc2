use serde::{Deserialize, Serialize};

use sellerdesk_core::{Seller, SellerId};

use crate::SellerClaims;

/// The caller of a scoped operation, as resolved by an authentication provider.
///
/// The core trusts this identity unconditionally; every ownership check compares
/// `seller_id` with the owner of the resource being touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub seller_id: SellerId,
    pub name: String,
    pub last_name: String,
    pub email: String,
}

impl Identity {
    pub fn seller_id(&self) -> SellerId {
        self.seller_id
    }

    /// Display profile for the seller directory.
    pub fn profile(&self) -> Seller {
        Seller {
            id: self.seller_id,
            name: self.name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

impl From<SellerClaims> for Identity {
    fn from(claims: SellerClaims) -> Self {
        Self {
            seller_id: claims.sub,
            name: claims.name,
            last_name: claims.last_name,
            email: claims.email,
        }
    }
}
