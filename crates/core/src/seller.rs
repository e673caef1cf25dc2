use serde::{Deserialize, Serialize};

use crate::SellerId;

/// Seller profile (display fields only; credentials live with the identity provider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    pub id: SellerId,
    pub name: String,
    pub last_name: String,
    pub email: String,
}

impl crate::Entity for Seller {
    type Id = SellerId;

    fn id(&self) -> SellerId {
        self.id
    }
}
