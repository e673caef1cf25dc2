//! Seller ownership guard.
//!
//! - No IO
//! - No panics
//! - No business logic (pure ownership check)

use thiserror::Error;

use sellerdesk_core::{DomainError, Owned, SellerId};

/// Outcome of an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Forbidden,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: {entity} belongs to another seller")]
    Forbidden { entity: &'static str },
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Forbidden { entity } => DomainError::forbidden(entity),
        }
    }
}

/// Compare a resource owner against the caller.
pub fn authorize(resource_owner: SellerId, caller: SellerId) -> Access {
    if resource_owner == caller {
        Access::Allowed
    } else {
        Access::Forbidden
    }
}

/// Guard a read or mutation of an owned resource.
///
/// Callers resolve the resource first, so a missing record surfaces as
/// "not found" and an existing one owned by someone else as `Forbidden`.
pub fn ensure_owner<R: Owned>(
    resource: &R,
    caller: SellerId,
    entity: &'static str,
) -> Result<(), AuthzError> {
    match authorize(resource.owner(), caller) {
        Access::Allowed => Ok(()),
        Access::Forbidden => {
            tracing::debug!(
                entity,
                owner = %resource.owner(),
                caller = %caller,
                "ownership check denied"
            );
            Err(AuthzError::Forbidden { entity })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sellerdesk_core::Entity;

    struct Note {
        id: u32,
        owner: SellerId,
    }

    impl Entity for Note {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }
    }

    impl Owned for Note {
        fn owner(&self) -> SellerId {
            self.owner
        }
    }

    #[test]
    fn owner_is_allowed() {
        let seller = SellerId::new();
        let note = Note { id: 1, owner: seller };
        assert_eq!(ensure_owner(&note, seller, "note"), Ok(()));
    }

    #[test]
    fn other_seller_is_forbidden_not_missing() {
        let note = Note { id: 1, owner: SellerId::new() };
        let err = ensure_owner(&note, SellerId::new(), "note").unwrap_err();
        assert_eq!(DomainError::from(err), DomainError::Forbidden("note"));
    }

    proptest! {
        #[test]
        fn access_is_allowed_iff_ids_match(a in any::<u128>(), b in any::<u128>()) {
            let owner = SellerId::from_uuid(uuid_from(a));
            let caller = SellerId::from_uuid(uuid_from(b));
            let expected = if a == b { Access::Allowed } else { Access::Forbidden };
            prop_assert_eq!(authorize(owner, caller), expected);
            prop_assert_eq!(authorize(owner, owner), Access::Allowed);
        }
    }

    fn uuid_from(bits: u128) -> uuid::Uuid {
        uuid::Uuid::from_u128(bits)
    }
}
