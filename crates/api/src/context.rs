use sellerdesk_auth::Identity;
use sellerdesk_core::SellerId;

/// Authenticated caller for a request.
///
/// This is immutable and present on every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    identity: Identity,
}

impl CallerContext {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn seller_id(&self) -> SellerId {
        self.identity.seller_id()
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}
