//! `sellerdesk-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it turns an
//! opaque bearer credential into an [`Identity`] and decides whether a caller
//! owns a resource. Credential issuance lives elsewhere.

pub mod claims;
pub mod guard;
pub mod identity;
pub mod provider;

pub use claims::{SellerClaims, TokenValidationError, validate_claims};
pub use guard::{Access, AuthzError, authorize, ensure_owner};
pub use identity::Identity;
pub use provider::{AuthError, AuthenticationProvider, Hs256Authenticator};
