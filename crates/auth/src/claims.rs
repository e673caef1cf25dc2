use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sellerdesk_core::SellerId;

/// JWT claims model (transport-agnostic).
///
/// The minimal set of claims expected once a token has been decoded and its
/// signature verified. Timestamps are seconds since the Unix epoch, as in
/// registered JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerClaims {
    /// Subject: the seller the token was issued to.
    pub sub: SellerId,

    pub name: String,

    #[serde(rename = "lastName")]
    pub last_name: String,

    pub email: String,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

impl SellerClaims {
    pub fn new(
        sub: SellerId,
        name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            sub,
            name: name.into(),
            last_name: last_name.into(),
            email: email.into(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate JWT claims against `now`.
///
/// `leeway` widens both ends of the validity window to absorb clock skew.
/// Signature verification happens before this, in the provider.
pub fn validate_claims(
    claims: &SellerClaims,
    now: DateTime<Utc>,
    leeway: Duration,
) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    let leeway = leeway.num_seconds();
    if now + leeway < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now - leeway >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_at(now: DateTime<Utc>) -> SellerClaims {
        SellerClaims::new(
            SellerId::new(),
            "Ada",
            "Lovelace",
            "ada@example.com",
            now,
            Duration::hours(24),
        )
    }

    #[test]
    fn fresh_claims_are_valid() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims_at(now), now, Duration::zero()), Ok(()));
    }

    #[test]
    fn expired_claims_are_rejected() {
        let issued = Utc::now() - Duration::hours(25);
        let claims = claims_at(issued);
        assert_eq!(
            validate_claims(&claims, Utc::now(), Duration::zero()),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn future_claims_are_rejected_unless_within_leeway() {
        let now = Utc::now();
        let claims = claims_at(now + Duration::seconds(30));
        assert_eq!(
            validate_claims(&claims, now, Duration::zero()),
            Err(TokenValidationError::NotYetValid)
        );
        assert_eq!(validate_claims(&claims, now, Duration::seconds(60)), Ok(()));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let mut claims = claims_at(now);
        claims.exp = claims.iat;
        assert_eq!(
            validate_claims(&claims, now, Duration::zero()),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
