//! Bearer credential → [`Identity`] resolution.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::{Identity, SellerClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer credential")]
    MissingCredential,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Resolves an opaque credential into a caller identity.
///
/// Implementations must not consult ambient process state: everything they need
/// (keys, leeway) is handed to them at construction.
pub trait AuthenticationProvider: Send + Sync {
    fn authenticate(&self, credential: &str, now: DateTime<Utc>) -> Result<Identity, AuthError>;
}

/// HS256-signed JWT provider.
pub struct Hs256Authenticator {
    key: DecodingKey,
    validation: Validation,
    leeway: Duration,
}

impl Hs256Authenticator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        // Time-window checks run in `validate_claims` against the caller-supplied clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
            leeway: Duration::zero(),
        }
    }

    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }
}

impl core::fmt::Debug for Hs256Authenticator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Authenticator")
            .field("leeway", &self.leeway)
            .finish_non_exhaustive()
    }
}

impl AuthenticationProvider for Hs256Authenticator {
    fn authenticate(&self, credential: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let data = jsonwebtoken::decode::<SellerClaims>(credential, &self.key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        validate_claims(&data.claims, now, self.leeway)?;

        Ok(Identity::from(data.claims))
    }
}
