//! Identity provider boundary.
//!
//! Authentication is delegated to an external identity provider. The server only needs one
//! capability from it: turn the bearer token of the current request into an identity, or
//! nothing. A token that fails verification is treated exactly like a missing one.

use async_trait::async_trait;
use buzzify_common::config::AuthConfig;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identity asserted by the external provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    /// Provider-assigned subject id.
    pub subject: String,
    /// Primary email address.
    pub email: String,
    /// Preferred username, if the provider has one.
    pub username: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Avatar URL.
    pub image: Option<String>,
}

/// Resolve a session token into an identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The identity behind `token`, or `None` when the token is not valid.
    async fn resolve(&self, token: &str) -> Option<ExternalIdentity>;
}

/// Shared trait object handed to the API layer.
pub type IdentityProviderService = Arc<dyn IdentityProvider>;

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
    email: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "picture")]
    image: Option<String>,
}

/// Verifies HS256 session JWTs signed by the identity provider.
#[derive(Clone)]
pub struct JwtIdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    /// Create a provider from the auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn resolve(&self, token: &str) -> Option<ExternalIdentity> {
        match decode::<SessionClaims>(token, &self.key, &self.validation) {
            Ok(data) => {
                let claims = data.claims;
                Some(ExternalIdentity {
                    subject: claims.sub,
                    email: claims.email,
                    username: claims.username,
                    name: claims.name,
                    image: claims.image,
                })
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejected session token");
                None
            }
        }
    }
}
