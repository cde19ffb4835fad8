use axum::extract::{FromRef, FromRequestParts};
use axum::http::{HeaderMap, HeaderName, request::Parts};
use common::config::AuthConfig;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

use crate::error::CommerceError;
use crate::model::GenericError;

/// Who the caller is and whether they may use the back-office.
///
/// The identity header is set by the authenticating edge in front of the service;
/// admin rights are a per-request lookup in the configured allowlist.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    identity_header: HeaderName,
    admins: HashSet<String>,
}

impl AccessPolicy {
    pub fn new(identity_header: &str, admin_emails: &[String]) -> Result<Self, GenericError> {
        let identity_header = HeaderName::try_from(identity_header.to_ascii_lowercase())?;
        let admins = admin_emails
            .iter()
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .collect::<HashSet<_>>();
        if admins.is_empty() {
            warn!("Admin allowlist is empty, back-office routes will reject every caller");
        }
        Ok(Self { identity_header, admins })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, GenericError> {
        Self::new(&config.identity_header, &config.admin_emails)
    }

    pub fn identity_header(&self) -> &HeaderName {
        &self.identity_header
    }

    pub fn identity(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get(&self.identity_header)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty())
    }

    pub fn is_admin(&self, email: &str) -> bool {
        self.admins.contains(&email.trim().to_lowercase())
    }
}

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer(pub String);

/// Caller that may or may not be signed in (guest checkout).
#[derive(Debug, Clone, PartialEq)]
pub struct MaybeCustomer(pub Option<String>);

/// Allowlisted back-office user.
#[derive(Debug, Clone, PartialEq)]
pub struct Admin(pub String);

impl<S> FromRequestParts<S> for MaybeCustomer
where
    Arc<AccessPolicy>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = CommerceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let policy = Arc::<AccessPolicy>::from_ref(state);
        Ok(MaybeCustomer(policy.identity(&parts.headers)))
    }
}

impl<S> FromRequestParts<S> for Customer
where
    Arc<AccessPolicy>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = CommerceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let policy = Arc::<AccessPolicy>::from_ref(state);
        policy
            .identity(&parts.headers)
            .map(Customer)
            .ok_or(CommerceError::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for Admin
where
    Arc<AccessPolicy>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = CommerceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let policy = Arc::<AccessPolicy>::from_ref(state);
        let email = policy
            .identity(&parts.headers)
            .ok_or(CommerceError::Unauthorized)?;
        if !policy.is_admin(&email) {
            warn!(email = %email, path = %parts.uri.path(), "Back-office access denied");
            return Err(CommerceError::Forbidden);
        }
        Ok(Admin(email))
    }
}
