use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use firmdex_core::{PrincipalId, TenantId};

use crate::roles::Role;
use crate::scope::Principal;

/// JWT claims model (transport-agnostic).
///
/// The minimal set of claims the service expects once a token has been
/// decoded/verified by the transport layer. A principal carries exactly one
/// role and at most one tenant affiliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// The principal's single role.
    pub role: Role,

    /// Tenant affiliation, if any. Unaffiliated principals are valid tokens
    /// but see no tenant-scoped data.
    pub tenant_id: Option<TenantId>,

    /// Superuser escape hatch (operator accounts).
    #[serde(default)]
    pub superuser: bool,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

impl AuthClaims {
    /// The per-request principal these claims establish.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.sub,
            role: self.role,
            tenant: self.tenant_id,
            is_authenticated: true,
            is_superuser: self.superuser,
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

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// is intentionally outside this crate.
pub fn validate_claims(claims: &AuthClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
