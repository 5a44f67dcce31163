//! Tenant scope guard: tenant-equality checks gating every data access.
//!
//! Decisions are pure functions of the principal's role/tenant attributes,
//! recomputed per request. There is no cached authorization state; the
//! principal is explicit context passed into each call.

use firmdex_core::TenantId;

use crate::registry::Action;
use crate::roles::Role;
use crate::store::AccessStore;

/// Resolved per-request principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: firmdex_core::PrincipalId,
    pub role: Role,
    pub tenant: Option<TenantId>,
    pub is_authenticated: bool,
    pub is_superuser: bool,
}

impl Principal {
    pub fn authenticated(id: firmdex_core::PrincipalId, role: Role, tenant: Option<TenantId>) -> Self {
        Self {
            id,
            role,
            tenant,
            is_authenticated: true,
            is_superuser: false,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            id: firmdex_core::PrincipalId::from_uuid(uuid::Uuid::nil()),
            role: Role::default(),
            tenant: None,
            is_authenticated: false,
            is_superuser: false,
        }
    }
}

/// An instance that exposes its owning tenant.
pub trait TenantScoped {
    fn tenant(&self) -> Option<TenantId>;
}

/// Filter predicate produced by [`scope_listing`].
///
/// Applied by the host to every multi-object read before returning results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope {
    /// Superuser: every instance is admitted.
    All,
    /// Only instances of this tenant are admitted.
    Tenant(TenantId),
    /// Unaffiliated principal: empty result, not an error.
    Nothing,
}

impl ListingScope {
    pub fn admits(&self, instance: &impl TenantScoped) -> bool {
        match self {
            ListingScope::All => true,
            ListingScope::Tenant(tenant) => instance.tenant() == Some(*tenant),
            ListingScope::Nothing => false,
        }
    }
}

/// Narrow a listing to what the principal may see.
pub fn scope_listing(principal: &Principal) -> ListingScope {
    if principal.is_superuser {
        return ListingScope::All;
    }
    match principal.tenant {
        Some(tenant) => ListingScope::Tenant(tenant),
        None => ListingScope::Nothing,
    }
}

/// Single-object access check (read/update/delete).
///
/// Requires an authenticated principal with a tenant, an instance that
/// exposes a tenant, and equality of the two. A missing tenant on either
/// side is a denial, never a wildcard match.
pub fn check_object_access(principal: &Principal, instance: &impl TenantScoped) -> bool {
    if !principal.is_authenticated {
        return false;
    }
    match (principal.tenant, instance.tenant()) {
        (Some(mine), Some(theirs)) => mine == theirs,
        _ => false,
    }
}

/// Action-level gate: may this principal ever perform `action` on `resource`?
///
/// Answers the coarse question ("can a Manager delete an address at all");
/// it composes with [`check_object_access`], which answers the scoped one
/// ("can *this* Manager delete *this* address"). Both must pass.
pub fn has_action(
    principal: &Principal,
    resource: &str,
    action: Action,
    store: &impl AccessStore,
) -> bool {
    if !principal.is_authenticated {
        return false;
    }
    if principal.is_superuser {
        return true;
    }
    store
        .memberships(principal.id)
        .iter()
        .any(|group| store.has_grant(group, resource, action))
}
