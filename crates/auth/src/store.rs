//! Storage ports for the authorization core.
//!
//! Conceptually three tables: `groups` (name unique), `memberships`
//! (principal, group — unique pair), `grants` (group, resource, action —
//! unique triple). Implementations live in `firmdex-infra`; an in-memory
//! store is enough for the request-per-call model, and a database-backed one
//! would slot in behind the same traits.

use std::sync::Arc;

use firmdex_core::PrincipalId;

use crate::registry::Action;

/// Group / membership / grant storage.
///
/// All operations are idempotent at the row level: creating an existing group
/// or adding a present grant/membership is a no-op, so concurrent bootstrap
/// runs converge without coordination.
pub trait AccessStore: Send + Sync {
    /// Get-or-create a group by name.
    fn ensure_group(&self, name: &str);

    fn group_exists(&self, name: &str) -> bool;

    /// Add a grant row. Returns `false` if the triple was already present.
    fn add_grant(&self, group: &str, resource: &str, action: Action) -> bool;

    fn has_grant(&self, group: &str, resource: &str, action: Action) -> bool;

    /// All grant rows for a group, as (resource, action) pairs.
    fn grants_for(&self, group: &str) -> Vec<(String, Action)>;

    /// Add a membership row. Returns `false` if already present.
    fn add_membership(&self, principal: PrincipalId, group: &str) -> bool;

    /// Remove a membership row. Returns `false` if it was not present.
    fn remove_membership(&self, principal: PrincipalId, group: &str) -> bool;

    /// Group names the principal currently belongs to.
    fn memberships(&self, principal: PrincipalId) -> Vec<String>;
}

/// Catalog of protected resource types and their concrete permission rows.
///
/// Mirrors the host's model registry: a resource type named in the grant
/// table but absent here is skipped with a warning at materialization.
pub trait PermissionCatalog: Send + Sync {
    fn has_resource(&self, resource: &str) -> bool;

    /// Whether the concrete permission row (resource, action) exists.
    fn has_permission(&self, resource: &str, action: Action) -> bool;
}

impl<S> AccessStore for Arc<S>
where
    S: AccessStore + ?Sized,
{
    fn ensure_group(&self, name: &str) {
        (**self).ensure_group(name)
    }

    fn group_exists(&self, name: &str) -> bool {
        (**self).group_exists(name)
    }

    fn add_grant(&self, group: &str, resource: &str, action: Action) -> bool {
        (**self).add_grant(group, resource, action)
    }

    fn has_grant(&self, group: &str, resource: &str, action: Action) -> bool {
        (**self).has_grant(group, resource, action)
    }

    fn grants_for(&self, group: &str) -> Vec<(String, Action)> {
        (**self).grants_for(group)
    }

    fn add_membership(&self, principal: PrincipalId, group: &str) -> bool {
        (**self).add_membership(principal, group)
    }

    fn remove_membership(&self, principal: PrincipalId, group: &str) -> bool {
        (**self).remove_membership(principal, group)
    }

    fn memberships(&self, principal: PrincipalId) -> Vec<String> {
        (**self).memberships(principal)
    }
}

impl<C> PermissionCatalog for Arc<C>
where
    C: PermissionCatalog + ?Sized,
{
    fn has_resource(&self, resource: &str) -> bool {
        (**self).has_resource(resource)
    }

    fn has_permission(&self, resource: &str, action: Action) -> bool {
        (**self).has_permission(resource, action)
    }
}
