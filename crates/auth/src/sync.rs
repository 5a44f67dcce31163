//! Group synchronizer: membership as a pure function of the current role.

use firmdex_core::PrincipalId;

use crate::roles::{Role, is_role_group, role_group};
use crate::store::AccessStore;

/// Converge the principal's role-derived group membership to its current role.
///
/// This is a convergence operation, not an incremental add: after the call
/// the principal belongs to exactly one role-derived group — the one matching
/// `role` — with no residue from a prior role. Memberships in groups outside
/// the role family are left untouched. Safe to call repeatedly; the host's
/// user create and update paths call it before reporting success.
pub fn sync_role_group(store: &impl AccessStore, principal: PrincipalId, role: Role) {
    let Some(target) = role_group(role) else {
        // Unmapped role: leave existing memberships alone.
        tracing::debug!(%principal, %role, "no group mapping for role; membership unchanged");
        return;
    };

    // Group creation happens-before membership assignment, so the membership
    // row never references a nonexistent group.
    store.ensure_group(target);

    for group in store.memberships(principal) {
        if group != target && is_role_group(&group) {
            store.remove_membership(principal, &group);
        }
    }

    store.add_membership(principal, target);
}
