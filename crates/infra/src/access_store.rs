//! In-memory group / membership / grant tables and permission catalog.

use std::collections::HashSet;
use std::sync::RwLock;

use firmdex_auth::{AccessStore, Action, PermissionCatalog, registry::resources};
use firmdex_core::PrincipalId;

/// In-memory access tables: `groups` (name unique), `memberships`
/// (principal, group — unique pair), `grants` (group, resource, action —
/// unique triple).
///
/// Set semantics give every write row-level idempotence, so concurrent
/// bootstrap runs converge without coordination. Concurrent role updates to
/// the same principal race as any storage write would; last writer wins.
#[derive(Debug, Default)]
pub struct InMemoryAccessStore {
    inner: RwLock<AccessTables>,
}

#[derive(Debug, Default)]
struct AccessTables {
    groups: HashSet<String>,
    memberships: HashSet<(PrincipalId, String)>,
    grants: HashSet<(String, String, Action)>,
}

impl InMemoryAccessStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccessStore for InMemoryAccessStore {
    fn ensure_group(&self, name: &str) {
        if let Ok(mut tables) = self.inner.write() {
            tables.groups.insert(name.to_string());
        }
    }

    fn group_exists(&self, name: &str) -> bool {
        self.inner
            .read()
            .map(|tables| tables.groups.contains(name))
            .unwrap_or(false)
    }

    fn add_grant(&self, group: &str, resource: &str, action: Action) -> bool {
        match self.inner.write() {
            Ok(mut tables) => {
                tables
                    .grants
                    .insert((group.to_string(), resource.to_string(), action))
            }
            Err(_) => false,
        }
    }

    fn has_grant(&self, group: &str, resource: &str, action: Action) -> bool {
        self.inner
            .read()
            .map(|tables| {
                tables
                    .grants
                    .contains(&(group.to_string(), resource.to_string(), action))
            })
            .unwrap_or(false)
    }

    fn grants_for(&self, group: &str) -> Vec<(String, Action)> {
        let tables = match self.inner.read() {
            Ok(t) => t,
            Err(_) => return vec![],
        };
        tables
            .grants
            .iter()
            .filter(|(g, _, _)| g == group)
            .map(|(_, resource, action)| (resource.clone(), *action))
            .collect()
    }

    fn add_membership(&self, principal: PrincipalId, group: &str) -> bool {
        match self.inner.write() {
            Ok(mut tables) => tables.memberships.insert((principal, group.to_string())),
            Err(_) => false,
        }
    }

    fn remove_membership(&self, principal: PrincipalId, group: &str) -> bool {
        match self.inner.write() {
            Ok(mut tables) => tables.memberships.remove(&(principal, group.to_string())),
            Err(_) => false,
        }
    }

    fn memberships(&self, principal: PrincipalId) -> Vec<String> {
        let tables = match self.inner.read() {
            Ok(t) => t,
            Err(_) => return vec![],
        };
        tables
            .memberships
            .iter()
            .filter(|(p, _)| *p == principal)
            .map(|(_, group)| group.clone())
            .collect()
    }
}

/// Permission catalog mirroring the host's model registry.
///
/// Built once at bootstrap. The full catalog carries every directory resource
/// with all four permission rows; tests construct narrower catalogs to
/// exercise the skip/warn paths of materialization.
#[derive(Debug, Clone)]
pub struct InMemoryPermissionCatalog {
    resources: HashSet<String>,
    permissions: HashSet<(String, Action)>,
}

impl InMemoryPermissionCatalog {
    /// Every directory resource with all four permission rows.
    pub fn directory() -> Self {
        Self::with_resources(&resources::ALL)
    }

    pub fn with_resources(names: &[&str]) -> Self {
        let mut permissions = HashSet::new();
        for name in names {
            for action in Action::ALL {
                permissions.insert((name.to_string(), action));
            }
        }
        Self {
            resources: names.iter().map(|n| n.to_string()).collect(),
            permissions,
        }
    }

    /// Drop a single concrete permission row (test hook for the
    /// missing-permission warning path).
    pub fn without_permission(mut self, resource: &str, action: Action) -> Self {
        self.permissions.remove(&(resource.to_string(), action));
        self
    }
}

impl PermissionCatalog for InMemoryPermissionCatalog {
    fn has_resource(&self, resource: &str) -> bool {
        self.resources.contains(resource)
    }

    fn has_permission(&self, resource: &str, action: Action) -> bool {
        self.permissions.contains(&(resource.to_string(), action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firmdex_auth::{default_grant_table, materialize};

    #[test]
    fn grant_rows_are_unique() {
        let store = InMemoryAccessStore::new();
        store.ensure_group("Admin");

        assert!(store.add_grant("Admin", resources::COMPANY, Action::View));
        assert!(!store.add_grant("Admin", resources::COMPANY, Action::View));
        assert_eq!(store.grants_for("Admin").len(), 1);
    }

    #[test]
    fn membership_rows_are_unique_per_pair() {
        let store = InMemoryAccessStore::new();
        let principal = PrincipalId::new();

        store.ensure_group("Viewer");
        assert!(store.add_membership(principal, "Viewer"));
        assert!(!store.add_membership(principal, "Viewer"));
        assert_eq!(store.memberships(principal), vec!["Viewer".to_string()]);

        assert!(store.remove_membership(principal, "Viewer"));
        assert!(!store.remove_membership(principal, "Viewer"));
        assert!(store.memberships(principal).is_empty());
    }

    #[test]
    fn ensure_group_is_get_or_create() {
        let store = InMemoryAccessStore::new();
        store.ensure_group("Manager");
        store.ensure_group("Manager");
        assert!(store.group_exists("Manager"));
    }

    #[test]
    fn directory_catalog_backs_full_materialization() {
        let store = InMemoryAccessStore::new();
        let catalog = InMemoryPermissionCatalog::directory();

        let report = materialize(default_grant_table(), &catalog, &store).unwrap();
        assert!(!report.has_warnings());
        for role in firmdex_auth::Role::ALL {
            assert!(store.group_exists(role.group_name()));
        }
    }

    #[test]
    fn without_permission_surfaces_warning() {
        let store = InMemoryAccessStore::new();
        let catalog =
            InMemoryPermissionCatalog::directory().without_permission(resources::USER, Action::Delete);

        let report = materialize(default_grant_table(), &catalog, &store).unwrap();
        assert!(report.has_warnings());
        assert!(!store.has_grant("Admin", resources::USER, Action::Delete));
    }
}
