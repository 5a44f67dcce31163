//! In-crate test doubles for the storage ports.

use std::collections::HashSet;
use std::sync::Mutex;

use firmdex_core::PrincipalId;

use crate::registry::{Action, resources};
use crate::store::{AccessStore, PermissionCatalog};

#[derive(Default)]
pub(crate) struct MemoryAccessStore {
    groups: Mutex<HashSet<String>>,
    grants: Mutex<HashSet<(String, String, Action)>>,
    memberships: Mutex<HashSet<(PrincipalId, String)>>,
}

impl AccessStore for MemoryAccessStore {
    fn ensure_group(&self, name: &str) {
        self.groups.lock().unwrap().insert(name.to_string());
    }

    fn group_exists(&self, name: &str) -> bool {
        self.groups.lock().unwrap().contains(name)
    }

    fn add_grant(&self, group: &str, resource: &str, action: Action) -> bool {
        self.grants
            .lock()
            .unwrap()
            .insert((group.to_string(), resource.to_string(), action))
    }

    fn has_grant(&self, group: &str, resource: &str, action: Action) -> bool {
        self.grants
            .lock()
            .unwrap()
            .contains(&(group.to_string(), resource.to_string(), action))
    }

    fn grants_for(&self, group: &str) -> Vec<(String, Action)> {
        self.grants
            .lock()
            .unwrap()
            .iter()
            .filter(|(g, _, _)| g == group)
            .map(|(_, r, a)| (r.clone(), *a))
            .collect()
    }

    fn add_membership(&self, principal: PrincipalId, group: &str) -> bool {
        self.memberships
            .lock()
            .unwrap()
            .insert((principal, group.to_string()))
    }

    fn remove_membership(&self, principal: PrincipalId, group: &str) -> bool {
        self.memberships
            .lock()
            .unwrap()
            .remove(&(principal, group.to_string()))
    }

    fn memberships(&self, principal: PrincipalId) -> Vec<String> {
        self.memberships
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| *p == principal)
            .map(|(_, g)| g.clone())
            .collect()
    }
}

pub(crate) struct MemoryCatalog {
    resources: HashSet<String>,
    permissions: HashSet<(String, Action)>,
}

impl MemoryCatalog {
    /// Every known resource with all four permission rows.
    pub(crate) fn full() -> Self {
        Self::with_resources(&resources::ALL)
    }

    pub(crate) fn with_resources(names: &[&str]) -> Self {
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

    pub(crate) fn remove_permission(&mut self, resource: &str, action: Action) {
        self.permissions.remove(&(resource.to_string(), action));
    }
}

impl PermissionCatalog for MemoryCatalog {
    fn has_resource(&self, resource: &str) -> bool {
        self.resources.contains(resource)
    }

    fn has_permission(&self, resource: &str, action: Action) -> bool {
        self.permissions.contains(&(resource.to_string(), action))
    }
}
