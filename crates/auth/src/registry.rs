//! Declarative role→permission registry.
//!
//! The grant table is the single source of truth for which actions each role
//! may perform on each protected resource type. It is config-shaped (string
//! action names), validated in full before any side effect, and materialized
//! into concrete group/grant rows once at bootstrap. Runtime traffic only
//! reads the materialized rows.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roles::Role;
use crate::store::{AccessStore, PermissionCatalog};

/// Names of the protected resource types.
pub mod resources {
    pub const COMPANY: &str = "company";
    pub const ADDRESS: &str = "address";
    pub const USER: &str = "user";

    pub const ALL: [&str; 3] = [COMPANY, ADDRESS, USER];
}

// ─────────────────────────────────────────────────────────────────────────────
// Actions
// ─────────────────────────────────────────────────────────────────────────────

/// Action on a protected resource type.
///
/// The action set is closed; a grant table naming anything else is a
/// configuration error at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Add,
    Change,
    Delete,
    View,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Add, Action::Change, Action::Delete, Action::View];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Change => "change",
            Action::Delete => "delete",
            Action::View => "view",
        }
    }

    pub fn parse(s: &str) -> Option<Action> {
        match s {
            "add" => Some(Action::Add),
            "change" => Some(Action::Change),
            "delete" => Some(Action::Delete),
            "view" => Some(Action::View),
            _ => None,
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Grant table
// ─────────────────────────────────────────────────────────────────────────────

/// One row of the declarative grant table.
#[derive(Debug, Clone, Copy)]
pub struct GrantRow {
    pub resource: &'static str,
    pub role: Role,
    pub actions: &'static [&'static str],
}

/// The built-in grant table.
///
/// | resource | Admin | Owner | Manager | Worker | Viewer |
/// |---|---|---|---|---|---|
/// | company | add,change,delete,view | add,change,view | change,view | view | view |
/// | address | add,change,delete,view | add,change,view | add,change,view | view | view |
/// | user    | add,change,delete,view | add,change,view | add,change,view | view | view |
pub fn default_grant_table() -> &'static [GrantRow] {
    const TABLE: &[GrantRow] = &[
        GrantRow { resource: resources::COMPANY, role: Role::Admin, actions: &["add", "change", "delete", "view"] },
        GrantRow { resource: resources::COMPANY, role: Role::Owner, actions: &["add", "change", "view"] },
        GrantRow { resource: resources::COMPANY, role: Role::Manager, actions: &["view", "change"] },
        GrantRow { resource: resources::COMPANY, role: Role::Worker, actions: &["view"] },
        GrantRow { resource: resources::COMPANY, role: Role::Viewer, actions: &["view"] },
        GrantRow { resource: resources::ADDRESS, role: Role::Admin, actions: &["add", "change", "delete", "view"] },
        GrantRow { resource: resources::ADDRESS, role: Role::Owner, actions: &["add", "change", "view"] },
        GrantRow { resource: resources::ADDRESS, role: Role::Manager, actions: &["add", "change", "view"] },
        GrantRow { resource: resources::ADDRESS, role: Role::Worker, actions: &["view"] },
        GrantRow { resource: resources::ADDRESS, role: Role::Viewer, actions: &["view"] },
        GrantRow { resource: resources::USER, role: Role::Admin, actions: &["add", "change", "delete", "view"] },
        GrantRow { resource: resources::USER, role: Role::Owner, actions: &["add", "change", "view"] },
        GrantRow { resource: resources::USER, role: Role::Manager, actions: &["add", "change", "view"] },
        GrantRow { resource: resources::USER, role: Role::Worker, actions: &["view"] },
        GrantRow { resource: resources::USER, role: Role::Viewer, actions: &["view"] },
    ];
    TABLE
}

/// Fatal configuration error in the grant table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown action '{action}' for resource '{resource}' / role '{role}'")]
    UnknownAction {
        resource: String,
        role: Role,
        action: String,
    },

    #[error("empty resource name in grant table")]
    EmptyResource,
}

struct ValidatedRow {
    resource: &'static str,
    role: Role,
    actions: Vec<Action>,
}

/// Parse the whole table up front so a malformed entry aborts before any
/// group or grant row exists.
fn validate(table: &[GrantRow]) -> Result<Vec<ValidatedRow>, RegistryError> {
    let mut rows = Vec::with_capacity(table.len());
    for row in table {
        if row.resource.is_empty() {
            return Err(RegistryError::EmptyResource);
        }
        let mut actions = Vec::with_capacity(row.actions.len());
        for name in row.actions {
            let action = Action::parse(name).ok_or_else(|| RegistryError::UnknownAction {
                resource: row.resource.to_string(),
                role: row.role,
                action: name.to_string(),
            })?;
            actions.push(action);
        }
        rows.push(ValidatedRow {
            resource: row.resource,
            role: row.role,
            actions,
        });
    }
    Ok(rows)
}

// ─────────────────────────────────────────────────────────────────────────────
// Materialization
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of a single declared grant during materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantOutcome {
    /// The grant row was created.
    Granted,
    /// The grant row already existed (re-run).
    AlreadyPresent,
    /// The concrete permission row is missing from the catalog; skipped.
    MissingPermission,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrantRecord {
    pub resource: String,
    pub role: Role,
    pub action: Action,
    pub outcome: GrantOutcome,
}

/// Per-run materialization report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaterializeReport {
    pub grants: Vec<GrantRecord>,
    /// Resource types named in the table but unknown to the model catalog.
    pub skipped_resources: Vec<String>,
    pub warnings: Vec<String>,
}

impl MaterializeReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn granted_count(&self) -> usize {
        self.grants
            .iter()
            .filter(|g| g.outcome == GrantOutcome::Granted)
            .count()
    }
}

/// Materialize the grant table into concrete groups and grant rows.
///
/// Idempotent: re-running creates missing groups and grants but never
/// duplicates or removes rows already present. Recoverable conditions
/// (resource type absent from the catalog, missing permission row) are
/// warned and skipped; later entries are still processed. A malformed table
/// fails before any group is created.
pub fn materialize(
    table: &[GrantRow],
    catalog: &impl PermissionCatalog,
    store: &impl AccessStore,
) -> Result<MaterializeReport, RegistryError> {
    let rows = validate(table)?;

    let mut report = MaterializeReport::default();

    for row in &rows {
        if !catalog.has_resource(row.resource) {
            tracing::warn!(
                resource = row.resource,
                "resource type not in model catalog; skipping"
            );
            if !report.skipped_resources.iter().any(|r| r == row.resource) {
                report.skipped_resources.push(row.resource.to_string());
                report
                    .warnings
                    .push(format!("resource '{}' not in model catalog", row.resource));
            }
            continue;
        }

        let group = row.role.group_name();
        store.ensure_group(group);

        for &action in &row.actions {
            let outcome = if !catalog.has_permission(row.resource, action) {
                tracing::warn!(
                    resource = row.resource,
                    action = %action,
                    group,
                    "permission row missing; grant skipped"
                );
                report.warnings.push(format!(
                    "permission '{}_{}' missing; group '{}' not granted",
                    action, row.resource, group
                ));
                GrantOutcome::MissingPermission
            } else if store.add_grant(group, row.resource, action) {
                tracing::info!(resource = row.resource, action = %action, group, "grant added");
                GrantOutcome::Granted
            } else {
                tracing::debug!(resource = row.resource, action = %action, group, "grant already present");
                GrantOutcome::AlreadyPresent
            };

            report.grants.push(GrantRecord {
                resource: row.resource.to_string(),
                role: row.role,
                action,
                outcome,
            });
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryAccessStore, MemoryCatalog};

    #[test]
    fn default_table_is_well_formed() {
        assert!(validate(default_grant_table()).is_ok());
    }

    #[test]
    fn materialize_is_idempotent() {
        let store = MemoryAccessStore::default();
        let catalog = MemoryCatalog::full();

        let first = materialize(default_grant_table(), &catalog, &store).unwrap();
        assert!(first.granted_count() > 0);
        assert!(!first.has_warnings());

        let snapshot: Vec<_> = Role::ALL
            .iter()
            .map(|r| {
                let mut g = store.grants_for(r.group_name());
                g.sort();
                g
            })
            .collect();

        let second = materialize(default_grant_table(), &catalog, &store).unwrap();
        assert_eq!(second.granted_count(), 0);
        assert!(
            second
                .grants
                .iter()
                .all(|g| g.outcome == GrantOutcome::AlreadyPresent)
        );

        let after: Vec<_> = Role::ALL
            .iter()
            .map(|r| {
                let mut g = store.grants_for(r.group_name());
                g.sort();
                g
            })
            .collect();
        assert_eq!(snapshot, after);
    }

    #[test]
    fn malformed_action_fails_before_any_group_exists() {
        let store = MemoryAccessStore::default();
        let catalog = MemoryCatalog::full();

        const BAD: &[GrantRow] = &[
            GrantRow { resource: resources::COMPANY, role: Role::Admin, actions: &["add"] },
            GrantRow { resource: resources::ADDRESS, role: Role::Viewer, actions: &["explode"] },
        ];

        let err = materialize(BAD, &catalog, &store).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownAction { ref action, .. } if action == "explode"));

        // Validation runs before materialization, so not even the first
        // (well-formed) row may have been applied.
        assert!(!store.group_exists("Admin"));
        assert!(store.grants_for("Admin").is_empty());
    }

    #[test]
    fn unknown_resource_is_skipped_and_later_rows_still_processed() {
        let store = MemoryAccessStore::default();
        let catalog = MemoryCatalog::with_resources(&[resources::ADDRESS]);

        const TABLE: &[GrantRow] = &[
            GrantRow { resource: "warehouse", role: Role::Admin, actions: &["view"] },
            GrantRow { resource: resources::ADDRESS, role: Role::Admin, actions: &["view"] },
        ];

        let report = materialize(TABLE, &catalog, &store).unwrap();
        assert_eq!(report.skipped_resources, vec!["warehouse".to_string()]);
        assert!(report.has_warnings());
        assert!(store.has_grant("Admin", resources::ADDRESS, Action::View));
        assert!(!store.has_grant("Admin", "warehouse", Action::View));
    }

    #[test]
    fn missing_permission_row_warns_but_other_grants_land() {
        let store = MemoryAccessStore::default();
        let mut catalog = MemoryCatalog::full();
        catalog.remove_permission(resources::COMPANY, Action::Delete);

        let report = materialize(default_grant_table(), &catalog, &store).unwrap();

        assert!(report.has_warnings());
        assert!(!store.has_grant("Admin", resources::COMPANY, Action::Delete));
        // The rest of the Admin/company grants are unaffected.
        assert!(store.has_grant("Admin", resources::COMPANY, Action::Add));
        assert!(store.has_grant("Admin", resources::COMPANY, Action::View));
        assert!(
            report
                .grants
                .iter()
                .any(|g| g.outcome == GrantOutcome::MissingPermission
                    && g.action == Action::Delete
                    && g.resource == resources::COMPANY)
        );
    }

    #[test]
    fn grant_table_matches_policy_matrix() {
        let store = MemoryAccessStore::default();
        let catalog = MemoryCatalog::full();
        materialize(default_grant_table(), &catalog, &store).unwrap();

        // Spot-check the asymmetric cells of the matrix.
        assert!(store.has_grant("Manager", resources::ADDRESS, Action::Add));
        assert!(!store.has_grant("Manager", resources::COMPANY, Action::Add));
        assert!(!store.has_grant("Owner", resources::COMPANY, Action::Delete));
        assert!(!store.has_grant("Worker", resources::USER, Action::Change));
        assert!(store.has_grant("Viewer", resources::COMPANY, Action::View));
    }
}
