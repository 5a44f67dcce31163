use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role of a principal in the system.
///
/// The role set is closed: every principal carries exactly one role, and each
/// role maps to exactly one permission group (see [`crate::sync`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Viewer,
    Worker,
    Manager,
    Admin,
    Owner,
}

impl Role {
    /// All roles, in escalation order.
    pub const ALL: [Role; 5] = [
        Role::Viewer,
        Role::Worker,
        Role::Manager,
        Role::Admin,
        Role::Owner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Worker => "worker",
            Role::Manager => "manager",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }

    /// Display name of the permission group backing this role.
    pub fn group_name(&self) -> &'static str {
        match self {
            Role::Viewer => "Viewer",
            Role::Worker => "Worker",
            Role::Manager => "Manager",
            Role::Admin => "Admin",
            Role::Owner => "Owner",
        }
    }
}

/// Role → group-name mapping used by the synchronizer.
///
/// Total over the closed enum today; the synchronizer still treats a missing
/// mapping as a no-op rather than touching memberships.
pub fn role_group(role: Role) -> Option<&'static str> {
    match role {
        Role::Viewer => Some("Viewer"),
        Role::Worker => Some("Worker"),
        Role::Manager => Some("Manager"),
        Role::Admin => Some("Admin"),
        Role::Owner => Some("Owner"),
    }
}

/// Whether a group name is one of the role-derived groups.
///
/// Memberships in any other group are invisible to the synchronizer.
pub fn is_role_group(name: &str) -> bool {
    Role::ALL.iter().any(|r| r.group_name() == name)
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Role::Viewer),
            "worker" => Ok(Role::Worker),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);
