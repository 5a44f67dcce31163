//! `firmdex-auth` — pure authorization boundary.
//!
//! Three pieces: a declarative role→permission registry materialized once at
//! bootstrap, a group synchronizer that keeps a principal's membership a pure
//! function of its role, and a tenant scope guard consulted on every data
//! access. This crate is intentionally decoupled from HTTP and storage; the
//! storage seams are the [`AccessStore`] and [`PermissionCatalog`] ports.

pub mod claims;
pub mod registry;
pub mod roles;
pub mod scope;
pub mod store;
pub mod sync;

#[cfg(test)]
mod testing;

pub use claims::{AuthClaims, TokenValidationError, validate_claims};
pub use registry::{
    Action, GrantOutcome, GrantRecord, GrantRow, MaterializeReport, RegistryError,
    default_grant_table, materialize, resources,
};
pub use roles::Role;
pub use scope::{ListingScope, Principal, TenantScoped, check_object_access, has_action, scope_listing};
pub use store::{AccessStore, PermissionCatalog};
pub use sync::sync_role_group;
