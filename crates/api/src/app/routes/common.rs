use core::str::FromStr;

use axum::response::Response;

use firmdex_auth::{Action, Principal, TenantScoped, check_object_access, has_action, scope_listing};

use crate::app::{AppState, errors};

/// Action-level gate: 403 when the principal's role may never perform the
/// action on this resource type.
pub fn require_action(
    state: &AppState,
    principal: &Principal,
    resource: &str,
    action: Action,
) -> Result<(), Response> {
    if has_action(principal, resource, action, &state.access) {
        Ok(())
    } else {
        Err(errors::forbidden())
    }
}

/// Resolve a single object through the scope guard.
///
/// Absent and out-of-scope are the identical 404; an object that is visible
/// to the caller's listing scope but fails the per-object check (a superuser
/// without tenant affiliation) is a 403.
pub fn resolve_scoped<T: TenantScoped>(
    principal: &Principal,
    record: Option<T>,
) -> Result<T, Response> {
    let Some(record) = record else {
        return Err(errors::not_found());
    };
    if !scope_listing(principal).admits(&record) {
        return Err(errors::not_found());
    }
    if !check_object_access(principal, &record) {
        return Err(errors::forbidden());
    }
    Ok(record)
}

/// Parse a path id. An unparseable id resolves like a missing object.
pub fn parse_id<T: FromStr>(raw: &str) -> Result<T, Response> {
    raw.parse::<T>().map_err(|_| errors::not_found())
}
