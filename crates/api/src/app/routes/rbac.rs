//! RBAC audit endpoints: what was materialized, and what each group holds.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use firmdex_auth::{Action, Principal, Role, resources};

use crate::app::routes::common::require_action;
use crate::app::AppState;

pub fn router() -> Router {
    Router::new()
        .route("/report", get(bootstrap_report))
        .route("/roles", get(list_roles))
}

/// GET /rbac/report — per-grant outcome of the bootstrap materialization.
pub async fn bootstrap_report(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::USER, Action::View) {
        return resp;
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({ "report": state.bootstrap_report })),
    )
        .into_response()
}

/// GET /rbac/roles — each role's group and its materialized grants.
pub async fn list_roles(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::USER, Action::View) {
        return resp;
    }

    let roles: Vec<_> = Role::ALL
        .iter()
        .map(|role| {
            let group = role.group_name();
            let mut grants: Vec<_> = state
                .access
                .grants_for(group)
                .into_iter()
                .map(|(resource, action)| format!("{action}_{resource}"))
                .collect();
            grants.sort();
            serde_json::json!({
                "role": role,
                "group": group,
                "grants": grants,
            })
        })
        .collect();

    (StatusCode::OK, Json(serde_json::json!({ "roles": roles }))).into_response()
}
