use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use firmdex_auth::{Action, Principal, resources, scope_listing, sync_role_group};
use firmdex_core::PrincipalId;
use firmdex_directory::{UserDraft, UserPatch, UserProfile};

use crate::app::routes::common::{parse_id, require_action, resolve_scoped};
use crate::app::{AppState, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
}

fn user_json(state: &AppState, user: &UserProfile) -> serde_json::Value {
    let company_name = user
        .company
        .and_then(|id| state.directory.get_company(id))
        .map(|c| c.name);
    dto::user_to_json(user, company_name.as_deref())
}

pub async fn list_users(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::USER, Action::View) {
        return resp;
    }

    let scope = scope_listing(&principal);
    let items: Vec<_> = state
        .directory
        .list_users()
        .iter()
        .filter(|u| scope.admits(*u))
        .map(|u| user_json(&state, u))
        .collect();

    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

/// Create a user. The affiliation is forced to the creator's company, and
/// group membership is synchronized with the role before the response.
pub async fn create_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(draft): Json<UserDraft>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::USER, Action::Add) {
        return resp;
    }

    let Some(tenant) = principal.tenant else {
        return errors::forbidden();
    };

    let user = match UserProfile::create(draft, Some(tenant.into())) {
        Ok(u) => u,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let user = match state.directory.insert_user(user) {
        Ok(u) => u,
        Err(e) => return errors::domain_error_to_response(e),
    };

    sync_role_group(&state.access, user.id, user.role);
    tracing::info!(user = %user.id, role = %user.role, "user created");

    (StatusCode::CREATED, Json(user_json(&state, &user))).into_response()
}

pub async fn get_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::USER, Action::View) {
        return resp;
    }
    let id: PrincipalId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match resolve_scoped(&principal, state.directory.get_user(id)) {
        Ok(user) => (StatusCode::OK, Json(user_json(&state, &user))).into_response(),
        Err(resp) => resp,
    }
}

pub async fn update_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(patch): Json<UserPatch>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::USER, Action::Change) {
        return resp;
    }
    let id: PrincipalId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let mut user = match resolve_scoped(&principal, state.directory.get_user(id)) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    if let Err(e) = user.apply(patch) {
        return errors::domain_error_to_response(e);
    }

    let user = match state.directory.update_user(user) {
        Ok(u) => u,
        Err(e) => return errors::domain_error_to_response(e),
    };

    // Membership must converge before the update is acknowledged.
    sync_role_group(&state.access, user.id, user.role);

    (StatusCode::OK, Json(user_json(&state, &user))).into_response()
}

pub async fn delete_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::USER, Action::Delete) {
        return resp;
    }
    let id: PrincipalId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let user = match resolve_scoped(&principal, state.directory.get_user(id)) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    match state.directory.delete_user(user.id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
