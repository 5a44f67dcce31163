use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use firmdex_auth::{Action, Principal, resources, scope_listing};
use firmdex_core::CompanyId;
use firmdex_directory::{Company, CompanyDraft, CompanyPatch};

use crate::app::routes::common::{parse_id, require_action, resolve_scoped};
use crate::app::{AppState, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_companies).post(create_company))
        .route(
            "/:id",
            get(get_company).patch(update_company).delete(delete_company),
        )
}

pub async fn list_companies(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::COMPANY, Action::View) {
        return resp;
    }

    let scope = scope_listing(&principal);
    let items: Vec<_> = state
        .directory
        .list_companies()
        .iter()
        .filter(|c| scope.admits(*c))
        .map(dto::company_to_json)
        .collect();

    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

/// Create a company. The owner is forced to the creating principal; this is
/// the one creation path open to principals without a tenant affiliation.
pub async fn create_company(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(draft): Json<CompanyDraft>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::COMPANY, Action::Add) {
        return resp;
    }

    let company = match Company::create(draft, principal.id) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match state.directory.insert_company(company) {
        Ok(company) => {
            tracing::info!(company = %company.id, owner = %company.owner, "company created");
            (StatusCode::CREATED, Json(dto::company_to_json(&company))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_company(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::COMPANY, Action::View) {
        return resp;
    }
    let id: CompanyId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match resolve_scoped(&principal, state.directory.get_company(id)) {
        Ok(company) => (StatusCode::OK, Json(dto::company_to_json(&company))).into_response(),
        Err(resp) => resp,
    }
}

pub async fn update_company(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(patch): Json<CompanyPatch>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::COMPANY, Action::Change) {
        return resp;
    }
    let id: CompanyId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let mut company = match resolve_scoped(&principal, state.directory.get_company(id)) {
        Ok(company) => company,
        Err(resp) => return resp,
    };

    if let Err(e) = company.apply(patch) {
        return errors::domain_error_to_response(e);
    }

    match state.directory.update_company(company) {
        Ok(company) => (StatusCode::OK, Json(dto::company_to_json(&company))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_company(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::COMPANY, Action::Delete) {
        return resp;
    }
    let id: CompanyId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let company = match resolve_scoped(&principal, state.directory.get_company(id)) {
        Ok(company) => company,
        Err(resp) => return resp,
    };

    match state.directory.delete_company(company.id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
