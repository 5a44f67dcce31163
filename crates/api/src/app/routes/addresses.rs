use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use firmdex_auth::{Action, Principal, resources, scope_listing};
use firmdex_core::AddressId;
use firmdex_directory::{Address, AddressDraft, AddressPatch};

use crate::app::routes::common::{parse_id, require_action, resolve_scoped};
use crate::app::{AppState, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_addresses).post(create_address))
        .route(
            "/:id",
            get(get_address).patch(update_address).delete(delete_address),
        )
}

pub async fn list_addresses(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::ADDRESS, Action::View) {
        return resp;
    }

    let scope = scope_listing(&principal);
    let items: Vec<_> = state
        .directory
        .list_addresses()
        .iter()
        .filter(|a| scope.admits(*a))
        .map(dto::address_to_json)
        .collect();

    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

/// Create an address. The owning company is forced to the creator's tenant;
/// the payload cannot place an address under another company.
pub async fn create_address(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(draft): Json<AddressDraft>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::ADDRESS, Action::Add) {
        return resp;
    }

    let Some(tenant) = principal.tenant else {
        // No affiliation means no tenant-scoped writes.
        return errors::forbidden();
    };

    let address = match Address::create(draft, tenant.into()) {
        Ok(a) => a,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match state.directory.insert_address(address) {
        Ok(address) => {
            tracing::info!(address = %address.id, company = %address.company, "address created");
            (StatusCode::CREATED, Json(dto::address_to_json(&address))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_address(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::ADDRESS, Action::View) {
        return resp;
    }
    let id: AddressId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match resolve_scoped(&principal, state.directory.get_address(id)) {
        Ok(address) => (StatusCode::OK, Json(dto::address_to_json(&address))).into_response(),
        Err(resp) => resp,
    }
}

pub async fn update_address(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(patch): Json<AddressPatch>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::ADDRESS, Action::Change) {
        return resp;
    }
    let id: AddressId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let mut address = match resolve_scoped(&principal, state.directory.get_address(id)) {
        Ok(address) => address,
        Err(resp) => return resp,
    };

    if let Err(e) = address.apply(patch) {
        return errors::domain_error_to_response(e);
    }

    match state.directory.update_address(address) {
        Ok(address) => (StatusCode::OK, Json(dto::address_to_json(&address))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_address(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_action(&state, &principal, resources::ADDRESS, Action::Delete) {
        return resp;
    }
    let id: AddressId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let address = match resolve_scoped(&principal, state.directory.get_address(id)) {
        Ok(address) => address,
        Err(resp) => return resp,
    };

    match state.directory.delete_address(address.id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
