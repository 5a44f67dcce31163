use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use firmdex_auth::Principal;

use crate::app::{AppState, dto};

/// The caller's own identity and, when present, directory profile.
pub async fn me(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    let profile = state.directory.get_user(principal.id);
    let company_name = profile
        .as_ref()
        .and_then(|p| p.company)
        .and_then(|id| state.directory.get_company(id))
        .map(|c| c.name);

    let body = serde_json::json!({
        "principal": {
            "id": principal.id,
            "role": principal.role,
            "company": principal.tenant,
            "superuser": principal.is_superuser,
        },
        "profile": profile.as_ref().map(|p| dto::user_to_json(p, company_name.as_deref())),
    });

    (StatusCode::OK, Json(body)).into_response()
}
