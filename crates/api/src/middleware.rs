use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use firmdex_auth::{AuthClaims, validate_claims};

#[derive(Clone)]
pub struct AuthState {
    decoding: Arc<DecodingKey>,
    validation: Validation,
}

impl AuthState {
    pub fn new(jwt_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Claim-window checks are done by `validate_claims` against our own
        // timestamp fields; the registered exp/iat claims are not used.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            decoding: Arc::new(DecodingKey::from_secret(jwt_secret.as_bytes())),
            validation,
        }
    }
}

/// Verify the bearer token and attach the resolved [`firmdex_auth::Principal`]
/// to the request. Everything behind this layer can assume an authenticated
/// principal; unauthenticated requests never reach a handler.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    let data = jsonwebtoken::decode::<AuthClaims>(token, &state.decoding, &state.validation)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    validate_claims(&data.claims, Utc::now()).map_err(|_| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(data.claims.principal());

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
