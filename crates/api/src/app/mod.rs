pub mod dto;
pub mod errors;
pub mod routes;

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use firmdex_auth::{AccessStore, MaterializeReport, default_grant_table, materialize};
use firmdex_infra::{
    DirectoryStore, InMemoryAccessStore, InMemoryDirectoryStore, InMemoryPermissionCatalog,
};

use crate::middleware::{AuthState, auth_middleware};

/// Shared per-process services.
pub struct AppState {
    pub directory: Arc<dyn DirectoryStore>,
    pub access: Arc<dyn AccessStore>,
    /// Outcome of the bootstrap materialization, kept for the audit endpoint.
    pub bootstrap_report: MaterializeReport,
}

/// Build the application router.
///
/// Materializes the role registry before serving: a malformed grant table
/// aborts here, before any route is exposed or any group exists.
pub fn build_app(jwt_secret: &str) -> anyhow::Result<Router> {
    let directory: Arc<dyn DirectoryStore> = Arc::new(InMemoryDirectoryStore::new());
    let access: Arc<dyn AccessStore> = Arc::new(InMemoryAccessStore::new());

    let catalog = InMemoryPermissionCatalog::directory();
    let report = materialize(default_grant_table(), &catalog, &access)?;
    tracing::info!(
        granted = report.granted_count(),
        warnings = report.warnings.len(),
        "role registry materialized"
    );
    for warning in &report.warnings {
        tracing::warn!("bootstrap: {warning}");
    }

    let state = Arc::new(AppState {
        directory,
        access,
        bootstrap_report: report,
    });

    let auth_state = AuthState::new(jwt_secret);

    let protected = Router::new()
        .route("/me", get(routes::me::me))
        .nest("/companies", routes::companies::router())
        .nest("/addresses", routes::addresses::router())
        .nest("/users", routes::users::router())
        .nest("/rbac", routes::rbac::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(auth_state, auth_middleware))
                .layer(Extension(state)),
        );

    Ok(Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .merge(protected))
}
