use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::{Extension, Router};

use crate::api::rest::handlers;
use crate::domain::catalog::AccessCatalog;
use crate::module::ConcreteService;

/// All prescription routes, mounted at the root.
///
/// Handlers read the caller's `SecurityContext` from request extensions; it is
/// inserted by the gateway pipeline wrapped around this router.
pub fn router(service: Arc<ConcreteService>, catalog: Arc<AccessCatalog>) -> Router {
    Router::new()
        .route("/prescription", get(handlers::list_prescriptions))
        .route("/prescription/{id}", get(handlers::get_prescription))
        .route("/prescriptions", post(handlers::create_prescription))
        .route(
            "/prescriptions/{id}",
            patch(handlers::update_prescription).delete(handlers::delete_prescription),
        )
        .route("/report", get(handlers::daily_report))
        .route("/posts", get(handlers::drug_interactions))
        .route("/api/v1/users/welcome", get(handlers::welcome))
        .route("/api/v1/roles", get(handlers::list_roles))
        .route("/api/v1/permission", get(handlers::list_permissions))
        .route("/api/v1/privileges", get(handlers::list_privileges))
        .route("/v3/api-docs", get(handlers::api_docs))
        .layer(Extension(service))
        .layer(Extension(catalog))
}
