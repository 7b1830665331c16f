//! Wiring of authentication, the security pipeline and the prescriptions module.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use api_gateway::SecurityPolicyAssembler;
use axum::Router;
use medrx_authn::{JwtCredentialVerifier, StaticIdentityDirectory};
use prescriptions::PrescriptionsModule;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;

fn assembler(cfg: &AppConfig) -> anyhow::Result<SecurityPolicyAssembler> {
    let verifier =
        JwtCredentialVerifier::from_config(&cfg.authn.jwt).context("invalid JWT configuration")?;
    let directory = StaticIdentityDirectory::from_config(&cfg.authn.identities);
    if directory.is_empty() {
        tracing::warn!("no identities configured: every protected route will answer 401");
    } else {
        tracing::info!(identities = directory.len(), "static identity directory loaded");
    }

    Ok(SecurityPolicyAssembler::new(
        cfg.api_gateway.clone(),
        Arc::new(verifier),
        Arc::new(directory),
    ))
}

/// Validate everything that can be checked without opening the database.
///
/// # Errors
/// Returns the first configuration problem found.
pub fn check(cfg: &AppConfig) -> anyhow::Result<()> {
    api_gateway::server::parse_bind_address(&cfg.api_gateway.bind_addr)?;
    let assembler = assembler(cfg)?;
    assembler.build_pipeline()?;
    api_gateway::cors::build_cors_layer(assembler.config())?;
    Ok(())
}

/// Build the fully wrapped application router.
///
/// # Errors
/// Fails if authentication, the route policy, CORS or storage cannot be set up.
pub async fn build_router(cfg: &AppConfig) -> anyhow::Result<Router> {
    let assembler = assembler(cfg)?;
    let module =
        PrescriptionsModule::init(&cfg.database, &cfg.interactions, &cfg.access_catalog).await?;
    assembler.apply_middleware_stack(module.router())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

/// Serve until Ctrl-C, then give in-flight requests the configured grace period.
///
/// # Errors
/// Fails if the router cannot be built or the listener cannot bind.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let router = build_router(&cfg).await?;
    let cancel = CancellationToken::new();
    let bind_addr = cfg.api_gateway.bind_addr.clone();

    let mut server = tokio::spawn({
        let cancel = cancel.clone();
        async move { api_gateway::serve(router, &bind_addr, cancel).await }
    });

    tokio::select! {
        res = &mut server => return res.context("HTTP server task failed")?,
        () = shutdown_signal() => {}
    }

    cancel.cancel();
    let grace = Duration::from_secs(cfg.server.shutdown_grace_secs);
    if let Ok(res) = tokio::time::timeout(grace, &mut server).await {
        res.context("HTTP server task failed")?
    } else {
        tracing::warn!(
            grace_secs = cfg.server.shutdown_grace_secs,
            "in-flight requests did not finish in time, aborting"
        );
        server.abort();
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use jsonwebtoken::{EncodingKey, Header, encode, get_current_timestamp};
    use medrx_authn::{Claims, IdentityConfig};
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    const SECRET: &str = "e2e-secret";

    fn config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.authn.jwt.secret = SecretString::from(SECRET);
        cfg.authn.identities = vec![IdentityConfig {
            subject: "dr.karim".to_owned(),
            display_name: None,
            roles: vec!["DOCTOR".to_owned()],
            credential_version: 0,
            enabled: true,
            password_hash: None,
        }];
        cfg.database.url = "sqlite::memory:".to_owned();
        cfg
    }

    fn token(sub: &str) -> String {
        let now = get_current_timestamp();
        encode(
            &Header::default(),
            &Claims {
                sub: sub.to_owned(),
                exp: now + 600,
                iat: now,
                ver: 0,
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn create_req(auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/prescriptions")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = auth {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder
            .body(Body::from(
                json!({
                    "prescriptionDate": "2024-06-01",
                    "name": "Mita",
                    "age": 29,
                    "gender": "Female",
                    "diagnosis": "Anemia",
                    "medicines": "Ferrous sulfate"
                })
                .to_string(),
            ))
            .unwrap()
    }

    #[test]
    fn default_config_needs_a_secret() {
        assert!(check(&AppConfig::default()).is_err());
        assert!(check(&config()).is_ok());
    }

    #[test]
    fn bad_bind_address_fails_check() {
        let mut cfg = config();
        cfg.api_gateway.bind_addr = "nowhere".to_owned();
        assert!(check(&cfg).is_err());
    }

    #[tokio::test]
    async fn protected_write_needs_a_token_end_to_end() {
        let app = build_router(&config()).await.unwrap();

        let anonymous = app.clone().oneshot(create_req(None)).await.unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let authorized = app
            .clone()
            .oneshot(create_req(Some(&token("dr.karim"))))
            .await
            .unwrap();
        assert_eq!(authorized.status(), StatusCode::CREATED);

        let report = app
            .oneshot(
                Request::builder()
                    .uri("/report")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token("dr.karim")))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(report.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(report.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!([{"date": "01-06-2024", "count": 1}]));
    }

    #[tokio::test]
    async fn catalog_is_public_end_to_end() {
        let app = build_router(&config()).await.unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/roles")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
