//! Startup-time composition of the HTTP security policy.
//!
//! Wires the authentication gate and route policy into a [`Pipeline`] and
//! wraps a module router with the full middleware stack.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use http::HeaderName;
use medrx_authn::{Argon2PasswordEncoder, CredentialVerifier, IdentityDirectory, PasswordEncoder};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use crate::auth::{AuthenticationGate, REQUEST_ID_HEADER};
use crate::config::ApiGatewayConfig;
use crate::pipeline::{Pipeline, pipeline_middleware};
use crate::route_policy::{RoutePolicy, RoutePolicyEnforcer};

/// How the API keeps caller state between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPolicy {
    /// Every request carries its own credentials; no session store, no cookies.
    Stateless,
}

pub struct SecurityPolicyAssembler {
    config: ApiGatewayConfig,
    verifier: Arc<dyn CredentialVerifier>,
    directory: Arc<dyn IdentityDirectory>,
    password_encoder: Arc<dyn PasswordEncoder>,
}

impl SecurityPolicyAssembler {
    #[must_use]
    pub fn new(
        config: ApiGatewayConfig,
        verifier: Arc<dyn CredentialVerifier>,
        directory: Arc<dyn IdentityDirectory>,
    ) -> Self {
        Self {
            config,
            verifier,
            directory,
            password_encoder: Arc::new(Argon2PasswordEncoder::default()),
        }
    }

    #[must_use]
    pub fn with_password_encoder(mut self, encoder: Arc<dyn PasswordEncoder>) -> Self {
        self.password_encoder = encoder;
        self
    }

    /// Hashing scheme for collaborators that store credentials.
    #[must_use]
    pub fn password_encoder(&self) -> Arc<dyn PasswordEncoder> {
        Arc::clone(&self.password_encoder)
    }

    #[must_use]
    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy::Stateless
    }

    #[must_use]
    pub fn config(&self) -> &ApiGatewayConfig {
        &self.config
    }

    /// Compile the public allow-list, warning about redundant patterns.
    ///
    /// # Errors
    /// Returns an error if any configured pattern is invalid.
    pub fn build_route_policy(&self) -> Result<RoutePolicy> {
        let policy = RoutePolicy::new(&self.config.public_routes)?;

        for (shadowed, broader) in policy.shadowed_patterns() {
            tracing::warn!(
                pattern = shadowed,
                covered_by = broader,
                "public route pattern is already opened by a broader wildcard"
            );
        }
        tracing::info!(
            public_routes_count = self.config.public_routes.len(),
            "Route policy built from configuration"
        );

        Ok(policy)
    }

    /// Gate first, then the enforcer: the enforcer must see the gate's result.
    ///
    /// # Errors
    /// Returns an error if the route policy cannot be built.
    pub fn build_pipeline(&self) -> Result<Pipeline> {
        let policy = self.build_route_policy()?;
        Ok(Pipeline::new()
            .stage(AuthenticationGate::new(
                Arc::clone(&self.verifier),
                Arc::clone(&self.directory),
            ))
            .stage(RoutePolicyEnforcer::new(policy)))
    }

    /// Apply all middleware layers to a router (request ID, tracing, timeout,
    /// body limit, CORS, security pipeline).
    ///
    /// # Errors
    /// Returns an error if the route policy or CORS configuration is invalid.
    pub fn apply_middleware_stack(&self, mut router: Router) -> Result<Router> {
        // `Router::layer` wraps: the **last** added layer is the **outermost**
        // and runs first on the request path.
        //
        // Request execution order (outermost -> innermost):
        // SetRequestId -> PropagateRequestId -> Trace -> Timeout -> BodyLimit
        // -> CORS -> Pipeline [AuthenticationGate -> RoutePolicyEnforcer] -> Router
        let config = &self.config;

        // 6) Security pipeline
        let pipeline = self.build_pipeline()?;
        router = router.layer(from_fn_with_state(pipeline, pipeline_middleware));

        tracing::info!(
            session_policy = ?self.session_policy(),
            password_scheme = self.password_encoder.scheme(),
            "CSRF protection disabled: bearer-token API without cookies"
        );

        // 5) CORS (outer to the pipeline so preflight short-circuits and 401s carry CORS headers)
        if config.cors_enabled {
            router = router.layer(crate::cors::build_cors_layer(config)?);
        }

        // 4) Body limit
        router = router.layer(RequestBodyLimitLayer::new(config.defaults.body_limit_bytes));
        router = router.layer(DefaultBodyLimit::max(config.defaults.body_limit_bytes));

        // 3) Timeout
        router = router.layer(TimeoutLayer::with_status_code(
            http::StatusCode::GATEWAY_TIMEOUT,
            Duration::from_secs(config.defaults.request_timeout_secs),
        ));

        // 2) Trace (inner to SetRequestId so the span sees the generated id)
        router = router.layer({
            use tower_http::trace::TraceLayer;
            use tracing::field::Empty;

            TraceLayer::new_for_http()
                .make_span_with(|req: &http::Request<axum::body::Body>| {
                    let rid = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("n/a");

                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri().path(),
                        version = ?req.version(),
                        module = "api_gateway",
                        request_id = %rid,
                        status = Empty,
                        latency_ms = Empty,
                    )
                })
                .on_response(
                    |res: &http::Response<axum::body::Body>,
                     latency: Duration,
                     span: &tracing::Span| {
                        span.record("status", res.status().as_u16());
                        span.record("latency_ms", latency.as_millis());
                    },
                )
        });

        // 1) Request ID handling: generate if missing, then echo on the response
        let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

        Ok(router)
    }

    /// Pipeline layer alone, for routers that bring their own outer stack.
    ///
    /// # Errors
    /// Returns an error if the route policy cannot be built.
    pub fn apply_pipeline(&self, router: Router) -> Result<Router> {
        Ok(router.layer(from_fn_with_state(self.build_pipeline()?, pipeline_middleware)))
    }
}
