//! Ordered request-processing stages run ahead of every handler.
//!
//! Each [`Stage`] either lets the request continue or answers it. Stage
//! results are recorded in a [`RequestContext`] stored in the request
//! extensions, so a stage registered twice for the same request runs once.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::request::Parts;
use medrx_security::SecurityContext;

/// Outcome of a single stage.
pub enum StageOutcome {
    /// Hand the request to the next stage, then the handler.
    Continue,
    /// Answer now; later stages and the handler never run.
    Respond(Response),
}

#[async_trait]
pub trait Stage: Send + Sync {
    /// Stable identifier used by the run-once guard.
    fn name(&self) -> &'static str;

    async fn process(&self, parts: &Parts, ctx: &mut RequestContext) -> StageOutcome;
}

/// Per-request state threaded through the pipeline.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    security: SecurityContext,
    applied: BTreeSet<&'static str>,
}

impl RequestContext {
    #[must_use]
    pub fn security(&self) -> &SecurityContext {
        &self.security
    }

    pub fn security_mut(&mut self) -> &mut SecurityContext {
        &mut self.security
    }

    #[must_use]
    pub fn has_applied(&self, stage: &str) -> bool {
        self.applied.contains(stage)
    }
}

#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage; stages run in insertion order.
    #[must_use]
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|s| s.name())
    }

    /// Run every stage not yet applied to this request.
    ///
    /// On `Continue` the updated context is stored back into `parts`, along
    /// with a copy of the [`SecurityContext`] for handlers.
    pub async fn run(&self, parts: &mut Parts) -> Option<Response> {
        let mut ctx = parts
            .extensions
            .remove::<RequestContext>()
            .unwrap_or_default();

        for stage in &self.stages {
            let name = stage.name();
            if !ctx.applied.insert(name) {
                tracing::trace!(stage = name, "stage already applied to this request");
                continue;
            }
            if let StageOutcome::Respond(response) = stage.process(parts, &mut ctx).await {
                return Some(response);
            }
        }

        parts.extensions.insert(ctx.security.clone());
        parts.extensions.insert(ctx);
        None
    }
}

/// Axum adapter: `from_fn_with_state(pipeline, pipeline_middleware)`.
pub async fn pipeline_middleware(
    State(pipeline): State<Pipeline>,
    req: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = req.into_parts();
    if let Some(response) = pipeline.run(&mut parts).await {
        return response;
    }
    next.run(Request::from_parts(parts, body)).await
}
