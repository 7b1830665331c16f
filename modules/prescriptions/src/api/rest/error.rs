use axum::extract::FromRequestParts;
use http::request::Parts;
use medrx_errors::Problem;

use crate::domain::error::DomainError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Where a failed request came from, for problem responses.
#[derive(Debug, Clone, Default)]
pub struct ProblemContext {
    pub instance: String,
    pub trace_id: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for ProblemContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            instance: parts.uri.path().to_owned(),
            trace_id: parts
                .headers
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
        })
    }
}

impl ProblemContext {
    #[must_use]
    pub fn decorate(&self, problem: Problem) -> Problem {
        let problem = problem.with_instance(self.instance.clone());
        match &self.trace_id {
            Some(id) => problem.with_trace_id(id.clone()),
            None => problem,
        }
    }
}

/// Map domain error to RFC 9457 Problem
#[must_use]
pub fn domain_error_to_problem(e: &DomainError, ctx: &ProblemContext) -> Problem {
    let problem = match e {
        DomainError::NotFound { .. } => Problem::not_found(e.to_string()),
        DomainError::Validation { .. } => Problem::bad_request(e.to_string()),
        DomainError::Database(_) => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = %e, "Database error occurred");
            Problem::internal("An internal database error occurred")
        }
        DomainError::Upstream(_) => {
            tracing::warn!(error = %e, "Drug interaction service failed");
            Problem::bad_gateway("The drug interaction service is unavailable")
        }
    };
    ctx.decorate(problem)
}
