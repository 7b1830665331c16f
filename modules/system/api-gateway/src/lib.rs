#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! HTTP security layer for medrx.
//!
//! Request execution order (outermost -> innermost):
//! set request id -> propagate request id -> trace -> timeout -> body limit
//! -> CORS -> pipeline [authentication gate -> route policy] -> router

pub mod assembler;
pub mod auth;
pub mod config;
pub mod cors;
pub mod pipeline;
pub mod route_policy;
pub mod server;

pub use assembler::{SecurityPolicyAssembler, SessionPolicy};
pub use auth::{AuthenticationGate, REQUEST_ID_HEADER};
pub use config::{ApiGatewayConfig, CorsConfig, DEFAULT_PUBLIC_ROUTES, Defaults};
pub use pipeline::{Pipeline, RequestContext, Stage, StageOutcome, pipeline_middleware};
pub use route_policy::{AuthRequirement, RoutePolicy, RoutePolicyEnforcer, RoutePolicyError};
pub use server::serve;
