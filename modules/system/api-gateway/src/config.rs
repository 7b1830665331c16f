use serde::{Deserialize, Serialize};

fn default_cors_enabled() -> bool {
    true
}

fn default_body_limit_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Paths reachable without authentication.
///
/// Kept exactly as deployed, including the redundant `/api/v1/permission`
/// and `/api/v1/roles` entries and the slash-less `api/v1/**`, which is
/// normalized to `/api/v1/**` and therefore opens the whole `/api/v1` tree.
pub const DEFAULT_PUBLIC_ROUTES: &[&str] = &[
    "/api/v1/auth/**",
    "/api/v1/users/welcome",
    "/swagger-ui/**",
    "/swagger-ui.html/**",
    "/swagger-resources/**",
    "/api-docs/**",
    "/v2/api-docs/**",
    "/v3/api-docs/**",
    "/webjars/**",
    "/api/v1/privileges/**",
    "/api/v1/permission/**",
    "/api/v1/permission",
    "/api/v1/roles/**",
    "/api/v1/roles",
    "api/v1/**",
];

fn default_public_routes() -> Vec<String> {
    DEFAULT_PUBLIC_ROUTES.iter().map(|&p| p.to_owned()).collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiGatewayConfig {
    pub bind_addr: String,
    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,
    /// Optional detailed CORS configuration; permissive defaults when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors: Option<CorsConfig>,

    /// Exact paths or `prefix/**` patterns that skip authentication.
    #[serde(default = "default_public_routes")]
    pub public_routes: Vec<String>,

    /// Global defaults
    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for ApiGatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_owned(),
            cors_enabled: default_cors_enabled(),
            cors: None,
            public_routes: default_public_routes(),
            defaults: Defaults::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Defaults {
    /// Global request body size limit in bytes
    pub body_limit_bytes: usize,
    /// Requests running longer than this are answered with 504.
    pub request_timeout_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            body_limit_bytes: default_body_limit_bytes(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct CorsConfig {
    /// Allowed origins: `["*"]` means any
    pub allowed_origins: Vec<String>,
    /// Allowed HTTP methods: `["*"]` means any
    pub allowed_methods: Vec<String>,
    /// Allowed request headers: `["*"]` means any
    pub allowed_headers: Vec<String>,
    /// Whether to allow credentials. Rejected together with any wildcard.
    pub allow_credentials: bool,
    /// Max age for preflight caching in seconds
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_owned()],
            allowed_methods: vec!["*".to_owned()],
            allowed_headers: vec!["*".to_owned()],
            allow_credentials: false,
            max_age_seconds: 600,
        }
    }
}
