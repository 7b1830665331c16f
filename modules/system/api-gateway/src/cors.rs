use std::time::Duration;

use anyhow::{Context, bail};
use http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::{ApiGatewayConfig, CorsConfig};

fn is_wildcard(values: &[String]) -> bool {
    values.iter().any(|v| v == "*")
}

/// Build the CORS layer from gateway configuration.
///
/// Missing `cors` section means the permissive default: any origin, any
/// method, any header, no credentials.
///
/// # Errors
/// Fails on unparsable origins, methods or header names, and on
/// `allow_credentials` combined with a wildcard (browsers reject that).
pub fn build_cors_layer(cfg: &ApiGatewayConfig) -> anyhow::Result<CorsLayer> {
    let cors = cfg.cors.clone().unwrap_or_default();
    validate(&cors)?;

    let origin = if is_wildcard(&cors.allowed_origins) {
        AllowOrigin::any()
    } else {
        let origins = cors
            .allowed_origins
            .iter()
            .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin '{o}'")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    let methods = if is_wildcard(&cors.allowed_methods) {
        AllowMethods::any()
    } else {
        let methods = cors
            .allowed_methods
            .iter()
            .map(|m| {
                Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                    .with_context(|| format!("invalid CORS method '{m}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowMethods::list(methods)
    };

    let headers = if is_wildcard(&cors.allowed_headers) {
        AllowHeaders::any()
    } else {
        let headers = cors
            .allowed_headers
            .iter()
            .map(|h| HeaderName::from_bytes(h.as_bytes()).with_context(|| format!("invalid CORS header '{h}'")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowHeaders::list(headers)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(cors.allow_credentials)
        .max_age(Duration::from_secs(cors.max_age_seconds)))
}

fn validate(cors: &CorsConfig) -> anyhow::Result<()> {
    if cors.allow_credentials
        && (is_wildcard(&cors.allowed_origins)
            || is_wildcard(&cors.allowed_methods)
            || is_wildcard(&cors.allowed_headers))
    {
        bail!("CORS allow_credentials cannot be combined with wildcard origins, methods or headers");
    }
    Ok(())
}
