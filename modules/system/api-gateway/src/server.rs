use std::net::SocketAddr;

use axum::Router;
use tokio_util::sync::CancellationToken;

/// Parse bind address from configuration string.
///
/// # Errors
/// Returns an error if `bind_addr` is not a socket address.
pub fn parse_bind_address(bind_addr: &str) -> anyhow::Result<SocketAddr> {
    bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address '{bind_addr}': {e}"))
}

/// Bind and serve `router` until `cancel` fires, then drain in-flight requests.
///
/// Connection info is attached to every request so the authentication gate
/// can record the caller's remote address.
///
/// # Errors
/// Returns an error if binding fails or the server stops abnormally.
pub async fn serve(router: Router, bind_addr: &str, cancel: CancellationToken) -> anyhow::Result<()> {
    let addr = parse_bind_address(bind_addr)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server bound on {}", listener.local_addr()?);

    let shutdown = async move {
        cancel.cancelled().await;
        tracing::info!("HTTP server shutting down gracefully (cancellation)");
    };

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(|e| anyhow::anyhow!(e))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn bind_address_parsing() {
        assert!(parse_bind_address("127.0.0.1:8080").is_ok());
        assert!(parse_bind_address("localhost").is_err());
    }

    #[tokio::test]
    async fn serve_stops_on_cancel() {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(serve(Router::new(), "127.0.0.1:0", cancel.clone()));

        cancel.cancel();

        assert!(handle.await.unwrap().is_ok());
    }
}
