//! HTTP server startup.

use std::future::{Future, IntoFuture};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::config::ServerConfig;
use crate::server::lifecycle::serve_with_shutdown;
use crate::server::shutdown::shutdown_signal;
use crate::server::{ServerError, ServerResult};
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Starts an HTTP server with graceful shutdown.
///
/// After a shutdown signal the server stops accepting connections and waits
/// for in-flight requests, at most for the configured shutdown timeout.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    if let Err(validation_error) = server_config.validate() {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            error = %validation_error,
            "Invalid server configuration"
        );

        return Err(ServerError::invalid_config(&validation_error));
    }

    let server_addr = server_config.server_addr();
    let listener = TcpListener::bind(server_addr).await.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %err,
            "Failed to bind to address"
        );
        ServerError::bind_error(server_addr, err)
    })?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "Successfully bound to address"
    );

    serve_with_shutdown(&server_config, || {
        serve_until_drained(
            listener,
            app,
            shutdown_signal(),
            server_config.shutdown_timeout(),
        )
    })
    .await
}

/// Serves until `signal` resolves, then drains for at most `drain_timeout`.
async fn serve_until_drained(
    listener: TcpListener,
    app: Router,
    signal: impl Future<Output = ()> + Send + 'static,
    drain_timeout: Duration,
) -> io::Result<()> {
    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        signal.await;
        let _ = signalled_tx.send(());
    })
    .into_future();

    let deadline = async move {
        if signalled_rx.await.is_err() {
            std::future::pending::<()>().await;
        }

        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            timeout_secs = drain_timeout.as_secs(),
            "Graceful shutdown initiated"
        );
        tokio::time::sleep(drain_timeout).await;
    };

    tokio::select! {
        result = server => result,
        () = deadline => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                timeout_secs = drain_timeout.as_secs(),
                "Shutdown timeout exceeded, dropping open connections"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::get;

    use super::*;

    #[tokio::test]
    async fn stops_after_signal() -> anyhow::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let app = Router::new().route("/", get(|| async { "ok" }));

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            serve_until_drained(listener, app, async {}, Duration::from_secs(1)),
        )
        .await?;

        assert!(result.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn privileged_port_is_rejected() {
        let config = ServerConfig {
            port: 80,
            ..Default::default()
        };

        let result = serve_http(Router::new(), config).await;
        assert!(matches!(result, Err(ServerError::InvalidConfig(_))));
    }
}
