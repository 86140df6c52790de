//! Server Implementation

use std::net::SocketAddr;

use crate::core::{Config, Result, ServerState};
use crate::services::https::build_router;

/// HTTP Server
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Serve until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        let state = ServerState::initialize(&self.config).await?;
        state.start_background_tasks();

        let app = build_router(state);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Mesa server listening on {}", addr);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        })
        .await?;

        Ok(())
    }
}
