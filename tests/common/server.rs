//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own studio and scripted model.

use super::constants::*;
use aura_studio_server::server::server::make_app;
use aura_studio_server::config::HttpConfig;
use aura_studio_server::server::RequestsLoggingLevel;
use aura_studio_server::{QuotaGate, ScriptedModel, Studio, StudioSettings};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Test server instance backed by a [`ScriptedModel`]
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// The model answering every feature call; queue replies before requests
    pub model: Arc<ScriptedModel>,

    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port with an empty scripted model
    pub async fn spawn() -> Self {
        Self::spawn_with_model(Arc::new(ScriptedModel::new())).await
    }

    /// Spawns a new test server answering from `model`
    ///
    /// # Panics
    ///
    /// Panics if port binding fails or the server doesn't become ready
    /// within the timeout.
    pub async fn spawn_with_model(model: Arc<ScriptedModel>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let config = HttpConfig {
            port,
            metrics_port: 0,
            logging_level: RequestsLoggingLevel::None,
            frontend_dir_path: None,
        };
        let studio = Studio::new(model.clone(), QuotaGate::new(), StudioSettings::default());
        let app = make_app(config, Arc::new(studio));

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            model,
            shutdown: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Polls `GET /` until the stats page answers
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::new();
        let home = format!("{}/", self.base_url);

        let ready = tokio::time::timeout(
            Duration::from_millis(SERVER_READY_TIMEOUT_MS),
            async {
                loop {
                    if let Ok(response) = client.get(&home).send().await {
                        if response.status().is_success() {
                            return;
                        }
                    }
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            },
        )
        .await;

        assert!(
            ready.is_ok(),
            "Server did not become ready within {}ms",
            SERVER_READY_TIMEOUT_MS
        );
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
