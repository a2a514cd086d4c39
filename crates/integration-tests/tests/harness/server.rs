//! Test server wrapper that starts the gateway on a random port

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use voxgate_config::Config;
use voxgate_provider::FlagStore;
use voxgate_synthesis::{Server, endpoint_router};

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a test server with the given configuration
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        Self::serve(Server::build(config)?).await
    }

    /// Start a test server with an injected flag store
    pub async fn start_with_flags(
        config: Config,
        store: Arc<dyn FlagStore>,
    ) -> anyhow::Result<Self> {
        Self::serve(Server::with_flag_store(config, store)?).await
    }

    async fn serve(server: Server) -> anyhow::Result<Self> {
        let app = endpoint_router().with_state(Arc::new(server));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown,
            client: reqwest::Client::new(),
        })
    }

    /// Base URL of the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// POST a speech request and return the parsed JSON body and status
    pub async fn speak(&self, body: &serde_json::Value) -> anyhow::Result<(u16, serde_json::Value)> {
        let response = self
            .client
            .post(self.url("/v1/speech"))
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let json = response.json().await.unwrap_or(serde_json::Value::Null);
        Ok((status, json))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
