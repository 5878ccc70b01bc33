//! Test server harness.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use satya::MockEmbedder;
use satya::gateway::{AppState, create_router_with_state};
use satya::index::{DistanceMetric, FactCheckIndex, SourceMetadata};
use satya::pipeline::Analyzer;
use satya::scoring::ModelScorer;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

pub const TEST_API_KEY: &str = "integration-secret";

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub api_key: Option<String>,
    /// Texts containing this string make the embedder fail.
    pub embedder_fail_on: Option<String>,
    pub seed: Vec<(String, SourceMetadata)>,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            api_key: Some(TEST_API_KEY.to_string()),
            embedder_fail_on: None,
            seed: vec![(
                "The viral flood photo was taken in 2013".to_string(),
                SourceMetadata::new("Fact Desk", "https://facts.example/flood"),
            )],
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub index: Arc<FactCheckIndex>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

async fn wait_for_server_ready(addr: SocketAddr) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();
    loop {
        if start.elapsed() > Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS) {
            return Err(ServerStartupError::Timeout);
        }
        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => tokio::time::sleep(Duration::from_millis(STARTUP_POLL_INTERVAL_MS)).await,
        }
    }
}

/// Spawns a server with a stub embedder and heuristic-only scoring on an
/// ephemeral port.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let mut embedder = MockEmbedder::new();
    if let Some(trigger) = config.embedder_fail_on {
        embedder = embedder.fail_on(trigger);
    }

    let index = Arc::new(FactCheckIndex::new(
        Arc::new(embedder),
        DistanceMetric::Euclidean,
    ));
    if !config.seed.is_empty() {
        let (texts, sources): (Vec<String>, Vec<SourceMetadata>) = config.seed.into_iter().unzip();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        index
            .insert(&refs, sources)
            .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    }

    let analyzer = Analyzer::new(index.clone(), Arc::new(ModelScorer::new()))
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let state = AppState::new(Arc::new(analyzer), config.api_key.as_deref());
    let app = create_router_with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    wait_for_server_ready(addr).await?;

    Ok(TestServer {
        addr,
        index,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
