//! Node wiring and lifecycle.

use crate::{NodeConfig, NodeError, ShutdownController};
use atelier_ledger::{JsonRpcGateway, LedgerGateway};
use atelier_store_http::HttpContentStore;
use atelier_verification::{
    EventReconciler, RetryPolicy, StaticAuthorizer, VerificationOrchestrator,
};
use atelier_websocket::WebSocketServer;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// How long `stop` waits for each background task before aborting it.
const STOP_GRACE: Duration = Duration::from_secs(5);

/// One running atelier service instance.
///
/// Owns the orchestrator, the event reconciler task, the HTTP relay, and
/// the optional WebSocket server, all wired to a single shutdown
/// controller. The node holds no durable local state; the cache is
/// rebuilt from the ledger and store on every start.
pub struct AtelierNode {
    config: NodeConfig,
    shutdown: ShutdownController,
    gateway: Arc<JsonRpcGateway>,
    orchestrator: Arc<VerificationOrchestrator>,
    tasks: Vec<JoinHandle<()>>,
}

impl AtelierNode {
    /// Build the node and its collaborators. Fails fast on invalid
    /// configuration (e.g. malformed admin addresses).
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        let admins = config.admin_set()?;

        let store = Arc::new(HttpContentStore::new(
            &config.content_store_url,
            config.content_store_token.clone(),
        ));
        let gateway = Arc::new(JsonRpcGateway::new(&config.ledger_rpc_url));
        let authz = Arc::new(StaticAuthorizer::new(admins));

        let retry = RetryPolicy {
            max_attempts: config.retry_max_attempts,
            ..RetryPolicy::default()
        };
        let orchestrator = Arc::new(
            VerificationOrchestrator::new(
                store,
                Arc::clone(&gateway) as Arc<dyn LedgerGateway>,
                authz,
            )
            .with_retry_policy(retry),
        );

        Ok(Self {
            config,
            shutdown: ShutdownController::new(),
            gateway,
            orchestrator,
            tasks: Vec::new(),
        })
    }

    /// The orchestrator, for embedding callers and tests.
    pub fn orchestrator(&self) -> Arc<VerificationOrchestrator> {
        Arc::clone(&self.orchestrator)
    }

    /// Start the reconciler and the servers. Returns once they are
    /// spawned; use [`wait_for_signal`] to block until shutdown is
    /// requested.
    ///
    /// [`wait_for_signal`]: AtelierNode::wait_for_signal
    pub fn start(&mut self) -> Result<(), NodeError> {
        let reconciler = EventReconciler::new(
            Arc::clone(&self.gateway) as Arc<dyn LedgerGateway>,
            self.orchestrator.cache(),
            self.orchestrator.updates(),
        )
        .with_poll_interval(Duration::from_secs(self.config.event_poll_interval_secs));
        self.tasks.push(reconciler.spawn(self.shutdown.subscribe()));

        let rpc = atelier_rpc::RpcServer::new(self.config.rpc_port, self.orchestrator());
        let rpc_shutdown = self.shutdown.subscribe();
        self.tasks.push(tokio::spawn(async move {
            if let Err(e) = rpc.start(rpc_shutdown).await {
                tracing::error!(error = %e, "RPC server exited");
            }
        }));

        if self.config.enable_websocket {
            let ws = WebSocketServer::new(
                self.config.websocket_port,
                self.orchestrator.updates(),
            );
            let ws_shutdown = self.shutdown.subscribe();
            self.tasks.push(tokio::spawn(async move {
                if let Err(e) = ws.start(ws_shutdown).await {
                    tracing::error!(error = %e, "WebSocket server exited");
                }
            }));
        }

        tracing::info!(
            rpc_port = self.config.rpc_port,
            websocket = self.config.enable_websocket,
            ledger = %self.config.ledger_rpc_url,
            store = %self.config.content_store_url,
            "atelier node started"
        );
        Ok(())
    }

    /// Block until SIGINT/SIGTERM.
    pub async fn wait_for_signal(&self) {
        self.shutdown.wait_for_signal().await;
    }

    /// Broadcast shutdown and wait for every background task to finish,
    /// aborting stragglers after a grace period.
    pub async fn stop(&mut self) {
        self.shutdown.shutdown();
        for mut task in self.tasks.drain(..) {
            if tokio::time::timeout(STOP_GRACE, &mut task).await.is_err() {
                tracing::warn!("task did not stop within grace period, aborting");
                task.abort();
            }
        }
        tracing::info!("atelier node stopped");
    }
}
