//! Background request worker wiring the TUI to a [`FetchGateway`].
//!
//! This module bridges the synchronous TUI event loop (crossterm poll-based)
//! with the async gateway. [`spawn_api`] starts a tokio task that receives
//! [`ApiCommand`]s and answers each fetch with an [`ApiEvent`].
//!
//! # Architecture
//!
//! ```text
//! TUI (main thread)  ←── ApiEvent ───  tokio background tasks
//!                     ─── ApiCommand →
//! ```
//!
//! Each fetch runs in its own task, so a slow request never delays the
//! next one. Results carry the [`RequestId`] they were issued with; the
//! controllers use it to drop results nobody is waiting for any more.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tokio::sync::mpsc;

use crate::gateway::{FetchGateway, FetchRequest, GatewayError, Toast, toast_for};

/// Correlates a response with the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

impl RequestId {
    /// Allocates a process-unique id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Commands sent from the TUI main loop to the request worker.
#[derive(Debug)]
pub enum ApiCommand {
    /// Execute a request.
    Fetch {
        /// Id echoed back in [`ApiEvent::Completed`].
        id: RequestId,
        /// The request.
        request: FetchRequest,
    },
    /// Stop accepting commands.
    Shutdown,
}

/// Events sent from the request worker to the TUI main loop.
#[derive(Debug)]
pub enum ApiEvent {
    /// A request finished.
    Completed {
        /// Id the request was issued with.
        id: RequestId,
        /// Decoded body or the gateway error.
        result: Result<Value, GatewayError>,
    },
    /// A notification raised by the gateway.
    Toast(Toast),
}

/// Default channel capacity for commands and events.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Spawn the request worker and return its channel handles.
///
/// Must be called from within a tokio runtime.
pub fn spawn_api<G>(
    gateway: Arc<G>,
    channel_capacity: usize,
) -> (mpsc::Sender<ApiCommand>, mpsc::Receiver<ApiEvent>)
where
    G: FetchGateway + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel::<ApiCommand>(channel_capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<ApiEvent>(channel_capacity);

    tokio::spawn(async move {
        command_handler(gateway, cmd_rx, evt_tx).await;
    });

    (cmd_tx, evt_rx)
}

/// Background task: dispatch commands until shutdown or the TUI hangs up.
async fn command_handler<G>(
    gateway: Arc<G>,
    mut cmd_rx: mpsc::Receiver<ApiCommand>,
    evt_tx: mpsc::Sender<ApiEvent>,
) where
    G: FetchGateway + 'static,
{
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            ApiCommand::Fetch { id, request } => {
                let gateway = Arc::clone(&gateway);
                let evt_tx = evt_tx.clone();
                tokio::spawn(async move {
                    execute(gateway.as_ref(), id, request, &evt_tx).await;
                });
            }
            ApiCommand::Shutdown => {
                tracing::info!("api command handler shutting down");
                break;
            }
        }
    }
}

/// Run one request and report its notification and result.
async fn execute<G: FetchGateway>(
    gateway: &G,
    id: RequestId,
    request: FetchRequest,
    evt_tx: &mpsc::Sender<ApiEvent>,
) {
    tracing::debug!(request_id = %id, method = %request.method, path = %request.url, "fetch");
    let result = gateway.fetch(&request).await;
    if let Err(e) = &result {
        tracing::warn!(request_id = %id, error = %e, "fetch failed");
    }

    if let Some(toast) = toast_for(&request, &result)
        && evt_tx.send(ApiEvent::Toast(toast)).await.is_err()
    {
        return;
    }
    // A closed channel means the TUI is gone.
    let _ = evt_tx.send(ApiEvent::Completed { id, result }).await;
}
