//! Loopback gateway for testing.
//!
//! [`LoopbackGateway`] never touches the network. Responses are scripted up
//! front with [`LoopbackGateway::respond`] and handed out in FIFO order; every
//! executed request is recorded so tests can assert on method, path, headers
//! and body.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde_json::Value;

use super::{FetchGateway, FetchRequest, GatewayError};

/// In-process gateway with scripted responses.
#[derive(Debug, Default)]
pub struct LoopbackGateway {
    /// Responses handed out in order.
    responses: Mutex<VecDeque<Result<Value, GatewayError>>>,
    /// Every request executed so far.
    requests: Mutex<Vec<FetchRequest>>,
}

impl LoopbackGateway {
    /// Creates a gateway with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the result for the next unanswered request.
    pub fn respond(&self, result: Result<Value, GatewayError>) {
        self.responses.lock().push_back(result);
    }

    /// Builder form of [`respond`](Self::respond).
    #[must_use]
    pub fn with_response(self, result: Result<Value, GatewayError>) -> Self {
        self.respond(result);
        self
    }

    /// Snapshot of the requests executed so far.
    #[must_use]
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }
}

impl FetchGateway for LoopbackGateway {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value, GatewayError> {
        self.requests.lock().push(request.clone());
        self.responses.lock().pop_front().unwrap_or_else(|| {
            Err(GatewayError::Transport(format!(
                "no scripted response for {} {}",
                request.method, request.url
            )))
        })
    }
}
