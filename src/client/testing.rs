//! Scripted transport for unit tests.

use crate::client::request::RequestDescriptor;
use crate::client::transport::{Transport, TransportResponse};
use crate::error::{TransportError, TransportErrorKind};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub(crate) type Outcome = Result<TransportResponse, TransportError>;

/// Plays back a fixed list of outcomes; the last one repeats forever.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Outcome>>>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RequestDescriptor>>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub(crate) fn new(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        ScriptedTransport {
            script: Arc::new(Mutex::new(outcomes.into_iter().collect())),
            ..Default::default()
        }
    }

    pub(crate) fn always(outcome: Outcome) -> Self {
        Self::new([outcome])
    }

    /// Sleep before answering each attempt.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
        _timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut script = self.script.lock();
        match script.len() {
            0 => Err(TransportError::new(TransportErrorKind::Other, "script is empty")),
            1 => script[0].clone(),
            _ => script.pop_front().unwrap_or_else(|| {
                Err(TransportError::new(TransportErrorKind::Other, "script is empty"))
            }),
        }
    }
}

pub(crate) fn json_response(status: u16, body: serde_json::Value) -> Outcome {
    Ok(TransportResponse::new(status, body.to_string()))
}

pub(crate) fn connection_reset() -> Outcome {
    Err(TransportError::new(
        TransportErrorKind::ConnectionReset,
        "connection reset by peer",
    ))
}

/// A configured client answering from `transport`, without backoff delays
/// worth waiting for.
pub(crate) fn scripted_client(transport: &ScriptedTransport) -> super::DebridClient {
    let client = super::DebridClient::with_transport(transport.clone());
    client
        .configure(
            super::ClientOptions::new("test-api-key")
                .with_base_url("http://localhost:3000")
                .with_max_retries(0),
        )
        .expect("valid test configuration");
    client
}

pub(crate) fn success(data: serde_json::Value) -> Outcome {
    json_response(200, serde_json::json!({ "status": "success", "data": data }))
}
