//! Scripted transport for exercising the pipeline without a network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::Transport;
use crate::credential::Credential;
use crate::error::ProviderError;

type Responder = Box<dyn Fn(usize, &str, &Value) -> Result<Value, ProviderError> + Send + Sync>;

pub(crate) struct MockTransport {
    responder: Responder,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    /// The responder sees the zero-based call index, the target model and
    /// the request body, so tests can script per-call and per-request
    /// behavior.
    pub fn new(
        responder: impl Fn(usize, &str, &Value) -> Result<Value, ProviderError>
            + Send
            + Sync
            + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            delay: Mutex::new(None),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn with_delay(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn generate_content(
        &self,
        _credential: &Credential,
        model: &str,
        body: &Value,
    ) -> Result<Value, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((model.to_string(), body.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        (self.responder)(call, model, body)
    }
}

pub(crate) fn text_payload(text: &str) -> Value {
    json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
}

pub(crate) fn image_payload(mime: &str, data: &str) -> Value {
    json!({
        "candidates": [{ "content": { "parts": [
            { "inlineData": { "mimeType": mime, "data": data } }
        ] } }]
    })
}
