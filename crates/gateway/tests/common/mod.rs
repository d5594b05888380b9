#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use pc_domain::character::CharacterCatalog;
use pc_domain::config::Config;
use pc_domain::error::{Error, Result};
use pc_gateway::bootstrap::assemble_state;
use pc_gateway::state::AppState;
use pc_providers::{ChatRequest, ChatResponse, LlmProvider};

/// In-process stand-in for the upstream model API.
///
/// Replies come from a queue of scripted outcomes; once the queue is empty
/// every call succeeds with `"reply N"`.
#[derive(Default)]
pub struct FakeProvider {
    script: Mutex<VecDeque<Result<String>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Default::default()
        })
    }

    pub fn push_reply(&self, text: &str) {
        self.script.lock().push_back(Ok(text.to_owned()));
    }

    pub fn push_failure(&self, err: Error) {
        self.script.lock().push_back(Err(err));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> ChatRequest {
        self.requests.lock().last().cloned().expect("no request recorded")
    }
}

#[async_trait::async_trait]
impl LlmProvider for FakeProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().push(req.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let outcome = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("reply {n}")));
        outcome.map(|text| ChatResponse {
            content: Some(text),
            usage: None,
            model: "fake-model".into(),
            finish_reason: Some("stop".into()),
        })
    }

    fn provider_id(&self) -> &str {
        "fake"
    }

    fn default_model(&self) -> &str {
        "fake-model"
    }
}

pub fn test_state(provider: Arc<FakeProvider>) -> AppState {
    test_state_with(Config::default(), provider)
}

pub fn test_state_with(config: Config, provider: Arc<FakeProvider>) -> AppState {
    assemble_state(
        Arc::new(config),
        Arc::new(CharacterCatalog::builtin()),
        provider,
    )
}
