//! In-memory provider and log sink for runtime tests.

use crate::error::BridgeError;
use crate::log::InvocationLog;
use crate::provider::Provider;
use crate::types::*;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted transport outcome
#[derive(Debug, Clone)]
pub enum Step {
    Reply(String),
    Empty,
    Fail(String),
}

/// Provider replaying a script; the last step repeats forever.
///
/// Built with [`ScriptedProvider::failing_for`] it ignores the script, echoes
/// the last payload message and fails only when that message matches.
#[derive(Debug)]
pub struct ScriptedProvider {
    steps: Mutex<VecDeque<Step>>,
    poison: Option<String>,
    shape: PayloadShape,
    calls: AtomicU32,
    requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            poison: None,
            shape: PayloadShape::InlineSystem,
            calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding(text: &str) -> Self {
        Self::new(vec![Step::Reply(text.to_string())])
    }

    pub fn always_failing(error: &str) -> Self {
        Self::new(vec![Step::Fail(error.to_string())])
    }

    pub fn failing_then(text: &str, failures: u32) -> Self {
        let mut steps: Vec<Step> = (0..failures)
            .map(|i| Step::Fail(format!("transient failure #{}", i + 1)))
            .collect();
        steps.push(Step::Reply(text.to_string()));
        Self::new(steps)
    }

    pub fn empty_then(text: &str) -> Self {
        Self::new(vec![Step::Empty, Step::Reply(text.to_string())])
    }

    /// Echo the last message back, but fail for `poison`
    pub fn failing_for(poison: &str) -> Self {
        let mut provider = Self::new(vec![]);
        provider.poison = Some(poison.to_string());
        provider
    }

    pub fn with_shape(mut self, shape: PayloadShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_step(&self, req: &ChatCompletionRequest) -> Step {
        if let Some(poison) = &self.poison {
            let last = req
                .payload
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            return if &last == poison {
                Step::Fail(format!("backend rejected {:?}", last))
            } else {
                Step::Reply(format!("echo: {}", last))
            };
        }

        let mut steps = self.steps.lock().unwrap();
        if steps.len() > 1 {
            steps.pop_front().unwrap()
        } else {
            steps.front().cloned().unwrap_or(Step::Empty)
        }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn info(&self) -> Arc<ProviderInfo> {
        Arc::new(ProviderInfo {
            id: "scripted".to_string(),
            name: "Scripted".to_string(),
        })
    }

    fn payload_shape(&self) -> PayloadShape {
        self.shape
    }

    async fn chat_completion(
        &self,
        req: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, BridgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.next_step(&req);
        self.requests.lock().unwrap().push(req);

        let choices = match step {
            Step::Fail(error) => return Err(BridgeError::provider(error)),
            Step::Empty => vec![],
            Step::Reply(text) => vec![Choice {
                index: 0,
                content: text,
                finish_reason: FinishReason::Stop,
            }],
        };

        Ok(ChatCompletionResponse {
            id: "scripted-1".to_string(),
            model: "scripted-model".to_string(),
            choices,
            usage: Usage::default(),
        })
    }
}

/// Recorded invocation event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// Number of payload messages
    Outbound(usize),
    Response(String),
    Retry(u32, u32),
    Failure,
}

#[derive(Debug, Default)]
pub struct RecordingLog {
    events: Mutex<Vec<LogEvent>>,
}

impl RecordingLog {
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: LogEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl InvocationLog for RecordingLog {
    fn outbound(&self, _ctx: &RequestContext, payload: &WirePayload) {
        self.push(LogEvent::Outbound(payload.messages.len()));
    }

    fn response(&self, _ctx: &RequestContext, text: &str) {
        self.push(LogEvent::Response(text.to_string()));
    }

    fn retry(&self, _ctx: &RequestContext, attempt: u32, max_attempts: u32, _error: &BridgeError) {
        self.push(LogEvent::Retry(attempt, max_attempts));
    }

    fn failure(&self, _ctx: &RequestContext, _error: &BridgeError) {
        self.push(LogEvent::Failure);
    }
}
