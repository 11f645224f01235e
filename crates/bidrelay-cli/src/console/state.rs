//! Console state shared by the CLI and the TUI
//!
//! Every submission gets a generation number. Events tagged with an older
//! generation are dropped, so a superseded submission can never write into
//! the state of the current one.

use serde_json::Value;

use super::log::LogBook;
use super::payload::ChatMessage;
use super::submission::{SubmissionEvent, SubmissionState, run_submission};
use super::transport::{RelayTransport, SubmissionForm};
use super::views::{ComplianceVerdict, WriterBuckets, raw_view};

#[derive(Debug, Clone)]
pub struct Console {
    state: SubmissionState,
    generation: u64,
    pub logs: LogBook,
    accumulated: String,
    messages: Vec<ChatMessage>,
    error: Option<String>,
    /// Ask the relay for a streamed reply and show it live
    pub stream_logs: bool,
    verdict: Option<ComplianceVerdict>,
    buckets: WriterBuckets,
}

impl Default for Console {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Console {
    pub fn new(stream_logs: bool) -> Self {
        Self {
            state: SubmissionState::Idle,
            generation: 0,
            logs: LogBook::default(),
            accumulated: String::new(),
            messages: Vec::new(),
            error: None,
            stream_logs,
            verdict: None,
            buckets: WriterBuckets::default(),
        }
    }

    /// Start a new submission: clear the previous one and return its
    /// generation. Anything still running for an older generation is stale.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.state = SubmissionState::Preparing;
        self.logs.clear();
        self.accumulated.clear();
        self.messages.clear();
        self.error = None;
        self.verdict = None;
        self.buckets = WriterBuckets::default();
        self.generation
    }

    /// Apply an event from submission `generation`. Returns false when the
    /// event is stale and was ignored.
    pub fn apply(&mut self, generation: u64, event: SubmissionEvent) -> bool {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "Dropping stale event");
            return false;
        }

        match event {
            SubmissionEvent::Transition(state) => self.state = state,
            SubmissionEvent::Network(line) => self.logs.network.push(line),
            SubmissionEvent::Live(text) => {
                if !text.is_empty() {
                    self.logs.live.push(text);
                }
            }
            SubmissionEvent::Completed {
                accumulated,
                messages,
            } => {
                self.verdict = ComplianceVerdict::detect(&messages);
                self.buckets = WriterBuckets::build(&messages);
                self.accumulated = accumulated;
                self.messages = messages;
            }
            SubmissionEvent::Failed(message) => {
                self.logs.network.push(format!("Error: {message}"));
                self.error = Some(message);
            }
        }
        true
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_active()
    }

    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn verdict(&self) -> Option<&ComplianceVerdict> {
        self.verdict.as_ref()
    }

    pub fn buckets(&self) -> &WriterBuckets {
        &self.buckets
    }

    pub fn raw_view(&self) -> Value {
        raw_view(&self.messages)
    }

    /// Run a submission to completion, applying its events in place
    pub async fn submit(
        &mut self,
        transport: &dyn RelayTransport,
        form: &SubmissionForm,
    ) -> SubmissionState {
        self.submit_observed(transport, form, &mut |_: &SubmissionEvent| {})
            .await
    }

    /// Like [`Console::submit`], also showing every event to `observer`
    /// before it is applied
    pub async fn submit_observed(
        &mut self,
        transport: &dyn RelayTransport,
        form: &SubmissionForm,
        observer: &mut (dyn FnMut(&SubmissionEvent) + Send),
    ) -> SubmissionState {
        let generation = self.begin();
        let stream_logs = self.stream_logs;
        run_submission(transport, form, stream_logs, &mut |event: SubmissionEvent| {
            observer(&event);
            self.apply(generation, event);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::views::WriterBucket;
    use crate::testing::{ScriptedResponse, ScriptedTransport};

    #[tokio::test]
    async fn test_submit_populates_views() {
        let body = r#"[{"compliant":false,"message":"Missing signature"},{"output":"Pricing table attached"}]"#;
        let transport = ScriptedTransport::new(
            ScriptedResponse::new(200, Some("application/json")).chunk(body),
        );
        let mut console = Console::new(false);
        let state = console.submit(&transport, &SubmissionForm::default()).await;

        assert_eq!(state, SubmissionState::Done);
        assert_eq!(console.messages().len(), 2);
        let verdict = console.verdict().unwrap();
        assert!(!verdict.compliant);
        assert_eq!(verdict.message, "Missing signature");
        assert_eq!(console.buckets().get(WriterBucket::Pricing).len(), 1);
        assert!(console.error().is_none());
        assert!(!console.is_loading());
    }

    #[tokio::test]
    async fn test_failure_sets_error_and_logs_it() {
        let transport = ScriptedTransport::failing("connection refused");
        let mut console = Console::new(true);
        console.submit(&transport, &SubmissionForm::default()).await;

        assert_eq!(console.state(), SubmissionState::Failed);
        assert_eq!(console.error(), Some("connection refused"));
        assert!(console.logs.network_text().contains("Error: connection refused"));
        assert!(console.messages().is_empty());
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let mut console = Console::new(true);
        let first = console.begin();
        let second = console.begin();
        assert!(second > first);

        let applied = console.apply(
            first,
            SubmissionEvent::Network("from the old run".to_string()),
        );
        assert!(!applied);
        assert!(console.logs.network.is_empty());

        assert!(console.apply(second, SubmissionEvent::Network("current".to_string())));
        assert_eq!(console.logs.network_text(), "current");
    }

    #[test]
    fn test_begin_clears_previous_results() {
        let mut console = Console::new(true);
        let generation = console.begin();
        console.apply(generation, SubmissionEvent::Live("abc".to_string()));
        console.apply(generation, SubmissionEvent::Failed("boom".to_string()));

        console.begin();
        assert!(console.logs.live.is_empty());
        assert!(console.logs.network.is_empty());
        assert!(console.error().is_none());
        assert_eq!(console.state(), SubmissionState::Preparing);
    }
}
