//! One submission, from form to flattened messages
//!
//! [`run_submission`] walks the state machine
//! `Preparing → Sending → Receiving → Parsing → Done | Failed` and reports
//! every step as a [`SubmissionEvent`]. It owns no UI state: whoever drives it
//! decides where the events go.

use std::time::Instant;

use super::payload::{ChatMessage, flatten, parse_accumulated};
use super::reader::ChunkProgress;
use super::transport::{RelayTransport, SubmissionForm};

pub const MISSING_CONTENT_TYPE_NOTE: &str =
    "Note: upstream did not set content-type; parsed as text.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Preparing,
    Sending,
    Receiving,
    Parsing,
    Done,
    Failed,
}

impl SubmissionState {
    /// True while a submission is in flight
    pub fn is_active(self) -> bool {
        matches!(
            self,
            SubmissionState::Preparing
                | SubmissionState::Sending
                | SubmissionState::Receiving
                | SubmissionState::Parsing
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SubmissionState::Done | SubmissionState::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Preparing => "preparing",
            SubmissionState::Sending => "sending",
            SubmissionState::Receiving => "receiving",
            SubmissionState::Parsing => "parsing",
            SubmissionState::Done => "done",
            SubmissionState::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionEvent {
    Transition(SubmissionState),
    /// A line for the network log
    Network(String),
    /// Decoded streamed text for the live log
    Live(String),
    Completed {
        accumulated: String,
        messages: Vec<ChatMessage>,
    },
    Failed(String),
}

/// Run one submission through `transport`, reporting progress to `emit`.
///
/// Always ends with `Transition(Done)` or `Transition(Failed)`.
pub async fn run_submission(
    transport: &dyn RelayTransport,
    form: &SubmissionForm,
    stream_logs: bool,
    emit: &mut (dyn FnMut(SubmissionEvent) + Send),
) -> SubmissionState {
    let started = Instant::now();
    emit(SubmissionEvent::Transition(SubmissionState::Preparing));

    match drive(transport, form, stream_logs, started, emit).await {
        Ok(()) => {
            emit(SubmissionEvent::Transition(SubmissionState::Done));
            SubmissionState::Done
        }
        Err(message) => {
            tracing::warn!("Submission failed: {message}");
            emit(SubmissionEvent::Failed(message));
            emit(SubmissionEvent::Transition(SubmissionState::Failed));
            SubmissionState::Failed
        }
    }
}

async fn drive(
    transport: &dyn RelayTransport,
    form: &SubmissionForm,
    stream_logs: bool,
    started: Instant,
    emit: &mut (dyn FnMut(SubmissionEvent) + Send),
) -> Result<(), String> {
    emit(SubmissionEvent::Network("Preparing request...".to_string()));
    let body = form.to_multipart().await.map_err(|e| e.to_string())?;
    emit(SubmissionEvent::Transition(SubmissionState::Sending));

    let endpoint = transport.endpoint(stream_logs);
    emit(SubmissionEvent::Network(format!("POST {endpoint}")));

    let sent = Instant::now();
    let mut reader = transport
        .send(body, stream_logs)
        .await
        .map_err(|e| e.to_string())?;
    let meta = reader.meta().clone();

    emit(SubmissionEvent::Transition(SubmissionState::Receiving));
    emit(SubmissionEvent::Network(
        format!("Status: {} {}", meta.status, meta.reason).trim_end().to_string(),
    ));
    emit(SubmissionEvent::Network(format!(
        "Headers received in {} ms",
        sent.elapsed().as_millis()
    )));

    let accumulated = if stream_logs && reader.has_stream() {
        let text = reader
            .read_incrementally(&mut |progress: ChunkProgress<'_>| {
                emit(SubmissionEvent::Live(progress.text.to_string()));
                if progress.bytes > 0 {
                    emit(SubmissionEvent::Network(format!(
                        "+{} bytes (total {})",
                        progress.bytes, progress.total
                    )));
                }
            })
            .await
            .map_err(|e| e.to_string())?;
        emit(SubmissionEvent::Network("Stream finished.".to_string()));
        text
    } else {
        reader.read_fully().await.map_err(|e| e.to_string())?
    };

    emit(SubmissionEvent::Transition(SubmissionState::Parsing));
    let messages = flatten(&parse_accumulated(&accumulated));
    tracing::debug!(count = messages.len(), "Flattened upstream reply");
    emit(SubmissionEvent::Completed {
        accumulated,
        messages,
    });

    emit(SubmissionEvent::Network(format!(
        "Total {} ms",
        started.elapsed().as_millis()
    )));
    if meta.content_type.is_none() {
        emit(SubmissionEvent::Network(MISSING_CONTENT_TYPE_NOTE.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedResponse, ScriptedTransport};

    async fn collect(
        transport: &ScriptedTransport,
        stream_logs: bool,
    ) -> (SubmissionState, Vec<SubmissionEvent>) {
        let mut events = Vec::new();
        let state = run_submission(
            transport,
            &SubmissionForm::default(),
            stream_logs,
            &mut |e: SubmissionEvent| events.push(e),
        )
        .await;
        (state, events)
    }

    fn transitions(events: &[SubmissionEvent]) -> Vec<SubmissionState> {
        events
            .iter()
            .filter_map(|e| match e {
                SubmissionEvent::Transition(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_successful_state_sequence() {
        let transport = ScriptedTransport::new(
            ScriptedResponse::new(200, Some("application/json")).chunk("{\"message\":\"ok\"}"),
        );
        let (state, events) = collect(&transport, false).await;

        assert_eq!(state, SubmissionState::Done);
        assert_eq!(
            transitions(&events),
            vec![
                SubmissionState::Preparing,
                SubmissionState::Sending,
                SubmissionState::Receiving,
                SubmissionState::Parsing,
                SubmissionState::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_transport_failure_ends_failed() {
        let transport = ScriptedTransport::failing("connection refused");
        let (state, events) = collect(&transport, true).await;

        assert_eq!(state, SubmissionState::Failed);
        assert!(events.contains(&SubmissionEvent::Failed("connection refused".to_string())));
        assert_eq!(
            transitions(&events).last(),
            Some(&SubmissionState::Failed)
        );
    }

    #[tokio::test]
    async fn test_stream_flag_follows_logs_toggle() {
        let transport = ScriptedTransport::new(ScriptedResponse::new(200, None).chunk("x"));
        collect(&transport, true).await;
        collect(&transport, false).await;
        assert_eq!(transport.stream_flags(), vec![true, false]);
    }

    #[tokio::test]
    async fn test_no_live_events_when_buffered() {
        let transport =
            ScriptedTransport::new(ScriptedResponse::new(200, Some("text/plain")).chunk("hi"));
        let (_, events) = collect(&transport, false).await;
        assert!(!events.iter().any(|e| matches!(e, SubmissionEvent::Live(_))));
    }

    #[tokio::test]
    async fn test_attachments_read_before_sending() {
        let dir = tempfile::tempdir().unwrap();
        let form = SubmissionForm {
            rfp: Some(dir.path().join("missing-rfp.pdf")),
            ..Default::default()
        };
        let transport = ScriptedTransport::new(ScriptedResponse::new(200, None).chunk("x"));

        let mut events = Vec::new();
        let state = run_submission(&transport, &form, true, &mut |e: SubmissionEvent| {
            events.push(e)
        })
        .await;

        assert_eq!(state, SubmissionState::Failed);
        assert!(transport.stream_flags().is_empty());
        assert!(!transitions(&events).contains(&SubmissionState::Sending));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, SubmissionEvent::Failed(m) if m.contains("missing-rfp.pdf")))
        );
    }

    #[test]
    fn test_state_predicates() {
        assert!(SubmissionState::Sending.is_active());
        assert!(!SubmissionState::Idle.is_active());
        assert!(SubmissionState::Failed.is_terminal());
        assert!(!SubmissionState::Parsing.is_terminal());
        assert_eq!(SubmissionState::Receiving.label(), "receiving");
    }
}
