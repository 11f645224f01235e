//! Per-submission log streams

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub text: String,
}

/// Append-only sequence of timestamped entries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogStream {
    entries: Vec<LogEntry>,
}

impl LogStream {
    pub fn push(&mut self, text: impl Into<String>) {
        self.entries.push(LogEntry {
            at: Utc::now(),
            text: text.into(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries joined with `sep`
    pub fn joined(&self, sep: &str) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join(sep)
    }
}

/// The two log panes: request lifecycle lines and raw streamed text
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogBook {
    pub network: LogStream,
    pub live: LogStream,
}

impl LogBook {
    pub fn clear(&mut self) {
        self.network.clear();
        self.live.clear();
    }

    /// Network log, one entry per line
    pub fn network_text(&self) -> String {
        self.network.joined("\n")
    }

    /// Live log, chunks concatenated as received
    pub fn live_text(&self) -> String {
        self.live.joined("")
    }
}
