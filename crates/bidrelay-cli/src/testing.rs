//! Test utilities for the console - scripted transports and responses
//!
//! These let the submission flow run without a relay: a [`ScriptedResponse`]
//! replays fixed chunks, and a [`ScriptedTransport`] hands one out per send.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::Form;

use crate::console::reader::{ResponseMeta, ResponseReader};
use crate::console::transport::RelayTransport;
use crate::error::{ConsoleError, ConsoleResult};

/// A response whose body arrives in exactly the chunks given
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    meta: ResponseMeta,
    chunks: VecDeque<Bytes>,
}

impl ScriptedResponse {
    pub fn new(status: u16, content_type: Option<&str>) -> Self {
        Self {
            meta: ResponseMeta {
                status,
                reason: "OK".to_string(),
                content_type: content_type.map(str::to_string),
            },
            chunks: VecDeque::new(),
        }
    }

    /// Append one body chunk
    pub fn chunk(mut self, data: impl AsRef<[u8]>) -> Self {
        self.chunks.push_back(Bytes::copy_from_slice(data.as_ref()));
        self
    }

    pub fn reason(mut self, reason: &str) -> Self {
        self.meta.reason = reason.to_string();
        self
    }
}

#[async_trait]
impl ResponseReader for ScriptedResponse {
    fn meta(&self) -> &ResponseMeta {
        &self.meta
    }

    async fn next_chunk(&mut self) -> ConsoleResult<Option<Bytes>> {
        Ok(self.chunks.pop_front())
    }
}

/// Transport that answers every send with the same scripted response,
/// or with the same error
#[derive(Debug)]
pub struct ScriptedTransport {
    response: Option<ScriptedResponse>,
    error: Option<String>,
    stream_flags: Mutex<Vec<bool>>,
}

impl ScriptedTransport {
    pub fn new(response: ScriptedResponse) -> Self {
        Self {
            response: Some(response),
            error: None,
            stream_flags: Mutex::new(Vec::new()),
        }
    }

    /// Every send fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            response: None,
            error: Some(message.to_string()),
            stream_flags: Mutex::new(Vec::new()),
        }
    }

    /// The `stream` flag of every send so far, in order
    pub fn stream_flags(&self) -> Vec<bool> {
        self.stream_flags
            .lock()
            .map(|flags| flags.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RelayTransport for ScriptedTransport {
    fn endpoint(&self, stream: bool) -> String {
        if stream {
            "http://relay.test/relay?stream=1".to_string()
        } else {
            "http://relay.test/relay".to_string()
        }
    }

    async fn send(&self, _body: Form, stream: bool) -> ConsoleResult<Box<dyn ResponseReader>> {
        if let Ok(mut flags) = self.stream_flags.lock() {
            flags.push(stream);
        }

        match (&self.response, &self.error) {
            (_, Some(message)) => Err(ConsoleError::General(message.clone())),
            (Some(response), None) => Ok(Box::new(response.clone())),
            (None, None) => Err(ConsoleError::General("no scripted response".to_string())),
        }
    }
}
