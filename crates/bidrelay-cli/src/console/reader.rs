//! Response reading, independent of transport
//!
//! A [`ResponseReader`] yields body chunks; on top of that it offers the two
//! ways the console consumes a reply: all at once, or incrementally with
//! per-chunk progress.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::error::ConsoleResult;

use super::decoder::Utf8StreamDecoder;

/// Status line and content type of a reply
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMeta {
    pub status: u16,
    pub reason: String,
    /// `None` when the server sent no content-type header
    pub content_type: Option<String>,
}

impl ResponseMeta {
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }
}

/// Progress report for one chunk read incrementally
#[derive(Debug, Clone, Copy)]
pub struct ChunkProgress<'a> {
    /// Raw byte length of this chunk (0 for the end-of-stream flush)
    pub bytes: usize,
    /// Running total of raw bytes received
    pub total: usize,
    /// Text decoded from this chunk
    pub text: &'a str,
}

#[async_trait]
pub trait ResponseReader: Send {
    fn meta(&self) -> &ResponseMeta;

    /// Whether the body can be consumed chunk by chunk
    fn has_stream(&self) -> bool {
        true
    }

    /// Next raw body chunk, `None` at end of body
    async fn next_chunk(&mut self) -> ConsoleResult<Option<Bytes>>;

    /// Read the whole body. JSON bodies are parsed and re-serialized
    /// compactly; anything else is decoded as UTF-8 text.
    async fn read_fully(&mut self) -> ConsoleResult<String> {
        let mut body = Vec::new();
        while let Some(chunk) = self.next_chunk().await? {
            body.extend_from_slice(&chunk);
        }

        if self.meta().is_json() {
            let value: Value = serde_json::from_slice(&body)?;
            Ok(serde_json::to_string(&value)?)
        } else {
            Ok(String::from_utf8_lossy(&body).into_owned())
        }
    }

    /// Read the body chunk by chunk, decoding statefully and reporting each
    /// chunk to `on_chunk` in arrival order. Returns the accumulated text.
    async fn read_incrementally(
        &mut self,
        on_chunk: &mut (dyn for<'c> FnMut(ChunkProgress<'c>) + Send),
    ) -> ConsoleResult<String> {
        let mut decoder = Utf8StreamDecoder::new();
        let mut accumulated = String::new();
        let mut total = 0usize;

        while let Some(chunk) = self.next_chunk().await? {
            total += chunk.len();
            let text = decoder.decode(&chunk);
            accumulated.push_str(&text);
            on_chunk(ChunkProgress {
                bytes: chunk.len(),
                total,
                text: &text,
            });
        }

        let tail = decoder.finish();
        if !tail.is_empty() {
            accumulated.push_str(&tail);
            on_chunk(ChunkProgress {
                bytes: 0,
                total,
                text: &tail,
            });
        }

        Ok(accumulated)
    }
}

/// Reader over a live `reqwest` response
pub struct HttpResponseReader {
    meta: ResponseMeta,
    response: reqwest::Response,
}

impl HttpResponseReader {
    pub fn new(response: reqwest::Response) -> Self {
        let status = response.status();
        let meta = ResponseMeta {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            content_type: response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        };
        Self { meta, response }
    }
}

#[async_trait]
impl ResponseReader for HttpResponseReader {
    fn meta(&self) -> &ResponseMeta {
        &self.meta
    }

    async fn next_chunk(&mut self) -> ConsoleResult<Option<Bytes>> {
        Ok(self.response.chunk().await?)
    }
}
