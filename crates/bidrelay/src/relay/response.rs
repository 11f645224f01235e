//! Upstream response relay: streamed passthrough or buffered re-emit

use axum::{
    body::Body,
    http::{HeaderValue, Response, StatusCode, header},
};
use futures::TryStreamExt;
use serde_json::Value;

use crate::contract;

use super::cors::allow_any_origin;
use super::error::RelayError;

/// How the upstream body is handed back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Pipe upstream bytes through as they arrive
    Streamed,
    /// Read the whole body, then re-emit as JSON or text
    Buffered,
}

impl ResponseMode {
    pub fn from_query(query: Option<&str>) -> Self {
        if contract::wants_stream(query) {
            ResponseMode::Streamed
        } else {
            ResponseMode::Buffered
        }
    }
}

/// Build the caller-facing response for an upstream reply
pub async fn relay_response(
    upstream: reqwest::Response,
    mode: ResponseMode,
) -> Result<Response<Body>, RelayError> {
    let status = StatusCode::from_u16(upstream.status().as_u16())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let upstream_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    tracing::debug!(%status, content_type = %upstream_type, ?mode, "Upstream responded");

    match mode {
        ResponseMode::Streamed => {
            let stream = upstream
                .bytes_stream()
                .inspect_err(|e| tracing::warn!("Upstream stream interrupted: {e}"));
            let body = Body::from_stream(stream);
            build(status, text_or_default(&upstream_type), body)
        }
        ResponseMode::Buffered if upstream_type.contains("application/json") => {
            let bytes = upstream.bytes().await.map_err(RelayError::from_reqwest)?;
            let value: Value = serde_json::from_slice(&bytes)
                .map_err(|e| RelayError::Response(format!("Invalid JSON from upstream: {e}")))?;
            let json = serde_json::to_vec(&value)
                .map_err(|e| RelayError::Response(format!("Failed to serialize JSON: {e}")))?;
            build(status, "application/json", Body::from(json))
        }
        ResponseMode::Buffered => {
            let text = upstream.text().await.map_err(RelayError::from_reqwest)?;
            build(status, text_or_default(&upstream_type), Body::from(text))
        }
    }
}

fn text_or_default(content_type: &str) -> &str {
    if content_type.is_empty() {
        "text/plain"
    } else {
        content_type
    }
}

fn build(status: StatusCode, content_type: &str, body: Body) -> Result<Response<Body>, RelayError> {
    let content_type = HeaderValue::from_str(content_type)
        .map_err(|e| RelayError::Response(format!("Invalid upstream content type: {e}")))?;

    let mut response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .body(body)
        .map_err(|e| RelayError::Response(format!("Failed to build response: {e}")))?;
    allow_any_origin(response.headers_mut());
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_query() {
        assert_eq!(ResponseMode::from_query(Some("stream=1")), ResponseMode::Streamed);
        assert_eq!(ResponseMode::from_query(Some("stream=0")), ResponseMode::Buffered);
        assert_eq!(ResponseMode::from_query(None), ResponseMode::Buffered);
    }

    #[test]
    fn test_text_default() {
        assert_eq!(text_or_default(""), "text/plain");
        assert_eq!(text_or_default("text/html"), "text/html");
    }

    #[test]
    fn test_build_sets_cors_and_type() {
        let response = build(StatusCode::ACCEPTED, "text/csv", Body::empty()).unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
