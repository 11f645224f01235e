//! Relay failure handling
//!
//! Every failure in the relay is terminal for that request: it is logged and
//! returned to the caller as a 500 with a JSON `{ error, hint? }` body. The
//! relay never retries.

use axum::{
    body::Body,
    http::{Response, StatusCode, header},
    response::IntoResponse,
};
use thiserror::Error;

use crate::contract::ErrorBody;

use super::cors::ALLOW_ORIGIN;

/// Errors that can occur while relaying a request
#[derive(Error, Debug, Clone)]
pub enum RelayError {
    /// Upstream URL is not configured; no network call was made
    #[error("{message}")]
    Config { message: String, hint: String },

    /// Inbound body could not be read or re-encoded
    #[error("{0}")]
    Request(String),

    /// Upstream could not be reached or its body could not be read
    #[error("{0}")]
    Network(String),

    /// Upstream answered with a body that does not match its content type
    #[error("{0}")]
    Response(String),
}

impl RelayError {
    /// Configuration error for a missing webhook environment variable
    pub fn missing_webhook(var: &str) -> Self {
        RelayError::Config {
            message: format!("Missing {var}"),
            hint: format!(
                "Please create a .env.local file in the project root and set \
                 {var}=https://<workspace>.app.n8n.cloud/ai-chat/<workflowId>, \
                 then restart the relay."
            ),
        }
    }

    /// Map a reqwest failure to a network error with a readable cause
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RelayError::Network(format!("Request timed out: {e}"))
        } else if e.is_connect() {
            RelayError::Network(format!("Failed to connect to upstream: {e}"))
        } else if e.is_decode() {
            RelayError::Response(format!("Failed to decode upstream body: {e}"))
        } else {
            RelayError::Network(format!("Request failed: {e}"))
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            RelayError::Config { .. } => "config",
            RelayError::Request(_) => "request",
            RelayError::Network(_) => "network",
            RelayError::Response(_) => "response",
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            RelayError::Config { message, hint } => ErrorBody {
                error: message.clone(),
                hint: Some(hint.clone()),
            },
            other => ErrorBody {
                error: other.to_string(),
                hint: None,
            },
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response<Body> {
        match &self {
            RelayError::Config { .. } => {
                tracing::error!(category = self.category(), "Relay not configured: {self}");
            }
            _ => tracing::error!(category = self.category(), "Relay failed: {self}"),
        }

        let payload = serde_json::to_vec(&self.body()).unwrap_or_else(|_| b"{}".to_vec());

        Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN)
            .body(Body::from(payload))
            .unwrap_or_else(|_| {
                let mut response = Response::new(Body::empty());
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                response
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(error: RelayError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_webhook_has_error_and_hint() {
        let (status, json) = body_json(RelayError::missing_webhook("N8N_WEBHOOK_URL")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Missing N8N_WEBHOOK_URL");
        assert!(json["hint"].as_str().unwrap().contains("N8N_WEBHOOK_URL="));
    }

    #[tokio::test]
    async fn test_network_error_has_no_hint() {
        let (status, json) = body_json(RelayError::Network("connection refused".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "connection refused");
        assert!(json.get("hint").is_none());
    }

    #[test]
    fn test_categories() {
        assert_eq!(RelayError::missing_webhook("X").category(), "config");
        assert_eq!(RelayError::Request(String::new()).category(), "request");
        assert_eq!(RelayError::Network(String::new()).category(), "network");
        assert_eq!(RelayError::Response(String::new()).category(), "response");
    }

    #[test]
    fn test_error_response_allows_any_origin() {
        let response = RelayError::Request("bad".into()).into_response();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
