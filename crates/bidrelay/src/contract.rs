//! Wire contract shared between the relay endpoint and console clients

use serde::{Deserialize, Serialize};

/// Default path the relay handler is mounted on
pub const RELAY_PATH: &str = "/relay";

/// Query parameter selecting streamed passthrough (`?stream=1`)
pub const STREAM_QUERY: &str = "stream";

/// Multipart field carrying the company profile PDF
pub const COMPANY_FIELD: &str = "company.pdf";

/// Multipart field carrying the RFP PDF
pub const RFP_FIELD: &str = "rfp.pdf";

/// Multipart text field carrying the prompt
pub const MESSAGE_FIELD: &str = "message";

/// Prompt sent when the user leaves the message blank
pub const DEFAULT_PROMPT: &str = "Run compliance + writers";

/// JSON body of every relay failure response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Returns true when the raw query string asks for a streamed relay
pub fn wants_stream(query: Option<&str>) -> bool {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .any(|(key, value)| key == STREAM_QUERY && value == "1")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wants_stream() {
        assert!(wants_stream(Some("stream=1")));
        assert!(wants_stream(Some("a=b&stream=1")));
        assert!(!wants_stream(Some("stream=0")));
        assert!(!wants_stream(Some("stream=true")));
        assert!(!wants_stream(Some("")));
        assert!(!wants_stream(None));
    }

    #[test]
    fn test_error_body_omits_missing_hint() {
        let body = ErrorBody {
            error: "boom".to_string(),
            hint: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"boom"}"#);
    }

    #[test]
    fn test_error_body_with_hint_round_trips() {
        let json = r#"{"error":"Missing N8N_WEBHOOK_URL","hint":"set it"}"#;
        let body: ErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.hint.as_deref(), Some("set it"));
    }
}
