//! Inbound body re-encoding
//!
//! The relay never forwards the caller's body bytes blindly when it knows the
//! format: multipart forms are parsed and rebuilt with a fresh boundary, JSON
//! is parsed and re-serialized compactly, anything else goes through verbatim.

use axum::{
    body::Body,
    extract::{FromRequest, Multipart},
    http::{Request, header},
};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use super::error::RelayError;

/// One field of an inbound multipart form
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    File {
        file_name: String,
        content_type: Option<String>,
        data: Bytes,
    },
}

/// A request body decoded by its declared content type, ready to forward
#[derive(Debug, Clone, PartialEq)]
pub enum RelayBody {
    /// Multipart fields in their original order
    Multipart(Vec<FormField>),
    /// Compact JSON text plus the caller's content type
    Json { content_type: String, text: String },
    /// Anything else, forwarded as received
    Raw { content_type: String, bytes: Bytes },
}

impl RelayBody {
    /// Decode an inbound request body according to its `Content-Type`
    pub async fn from_request(request: Request<Body>, limit: usize) -> Result<Self, RelayError> {
        let content_type = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if content_type.contains("multipart/form-data") {
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(|e| RelayError::Request(format!("Invalid multipart body: {e}")))?;
            return read_form(multipart).await.map(RelayBody::Multipart);
        }

        let bytes = axum::body::to_bytes(request.into_body(), limit)
            .await
            .map_err(|e| RelayError::Request(format!("Failed to read request body: {e}")))?;

        if content_type.contains("application/json") {
            let value: Value = serde_json::from_slice(&bytes)
                .map_err(|e| RelayError::Request(format!("Invalid JSON body: {e}")))?;
            let text = serde_json::to_string(&value)
                .map_err(|e| RelayError::Request(format!("Failed to serialize JSON: {e}")))?;
            Ok(RelayBody::Json { content_type, text })
        } else {
            Ok(RelayBody::Raw {
                content_type,
                bytes,
            })
        }
    }

    /// Short label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            RelayBody::Multipart(_) => "multipart",
            RelayBody::Json { .. } => "json",
            RelayBody::Raw { .. } => "raw",
        }
    }

    /// Attach this body to an outbound request.
    ///
    /// Multipart bodies get no inherited content type so the encoder writes a
    /// fresh boundary; other bodies keep the caller's content type.
    pub fn attach(self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, RelayError> {
        match self {
            RelayBody::Multipart(fields) => Ok(builder.multipart(build_form(fields)?)),
            RelayBody::Json { content_type, text } => Ok(builder
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(text)),
            RelayBody::Raw {
                content_type,
                bytes,
            } => {
                let builder = if content_type.is_empty() {
                    builder
                } else {
                    builder.header(reqwest::header::CONTENT_TYPE, content_type)
                };
                Ok(builder.body(bytes))
            }
        }
    }
}

async fn read_form(mut multipart: Multipart) -> Result<Vec<FormField>, RelayError> {
    let mut fields = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RelayError::Request(format!("Invalid multipart field: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        let value = match file_name {
            Some(file_name) => {
                let data = field.bytes().await.map_err(|e| {
                    RelayError::Request(format!("Failed to read file field '{name}': {e}"))
                })?;
                FieldValue::File {
                    file_name,
                    content_type,
                    data,
                }
            }
            None => {
                let text = field.text().await.map_err(|e| {
                    RelayError::Request(format!("Failed to read text field '{name}': {e}"))
                })?;
                FieldValue::Text(text)
            }
        };

        tracing::debug!("Relaying form field '{name}'");
        fields.push(FormField { name, value });
    }

    Ok(fields)
}

/// Rebuild a multipart form from decoded fields, keeping their order
pub fn build_form(fields: Vec<FormField>) -> Result<Form, RelayError> {
    let mut form = Form::new();

    for FormField { name, value } in fields {
        form = match value {
            FieldValue::Text(text) => form.text(name, text),
            FieldValue::File {
                file_name,
                content_type,
                data,
            } => {
                let mut part = Part::bytes(data.to_vec()).file_name(file_name);
                if let Some(mime) = content_type {
                    part = part.mime_str(&mime).map_err(|e| {
                        RelayError::Request(format!("Invalid content type '{mime}': {e}"))
                    })?;
                }
                form.part(name, part)
            }
        };
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(content_type: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/relay")
            .header(header::CONTENT_TYPE, content_type)
            .body(body.into())
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_is_compacted() {
        let req = request("application/json", "{\n  \"a\" : 1,\n  \"b\": [true, null]\n}");
        let body = RelayBody::from_request(req, usize::MAX).await.unwrap();
        assert_eq!(
            body,
            RelayBody::Json {
                content_type: "application/json".to_string(),
                text: r#"{"a":1,"b":[true,null]}"#.to_string(),
            }
        );
        assert_eq!(body.kind(), "json");
    }

    #[tokio::test]
    async fn test_malformed_json_is_request_error() {
        let req = request("application/json", "{not json");
        let err = RelayBody::from_request(req, usize::MAX).await.unwrap_err();
        assert!(matches!(err, RelayError::Request(_)));
        assert!(err.to_string().contains("Invalid JSON body"));
    }

    #[tokio::test]
    async fn test_plain_text_is_verbatim() {
        let req = request("text/plain; charset=utf-8", "  hello\nworld ");
        let body = RelayBody::from_request(req, usize::MAX).await.unwrap();
        match body {
            RelayBody::Raw {
                content_type,
                bytes,
            } => {
                assert_eq!(content_type, "text/plain; charset=utf-8");
                assert_eq!(&bytes[..], b"  hello\nworld ");
            }
            other => panic!("expected raw body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_multipart_fields_decoded_in_order() {
        let boundary = "XyZboundary";
        let raw = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"company.pdf\"; filename=\"acme.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n\
             %PDF-1.4 acme\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"message\"\r\n\r\n\
             Run compliance + writers\r\n\
             --{b}--\r\n",
            b = boundary
        );
        let req = request(&format!("multipart/form-data; boundary={boundary}"), raw);
        let body = RelayBody::from_request(req, usize::MAX).await.unwrap();

        let RelayBody::Multipart(fields) = body else {
            panic!("expected multipart body");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "company.pdf");
        assert_eq!(
            fields[0].value,
            FieldValue::File {
                file_name: "acme.pdf".to_string(),
                content_type: Some("application/pdf".to_string()),
                data: Bytes::from_static(b"%PDF-1.4 acme"),
            }
        );
        assert_eq!(fields[1].name, "message");
        assert_eq!(
            fields[1].value,
            FieldValue::Text("Run compliance + writers".to_string())
        );
    }

    #[tokio::test]
    async fn test_multipart_without_boundary_is_request_error() {
        let req = request("multipart/form-data", "garbage");
        let err = RelayBody::from_request(req, usize::MAX).await.unwrap_err();
        assert!(matches!(err, RelayError::Request(_)));
    }

    #[test]
    fn test_build_form_rejects_bad_mime() {
        let fields = vec![FormField {
            name: "f".to_string(),
            value: FieldValue::File {
                file_name: "x.bin".to_string(),
                content_type: Some("not a mime".to_string()),
                data: Bytes::new(),
            },
        }];
        assert!(build_form(fields).is_err());
    }
}
