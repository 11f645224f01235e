//! Submission form and the relay transport

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bidrelay_server::contract::{COMPANY_FIELD, DEFAULT_PROMPT, MESSAGE_FIELD, RFP_FIELD, STREAM_QUERY};
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::error::{ConsoleError, ConsoleResult};

use super::reader::{HttpResponseReader, ResponseReader};

/// What the user submits: two optional PDFs and a prompt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionForm {
    pub company: Option<PathBuf>,
    pub rfp: Option<PathBuf>,
    pub message: String,
}

impl SubmissionForm {
    /// Trimmed prompt, or the default prompt when blank
    pub fn prompt(&self) -> &str {
        let trimmed = self.message.trim();
        if trimmed.is_empty() {
            DEFAULT_PROMPT
        } else {
            trimmed
        }
    }

    /// Build the multipart body, reading attachments from disk
    pub async fn to_multipart(&self) -> ConsoleResult<Form> {
        let mut form = Form::new();
        if let Some(path) = &self.company {
            form = form.part(COMPANY_FIELD, pdf_part(path).await?);
        }
        if let Some(path) = &self.rfp {
            form = form.part(RFP_FIELD, pdf_part(path).await?);
        }
        Ok(form.text(MESSAGE_FIELD, self.prompt().to_string()))
    }
}

async fn pdf_part(path: &Path) -> ConsoleResult<Part> {
    let data = tokio::fs::read(path).await.map_err(|e| {
        ConsoleError::General(format!("Failed to read {}: {e}", path.display()))
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());

    Part::bytes(data)
        .file_name(file_name)
        .mime_str("application/pdf")
        .map_err(ConsoleError::from)
}

/// Something that can carry a submission to the relay
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// URL the submission is posted to
    fn endpoint(&self, stream: bool) -> String;

    /// Post a prepared multipart body; resolves once response headers have
    /// arrived
    async fn send(&self, body: Form, stream: bool) -> ConsoleResult<Box<dyn ResponseReader>>;
}

/// HTTP transport to a running relay
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    relay_url: Url,
}

impl RelayClient {
    pub fn new(relay_url: &str) -> ConsoleResult<Self> {
        let relay_url =
            Url::parse(relay_url).map_err(|e| ConsoleError::Url(format!("{relay_url}: {e}")))?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ConsoleError::Http(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, relay_url })
    }

    fn url(&self, stream: bool) -> Url {
        let mut url = self.relay_url.clone();
        if stream {
            url.query_pairs_mut().append_pair(STREAM_QUERY, "1");
        }
        url
    }
}

#[async_trait]
impl RelayTransport for RelayClient {
    fn endpoint(&self, stream: bool) -> String {
        self.url(stream).to_string()
    }

    async fn send(&self, body: Form, stream: bool) -> ConsoleResult<Box<dyn ResponseReader>> {
        let response = self
            .client
            .post(self.url(stream))
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .multipart(body)
            .send()
            .await?;
        Ok(Box::new(HttpResponseReader::new(response)))
    }
}
