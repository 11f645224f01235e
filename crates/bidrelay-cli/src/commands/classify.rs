use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::console::{Console, SubmissionEvent, SubmissionState, flatten, parse_accumulated};
use crate::error::CliResult;
use crate::output::OutputFormat;

use super::print_results;

#[derive(Parser)]
pub struct ClassifyCommand {
    #[clap(help = "Saved webhook reply to inspect ('-' for stdin)")]
    pub file: PathBuf,
}

impl ClassifyCommand {
    pub async fn execute(&self, format: OutputFormat) -> CliResult<()> {
        let text = self.read_input().await?;
        let console = classify_text(text);
        print_results(&console, format)
    }

    async fn read_input(&self) -> CliResult<String> {
        if self.file.as_os_str() == "-" {
            return read_all(tokio::io::stdin()).await;
        }

        tokio::fs::read_to_string(&self.file)
            .await
            .map_err(|e| format!("Failed to read {}: {e}", self.file.display()).into())
    }
}

async fn read_all(mut reader: impl AsyncRead + Unpin) -> CliResult<String> {
    let mut text = String::new();
    reader.read_to_string(&mut text).await?;
    Ok(text)
}

/// Load a reply body into a console as if it had just been received
pub fn classify_text(text: String) -> Console {
    let mut console = Console::new(false);
    let generation = console.begin();
    let messages = flatten(&parse_accumulated(&text));
    console.apply(
        generation,
        SubmissionEvent::Completed {
            accumulated: text,
            messages,
        },
    );
    console.apply(generation, SubmissionEvent::Transition(SubmissionState::Done));
    console
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::WriterBucket;

    #[test]
    fn test_classify_json_reply() {
        let console = classify_text(
            r#"{"data":[{"Compliant":true,"Message":"OK"},"Executive Summary: we deliver"]}"#
                .to_string(),
        );
        assert_eq!(console.messages().len(), 2);
        assert!(console.verdict().is_some_and(|v| v.compliant));
        assert_eq!(console.buckets().get(WriterBucket::Executive).len(), 1);
        assert_eq!(console.state(), SubmissionState::Done);
    }

    #[test]
    fn test_classify_plain_text() {
        let console = classify_text("just words".to_string());
        assert_eq!(console.messages().len(), 1);
        assert_eq!(console.messages()[0].content, "just words");
        assert!(console.verdict().is_none());
    }

    #[tokio::test]
    async fn test_read_all_from_async_reader() {
        let input: &[u8] = "{\"message\":\"Été\"}".as_bytes();
        let text = read_all(input).await.unwrap();
        assert_eq!(classify_text(text).messages()[0].content, "Été");
    }

    #[tokio::test]
    async fn test_read_all_rejects_invalid_utf8() {
        let input: &[u8] = &[0xff, 0xfe];
        assert!(read_all(input).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = ClassifyCommand {
            file: dir.path().join("reply.json"),
        };
        let err = cmd.execute(OutputFormat::Json).await.unwrap_err();
        assert!(err.to_string().contains("reply.json"));
    }
}
