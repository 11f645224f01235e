use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use crate::console::{Console, RelayClient, SubmissionEvent, SubmissionForm, SubmissionState};
use crate::error::CliResult;
use crate::output::OutputFormat;

use super::print_results;

pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:3000/relay";

#[derive(Parser)]
pub struct SubmitCommand {
    #[clap(long, default_value = DEFAULT_RELAY_URL, help = "Relay endpoint URL")]
    pub relay: String,

    #[clap(long, help = "Company profile PDF")]
    pub company: Option<PathBuf>,

    #[clap(long, help = "RFP document PDF")]
    pub rfp: Option<PathBuf>,

    #[clap(long, short, help = "Prompt sent with the documents")]
    pub message: Option<String>,

    #[clap(long, help = "Wait for the full reply instead of streaming logs")]
    pub no_logs: bool,
}

impl SubmitCommand {
    pub fn form(&self) -> SubmissionForm {
        SubmissionForm {
            company: self.company.clone(),
            rfp: self.rfp.clone(),
            message: self.message.clone().unwrap_or_default(),
        }
    }

    pub async fn execute(&self, format: OutputFormat) -> CliResult<()> {
        let transport = RelayClient::new(&self.relay)?;
        let form = self.form();
        let mut console = Console::new(!self.no_logs);

        let state = if self.no_logs {
            let pb = ProgressBar::new_spinner();
            let style = ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed}] {msg}")
                .map_err(|e| format!("Progress bar error: {e}"))?;
            pb.set_style(style);
            pb.enable_steady_tick(Duration::from_millis(100));
            pb.set_message("preparing");

            let state = console
                .submit_observed(&transport, &form, &mut |event: &SubmissionEvent| {
                    if let SubmissionEvent::Transition(state) = event {
                        pb.set_message(state.label());
                    }
                })
                .await;
            pb.finish_and_clear();
            state
        } else {
            console
                .submit_observed(&transport, &form, &mut echo_to_stderr)
                .await
        };

        if state == SubmissionState::Failed {
            let error = console.error().unwrap_or("unknown error");
            return Err(format!("Submission failed: {error}").into());
        }

        print_results(&console, format)
    }
}

/// Network lines go out one per line; live text is written as it arrives
fn echo_to_stderr(event: &SubmissionEvent) {
    let mut stderr = std::io::stderr().lock();
    let _ = match event {
        SubmissionEvent::Network(line) => writeln!(stderr, "[net] {line}"),
        SubmissionEvent::Live(text) => write!(stderr, "{text}").and_then(|_| stderr.flush()),
        _ => Ok(()),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[clap(flatten)]
        submit: SubmitCommand,
    }

    #[test]
    fn test_defaults() {
        let cmd = Harness::parse_from(["submit"]).submit;
        assert_eq!(cmd.relay, DEFAULT_RELAY_URL);
        assert!(!cmd.no_logs);
        assert_eq!(cmd.form(), SubmissionForm::default());
    }

    #[test]
    fn test_form_from_args() {
        let cmd = Harness::parse_from([
            "submit",
            "--company",
            "acme.pdf",
            "--rfp",
            "rfp.pdf",
            "-m",
            "Only compliance",
            "--no-logs",
        ])
        .submit;
        let form = cmd.form();
        assert_eq!(form.company, Some(PathBuf::from("acme.pdf")));
        assert_eq!(form.rfp, Some(PathBuf::from("rfp.pdf")));
        assert_eq!(form.prompt(), "Only compliance");
        assert!(cmd.no_logs);
    }
}
