pub mod commands;
pub mod console;
pub mod error;
pub mod output;
pub mod testing;

pub use commands::{ClassifyCommand, SubmitCommand};
pub use console::{Console, RelayClient, RelayTransport, SubmissionEvent, SubmissionForm};
pub use error::{CliError, CliResult, ConsoleError, ConsoleResult};
pub use output::{OutputFormat, truncate_string};
