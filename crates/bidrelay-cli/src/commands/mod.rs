pub mod classify;
pub mod submit;

pub use classify::ClassifyCommand;
pub use submit::SubmitCommand;

use crate::console::Console;
use crate::error::CliResult;
use crate::output::{OutputFormat, console_report, verdict_banner, writers_table};

const PREVIEW_LEN: usize = 96;

/// Print a finished console's results in `format`
pub(crate) fn print_results(console: &Console, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&console_report(console))?);
        }
        OutputFormat::Table => {
            println!("{}\n", verdict_banner(console.verdict()));

            if console.messages().is_empty() {
                println!("No messages.");
                return Ok(());
            }

            println!("{}\n", writers_table(console.buckets(), PREVIEW_LEN));
            println!("Total: {} messages", console.messages().len());
        }
    }
    Ok(())
}
