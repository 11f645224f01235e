use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use serde_json::{Map, Value, json};

use crate::console::{ComplianceVerdict, Console, WriterBuckets};

#[derive(Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Shorten `s` to at most `max_len` characters, marking the cut with `...`
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Collapse whitespace runs so multi-line content fits one table cell line
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn verdict_banner(verdict: Option<&ComplianceVerdict>) -> String {
    match verdict {
        Some(v) => format!("{}\n{}", v.headline(), v.message),
        None => "No compliance verdict in this reply.".to_string(),
    }
}

/// One row per message, grouped by bucket in display order
pub fn writers_table(buckets: &WriterBuckets, preview_len: usize) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Bucket", "#", "Content"]);

    for (bucket, messages) in buckets.iter() {
        for message in messages {
            table.add_row([
                bucket.label().to_string(),
                message.id.to_string(),
                truncate_string(&single_line(&message.content), preview_len),
            ]);
        }
    }
    table
}

/// Everything a finished submission produced, as one JSON document
pub fn console_report(console: &Console) -> Value {
    let mut writers = Map::new();
    for (bucket, messages) in console.buckets().iter() {
        writers.insert(bucket.label().to_string(), json!(messages));
    }

    json!({
        "state": console.state().label(),
        "error": console.error(),
        "verdict": console.verdict(),
        "writers": writers,
        "messages": console.messages(),
        "raw": console.raw_view(),
    })
}
