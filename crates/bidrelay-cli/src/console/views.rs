//! Derived views over the current message list

use serde::Serialize;
use serde_json::Value;

use super::payload::{ChatMessage, display_string, is_truthy};

/// Compliance result extracted from the first message that carries one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceVerdict {
    pub compliant: bool,
    pub message: String,
}

impl ComplianceVerdict {
    /// First message whose structured form has both a compliance flag and a
    /// message field.
    pub fn detect(messages: &[ChatMessage]) -> Option<Self> {
        messages.iter().find_map(|m| {
            let map = m.parsed.as_ref()?.as_object()?;

            let has_flag = map.contains_key("compliant") || map.contains_key("Compliant");
            let has_message = map.contains_key("message") || map.contains_key("Message");
            if !has_flag || !has_message {
                return None;
            }

            let compliant = non_null(map.get("compliant"))
                .or_else(|| non_null(map.get("Compliant")))
                .is_some_and(is_truthy);
            let message = non_null(map.get("message"))
                .or_else(|| non_null(map.get("Message")))
                .map(display_string)
                .unwrap_or_else(|| m.content.clone());

            Some(ComplianceVerdict { compliant, message })
        })
    }

    pub fn headline(&self) -> &'static str {
        if self.compliant {
            "Compliant ✅"
        } else {
            "Not compliant ❌"
        }
    }
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Topic categories for grouping writer output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriterBucket {
    Executive,
    Technical,
    Pricing,
    References,
    Timeline,
    Other,
}

impl WriterBucket {
    /// Buckets in match priority (and display) order
    pub const ALL: [WriterBucket; 6] = [
        WriterBucket::Executive,
        WriterBucket::Technical,
        WriterBucket::Pricing,
        WriterBucket::References,
        WriterBucket::Timeline,
        WriterBucket::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WriterBucket::Executive => "executive",
            WriterBucket::Technical => "technical",
            WriterBucket::Pricing => "pricing",
            WriterBucket::References => "references",
            WriterBucket::Timeline => "timeline",
            WriterBucket::Other => "other",
        }
    }

    /// Lowercase keywords that route a message here; `Other` has none
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            WriterBucket::Executive => &["executive summary"],
            WriterBucket::Technical => &["technical", "architecture"],
            WriterBucket::Pricing => &["pricing"],
            WriterBucket::References => &["reference"],
            WriterBucket::Timeline => &["timeline", "phase"],
            WriterBucket::Other => &[],
        }
    }

    /// First bucket with a keyword contained in `content`, ignoring case
    pub fn classify(content: &str) -> Self {
        let text = content.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.keywords().iter().any(|k| text.contains(k)))
            .unwrap_or(WriterBucket::Other)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Every message assigned to exactly one writer bucket
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriterBuckets {
    buckets: [Vec<ChatMessage>; 6],
}

impl WriterBuckets {
    pub fn build(messages: &[ChatMessage]) -> Self {
        let mut buckets: [Vec<ChatMessage>; 6] = Default::default();
        for message in messages {
            buckets[WriterBucket::classify(&message.content).index()].push(message.clone());
        }
        Self { buckets }
    }

    pub fn get(&self, bucket: WriterBucket) -> &[ChatMessage] {
        &self.buckets[bucket.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (WriterBucket, &[ChatMessage])> {
        WriterBucket::ALL
            .into_iter()
            .map(move |bucket| (bucket, self.get(bucket)))
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}

/// The "Raw" view: each message's structured form, or its text
pub fn raw_view(messages: &[ChatMessage]) -> Value {
    Value::Array(
        messages
            .iter()
            .map(|m| {
                m.parsed
                    .clone()
                    .unwrap_or_else(|| Value::String(m.content.clone()))
            })
            .collect(),
    )
}
