//! Upstream payload decoding
//!
//! Workflow webhooks answer in many shapes: a bare string, an object with a
//! `message`, an `output` field holding JSON-in-a-string, arrays of any of
//! those, or wrappers keyed by `data`, `items` or `messages`. Every payload is
//! classified into a closed set of [`UpstreamShape`]s and flattened into an
//! ordered list of [`ChatMessage`]s, depth-first and left-to-right.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Who produced a chat message. Upstream replies are always the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
}

/// One normalized unit of displayable content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// 1-based position in the flattened sequence
    pub id: usize,
    pub role: Role,
    pub content: String,
    /// Structured form of the message, when it has one
    pub parsed: Option<Value>,
}

/// Recognized upstream payload shapes
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamShape<'a> {
    /// Object whose `message`/`Message` field is non-empty
    MessageObject {
        message: &'a Value,
        object: &'a Value,
    },
    /// Object whose `text`/`output` field is non-empty
    TextObject { body: &'a Value, object: &'a Value },
    Array(&'a [Value]),
    DataWrapper(&'a Value),
    ItemsWrapper(&'a Value),
    MessagesWrapper(&'a Value),
    /// String, number or boolean
    Scalar(&'a Value),
    /// `null`; carries nothing to display
    Null,
    /// Any other object, shown as pretty JSON
    Opaque(&'a Value),
}

const MESSAGE_KEYS: [&str; 2] = ["message", "Message"];
const TEXT_KEYS: [&str; 2] = ["text", "output"];

impl<'a> UpstreamShape<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Null => UpstreamShape::Null,
            Value::Array(items) => UpstreamShape::Array(items),
            Value::Object(map) => Self::classify_object(value, map),
            _ => UpstreamShape::Scalar(value),
        }
    }

    fn classify_object(value: &'a Value, map: &'a Map<String, Value>) -> Self {
        let carries_content = MESSAGE_KEYS
            .iter()
            .chain(TEXT_KEYS.iter())
            .any(|key| map.contains_key(*key));

        if carries_content {
            if let Some(message) = first_truthy(map, &MESSAGE_KEYS) {
                return UpstreamShape::MessageObject {
                    message,
                    object: value,
                };
            }
            if let Some(body) = first_truthy(map, &TEXT_KEYS) {
                return UpstreamShape::TextObject {
                    body,
                    object: value,
                };
            }
            return UpstreamShape::Opaque(value);
        }

        if let Some(inner) = map.get("data") {
            UpstreamShape::DataWrapper(inner)
        } else if let Some(inner) = map.get("items") {
            UpstreamShape::ItemsWrapper(inner)
        } else if let Some(inner) = map.get("messages") {
            UpstreamShape::MessagesWrapper(inner)
        } else {
            UpstreamShape::Opaque(value)
        }
    }

    /// Content and structured form for a leaf shape; `None` for containers
    /// and `null`.
    fn leaf(&self) -> Option<(String, Option<Value>)> {
        match self {
            UpstreamShape::MessageObject { message, object } => {
                Some((display_string(message), Some((*object).clone())))
            }
            UpstreamShape::TextObject { body, object } => match body {
                Value::String(text) => Some((
                    text.clone(),
                    parse_structured(text).or_else(|| Some((*object).clone())),
                )),
                other => Some((pretty(other), Some((*other).clone()))),
            },
            UpstreamShape::Opaque(object) => Some((pretty(object), Some((*object).clone()))),
            UpstreamShape::Scalar(Value::String(text)) => {
                Some((text.clone(), parse_structured(text)))
            }
            UpstreamShape::Scalar(other) => Some((other.to_string(), None)),
            UpstreamShape::Array(_)
            | UpstreamShape::DataWrapper(_)
            | UpstreamShape::ItemsWrapper(_)
            | UpstreamShape::MessagesWrapper(_)
            | UpstreamShape::Null => None,
        }
    }
}

/// Flatten an upstream payload into ordered chat messages with ids 1..=n
pub fn flatten(payload: &Value) -> Vec<ChatMessage> {
    let mut messages = Vec::new();
    let mut pending = vec![payload];

    while let Some(value) = pending.pop() {
        let shape = UpstreamShape::classify(value);
        match shape {
            UpstreamShape::Array(items) => pending.extend(items.iter().rev()),
            UpstreamShape::DataWrapper(inner)
            | UpstreamShape::ItemsWrapper(inner)
            | UpstreamShape::MessagesWrapper(inner) => pending.push(inner),
            _ => {
                if let Some((content, parsed)) = shape.leaf() {
                    messages.push(ChatMessage {
                        id: messages.len() + 1,
                        role: Role::Assistant,
                        content,
                        parsed,
                    });
                }
            }
        }
    }

    messages
}

/// Interpret accumulated response text: JSON objects and arrays are used as
/// is, anything else becomes `{ "message": <text> }`.
pub fn parse_accumulated(text: &str) -> Value {
    parse_structured(text).unwrap_or_else(|| serde_json::json!({ "message": text }))
}

/// Parse text as a JSON object or array; scalars and invalid JSON give `None`
pub fn parse_structured(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
        _ => None,
    }
}

/// JavaScript-style truthiness, which is what webhook authors tend to assume
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text form of a value: strings verbatim, everything else as compact JSON
pub fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// First key whose value is truthy. An empty `message` therefore falls
/// through to `Message`, unlike a plain null check.
fn first_truthy<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| is_truthy(value))
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
