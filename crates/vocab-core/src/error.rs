//! Error reduction for bridge failures and the service-level error taxonomy.

use serde_json::{Map, Value};
use thiserror::Error;

/// Shape of a raw failure value produced by the host bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorShape {
    /// The host rejected with a bare string.
    Text,
    /// The host rejected with an object carrying one or more well-known fields.
    Structured,
    /// Anything else (null, numbers, booleans, arrays).
    Unknown,
}

/// Structured summary of a raw bridge failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSummary {
    pub shape: ErrorShape,
    pub message: String,
    pub cause: Option<String>,
    pub code: Option<String>,
}

impl std::fmt::Display for ErrorSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Reduce any raw failure value to a single human-readable summary.
///
/// Objects prefer `message`, then `error`, then `data`, then a compact dump of the whole value.
/// `cause` and `code` are appended as suffixes whenever present.
pub fn summarize_error(raw: &Value) -> ErrorSummary {
    match raw {
        Value::String(text) => ErrorSummary {
            shape: ErrorShape::Text,
            message: text.clone(),
            cause: None,
            code: None,
        },
        Value::Object(fields) => summarize_object(fields),
        other => ErrorSummary {
            shape: ErrorShape::Unknown,
            message: format!("Unknown error ({}): {}", type_tag(other), compact(other)),
            cause: None,
            code: None,
        },
    }
}

/// Convenience wrapper returning only the reduced message.
pub fn error_message(raw: &Value) -> String {
    summarize_error(raw).message
}

fn summarize_object(fields: &Map<String, Value>) -> ErrorSummary {
    let base = ["message", "error", "data"]
        .iter()
        .find_map(|key| fields.get(*key).filter(|value| is_present(value)))
        .map(render)
        .unwrap_or_else(|| compact(&Value::Object(fields.clone())));

    let cause = fields.get("cause").filter(|v| is_present(v)).map(render);
    let code = fields.get("code").filter(|v| is_present(v)).map(render);

    let mut message = base;
    if let Some(cause) = cause.as_deref() {
        message.push_str(&format!(" (cause: {cause})"));
    }
    if let Some(code) = code.as_deref() {
        message.push_str(&format!(" [code: {code}]"));
    }

    ErrorSummary {
        shape: ErrorShape::Structured,
        message,
        cause,
        code,
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        _ => true,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => compact(other),
    }
}

fn compact(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| String::from("<unserializable>"))
}

fn type_tag(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Presentation-only classification of a service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Backend,
    Encoding,
}

/// Failures raised inside a service operation before they collapse into an envelope.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Required field '{0}' is missing or empty")]
    MissingField(String),
    #[error("Field '{field}' {reason}")]
    OutOfRange { field: String, reason: String },
    #[error("Field '{field}' must contain valid JSON: {reason}")]
    MalformedJson { field: String, reason: String },
    #[error("{0}")]
    Backend(String),
    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Request parameters must be a JSON object")]
    NotAnObject,
}

impl ServiceError {
    pub fn out_of_range(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OutOfRange {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_) | Self::OutOfRange { .. } | Self::MalformedJson { .. } => {
                ErrorKind::Validation
            }
            Self::Backend(_) => ErrorKind::Backend,
            Self::Encode(_) | Self::NotAnObject => ErrorKind::Encoding,
        }
    }
}
