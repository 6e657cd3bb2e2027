use serde::{Deserialize, Serialize};
use std::fmt;

/// A validation diagnostic, tagged by the document it came from and the
/// location inside that document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    /// Usually the file path of the checked document.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(source: &str, location: Option<&str>, message: impl Into<String>) -> Self {
        Diagnostic {
            source: source.to_owned(),
            location: location.map(str::to_owned),
            message: message.into(),
        }
    }

    /// A document-level diagnostic with no finer location.
    pub fn document(source: &str, message: impl Into<String>) -> Self {
        Diagnostic::new(source, None, message)
    }

    pub fn at(source: &str, location: &str, message: impl Into<String>) -> Self {
        Diagnostic::new(source, Some(location), message)
    }

    /// Serialize with every field present (null for a missing location).
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "location": self.location,
            "message":  self.message,
            "source":   self.source,
        })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{}: {}: {}", self.source, loc, self.message),
            None => write!(f, "{}: {}", self.source, self.message),
        }
    }
}
