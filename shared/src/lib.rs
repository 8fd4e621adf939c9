use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub mod config;
pub mod markers;

pub use config::{ClientConfig, ConfigError, EndpointConfig, GlyphStyle, HighlightConfig};
pub use markers::{MarkerClass, MarkerError, MarkerFamily, Role};

// ===== COMMAND PROTOCOL =====

/// One instruction sent by the server in reply to a form/action POST.
///
/// The wire form is a JSON object tagged by its `command` field:
/// `{"command": "setCursor", "number": 2, "x": "3.5"}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    None,
    Reload,
    Redirect {
        location: String,
    },
    SetCursor {
        #[serde(deserialize_with = "cursor_index")]
        number: usize,
        x: NumericField,
    },
    SetLineData {
        x: Vec<f64>,
        y: Vec<f64>,
    },
    RemoveLine,
    RemoveCursor {
        #[serde(deserialize_with = "cursor_index")]
        number: usize,
    },
    /// Declared by the server protocol, never given payload semantics.
    ChangeColor,
}

impl Command {
    /// Every `command` tag the client understands.
    pub const KINDS: [&'static str; 8] = [
        "none",
        "reload",
        "redirect",
        "setCursor",
        "setLineData",
        "removeLine",
        "removeCursor",
        "changeColor",
    ];

    /// Classify and decode a raw reply.
    ///
    /// The tag is checked before the fields so that an unknown kind is reported
    /// as such instead of as a generic decoding failure.
    pub fn from_reply(reply: &serde_json::Value) -> Result<Self, ProtocolError> {
        let kind = reply
            .get("command")
            .and_then(|value| value.as_str())
            .ok_or(ProtocolError::MissingCommand)?;

        if !Self::KINDS.contains(&kind) {
            return Err(ProtocolError::UnrecognizedCommand(kind.to_string()));
        }

        serde_json::from_value(reply.clone()).map_err(|error| ProtocolError::Malformed {
            kind: kind.to_string(),
            reason: error.to_string(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Command::None => "none",
            Command::Reload => "reload",
            Command::Redirect { .. } => "redirect",
            Command::SetCursor { .. } => "setCursor",
            Command::SetLineData { .. } => "setLineData",
            Command::RemoveLine => "removeLine",
            Command::RemoveCursor { .. } => "removeCursor",
            Command::ChangeColor => "changeColor",
        }
    }
}

/// A number that the server may send either as a JSON number or as text.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum NumericField {
    Number(f64),
    Text(String),
}

impl NumericField {
    pub fn as_f64(&self) -> Result<f64, ProtocolError> {
        let parsed = match self {
            NumericField::Number(value) => Some(*value),
            NumericField::Text(text) => text.trim().parse::<f64>().ok(),
        };
        match parsed {
            Some(value) if value.is_finite() => Ok(value),
            _ => Err(ProtocolError::NotANumber(self.to_string())),
        }
    }
}

impl std::fmt::Display for NumericField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumericField::Number(value) => write!(f, "{value}"),
            NumericField::Text(text) => write!(f, "{text:?}"),
        }
    }
}

fn cursor_index<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let field = NumericField::deserialize(deserializer)?;
    let value = field.as_f64().map_err(serde::de::Error::custom)?;
    if value < 0.0 || value.fract() != 0.0 || value > usize::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "cursor number {field} is not a non-negative integer"
        )));
    }
    Ok(value as usize)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    #[error("reply has no `command` field")]
    MissingCommand,
    #[error("unrecognized command '{0}'")]
    UnrecognizedCommand(String),
    #[error("malformed '{kind}' command: {reason}")]
    Malformed { kind: String, reason: String },
    #[error("{0} is not a number")]
    NotANumber(String),
}

// ===== AUXILIARY ENDPOINT PAYLOADS =====

/// Reply of the dataset search endpoint: dataset id -> label.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    #[serde(default)]
    pub result: BTreeMap<String, String>,
}

impl SearchResults {
    /// Entries ordered by numeric id where ids are numeric, lexically otherwise.
    pub fn ordered(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .result
            .iter()
            .map(|(id, label)| (id.as_str(), label.as_str()))
            .collect();
        entries.sort_by(|(a, _), (b, _)| match (a.parse::<u64>(), b.parse::<u64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b),
            _ => a.cmp(b),
        });
        entries
    }
}

/// Reply of the share-link endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShareLinks {
    pub link_ro: String,
    pub link_rw: String,
}
