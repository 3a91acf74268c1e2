//! `robolog-types` – shared vocabulary of the episode recording stack.
//!
//! Defines the data carried through the perception-action loop (observations,
//! steps, model families) and the error taxonomy used by the error journal.
//! Every other `robolog-*` crate depends on this one and nothing else in the
//! workspace, so the types here stay free of I/O concerns.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single observation: named flat `f32` arrays keyed by field name,
/// e.g. `"image"` (flattened pixel buffer) and `"state"` (joint positions).
///
/// `BTreeMap` keeps the key order deterministic so serialized episodes are
/// stable across runs.
pub type Observation = BTreeMap<String, Vec<f32>>;

/// One observation/action/reward triple at a point in time.
///
/// Steps carry no identifier of their own; their position in the episode
/// buffer is their time order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub observation: Observation,
    /// Fixed-length action vector produced by the policy.
    pub action: Vec<f32>,
    pub reward: f32,
}

/// The policy model families the inference driver can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum ModelKind {
    /// Action-chunking transformer policy.
    #[default]
    Act,
    /// SO-101 arm policy.
    So101,
    /// User-supplied policy checkpoint.
    Custom,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Act => write!(f, "act"),
            ModelKind::So101 => write!(f, "so-101"),
            ModelKind::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for ModelKind {
    type Err = RoboLogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "act" => Ok(ModelKind::Act),
            "so-101" | "so101" => Ok(ModelKind::So101),
            "custom" => Ok(ModelKind::Custom),
            other => Err(RoboLogError::UnknownModel(other.to_string())),
        }
    }
}

/// Classification tags used by the error journal.
///
/// The wire form (`"API_ERROR"` etc.) is shared with the backend's log
/// tooling and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The backend answered episode registration with a non-200 status.
    ApiError,
    /// The backend could not be reached at all.
    ConnectionError,
    /// A step could not be appended to the in-memory buffers.
    LoggingError,
    /// The episode file could not be written.
    FileIoError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ApiError => write!(f, "API_ERROR"),
            ErrorKind::ConnectionError => write!(f, "CONNECTION_ERROR"),
            ErrorKind::LoggingError => write!(f, "LOGGING_ERROR"),
            ErrorKind::FileIoError => write!(f, "FILE_IO_ERROR"),
        }
    }
}

/// A single record in the append-only error journal.
///
/// The `traceback` field holds the captured Rust backtrace at the call site;
/// the name is kept for compatibility with the journal consumers that grew up
/// on the original field layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    pub traceback: String,
    pub details: serde_json::Value,
}

/// Errors shared across the workspace seams.
#[derive(Error, Debug)]
pub enum RoboLogError {
    #[error("unknown model kind: {0:?} (expected act, so-101, or custom)")]
    UnknownModel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_wire_format_is_screaming_snake() {
        let json = serde_json::to_string(&ErrorKind::ApiError).unwrap();
        assert_eq!(json, "\"API_ERROR\"");
        let json = serde_json::to_string(&ErrorKind::FileIoError).unwrap();
        assert_eq!(json, "\"FILE_IO_ERROR\"");
    }

    #[test]
    fn error_kind_roundtrip() {
        for kind in [
            ErrorKind::ApiError,
            ErrorKind::ConnectionError,
            ErrorKind::LoggingError,
            ErrorKind::FileIoError,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            let back: ErrorKind = serde_json::from_str(&json).unwrap();
            assert_eq!(kind, back);
        }
    }

    #[test]
    fn error_kind_display_matches_wire_format() {
        assert_eq!(ErrorKind::ConnectionError.to_string(), "CONNECTION_ERROR");
        assert_eq!(ErrorKind::LoggingError.to_string(), "LOGGING_ERROR");
    }

    #[test]
    fn model_kind_parses_cli_spellings() {
        assert_eq!("act".parse::<ModelKind>().unwrap(), ModelKind::Act);
        assert_eq!("so-101".parse::<ModelKind>().unwrap(), ModelKind::So101);
        assert_eq!("so101".parse::<ModelKind>().unwrap(), ModelKind::So101);
        assert_eq!("custom".parse::<ModelKind>().unwrap(), ModelKind::Custom);
        assert!("diffusion".parse::<ModelKind>().is_err());
    }

    #[test]
    fn model_kind_display() {
        assert_eq!(ModelKind::So101.to_string(), "so-101");
        assert_eq!(ModelKind::Act.to_string(), "act");
    }

    #[test]
    fn step_roundtrip() {
        let mut observation = Observation::new();
        observation.insert("image".to_string(), vec![0.1, 0.2, 0.3]);
        observation.insert("state".to_string(), vec![1.0, 2.0]);
        let step = Step {
            observation,
            action: vec![0.5; 6],
            reward: 1.5,
        };
        let json = serde_json::to_string(&step).unwrap();
        let back: Step = serde_json::from_str(&json).unwrap();
        assert_eq!(step, back);
    }

    #[test]
    fn error_entry_serializes_kind_as_type_field() {
        let entry = ErrorEntry {
            timestamp: Utc::now(),
            kind: ErrorKind::LoggingError,
            message: "failed to append step".to_string(),
            traceback: "backtrace disabled".to_string(),
            details: serde_json::json!({ "step": 3 }),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "LOGGING_ERROR");
        assert_eq!(json["details"]["step"], 3);
    }
}
