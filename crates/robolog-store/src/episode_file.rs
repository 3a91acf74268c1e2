//! [`EpisodeFile`] – the columnar on-disk episode document.
//!
//! One file per episode, holding three columnar datasets indexed by step:
//!
//! | field | shape |
//! |---|---|
//! | `action` | steps × action-dim |
//! | `reward` | steps |
//! | `observations.{key}` | steps × per-field length |
//!
//! The observation keys present in the **first** buffered step define the
//! file schema; a later step with a different key set is a write-time error,
//! reported to the journal by the recorder and never fatal.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use robolog_types::{Observation, Step};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can arise while building or writing an episode file.
#[derive(Error, Debug)]
pub enum EpisodeFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A step's observation keys differ from the first step's keys.
    #[error("observation keys at step {step} do not match the episode schema")]
    SchemaMismatch { step: usize },
}

/// Columnar episode document, serialized as a single JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeFile {
    /// Per-step action vectors (steps × action-dim).
    pub action: Vec<Vec<f32>>,
    /// Per-step scalar rewards.
    pub reward: Vec<f32>,
    /// One dataset per observation field, keyed by field name.
    pub observations: BTreeMap<String, Vec<Vec<f32>>>,
}

impl EpisodeFile {
    /// Assemble the columnar document from the recorder's parallel buffers.
    ///
    /// The first observation's key set defines the schema.
    ///
    /// # Errors
    ///
    /// Returns [`EpisodeFileError::SchemaMismatch`] naming the first step
    /// whose observation keys differ from the schema.
    pub fn from_buffers(
        observations: &[Observation],
        actions: &[Vec<f32>],
        rewards: &[f32],
    ) -> Result<Self, EpisodeFileError> {
        let mut columns: BTreeMap<String, Vec<Vec<f32>>> = BTreeMap::new();
        if let Some(first) = observations.first() {
            for key in first.keys() {
                columns.insert(key.clone(), Vec::with_capacity(observations.len()));
            }
            for (step, observation) in observations.iter().enumerate() {
                if observation.len() != columns.len() {
                    return Err(EpisodeFileError::SchemaMismatch { step });
                }
                for (key, values) in observation {
                    let column = columns
                        .get_mut(key)
                        .ok_or(EpisodeFileError::SchemaMismatch { step })?;
                    column.push(values.clone());
                }
            }
        }
        Ok(Self {
            action: actions.to_vec(),
            reward: rewards.to_vec(),
            observations: columns,
        })
    }

    /// Number of steps in the document.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// `true` when the document holds no steps.
    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }

    /// Reconstruct the row-wise [`Step`] sequence from the columnar
    /// datasets, in recording order.
    pub fn steps(&self) -> Vec<Step> {
        (0..self.len())
            .map(|i| Step {
                observation: self
                    .observations
                    .iter()
                    .map(|(key, column)| {
                        (key.clone(), column.get(i).cloned().unwrap_or_default())
                    })
                    .collect(),
                action: self.action.get(i).cloned().unwrap_or_default(),
                reward: self.reward[i],
            })
            .collect()
    }
}

/// Write the document to `path` as JSON, creating or truncating the file.
///
/// # Errors
///
/// Returns [`EpisodeFileError::Io`] when the path is unwritable and
/// [`EpisodeFileError::Json`] when serialization fails.
pub fn write_episode(path: &Path, episode: &EpisodeFile) -> Result<(), EpisodeFileError> {
    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), episode)?;
    Ok(())
}

/// Load an episode document back from `path`.
pub fn read_episode(path: &Path) -> Result<EpisodeFile, EpisodeFileError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
