//! [`Policy`] – the model seam of the recording loop.
//!
//! Model loading and prediction are external collaborators; the loop only
//! needs something that maps an observation to an action vector. Real
//! checkpoints (ACT, SO-101) plug in behind this trait; [`SimPolicy`]
//! stands in when no checkpoint is available.

use rand::Rng;
use robolog_types::{ModelKind, Observation};
use thiserror::Error;

/// Errors that can arise from policy inference.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// The model rejected the observation or failed internally.
    #[error("inference failed for {model}: {details}")]
    InferenceFailed { model: ModelKind, details: String },
}

/// Maps observations to fixed-length action vectors.
pub trait Policy: Send {
    /// The model family this policy runs.
    fn kind(&self) -> ModelKind;

    /// Predict the next action for `observation`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InferenceFailed`] when the model cannot
    /// produce an action. The loop logs the failure and skips the step.
    fn predict(&mut self, observation: &Observation) -> Result<Vec<f32>, PolicyError>;
}

/// A stand-in policy emitting random actions of a fixed dimension.
///
/// Used for bench-top recording runs and tests where the data pipeline, not
/// the policy, is under scrutiny.
pub struct SimPolicy {
    kind: ModelKind,
    action_dim: usize,
}

impl SimPolicy {
    /// Create a simulated `kind` policy producing `action_dim`-element
    /// actions.
    pub fn new(kind: ModelKind, action_dim: usize) -> Self {
        Self { kind, action_dim }
    }
}

impl Policy for SimPolicy {
    fn kind(&self) -> ModelKind {
        self.kind
    }

    fn predict(&mut self, _observation: &Observation) -> Result<Vec<f32>, PolicyError> {
        let mut rng = rand::thread_rng();
        Ok((0..self.action_dim).map(|_| rng.gen_range(0.0..1.0)).collect())
    }
}
