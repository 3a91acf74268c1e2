//! Generic [`ObservationSource`] trait and the simulated capture source.

use rand::Rng;
use robolog_types::Observation;
use thiserror::Error;
use tracing::debug;

/// Errors that can arise while capturing an observation.
#[derive(Error, Debug)]
pub enum HalError {
    /// The capture device is disconnected or returned no frame.
    #[error("capture failed on {device}: {details}")]
    CaptureFailed { device: String, details: String },
}

/// A source of observations for the perception-action loop.
///
/// Implementations bundle whatever sensors the robot exposes (camera frames,
/// joint encoders) into one named-array [`Observation`] per call.
pub trait ObservationSource: Send {
    /// Stable identifier for this source, e.g. `"front_rgb"`.
    fn id(&self) -> &str;

    /// Capture and return the next observation.
    ///
    /// # Errors
    ///
    /// Returns [`HalError::CaptureFailed`] if the device cannot produce a
    /// frame (disconnected, buffer unavailable).
    fn observe(&mut self) -> Result<Observation, HalError>;
}

/// A synthetic [`ObservationSource`] for headless runs.
///
/// Emits an `"image"` field of `width × height × 3` random pixels (RGB,
/// normalised to `[0, 1)`) and a `"state"` field of `state_dim` random joint
/// positions, matching what a real capture pipeline would hand the policy.
pub struct SimObservationSource {
    id: String,
    width: usize,
    height: usize,
    state_dim: usize,
}

impl SimObservationSource {
    /// Create a simulated source producing `width × height` RGB frames and a
    /// `state_dim`-element joint-state vector.
    pub fn new(id: impl Into<String>, width: usize, height: usize, state_dim: usize) -> Self {
        let id = id.into();
        debug!(source = %id, width, height, state_dim, "simulated observation source ready");
        Self {
            id,
            width,
            height,
            state_dim,
        }
    }
}

impl ObservationSource for SimObservationSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn observe(&mut self) -> Result<Observation, HalError> {
        let mut rng = rand::thread_rng();
        let pixels = (0..self.width * self.height * 3)
            .map(|_| rng.gen_range(0.0..1.0))
            .collect();
        let state = (0..self.state_dim).map(|_| rng.gen_range(0.0..1.0)).collect();

        let mut observation = Observation::new();
        observation.insert("image".to_string(), pixels);
        observation.insert("state".to_string(), state);
        Ok(observation)
    }
}
