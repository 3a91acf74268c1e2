//! [`InferenceLoop`] – the recording state machine.
//!
//! Each run is one episode:
//!
//! 1. **Start** – [`EpisodeRecorder::start_episode`].
//! 2. **Tick** – observe via [`ObservationSource`], predict via [`Policy`],
//!    hand the step to [`EpisodeRecorder::log_step`], sleep the pacing
//!    interval.
//! 3. **Finish** – [`EpisodeRecorder::end_episode`], executed on normal
//!    expiry and on operator interrupt alike.
//!
//! Observation and prediction failures are logged and the step skipped; the
//! loop never terminates because a collaborator misbehaved. Termination
//! comes only from the configured duration or the shared shutdown flag
//! (raised by the Ctrl-C handler).
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//! use robolog_hal::SimObservationSource;
//! use robolog_runtime::{InferenceLoop, InferenceLoopConfig, SimPolicy};
//! use robolog_store::{EpisodeRecorder, ErrorJournal};
//! use robolog_types::ModelKind;
//!
//! let mut recorder = EpisodeRecorder::new(
//!     "arm-01",
//!     "/opt/robolog/data",
//!     None,
//!     ErrorJournal::new("/opt/robolog/logs"),
//! );
//! let source = SimObservationSource::new("front_rgb", 640, 480, 6);
//! let policy = SimPolicy::new(ModelKind::Act, 14);
//!
//! let mut driver = InferenceLoop::new(InferenceLoopConfig::default(), source, policy);
//! driver.run(&mut recorder, &Arc::new(AtomicBool::new(false)));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use robolog_hal::ObservationSource;
use robolog_store::EpisodeRecorder;
use tracing::{info, warn};

use crate::policy::Policy;

/// Configuration bundle for [`InferenceLoop`].
pub struct InferenceLoopConfig {
    /// How long to record before ending the episode.
    pub duration: Duration,
    /// Pacing delay between iterations (default 100 ms, i.e. 10 Hz).
    pub pace: Duration,
}

impl Default for InferenceLoopConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(10),
            pace: Duration::from_millis(100),
        }
    }
}

/// Drives one episode per [`run`][InferenceLoop::run] call.
pub struct InferenceLoop<S, P> {
    config: InferenceLoopConfig,
    source: S,
    policy: P,
}

impl<S: ObservationSource, P: Policy> InferenceLoop<S, P> {
    /// Build a loop over the given observation source and policy.
    pub fn new(config: InferenceLoopConfig, source: S, policy: P) -> Self {
        Self {
            config,
            source,
            policy,
        }
    }

    /// Record one episode.
    ///
    /// Runs until the configured duration elapses or `shutdown` is raised,
    /// then finalizes the episode. `end_episode` runs on every exit path, so
    /// an interrupted run still flushes (or clears) its buffers.
    pub fn run(&mut self, recorder: &mut EpisodeRecorder, shutdown: &AtomicBool) {
        recorder.start_episode(self.policy.kind());

        let started = Instant::now();
        let mut step = 0usize;
        while started.elapsed() < self.config.duration {
            if shutdown.load(Ordering::Acquire) {
                info!("shutdown requested; finalizing episode");
                break;
            }

            match self.tick(recorder, step) {
                Ok(()) => step += 1,
                // A failed tick is a skipped step, nothing more.
                Err(reason) => warn!(step, "step skipped: {reason}"),
            }

            thread::sleep(self.config.pace);
        }

        recorder.end_episode();
        info!(steps = step, "episode finished");
    }

    /// One observe → predict → log iteration.
    fn tick(&mut self, recorder: &mut EpisodeRecorder, step: usize) -> Result<(), String> {
        let observation = self
            .source
            .observe()
            .map_err(|e| format!("observation failed: {e}"))?;
        let action = self
            .policy
            .predict(&observation)
            .map_err(|e| format!("prediction failed: {e}"))?;
        recorder.log_step(observation, action, 0.0, step);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
