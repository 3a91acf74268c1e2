//! `robolog-runtime` – the perception-action driver.
//!
//! Runs the recording loop: pull an observation from the HAL, ask the policy
//! for an action, hand the step to the
//! [`EpisodeRecorder`][robolog_store::EpisodeRecorder], sleep to pace the
//! loop. The loop owns no persistence logic of its own; every storage and
//! network failure is absorbed by the recorder, so the loop can run
//! indefinitely even with all persistence failing.
//!
//! # Modules
//!
//! - [`inference_loop`] – [`InferenceLoop`][inference_loop::InferenceLoop]:
//!   the driver state machine (`start_episode` → observe/predict/log/pace →
//!   `end_episode`, finalization guaranteed even on interrupt).
//! - [`policy`] – [`Policy`][policy::Policy]: the model seam, plus
//!   [`SimPolicy`][policy::SimPolicy] for runs without a real checkpoint.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: structured
//!   logging setup (`RUST_LOG`, `ROBOLOG_LOG_FORMAT=json`).

pub mod inference_loop;
pub mod policy;
pub mod telemetry;

pub use inference_loop::{InferenceLoop, InferenceLoopConfig};
pub use policy::{Policy, PolicyError, SimPolicy};
pub use telemetry::init_tracing;
