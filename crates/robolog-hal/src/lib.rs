//! `robolog-hal` – sensor abstraction for the recording stack.
//!
//! The inference loop does not talk to camera or robot-state hardware
//! directly; it pulls [`Observation`][robolog_types::Observation] maps from
//! anything implementing the [`ObservationSource`] trait.
//!
//! # Modules
//!
//! - [`camera`] – [`ObservationSource`][camera::ObservationSource]: the
//!   capture seam, plus [`SimObservationSource`][camera::SimObservationSource],
//!   a synthetic source used when no physical camera is attached (headless
//!   tests, CI, bench-top runs without the arm).

pub mod camera;

pub use camera::{HalError, ObservationSource, SimObservationSource};
