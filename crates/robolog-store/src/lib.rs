//! `robolog-store` – the episode data-logging pipeline.
//!
//! Buffers per-step observation/action/reward data in memory, persists it to
//! one columnar JSON file per episode, and keeps an append-only error journal
//! so that no storage or network failure ever reaches the control loop.
//!
//! # Modules
//!
//! - [`recorder`] – [`EpisodeRecorder`][recorder::EpisodeRecorder]: the
//!   episode lifecycle (`start_episode` / `log_step` / `end_episode`) with
//!   best-effort backend registration and degraded local-only recording.
//! - [`episode_file`] – [`EpisodeFile`][episode_file::EpisodeFile]: the
//!   columnar on-disk episode document (`action`, `reward`, one array per
//!   observation field) and its write/read entry points.
//! - [`journal`] – [`ErrorJournal`][journal::ErrorJournal]: the append-only
//!   JSON error journal. The last line of defense; it never fails outward.

pub mod episode_file;
pub mod journal;
pub mod recorder;

pub use episode_file::{EpisodeFile, EpisodeFileError, read_episode, write_episode};
pub use journal::ErrorJournal;
pub use recorder::EpisodeRecorder;
