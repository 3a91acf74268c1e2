//! [`EpisodeRecorder`] – the episode lifecycle.
//!
//! Owns the three parallel step buffers (observations, actions, rewards) and
//! drives one episode at a time:
//!
//! 1. [`start_episode`][EpisodeRecorder::start_episode] – clear the buffers,
//!    derive the episode file path from the robot id and a timestamp, and
//!    best-effort register the episode with the backend.
//! 2. [`log_step`][EpisodeRecorder::log_step] – append one step to the
//!    buffers. A step that cannot be appended consistently is journaled and
//!    dropped; the caller never sees an error.
//! 3. [`end_episode`][EpisodeRecorder::end_episode] – write the columnar
//!    episode file, journal any write failure, then clear the buffers and
//!    the remote episode id regardless of the outcome.
//!
//! Failure isolation is the contract: the control loop must be able to run
//! indefinitely even if all persistence is failing. Every storage or network
//! error stops at this boundary and lands in the [`ErrorJournal`].
//!
//! At most one recorder per process; the episode file and journal are not
//! safe for concurrent writers.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use robolog_sync::{SyncClient, SyncError};
use robolog_types::{ErrorKind, ModelKind, Observation};
use tracing::{info, warn};

use crate::episode_file::{EpisodeFile, write_episode};
use crate::journal::ErrorJournal;

/// Buffers steps for the current episode and persists them on episode end.
pub struct EpisodeRecorder {
    robot_id: String,
    save_dir: PathBuf,
    /// Backend registration client; `None` runs fully local.
    sync: Option<SyncClient>,
    journal: ErrorJournal,
    /// Target file of the episode currently being recorded.
    file_path: Option<PathBuf>,
    /// Backend-assigned id, present only while recording a registered episode.
    remote_episode_id: Option<i64>,
    observations: Vec<Observation>,
    actions: Vec<Vec<f32>>,
    rewards: Vec<f32>,
}

impl EpisodeRecorder {
    /// Create a recorder writing episodes for `robot_id` into `save_dir`.
    ///
    /// The directory is created if missing; failure to create it is logged
    /// and deferred to the episode write, which will journal it as
    /// `FILE_IO_ERROR`.
    pub fn new(
        robot_id: impl Into<String>,
        save_dir: impl Into<PathBuf>,
        sync: Option<SyncClient>,
        journal: ErrorJournal,
    ) -> Self {
        let save_dir = save_dir.into();
        if let Err(e) = fs::create_dir_all(&save_dir) {
            warn!(dir = %save_dir.display(), "failed to create save directory: {e}");
        }
        Self {
            robot_id: robot_id.into(),
            save_dir,
            sync,
            journal,
            file_path: None,
            remote_episode_id: None,
            observations: Vec::new(),
            actions: Vec::new(),
            rewards: Vec::new(),
        }
    }

    /// Begin a new episode.
    ///
    /// Clears any leftover buffered steps, derives the episode file path
    /// (`{robot_id}_episode_{YYYYMMDD_HHMMSS}.json`), and attempts backend
    /// registration when a [`SyncClient`] is configured. Registration
    /// failures are journaled (`API_ERROR` for a rejected status,
    /// `CONNECTION_ERROR` for transport failures) and the episode proceeds
    /// without a remote id.
    pub fn start_episode(&mut self, model: ModelKind) {
        self.clear_buffers();
        self.remote_episode_id = None;

        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{}_episode_{}.json", self.robot_id, stamp);
        let path = self.save_dir.join(filename);
        info!(
            robot = %self.robot_id,
            model = %model,
            file = %path.display(),
            "starting new episode"
        );
        self.file_path = Some(path);

        if let Some(sync) = &self.sync {
            match sync.register_episode(&self.robot_id, model) {
                Ok(id) => {
                    info!(episode_id = id, "episode registered with backend");
                    self.remote_episode_id = Some(id);
                }
                Err(SyncError::Rejected(status)) => {
                    self.journal.log_error(
                        ErrorKind::ApiError,
                        format!("episode creation failed: {status}"),
                        serde_json::json!({
                            "client_id": self.robot_id,
                            "model_type": model.to_string(),
                        }),
                    );
                }
                Err(e) => {
                    self.journal.log_error(
                        ErrorKind::ConnectionError,
                        format!("failed to connect to backend: {e}"),
                        serde_json::json!({ "api_url": sync.api_url() }),
                    );
                }
            }
        }
    }

    /// Append one step to the episode buffers.
    ///
    /// `step` is the loop's step counter, used only for error reporting. An
    /// action whose length differs from the episode's first action would
    /// produce a ragged dataset; such a step is journaled as `LOGGING_ERROR`
    /// and dropped, and the loop continues.
    pub fn log_step(
        &mut self,
        observation: Observation,
        action: Vec<f32>,
        reward: f32,
        step: usize,
    ) {
        if let Some(first) = self.actions.first()
            && first.len() != action.len()
        {
            self.journal.log_error(
                ErrorKind::LoggingError,
                format!(
                    "failed to log step: action length {} does not match episode action length {}",
                    action.len(),
                    first.len()
                ),
                serde_json::json!({ "step": step }),
            );
            return;
        }
        self.observations.push(observation);
        self.actions.push(action);
        self.rewards.push(reward);
    }

    /// Finish the episode: persist the buffers and reset.
    ///
    /// With an empty buffer this is a no-op apart from a log line; no file is
    /// created. Otherwise the episode file is written and any failure is
    /// journaled as `FILE_IO_ERROR` with the target path. The buffers and
    /// the remote episode id are cleared as the final step regardless of the
    /// write outcome.
    pub fn end_episode(&mut self) {
        if self.observations.is_empty() {
            info!("nothing to save; episode buffer is empty");
            return;
        }

        let Some(path) = self.file_path.take() else {
            self.journal.log_error(
                ErrorKind::FileIoError,
                "end_episode called with no active episode",
                serde_json::json!({ "robot_id": self.robot_id }),
            );
            self.clear_buffers();
            self.remote_episode_id = None;
            return;
        };

        info!(file = %path.display(), steps = self.rewards.len(), "saving episode");
        let result = EpisodeFile::from_buffers(&self.observations, &self.actions, &self.rewards)
            .and_then(|doc| write_episode(&path, &doc));
        match result {
            Ok(()) => info!(file = %path.display(), "episode saved"),
            Err(e) => {
                self.journal.log_error(
                    ErrorKind::FileIoError,
                    format!("failed to save episode file: {e}"),
                    serde_json::json!({ "file_path": path.display().to_string() }),
                );
            }
        }

        self.clear_buffers();
        self.remote_episode_id = None;
    }

    /// Number of steps buffered for the current episode.
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// `true` when no steps are buffered.
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Backend-assigned id of the episode in progress, if registration
    /// succeeded.
    pub fn remote_episode_id(&self) -> Option<i64> {
        self.remote_episode_id
    }

    /// Target file of the episode in progress.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// The error journal this recorder reports into.
    pub fn journal(&self) -> &ErrorJournal {
        &self.journal
    }

    fn clear_buffers(&mut self) {
        self.observations.clear();
        self.actions.clear();
        self.rewards.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode_file::read_episode;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn observation(image: &[f32], state: &[f32]) -> Observation {
        let mut map = Observation::new();
        map.insert("image".to_string(), image.to_vec());
        map.insert("state".to_string(), state.to_vec());
        map
    }

    fn local_recorder(dir: &Path) -> EpisodeRecorder {
        EpisodeRecorder::new(
            "arm-01",
            dir.join("data"),
            None,
            ErrorJournal::new(dir.join("logs")),
        )
    }

    /// One-shot HTTP stub answering a single request.
    fn one_shot_server(status: u16, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("stub addr");
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                // Drain the request until the client pauses for the response.
                let _ = stream.set_read_timeout(Some(std::time::Duration::from_millis(100)));
                let mut buf = [0u8; 4096];
                while matches!(stream.read(&mut buf), Ok(n) if n > 0) {}
                let response = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len(),
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn logged_steps_end_up_in_the_episode_file() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut recorder = local_recorder(dir.path());

        recorder.start_episode(ModelKind::Act);
        let path = recorder.file_path().unwrap().to_path_buf();
        for i in 0..4 {
            recorder.log_step(observation(&[0.1; 6], &[i as f32]), vec![0.5; 3], 0.0, i);
        }
        assert_eq!(recorder.len(), 4);
        recorder.end_episode();

        let doc = read_episode(&path).expect("episode file written");
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.action.len(), 4);
        assert_eq!(doc.observations["image"].len(), 4);
        assert_eq!(doc.observations["state"].len(), 4);
        assert!(recorder.is_empty());
        assert!(recorder.journal().entries().is_empty());
    }

    #[test]
    fn end_episode_on_empty_buffer_writes_nothing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut recorder = local_recorder(dir.path());

        recorder.start_episode(ModelKind::Act);
        let path = recorder.file_path().unwrap().to_path_buf();
        recorder.end_episode();

        assert!(!path.exists());
        assert!(recorder.journal().entries().is_empty());
    }

    #[test]
    fn buffers_and_remote_id_are_cleared_even_when_write_fails() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let journal = ErrorJournal::new(dir.path().join("logs"));
        // save_dir is an existing *file*, so the episode write must fail.
        let bogus = dir.path().join("not_a_dir");
        fs::write(&bogus, b"x").unwrap();
        let mut recorder = EpisodeRecorder::new("arm-01", &bogus, None, journal);

        recorder.start_episode(ModelKind::Act);
        recorder.log_step(observation(&[0.1], &[1.0]), vec![0.5], 0.0, 0);
        recorder.end_episode();

        assert!(recorder.is_empty());
        assert_eq!(recorder.remote_episode_id(), None);
        let entries = recorder.journal().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ErrorKind::FileIoError);
    }

    #[test]
    fn observation_schema_mismatch_is_journaled_not_fatal() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut recorder = local_recorder(dir.path());

        recorder.start_episode(ModelKind::Act);
        let path = recorder.file_path().unwrap().to_path_buf();
        recorder.log_step(observation(&[0.1], &[1.0]), vec![0.5], 0.0, 0);
        let mut partial = Observation::new();
        partial.insert("image".to_string(), vec![0.2]);
        recorder.log_step(partial, vec![0.5], 0.0, 1);
        recorder.end_episode();

        assert!(!path.exists(), "mismatched episode must not produce a file");
        let entries = recorder.journal().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ErrorKind::FileIoError);
        assert!(recorder.is_empty());
    }

    #[test]
    fn ragged_action_is_dropped_and_journaled() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut recorder = local_recorder(dir.path());

        recorder.start_episode(ModelKind::Act);
        let path = recorder.file_path().unwrap().to_path_buf();
        recorder.log_step(observation(&[0.1], &[1.0]), vec![0.5; 3], 0.0, 0);
        recorder.log_step(observation(&[0.2], &[2.0]), vec![0.5; 7], 0.0, 1);
        recorder.log_step(observation(&[0.3], &[3.0]), vec![0.6; 3], 0.0, 2);
        recorder.end_episode();

        let doc = read_episode(&path).expect("episode file written");
        assert_eq!(doc.len(), 2, "the ragged step must be dropped");

        let entries = recorder.journal().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ErrorKind::LoggingError);
        assert_eq!(entries[0].details["step"], 1);
    }

    #[test]
    fn unreachable_backend_degrades_to_local_recording() {
        let dir = tempfile::tempdir().expect("tmp dir");
        // Bind then drop: nothing listens on this address.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut recorder = EpisodeRecorder::new(
            "arm-01",
            dir.path().join("data"),
            Some(SyncClient::new(format!("http://{addr}"))),
            ErrorJournal::new(dir.path().join("logs")),
        );

        recorder.start_episode(ModelKind::Act);
        assert_eq!(recorder.remote_episode_id(), None);
        let entries = recorder.journal().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ErrorKind::ConnectionError);

        let path = recorder.file_path().unwrap().to_path_buf();
        recorder.log_step(observation(&[0.1], &[1.0]), vec![0.5], 1.0, 0);
        recorder.end_episode();
        assert!(path.exists(), "local write must succeed without a backend");
    }

    #[test]
    fn rejected_registration_is_journaled_as_api_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let url = one_shot_server(500, r#"{"detail": "boom"}"#);
        let mut recorder = EpisodeRecorder::new(
            "arm-01",
            dir.path().join("data"),
            Some(SyncClient::new(url)),
            ErrorJournal::new(dir.path().join("logs")),
        );

        recorder.start_episode(ModelKind::So101);
        assert_eq!(recorder.remote_episode_id(), None);
        let entries = recorder.journal().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ErrorKind::ApiError);
        assert_eq!(entries[0].details["model_type"], "so-101");
    }

    #[test]
    fn successful_registration_stores_id_until_episode_end() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let url = one_shot_server(200, r#"{"id": 42, "status": "recording"}"#);
        let mut recorder = EpisodeRecorder::new(
            "arm-01",
            dir.path().join("data"),
            Some(SyncClient::new(url)),
            ErrorJournal::new(dir.path().join("logs")),
        );

        recorder.start_episode(ModelKind::Act);
        assert_eq!(recorder.remote_episode_id(), Some(42));

        recorder.log_step(observation(&[0.1], &[1.0]), vec![0.5], 0.0, 0);
        recorder.end_episode();
        assert_eq!(recorder.remote_episode_id(), None);
    }

    #[test]
    fn start_episode_clears_leftover_steps() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut recorder = local_recorder(dir.path());

        recorder.start_episode(ModelKind::Act);
        recorder.log_step(observation(&[0.1], &[1.0]), vec![0.5], 0.0, 0);
        // A new start without an end discards the stale step.
        recorder.start_episode(ModelKind::Act);
        assert!(recorder.is_empty());
    }

    #[test]
    fn end_episode_without_start_is_journaled() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut recorder = local_recorder(dir.path());

        // No start_episode: buffers stay empty, so this is the empty no-op.
        recorder.end_episode();
        assert!(recorder.journal().entries().is_empty());

        // Force the inconsistent state: steps buffered but no active episode.
        recorder.log_step(observation(&[0.1], &[1.0]), vec![0.5], 0.0, 0);
        recorder.end_episode();
        let entries = recorder.journal().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ErrorKind::FileIoError);
        assert!(recorder.is_empty());
    }
}
