//! `robolog-sync` – best-effort episode registration against the backend.
//!
//! Communicates with the fleet backend's `POST /episodes/` endpoint to obtain
//! a server-assigned episode id before recording starts. Every call here is
//! strictly best-effort: the recorder treats any failure as "record locally
//! only" and the control loop never sees an error from this crate.
//!
//! Step-level upload is intentionally absent. If it is ever added it must be
//! a batched background sender that stays off the control loop's step path.
//!
//! # Example
//!
//! ```rust,no_run
//! use robolog_sync::SyncClient;
//! use robolog_types::ModelKind;
//!
//! let client = SyncClient::new("http://localhost:8000");
//! // Requires a running backend – skipped in unit tests.
//! // let episode_id = client.register_episode("arm-01", ModelKind::Act);
//! ```

use std::time::Duration;

use robolog_types::ModelKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// How long a registration attempt may block the episode start before it is
/// abandoned and the episode degrades to local-only recording.
const REGISTRATION_TIMEOUT: Duration = Duration::from_secs(5);

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can arise from backend registration.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The request never completed: DNS failure, refused connection, timeout,
    /// or an unreadable response body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The backend answered, but not with status 200.
    #[error("episode registration rejected: HTTP {0}")]
    Rejected(u16),
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire shapes
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for `POST /episodes/`.
#[derive(Serialize)]
struct EpisodeCreate<'a> {
    client_id: &'a str,
    model_type: String,
}

/// The subset of the backend's episode response the client consumes.
/// Extra fields (`timestamp`, `status`, …) are ignored.
#[derive(Deserialize)]
struct EpisodeCreated {
    id: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// SyncClient
// ─────────────────────────────────────────────────────────────────────────────

/// A blocking client for the backend episode API.
///
/// Construct once and reuse across episodes. Registration happens once per
/// episode, outside the step path, so a blocking client keeps the recorder
/// single-threaded as designed.
pub struct SyncClient {
    api_url: String,
    client: reqwest::blocking::Client,
}

impl SyncClient {
    /// Create a client pointing at `api_url` (e.g. `"http://localhost:8000"`).
    /// A trailing slash is tolerated.
    pub fn new(api_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(REGISTRATION_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self {
            api_url: api_url.into(),
            client,
        }
    }

    /// Base URL this client registers against.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Register a new episode for `client_id` running `model` and return the
    /// backend-assigned episode id.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Rejected`] when the backend answers with any
    /// status other than 200, and [`SyncError::Http`] when the request fails
    /// in transit or the response body cannot be decoded.
    pub fn register_episode(&self, client_id: &str, model: ModelKind) -> Result<i64, SyncError> {
        let url = format!("{}/episodes/", self.api_url.trim_end_matches('/'));
        let body = EpisodeCreate {
            client_id,
            model_type: model.to_string(),
        };

        let response = self.client.post(&url).json(&body).send()?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(SyncError::Rejected(status));
        }

        let created: EpisodeCreated = response.json()?;
        debug!(episode_id = created.id, %url, "episode registered with backend");
        Ok(created.id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
