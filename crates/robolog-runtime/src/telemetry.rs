//! Structured logging initialisation.
//!
//! Call [`init_tracing`] once at process startup.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `ROBOLOG_LOG_FORMAT=json` | Emit newline-delimited JSON logs for log aggregators. |

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the global `tracing` subscriber.
///
/// Honours `RUST_LOG` for filtering and switches to newline-delimited JSON
/// output when `ROBOLOG_LOG_FORMAT=json` is set. `service_name` is attached
/// to the filter default so `RUST_LOG=robolog=debug`-style directives keep
/// working across the workspace crates.
///
/// Calling this twice panics (the global subscriber can only be set once);
/// the CLI calls it exactly once from `main`.
pub fn init_tracing(service_name: &str) {
    let default_filter = format!("info,{service_name}=info");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let use_json = std::env::var("ROBOLOG_LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}
