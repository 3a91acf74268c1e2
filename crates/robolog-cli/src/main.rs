//! `robolog-cli` – the `robolog` recording binary.
//!
//! Entry point for an episode recording run:
//!
//! 1. Initialises structured logging (`RUST_LOG`, `ROBOLOG_LOG_FORMAT=json`).
//! 2. Loads `~/.robolog/config.toml` (if present), then applies environment
//!    overrides (`BACKEND_API_URL`, `ROBOT_ID`, …) and command-line flags.
//! 3. Intercepts **Ctrl-C** so an interrupted run still finalizes its
//!    episode (flush-or-clear buffers, attempt the file write).
//! 4. Drives one episode through the inference loop and reports where the
//!    data landed.

mod config;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use colored::Colorize;
use tracing::warn;

use robolog_hal::SimObservationSource;
use robolog_runtime::{InferenceLoop, InferenceLoopConfig, SimPolicy, init_tracing};
use robolog_store::{EpisodeRecorder, ErrorJournal};
use robolog_sync::SyncClient;

fn main() {
    init_tracing("robolog");
    print_banner();

    // ── Configuration ─────────────────────────────────────────────────────
    let mut cfg = match config::load() {
        Ok(Some(cfg)) => cfg,
        Ok(None) => config::Config::default(),
        Err(e) => {
            eprintln!("{} {}", "config error:".red().bold(), e);
            config::Config::default()
        }
    };
    config::apply_env_overrides(&mut cfg);
    if let Err(e) = apply_cli_overrides(&mut cfg, std::env::args().skip(1)) {
        eprintln!("{} {}", "argument error:".red().bold(), e);
        print_usage();
        std::process::exit(2);
    }

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    // Raising the flag lets the loop exit at the next iteration; the episode
    // is then finalized normally instead of being lost.
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – finalizing episode …".yellow().bold());
        shutdown_flag.store(true, Ordering::Release);
    }) {
        warn!("failed to install Ctrl-C handler: {e}");
    }

    // ── Recorder wiring ───────────────────────────────────────────────────
    let sync = cfg.api_url.as_ref().map(|url| SyncClient::new(url.clone()));
    if sync.is_none() {
        warn!("no backend API URL configured; recording locally only");
    }
    let journal = ErrorJournal::new(&cfg.log_dir);
    let mut recorder = EpisodeRecorder::new(&cfg.robot_id, &cfg.save_dir, sync, journal);

    println!(
        "  robot {} · model {} · {}s at {}ms/step",
        cfg.robot_id.cyan(),
        cfg.model.to_string().cyan(),
        cfg.duration_secs,
        cfg.pace_ms
    );

    // ── One episode ───────────────────────────────────────────────────────
    // Real camera and policy checkpoints plug in behind the same traits; the
    // simulated pair keeps the recording pipeline exercisable on any bench.
    let source = SimObservationSource::new(
        "front_rgb",
        cfg.image_width,
        cfg.image_height,
        cfg.state_dim,
    );
    let policy = SimPolicy::new(cfg.model, cfg.action_dim);
    let mut driver = InferenceLoop::new(
        InferenceLoopConfig {
            duration: Duration::from_secs(cfg.duration_secs),
            pace: Duration::from_millis(cfg.pace_ms),
        },
        source,
        policy,
    );
    driver.run(&mut recorder, &shutdown);

    println!(
        "{} episode data in {} · journal at {}",
        "✓ done.".green().bold(),
        cfg.save_dir.display().to_string().cyan(),
        recorder.journal().path().display().to_string().cyan(),
    );
}

/// Apply command-line flags on top of the file/env configuration.
///
/// Mirrors the environment overrides; flags win over both.
fn apply_cli_overrides(
    cfg: &mut config::Config,
    mut args: impl Iterator<Item = String>,
) -> Result<(), String> {
    while let Some(flag) = args.next() {
        let mut value_for = |flag: &str| {
            args.next()
                .ok_or_else(|| format!("{flag} requires a value"))
        };
        match flag.as_str() {
            "--model" | "--model-type" => {
                cfg.model = value_for(&flag)?
                    .parse()
                    .map_err(|e| format!("{e}"))?;
            }
            "--duration" => {
                cfg.duration_secs = value_for(&flag)?
                    .parse()
                    .map_err(|_| "--duration expects seconds".to_string())?;
            }
            "--api-url" => cfg.api_url = Some(value_for(&flag)?),
            "--robot-id" => cfg.robot_id = value_for(&flag)?,
            "--save-dir" => cfg.save_dir = value_for(&flag)?.into(),
            "--log-dir" => cfg.log_dir = value_for(&flag)?.into(),
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown flag: {other}")),
        }
    }
    Ok(())
}

fn print_usage() {
    println!("usage: robolog [--model act|so-101|custom] [--duration SECS]");
    println!("               [--api-url URL] [--robot-id ID]");
    println!("               [--save-dir DIR] [--log-dir DIR]");
}

fn print_banner() {
    println!("{}", "┌──────────────────────────────┐".cyan());
    println!("{}", "│  robolog · episode recorder  │".cyan().bold());
    println!("{}", "└──────────────────────────────┘".cyan());
}
