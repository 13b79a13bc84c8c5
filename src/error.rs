//! Error taxonomy for the monitor.
//!
//! `ConfigError` is fatal at startup. `CaptureError` and `ExtractionError`
//! are per-tick and only ever skip the tick. `ActionInvocationError` is logged
//! and never stops the loop.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Invalid or incomplete configuration. Monitoring does not start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid region ({x1}, {y1}, {x2}, {y2}): need x1 < x2 and y1 < y2")]
    InvalidRegion { x1: i32, y1: i32, x2: i32, y2: i32 },

    #[error("timeout must be a positive duration")]
    InvalidTimeout,

    #[error("tick interval must be a positive duration")]
    InvalidTickInterval,

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("recovery script not found at {}", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("recovery executable not found (searched: {})", format_paths(.searched))]
    ExecutableNotFound { searched: Vec<PathBuf> },

    #[error("no region selected or configured")]
    MissingRegion,
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The display could not be read for this tick.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("screen capture is not supported on this platform")]
    Unsupported,

    #[error("screen capture failed: {0}")]
    Platform(String),
}

/// The OCR collaborator failed for this tick.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("OCR engine failed: {0}")]
    Engine(String),

    #[error("OCR I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode image for OCR: {0}")]
    Image(#[from] image::ImageError),
}

/// The recovery command could not be run to completion.
#[derive(Debug, Error)]
pub enum ActionInvocationError {
    #[error("recovery script not found at {}", .0.display())]
    ScriptMissing(PathBuf),

    #[error("recovery executable not found at {}", .0.display())]
    ExecutableMissing(PathBuf),

    #[error("failed to launch recovery command: {0}")]
    Launch(#[source] std::io::Error),

    #[error("failed while waiting for recovery command: {0}")]
    Wait(#[source] std::io::Error),

    #[error("recovery command did not finish within {0:?}")]
    TimedOut(Duration),
}

/// A tick that produced no sample. The tracker is not touched.
#[derive(Debug, Error)]
pub enum TickError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Start/stop control failures of the monitor loop.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("already running")]
    AlreadyRunning,

    #[error("monitor worker thread panicked")]
    WorkerPanicked,
}
