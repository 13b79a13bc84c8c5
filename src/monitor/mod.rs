//! Text stability monitoring.
//!
//! A `MonitorLoop` owns a background worker that captures the watched region,
//! extracts its text, and feeds the `StabilityTracker`. When the text stays
//! the same for longer than the timeout, the configured `RecoveryAction`
//! fires once and the tracker starts over.

pub mod action;
pub mod config;
pub mod runner;
pub mod status;
pub mod tracker;

pub use action::ScriptAction;
pub use config::{MonitorConfig, load_config};
pub use runner::MonitorLoop;
pub use status::{Phase, StatusUpdate};
