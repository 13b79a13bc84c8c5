//! Screen Zone Monitor
//!
//! Watches a region of the display, reads its text with Tesseract and runs an
//! AutoHotkey recovery script when the text stops changing for too long.

mod capture;
mod error;
mod gui;
mod monitor;
mod ocr;
mod paths;
mod selection;

use anyhow::{Result, anyhow};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::mem;

use capture::Region;
use error::ConfigError;
use monitor::{MonitorConfig, MonitorLoop, Phase, ScriptAction};

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(paths::get_log_path())
    {
        let _ = file.write_all(line.as_bytes());
    }
}

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        let thread = std::thread::current()
            .name()
            .unwrap_or("unnamed")
            .to_string();
        let log_msg = format!("[PANIC] thread '{}'{} {}\n", thread, location, msg);
        eprintln!("{}", log_msg);
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(paths::get_log_path())
        {
            let _ = file.write_all(log_msg.as_bytes());
        }
    }));

    paths::ensure_directories()?;
    log("Screen Zone Monitor started");

    let config = match monitor::load_config() {
        Ok(config) => config,
        Err(e) => {
            log(&format!("Configuration error: {}", e));
            return Err(e.into());
        }
    };

    let action = match ScriptAction::resolve(&config.action) {
        Ok(action) => action,
        Err(e) => {
            log(&format!("Configuration error: {}", e));
            log("Set AUTOHOTKEY_SCRIPT_PATH (and AUTOHOTKEY_EXE if AutoHotkey is not installed in a standard location).");
            return Err(e.into());
        }
    };

    // Language data is fetched once; OCR reports its own errors per tick if this fails
    if let Err(e) = ocr::ensure_tessdata(&config.ocr.language) {
        log(&format!("Warning: Failed to set up Tesseract language data: {}", e));
        log("OCR may not work correctly.");
    }

    let region = config.region()?;

    if config.headless {
        let region = region.ok_or(ConfigError::MissingRegion)?;
        run_headless(&config, action, region)
    } else {
        log("Starting GUI application...");
        match gui::run_gui(config, action, region) {
            Ok(()) => {
                log("GUI application exited normally");
                Ok(())
            }
            Err(e) => {
                log(&format!("GUI error: {}", e));
                Err(anyhow!("GUI error: {}", e))
            }
        }
    }
}

/// Monitors `region` without a window until the process is terminated.
///
/// Status is logged whenever the phase kind changes, plus every timeout.
fn run_headless(config: &MonitorConfig, action: ScriptAction, region: Region) -> Result<()> {
    log("Running headless");
    let (mut monitor_loop, status_rx) =
        MonitorLoop::for_screen(region, config, Box::new(action))?;
    monitor_loop.start()?;

    let mut last_phase = None;
    for update in status_rx.iter() {
        let phase = mem::discriminant(&update.phase);
        if last_phase != Some(phase) || matches!(update.phase, Phase::TimedOut { .. }) {
            log(&update.summary());
        }
        last_phase = Some(phase);
    }

    log("Status channel closed");
    Ok(())
}
