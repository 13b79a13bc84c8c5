//! Status snapshots published by the monitor worker.
//!
//! Each successful tick sends one `StatusUpdate` over a channel. Consumers only
//! ever see copies; nothing they do feeds back into the loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use image::RgbaImage;

use super::tracker::StabilityEvent;

/// Monitoring phase for display.
#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    /// No text found in the region
    NoText,
    /// Text changed this tick; the timer restarted
    Changed,
    /// Text unchanged for `elapsed` out of `timeout`
    Unchanged { elapsed: Duration, timeout: Duration },
    /// Timeout passed and the recovery action ran
    TimedOut {
        elapsed: Duration,
        action_succeeded: bool,
    },
}

impl Phase {
    /// Builds the display phase from a tracker event.
    ///
    /// `action_succeeded` is only meaningful for `TimedOut`.
    pub fn from_event(event: &StabilityEvent, timeout: Duration, action_succeeded: bool) -> Self {
        match event {
            StabilityEvent::Absent => Self::NoText,
            StabilityEvent::Changed(_) => Self::Changed,
            StabilityEvent::Unchanged(elapsed) => Self::Unchanged {
                elapsed: *elapsed,
                timeout,
            },
            StabilityEvent::TimedOut(elapsed) => Self::TimedOut {
                elapsed: *elapsed,
                action_succeeded,
            },
        }
    }

    /// Get display text for the phase.
    pub fn status_text(&self) -> String {
        match self {
            Self::NoText => "No text detected in zone".to_string(),
            Self::Changed => "Text CHANGED - timer reset".to_string(),
            Self::Unchanged { elapsed, timeout } => format!(
                "Text UNCHANGED for {:.1}s / {}s",
                elapsed.as_secs_f32(),
                timeout.as_secs()
            ),
            Self::TimedOut {
                elapsed,
                action_succeeded: true,
            } => format!(
                "TIMEOUT after {:.1}s - recovery script executed",
                elapsed.as_secs_f32()
            ),
            Self::TimedOut {
                elapsed,
                action_succeeded: false,
            } => format!(
                "TIMEOUT after {:.1}s - recovery script FAILED",
                elapsed.as_secs_f32()
            ),
        }
    }

    /// Fraction of the timeout used up, for a progress bar.
    pub fn countdown_progress(&self) -> f32 {
        match self {
            Self::Unchanged { elapsed, timeout } if !timeout.is_zero() => {
                (elapsed.as_secs_f32() / timeout.as_secs_f32()).min(1.0)
            }
            Self::TimedOut { .. } => 1.0,
            _ => 0.0,
        }
    }
}

/// One tick's worth of observable state.
#[derive(Clone, Debug)]
pub struct StatusUpdate {
    pub phase: Phase,
    /// Detected text, truncated for display
    pub text: String,
    /// The captured region as seen this tick
    pub preview: Arc<RgbaImage>,
    pub captured_at: DateTime<Local>,
}

impl StatusUpdate {
    pub fn new(phase: Phase, text: &str, text_limit: usize, preview: Arc<RgbaImage>) -> Self {
        Self {
            phase,
            text: truncate_for_display(text, text_limit),
            preview,
            captured_at: Local::now(),
        }
    }

    /// One-line summary for the console log.
    pub fn summary(&self) -> String {
        let text = if self.text.is_empty() {
            "No text detected".to_string()
        } else {
            self.text.replace('\n', " | ")
        };
        format!("{} [{}]", self.phase.status_text(), text)
    }
}

/// Cuts `text` to at most `limit` characters, never splitting a character.
pub fn truncate_for_display(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
