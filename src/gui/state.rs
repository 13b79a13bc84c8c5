//! GUI application state management.
//!
//! Holds what the two screens display. Nothing here touches the worker: the
//! monitor screen only folds in `StatusUpdate` snapshots.

use crate::capture::{DisplayShot, Region};
use crate::error::ConfigError;
use crate::monitor::{Phase, StatusUpdate};
use crate::selection::{DisplayScale, DragSelection, SELECTOR_WIDTH};

/// Colour category of the status line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Idle,
    Normal,
    Warning,
    Alert,
}

/// State of the region selector screen.
#[derive(Default)]
pub struct SelectorState {
    /// Current display screenshot and its scale in the selector
    pub shot: Option<(DisplayShot, DisplayScale)>,
    pub drag: DragSelection,
    /// Last capture or selection error
    pub error: Option<String>,
    /// Set when the screenshot changed and its texture must be rebuilt
    pub shot_changed: bool,
}

impl SelectorState {
    /// Replaces the screenshot; an existing drag no longer applies to it.
    pub fn set_shot(&mut self, shot: DisplayShot) {
        let scale = DisplayScale::fit_width(
            shot.image.width(),
            shot.image.height(),
            shot.origin_x,
            shot.origin_y,
            SELECTOR_WIDTH,
        );
        self.shot = Some((shot, scale));
        self.drag.clear();
        self.error = None;
        self.shot_changed = true;
    }

    pub fn scale(&self) -> Option<&DisplayScale> {
        self.shot.as_ref().map(|(_, scale)| scale)
    }

    /// Converts the current drag into a region, recording any error for display.
    pub fn confirm(&mut self) -> Option<Region> {
        let Some(scale) = self.scale() else {
            self.error = Some("No screenshot available. Press 'Reload screenshot'.".to_string());
            return None;
        };
        match self.drag.to_region(scale) {
            Ok(region) => {
                self.error = None;
                Some(region)
            }
            Err(ConfigError::MissingRegion) => {
                self.error = Some("Please select a zone first".to_string());
                None
            }
            Err(e) => {
                self.error = Some(format!("Invalid zone: {}", e));
                None
            }
        }
    }
}

/// What the monitor screen shows.
#[derive(Default)]
pub struct MonitorDisplay {
    pub running: bool,
    /// Set once the previous worker has finished and Start would not block
    pub can_start: bool,
    /// Most recent successful tick
    pub last: Option<StatusUpdate>,
    /// Start/stop failure to show instead of the phase
    pub error: Option<String>,
    /// Set when `last` changed and the preview texture must be rebuilt
    pub preview_changed: bool,
}

impl MonitorDisplay {
    pub fn apply(&mut self, update: StatusUpdate) {
        self.last = Some(update);
        self.error = None;
        self.preview_changed = true;
    }

    /// Folds in the worker's liveness as read from the loop this frame.
    pub fn sync_worker(&mut self, running: bool, can_start: bool, died: bool) {
        self.running = running;
        self.can_start = can_start;
        if died && self.error.is_none() {
            self.error = Some("monitor worker stopped unexpectedly, see the log".to_string());
        }
    }

    /// Get display text for the status line.
    pub fn status_text(&self) -> String {
        if let Some(error) = &self.error {
            return format!("Error: {}", error);
        }
        match (&self.last, self.running) {
            (Some(update), true) => update.phase.status_text(),
            (_, true) => "Monitoring started...".to_string(),
            (Some(_), false) => "Monitoring stopped".to_string(),
            (None, false) => "Ready to start monitoring".to_string(),
        }
    }

    pub fn tone(&self) -> StatusTone {
        if self.error.is_some() {
            return StatusTone::Alert;
        }
        if !self.running {
            return StatusTone::Idle;
        }
        match self.last.as_ref().map(|u| &u.phase) {
            Some(Phase::TimedOut { .. }) => StatusTone::Alert,
            Some(Phase::Unchanged { .. }) => StatusTone::Warning,
            _ => StatusTone::Normal,
        }
    }

    pub fn detected_text(&self) -> String {
        match &self.last {
            None => "Detected text will appear here".to_string(),
            Some(update) if update.text.is_empty() => "Detected: No text detected".to_string(),
            Some(update) => format!("Detected: {}", update.text),
        }
    }

    pub fn progress(&self) -> f32 {
        match (&self.last, self.running) {
            (Some(update), true) => update.phase.countdown_progress(),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::sync::Arc;
    use std::time::Duration;

    fn update(phase: Phase, text: &str) -> StatusUpdate {
        StatusUpdate::new(phase, text, 300, Arc::new(RgbaImage::new(1, 1)))
    }

    fn shot(width: u32, height: u32) -> DisplayShot {
        DisplayShot {
            image: RgbaImage::new(width, height),
            origin_x: 0,
            origin_y: 0,
        }
    }

    #[test]
    fn test_status_text_lifecycle() {
        let mut display = MonitorDisplay::default();
        assert_eq!(display.status_text(), "Ready to start monitoring");
        assert_eq!(display.tone(), StatusTone::Idle);

        display.running = true;
        assert_eq!(display.status_text(), "Monitoring started...");

        display.apply(update(
            Phase::Unchanged {
                elapsed: Duration::from_secs(3),
                timeout: Duration::from_secs(35),
            },
            "Working",
        ));
        assert_eq!(display.status_text(), "Text UNCHANGED for 3.0s / 35s");
        assert_eq!(display.tone(), StatusTone::Warning);
        assert_eq!(display.detected_text(), "Detected: Working");

        display.running = false;
        assert_eq!(display.status_text(), "Monitoring stopped");
        assert_eq!(display.progress(), 0.0);
    }

    #[test]
    fn test_error_overrides_phase() {
        let mut display = MonitorDisplay {
            running: true,
            ..Default::default()
        };
        display.apply(update(Phase::Changed, "x"));
        display.error = Some("already running".to_string());
        assert_eq!(display.status_text(), "Error: already running");
        assert_eq!(display.tone(), StatusTone::Alert);
    }

    #[test]
    fn test_sync_worker_reports_dead_worker() {
        let mut display = MonitorDisplay::default();
        display.sync_worker(false, true, false);
        assert!(display.can_start);
        assert!(display.error.is_none());

        // Stopped but the last tick is still in flight
        display.sync_worker(false, false, false);
        assert!(!display.can_start);
        assert_eq!(display.status_text(), "Ready to start monitoring");

        display.sync_worker(false, false, true);
        assert_eq!(
            display.status_text(),
            "Error: monitor worker stopped unexpectedly, see the log"
        );
        assert_eq!(display.tone(), StatusTone::Alert);
    }

    #[test]
    fn test_empty_text_message() {
        let mut display = MonitorDisplay::default();
        display.apply(update(Phase::NoText, ""));
        assert_eq!(display.detected_text(), "Detected: No text detected");
    }

    #[test]
    fn test_selector_confirm_requires_screenshot_and_drag() {
        let mut selector = SelectorState::default();
        assert!(selector.confirm().is_none());
        assert!(selector.error.is_some());

        selector.set_shot(shot(2160, 1440));
        assert!(selector.error.is_none());
        assert!(selector.confirm().is_none());

        selector.drag.begin(10.0, 20.0);
        selector.drag.update(110.0, 70.0);
        let region = selector.confirm().unwrap();
        assert_eq!(region.corners(), [20, 40, 220, 140]);
        assert!(selector.error.is_none());
    }

    #[test]
    fn test_new_shot_clears_drag() {
        let mut selector = SelectorState::default();
        selector.set_shot(shot(1080, 720));
        selector.drag.begin(1.0, 1.0);
        selector.drag.update(50.0, 50.0);
        selector.set_shot(shot(1080, 720));
        assert_eq!(selector.drag.rect(), None);
        assert!(selector.shot_changed);
    }
}
