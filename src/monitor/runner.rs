//! Monitor runner - start/stop control and the tick loop.
//!
//! One background thread owns the capturer, extractor, tracker and recovery
//! action and runs ticks strictly one after another:
//! capture → extract → track → (fire) → publish.
//! The controlling side only flips a stop flag and reads published snapshots.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::capture::{Region, RegionCapturer, ScreenCapturer};
use crate::error::{ConfigError, MonitorError, TickError};
use crate::monitor::action::RecoveryAction;
use crate::monitor::config::MonitorConfig;
use crate::monitor::status::{Phase, StatusUpdate};
use crate::monitor::tracker::{StabilityEvent, StabilityTracker};
use crate::ocr::{TesseractEngine, TextExtractor};

/// How often a sleeping worker checks the stop flag.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Timing and display parameters for a monitor.
#[derive(Clone, Copy, Debug)]
pub struct MonitorSettings {
    pub timeout: Duration,
    pub tick_interval: Duration,
    pub text_limit: usize,
}

impl MonitorSettings {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            timeout: config.timeout(),
            tick_interval: config.tick_interval(),
            text_limit: config.display_text_limit,
        }
    }
}

/// Everything a tick needs, owned by exactly one thread at a time.
pub struct TickWorker {
    capturer: Box<dyn RegionCapturer>,
    extractor: TextExtractor,
    tracker: StabilityTracker,
    action: Box<dyn RecoveryAction>,
    status_tx: Sender<StatusUpdate>,
    settings: MonitorSettings,
}

impl TickWorker {
    /// Runs one tick with the sample taken at `now`.
    ///
    /// A capture or extraction failure returns early: the tracker is not
    /// touched and nothing is published, so the current streak survives.
    pub fn tick(&mut self, now: Instant) -> Result<(), TickError> {
        let image = self.capturer.capture()?;
        let text = self.extractor.extract(&image)?;

        let event = self.tracker.observe(&text, now);
        let mut action_succeeded = false;
        match &event {
            StabilityEvent::Absent => {}
            StabilityEvent::Changed(text) => {
                crate::log(&format!("Text CHANGED:\n{}", text));
            }
            StabilityEvent::Unchanged(_) => {}
            StabilityEvent::TimedOut(elapsed) => {
                crate::log("TIMEOUT TRIGGERED!");
                crate::log(&format!(
                    "  Text unchanged for {:.1} seconds",
                    elapsed.as_secs_f32()
                ));
                action_succeeded = self.action.fire();
            }
        }

        let phase = Phase::from_event(&event, self.tracker.timeout(), action_succeeded);
        let update = StatusUpdate::new(phase, &text, self.settings.text_limit, Arc::new(image));
        // A closed receiver only means nobody is watching
        let _ = self.status_tx.send(update);
        Ok(())
    }

    /// Ticks until `running` is cleared, then hands itself back.
    fn run(mut self, running: Arc<AtomicBool>) -> Self {
        while running.load(Ordering::SeqCst) {
            if let Err(e) = self.tick(Instant::now()) {
                crate::log(&format!("Monitoring error: {}. Tick skipped.", e));
            }
            sleep_while_running(&running, self.settings.tick_interval);
        }
        self
    }
}

/// Sleeps for `total`, returning early once `running` is cleared.
fn sleep_while_running(running: &AtomicBool, total: Duration) {
    let deadline = Instant::now() + total;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep((deadline - now).min(STOP_POLL_INTERVAL));
    }
}

/// Watches one region. Starts stopped.
pub struct MonitorLoop {
    region: Region,
    /// The worker while no thread owns it
    idle: Option<TickWorker>,
    /// Stop flag of the current run; `Some` while running
    running: Option<Arc<AtomicBool>>,
    /// The last spawned worker thread, joined before the next start
    handle: Option<JoinHandle<TickWorker>>,
}

impl MonitorLoop {
    /// Creates a monitor from explicit collaborators.
    ///
    /// Returns the monitor and the receiving end of its status channel.
    pub fn with_components(
        region: Region,
        capturer: Box<dyn RegionCapturer>,
        extractor: TextExtractor,
        action: Box<dyn RecoveryAction>,
        settings: MonitorSettings,
    ) -> Result<(Self, Receiver<StatusUpdate>), ConfigError> {
        if settings.tick_interval.is_zero() {
            return Err(ConfigError::InvalidTickInterval);
        }
        let tracker = StabilityTracker::new(settings.timeout)?;
        let (status_tx, status_rx) = channel();

        let worker = TickWorker {
            capturer,
            extractor,
            tracker,
            action,
            status_tx,
            settings,
        };

        Ok((
            Self {
                region,
                idle: Some(worker),
                running: None,
                handle: None,
            },
            status_rx,
        ))
    }

    /// Creates a monitor that captures the live desktop and reads it with Tesseract.
    pub fn for_screen(
        region: Region,
        config: &MonitorConfig,
        action: Box<dyn RecoveryAction>,
    ) -> Result<(Self, Receiver<StatusUpdate>), ConfigError> {
        let engine = TesseractEngine::locate(config.ocr.clone());
        Self::with_components(
            region,
            Box::new(ScreenCapturer::new(region)),
            TextExtractor::new(Box::new(engine)),
            action,
            MonitorSettings::from_config(config),
        )
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Returns true between `start` and `stop`, unless the worker died.
    pub fn is_running(&self) -> bool {
        self.running.is_some() && !self.worker_finished()
    }

    /// Returns true when `start` can run without waiting: not started, and
    /// any previous worker has already finished its last tick.
    pub fn can_start(&self) -> bool {
        self.running.is_none() && self.worker_finished()
    }

    /// Returns true when the worker ended while still started, i.e. it panicked.
    pub fn worker_died(&self) -> bool {
        self.running.is_some() && self.handle.is_some() && self.worker_finished()
    }

    fn worker_finished(&self) -> bool {
        self.handle
            .as_ref()
            .is_none_or(|handle| handle.is_finished())
    }

    /// Starts ticking on a background thread from a fresh, text-absent state.
    ///
    /// Rejected with `MonitorError::AlreadyRunning` while the worker is alive,
    /// and with `MonitorError::WorkerPanicked` once it has died.
    pub fn start(&mut self) -> Result<(), MonitorError> {
        if self.running.is_some() {
            if !self.worker_finished() {
                crate::log("Already monitoring");
                return Err(MonitorError::AlreadyRunning);
            }
            // Started, but the thread is gone without a stop request
            self.running = None;
        }

        let mut worker = self.reclaim_worker()?;
        worker.tracker.reset();

        crate::log("Starting monitoring...");
        crate::log(&format!("Zone: {}", self.region));
        crate::log(&format!(
            "Timeout: {} seconds of unchanged text",
            worker.settings.timeout.as_secs()
        ));

        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        self.handle = Some(thread::spawn(move || {
            let worker = worker.run(flag);
            crate::log("Monitor thread finished");
            worker
        }));
        self.running = Some(running);
        Ok(())
    }

    /// Asks the worker to stop after its current tick. Does nothing if stopped.
    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.store(false, Ordering::SeqCst);
            crate::log("Monitoring stopped");
        }
    }

    /// Takes the worker back from the previous thread (waiting for its
    /// in-flight tick) or from the idle slot.
    fn reclaim_worker(&mut self) -> Result<TickWorker, MonitorError> {
        if let Some(handle) = self.handle.take() {
            return handle.join().map_err(|_| {
                crate::log("Monitor thread panicked");
                MonitorError::WorkerPanicked
            });
        }
        self.idle.take().ok_or(MonitorError::WorkerPanicked)
    }
}

impl Drop for MonitorLoop {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
