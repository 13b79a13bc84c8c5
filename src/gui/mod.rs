//! GUI module for the application.
//!
//! Two screens in one eframe window: the region selector (shown when no region
//! is configured) and the monitor. Closing the window during selection exits
//! without monitoring.

pub mod render;
pub mod state;

use std::sync::mpsc::{Receiver, channel};
use std::thread;
use std::time::Duration;

use eframe::egui::{self, TextureHandle, Vec2, ViewportCommand};
use image::RgbaImage;

use crate::capture::{DisplayShot, Region, capture_primary_display};
use crate::error::CaptureError;
use crate::monitor::{MonitorConfig, MonitorLoop, ScriptAction, StatusUpdate};

use state::{MonitorDisplay, SelectorState};

/// Time given to the window to minimise before the desktop is captured again.
const RELOAD_DELAY: Duration = Duration::from_millis(400);

/// Repaint interval while monitoring.
const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

/// Selector screen with its screenshot texture.
struct SelectorScreen {
    state: SelectorState,
    texture: Option<TextureHandle>,
    /// Screenshot being taken in the background after "Reload"
    pending_shot: Option<Receiver<Result<DisplayShot, CaptureError>>>,
}

/// Monitor screen with the running loop and its status channel.
struct MonitorScreen {
    monitor: MonitorLoop,
    status_rx: Receiver<StatusUpdate>,
    display: MonitorDisplay,
    preview: Option<TextureHandle>,
}

enum Screen {
    Selecting(SelectorScreen),
    Monitoring(MonitorScreen),
    /// Setup failed after selection; the message is shown until the window closes
    Failed(String),
}

/// Main GUI application struct.
pub struct GuiApp {
    config: MonitorConfig,
    action: ScriptAction,
    screen: Screen,
}

impl GuiApp {
    /// Starts on the monitor screen when `region` is known, on the selector otherwise.
    fn new(config: MonitorConfig, action: ScriptAction, region: Option<Region>) -> Self {
        let screen = match region {
            Some(region) => Self::monitor_screen(&config, &action, region),
            None => {
                let mut state = SelectorState::default();
                match capture_primary_display() {
                    Ok(shot) => state.set_shot(shot),
                    Err(e) => {
                        crate::log(&format!("Failed to capture screenshot: {}", e));
                        state.error = Some(e.to_string());
                    }
                }
                Screen::Selecting(SelectorScreen {
                    state,
                    texture: None,
                    pending_shot: None,
                })
            }
        };
        Self {
            config,
            action,
            screen,
        }
    }

    fn monitor_screen(config: &MonitorConfig, action: &ScriptAction, region: Region) -> Screen {
        match MonitorLoop::for_screen(region, config, Box::new(action.clone())) {
            Ok((monitor, status_rx)) => Screen::Monitoring(MonitorScreen {
                monitor,
                status_rx,
                display: MonitorDisplay::default(),
                preview: None,
            }),
            Err(e) => {
                crate::log(&format!("Cannot create monitor: {}", e));
                Screen::Failed(e.to_string())
            }
        }
    }

    fn update_selector(&mut self, ctx: &egui::Context) {
        let Screen::Selecting(selector) = &mut self.screen else {
            return;
        };

        // Pick up a screenshot taken after "Reload"
        if let Some(rx) = &selector.pending_shot {
            match rx.try_recv() {
                Ok(Ok(shot)) => {
                    crate::log("Screenshot reloaded");
                    selector.state.set_shot(shot);
                    selector.pending_shot = None;
                }
                Ok(Err(e)) => {
                    crate::log(&format!("Failed to reload screenshot: {}", e));
                    selector.state.error = Some(e.to_string());
                    selector.pending_shot = None;
                }
                Err(_) => ctx.request_repaint_after(REPAINT_INTERVAL),
            }
        }

        if selector.state.shot_changed {
            selector.texture = selector
                .state
                .shot
                .as_ref()
                .map(|(shot, _)| load_texture(ctx, "display_shot", &shot.image));
            selector.state.shot_changed = false;
            if let Some(scale) = selector.state.scale() {
                let (width, height) = scale.scaled_size();
                ctx.send_viewport_cmd(ViewportCommand::InnerSize(Vec2::new(
                    width + 16.0,
                    height + 80.0,
                )));
            }
        }

        let mut reload_clicked = false;
        let mut next_clicked = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            (reload_clicked, next_clicked) = render::render_selector_toolbar(ui, &selector.state);
            ui.add_space(4.0);
            egui::ScrollArea::both().show(ui, |ui| {
                render::render_selector_canvas(ui, &mut selector.state, selector.texture.as_ref());
            });
        });

        if reload_clicked && selector.pending_shot.is_none() {
            selector.pending_shot = Some(reload_screenshot(ctx));
        }
        if next_clicked {
            if let Some(region) = selector.state.confirm() {
                crate::log(&format!("Zone selected: {}", region));
                self.screen = Self::monitor_screen(&self.config, &self.action, region);
                ctx.send_viewport_cmd(ViewportCommand::InnerSize(Vec2::new(900.0, 600.0)));
                ctx.send_viewport_cmd(ViewportCommand::Title(
                    "Screen Zone Monitor - Text Change Detector".to_string(),
                ));
            }
        }
    }

    fn update_monitor(&mut self, ctx: &egui::Context) {
        let Screen::Monitoring(screen) = &mut self.screen else {
            return;
        };

        // Drain snapshots; only the newest is shown
        while let Ok(update) = screen.status_rx.try_recv() {
            screen.display.apply(update);
        }
        screen.display.sync_worker(
            screen.monitor.is_running(),
            screen.monitor.can_start(),
            screen.monitor.worker_died(),
        );

        if screen.display.preview_changed {
            if let Some(update) = &screen.display.last {
                screen.preview = Some(load_texture(ctx, "zone_preview", &update.preview));
            }
            screen.display.preview_changed = false;
        }

        let mut start_clicked = false;
        let mut stop_clicked = false;
        let region = screen.monitor.region();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Screen Zone Monitor");
            ui.add_space(8.0);
            render::render_status(ui, &screen.display, region);
            render::render_preview(ui, &screen.display, screen.preview.as_ref());
            (start_clicked, stop_clicked) = render::render_controls(ui, &screen.display);
        });

        if start_clicked {
            match screen.monitor.start() {
                Ok(()) => {
                    screen.display.running = true;
                    screen.display.can_start = false;
                    screen.display.error = None;
                }
                Err(e) => {
                    crate::log(&format!("GUI: Failed to start monitoring: {}", e));
                    screen.display.error = Some(e.to_string());
                }
            }
        }
        if stop_clicked {
            screen.monitor.stop();
            screen.display.running = false;
        }

        // Also poll while a stopped worker finishes its last tick
        let draining = !screen.display.can_start && screen.display.error.is_none();
        if screen.display.running || draining {
            ctx.request_repaint_after(REPAINT_INTERVAL);
        }
    }
}

impl eframe::App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested())
            && matches!(self.screen, Screen::Selecting(_))
        {
            crate::log("No zone selected. Exiting.");
        }

        if let Screen::Failed(message) = &self.screen {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.heading("Screen Zone Monitor");
                ui.label(
                    egui::RichText::new(message.as_str()).color(egui::Color32::from_rgb(200, 0, 0)),
                );
            });
            return;
        }

        if matches!(self.screen, Screen::Selecting(_)) {
            self.update_selector(ctx);
        } else {
            self.update_monitor(ctx);
        }
    }
}

/// Minimises the window, captures the desktop on a helper thread, then
/// restores the window. The result arrives on the returned channel.
fn reload_screenshot(ctx: &egui::Context) -> Receiver<Result<DisplayShot, CaptureError>> {
    crate::log("Reloading screenshot...");
    ctx.send_viewport_cmd(ViewportCommand::Minimized(true));

    let (tx, rx) = channel();
    let ctx = ctx.clone();
    thread::spawn(move || {
        thread::sleep(RELOAD_DELAY);
        let _ = tx.send(capture_primary_display());
        ctx.send_viewport_cmd(ViewportCommand::Minimized(false));
        ctx.send_viewport_cmd(ViewportCommand::Focus);
        ctx.request_repaint();
    });
    rx
}

/// Uploads an RGBA image as a texture.
fn load_texture(ctx: &egui::Context, name: &str, image: &RgbaImage) -> TextureHandle {
    let size = [image.width() as usize, image.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
    ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR)
}

/// Run the GUI application.
/// This function blocks until the window is closed.
pub fn run_gui(
    config: MonitorConfig,
    action: ScriptAction,
    region: Option<Region>,
) -> eframe::Result<()> {
    let title = if region.is_some() {
        "Screen Zone Monitor - Text Change Detector"
    } else {
        "Screen Zone Selector - Draw Zone to Monitor"
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(Vec2::new(900.0, 600.0))
            .with_min_inner_size(Vec2::new(400.0, 300.0))
            .with_title(title)
            .with_drag_and_drop(false),
        ..Default::default()
    };

    eframe::run_native(
        "Screen Zone Monitor",
        options,
        Box::new(move |_cc| {
            crate::log("GUI: Creating GuiApp instance...");
            Ok(Box::new(GuiApp::new(config, action, region)))
        }),
    )
}
