//! GUI rendering functions.
//!
//! Contains UI layout and component rendering logic.

use eframe::egui::{self, Color32, RichText, Sense, Stroke, TextureHandle, Vec2};

use super::state::{MonitorDisplay, SelectorState, StatusTone};
use crate::capture::Region;

/// Largest size the region preview is drawn at.
const PREVIEW_MAX: Vec2 = Vec2::new(860.0, 300.0);

/// Render the selector toolbar. Returns (reload_clicked, next_clicked).
pub fn render_selector_toolbar(ui: &mut egui::Ui, state: &SelectorState) -> (bool, bool) {
    let mut reload_clicked = false;
    let mut next_clicked = false;

    ui.horizontal(|ui| {
        ui.label("Click and drag to select zone, then press 'Next'");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .button(RichText::new("Next").strong().color(Color32::from_rgb(0, 150, 0)))
                .clicked()
            {
                next_clicked = true;
            }
            if ui
                .button(RichText::new("Reload screenshot").strong())
                .clicked()
            {
                reload_clicked = true;
            }
        });
    });

    if let Some(error) = &state.error {
        ui.label(RichText::new(error).color(Color32::from_rgb(200, 0, 0)));
    }

    (reload_clicked, next_clicked)
}

/// Render the scaled screenshot and handle dragging on it.
pub fn render_selector_canvas(
    ui: &mut egui::Ui,
    state: &mut SelectorState,
    texture: Option<&TextureHandle>,
) {
    let (Some(texture), Some(scale)) = (texture, state.scale().copied()) else {
        ui.label("No screenshot available.");
        return;
    };

    let (width, height) = scale.scaled_size();
    let response = ui.add(
        egui::Image::new((texture.id(), Vec2::new(width, height))).sense(Sense::click_and_drag()),
    );
    let origin = response.rect.min;

    if let Some(pos) = response.interact_pointer_pos() {
        let (x, y) = scale.clamp(pos.x - origin.x, pos.y - origin.y);
        if response.drag_started() {
            state.drag.begin(x, y);
        } else if response.dragged() || response.drag_stopped() {
            state.drag.update(x, y);
        }
    }

    if let Some((min_x, min_y, max_x, max_y)) = state.drag.rect() {
        let rect = egui::Rect::from_min_max(
            origin + Vec2::new(min_x, min_y),
            origin + Vec2::new(max_x, max_y),
        );
        ui.painter()
            .rect_stroke(rect, 0.0, Stroke::new(2.0, Color32::RED));
    }
}

/// Render the status line, countdown and region info.
pub fn render_status(ui: &mut egui::Ui, display: &MonitorDisplay, region: Region) {
    let color = match display.tone() {
        StatusTone::Idle => Color32::GRAY,
        StatusTone::Normal => Color32::from_rgb(0, 120, 200),
        StatusTone::Warning => Color32::from_rgb(200, 150, 0),
        StatusTone::Alert => Color32::from_rgb(200, 0, 0),
    };
    ui.label(RichText::new(display.status_text()).size(14.0).color(color));

    ui.add_space(4.0);
    ui.add(egui::ProgressBar::new(display.progress()).desired_height(8.0));

    ui.add_space(4.0);
    ui.label(RichText::new(format!("Zone: {}", region)).small());
    if let Some(update) = &display.last {
        ui.label(
            RichText::new(format!(
                "Last sample: {}",
                update.captured_at.format("%H:%M:%S")
            ))
            .small(),
        );
    }
}

/// Render the region preview and the detected text.
pub fn render_preview(
    ui: &mut egui::Ui,
    display: &MonitorDisplay,
    preview: Option<&TextureHandle>,
) {
    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);

    if let Some(texture) = preview {
        let size = fit_within(texture.size_vec2(), PREVIEW_MAX);
        ui.image((texture.id(), size));
    } else {
        let (rect, _response) = ui.allocate_exact_size(Vec2::new(PREVIEW_MAX.x, 120.0), Sense::hover());
        ui.painter().rect_filled(rect, 4.0, Color32::from_gray(40));
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "Zone preview",
            egui::FontId::proportional(16.0),
            Color32::from_gray(140),
        );
    }

    ui.add_space(8.0);
    egui::ScrollArea::vertical()
        .max_height(120.0)
        .show(ui, |ui| {
            ui.label(RichText::new(display.detected_text()).monospace());
        });
}

/// Render the Start/Stop buttons. Returns (start_clicked, stop_clicked).
pub fn render_controls(ui: &mut egui::Ui, display: &MonitorDisplay) -> (bool, bool) {
    let mut start_clicked = false;
    let mut stop_clicked = false;

    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        // Start button - disabled until the previous worker has exited
        ui.add_enabled_ui(display.can_start, |ui| {
            if ui
                .button(RichText::new("▶ Start Monitoring").size(16.0))
                .clicked()
            {
                start_clicked = true;
            }
        });

        ui.add_space(20.0);

        // Stop button - enabled only while running
        ui.add_enabled_ui(display.running, |ui| {
            if ui
                .button(RichText::new("◼ Stop Monitoring").size(16.0))
                .clicked()
            {
                stop_clicked = true;
            }
        });
    });

    (start_clicked, stop_clicked)
}

/// Scales `size` down to fit inside `max`, keeping the aspect ratio.
fn fit_within(size: Vec2, max: Vec2) -> Vec2 {
    if size.x <= 0.0 || size.y <= 0.0 {
        return size;
    }
    let factor = (max.x / size.x).min(max.y / size.y).min(1.0);
    size * factor
}
