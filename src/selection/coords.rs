//! Coordinate conversion for the region selector.
//!
//! The selector shows the display screenshot scaled to a fixed width. Points
//! picked on the scaled image are mapped back to absolute desktop coordinates.

/// Width the display screenshot is scaled to in the selector.
pub const SELECTOR_WIDTH: f32 = 1080.0;

/// Mapping between the scaled screenshot and the desktop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayScale {
    origin_x: i32,
    origin_y: i32,
    ratio: f32,
    scaled_width: f32,
    scaled_height: f32,
}

impl DisplayScale {
    /// Scales an `orig_width`×`orig_height` screenshot whose top-left corner
    /// sits at (`origin_x`, `origin_y`) on the desktop to `target_width`,
    /// keeping the aspect ratio.
    pub fn fit_width(
        orig_width: u32,
        orig_height: u32,
        origin_x: i32,
        origin_y: i32,
        target_width: f32,
    ) -> Self {
        let ratio = if orig_width == 0 {
            1.0
        } else {
            target_width / orig_width as f32
        };
        Self {
            origin_x,
            origin_y,
            ratio,
            scaled_width: orig_width as f32 * ratio,
            scaled_height: (orig_height as f32 * ratio).floor(),
        }
    }

    /// Size of the scaled screenshot (width, height).
    pub fn scaled_size(&self) -> (f32, f32) {
        (self.scaled_width, self.scaled_height)
    }

    /// Clamps a point to the scaled screenshot.
    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        (x.clamp(0.0, self.scaled_width), y.clamp(0.0, self.scaled_height))
    }

    /// Converts a point on the scaled screenshot to absolute desktop coordinates.
    pub fn to_absolute(&self, x: f32, y: f32) -> (i32, i32) {
        // Truncation matches how pixels are addressed on the full-size image
        (
            (x / self.ratio) as i32 + self.origin_x,
            (y / self.ratio) as i32 + self.origin_y,
        )
    }
}
