//! Drag state of the region selector.

use super::coords::DisplayScale;
use crate::capture::Region;
use crate::error::ConfigError;

/// A rectangle being dragged on the scaled screenshot.
#[derive(Clone, Debug, Default)]
pub struct DragSelection {
    start: Option<(f32, f32)>,
    current: Option<(f32, f32)>,
}

impl DragSelection {
    /// Starts a new drag, discarding any previous rectangle.
    pub fn begin(&mut self, x: f32, y: f32) {
        self.start = Some((x, y));
        self.current = Some((x, y));
    }

    pub fn update(&mut self, x: f32, y: f32) {
        if self.start.is_some() {
            self.current = Some((x, y));
        }
    }

    pub fn clear(&mut self) {
        self.start = None;
        self.current = None;
    }

    /// Normalised rectangle in scaled coordinates: (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> Option<(f32, f32, f32, f32)> {
        let ((sx, sy), (cx, cy)) = (self.start?, self.current?);
        Some((sx.min(cx), sy.min(cy), sx.max(cx), sy.max(cy)))
    }

    /// Maps the dragged rectangle to a desktop region.
    ///
    /// Fails when nothing was dragged or the rectangle collapses to zero
    /// width or height on the desktop.
    pub fn to_region(&self, scale: &DisplayScale) -> Result<Region, ConfigError> {
        let (min_x, min_y, max_x, max_y) = self.rect().ok_or(ConfigError::MissingRegion)?;
        let (x1, y1) = scale.to_absolute(min_x, min_y);
        let (x2, y2) = scale.to_absolute(max_x, max_y);
        Region::new(x1, y1, x2, y2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_scale() -> DisplayScale {
        DisplayScale::fit_width(2160, 1440, 0, 0, 1080.0)
    }

    #[test]
    fn test_drag_in_any_direction_is_normalised() {
        let mut drag = DragSelection::default();
        drag.begin(300.0, 200.0);
        drag.update(100.0, 50.0);
        assert_eq!(drag.rect(), Some((100.0, 50.0, 300.0, 200.0)));

        let region = drag.to_region(&half_scale()).unwrap();
        assert_eq!(region.corners(), [200, 100, 600, 400]);
    }

    #[test]
    fn test_update_without_begin_is_ignored() {
        let mut drag = DragSelection::default();
        drag.update(10.0, 10.0);
        assert_eq!(drag.rect(), None);
        assert!(matches!(
            drag.to_region(&half_scale()),
            Err(ConfigError::MissingRegion)
        ));
    }

    #[test]
    fn test_click_without_drag_is_invalid() {
        let mut drag = DragSelection::default();
        drag.begin(40.0, 40.0);
        assert!(matches!(
            drag.to_region(&half_scale()),
            Err(ConfigError::InvalidRegion { .. })
        ));
    }

    #[test]
    fn test_clear_forgets_rectangle() {
        let mut drag = DragSelection::default();
        drag.begin(1.0, 1.0);
        drag.update(50.0, 50.0);
        drag.clear();
        assert_eq!(drag.rect(), None);
    }
}
