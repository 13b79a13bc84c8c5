//! The watched rectangle, in absolute display coordinates.

use std::fmt;

use crate::error::ConfigError;

/// A rectangle on the desktop. Always non-empty: `x1 < x2` and `y1 < y2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl Region {
    /// Creates a region from its top-left and bottom-right corners.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Result<Self, ConfigError> {
        if x1 >= x2 || y1 >= y2 {
            return Err(ConfigError::InvalidRegion { x1, y1, x2, y2 });
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    /// Creates a region from `[x1, y1, x2, y2]`, the config file layout.
    pub fn from_corners(corners: [i32; 4]) -> Result<Self, ConfigError> {
        let [x1, y1, x2, y2] = corners;
        Self::new(x1, y1, x2, y2)
    }

    /// Parses `"x1,y1,x2,y2"` (whitespace around numbers allowed).
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: "region".to_string(),
            value: value.to_string(),
        };

        let numbers = value
            .split(',')
            .map(|part| part.trim().parse::<i32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        let corners: [i32; 4] = numbers.try_into().map_err(|_| invalid())?;
        Self::from_corners(corners)
    }

    pub fn left(&self) -> i32 {
        self.x1
    }

    pub fn top(&self) -> i32 {
        self.y1
    }

    pub fn width(&self) -> u32 {
        self.x2.abs_diff(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.abs_diff(self.y1)
    }

    pub fn corners(&self) -> [i32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {}) {}x{}",
            self.x1,
            self.y1,
            self.x2,
            self.y2,
            self.width(),
            self.height()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_dimensions() {
        let region = Region::new(100, 50, 400, 250).unwrap();
        assert_eq!(region.width(), 300);
        assert_eq!(region.height(), 200);
        assert_eq!(region.corners(), [100, 50, 400, 250]);
    }

    #[test]
    fn test_region_rejects_empty_or_inverted() {
        assert!(Region::new(10, 10, 10, 20).is_err());
        assert!(Region::new(10, 10, 20, 10).is_err());
        assert!(Region::new(30, 10, 20, 40).is_err());
    }

    #[test]
    fn test_region_allows_negative_virtual_desktop_coords() {
        // Monitors left of the primary display have negative x
        let region = Region::new(-1920, 0, -1000, 300).unwrap();
        assert_eq!(region.width(), 920);
    }

    #[test]
    fn test_region_spanning_whole_i32_range() {
        let region = Region::new(i32::MIN, -1, i32::MAX, 1).unwrap();
        assert_eq!(region.width(), u32::MAX);
        assert_eq!(region.height(), 2);
    }

    #[test]
    fn test_region_parse() {
        let region = Region::parse("10, 20,110 ,220").unwrap();
        assert_eq!(region.corners(), [10, 20, 110, 220]);

        assert!(matches!(
            Region::parse("10,20,110"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            Region::parse("a,b,c,d"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            Region::parse("110,20,10,220"),
            Err(ConfigError::InvalidRegion { .. })
        ));
    }

    #[test]
    fn test_region_display() {
        let region = Region::new(0, 0, 640, 480).unwrap();
        assert_eq!(region.to_string(), "(0, 0, 640, 480) 640x480");
    }
}
