//! Screen capture for the monitored region.
//!
//! This module provides:
//! - The validated `Region` rectangle
//! - The `RegionCapturer` seam and the desktop `ScreenCapturer`
//! - Full primary-display capture for the region selector

pub mod region;
pub mod screen;

pub use region::Region;
pub use screen::{DisplayShot, RegionCapturer, ScreenCapturer, capture_primary_display};
