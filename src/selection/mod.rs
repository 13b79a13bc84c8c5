//! Interactive region selection.
//!
//! The user drags a rectangle over a scaled screenshot of the primary display;
//! the rectangle is mapped back to the desktop region that gets monitored.

pub mod coords;
pub mod state;

pub use coords::{DisplayScale, SELECTOR_WIDTH};
pub use state::DragSelection;
