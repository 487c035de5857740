//! Terra engine crate.
//!
//! Window runtime, GPU device/surface, input, frame timing and the small 2D
//! draw stream (rects + text) that the control panel is painted with.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod scene;
pub mod text;
