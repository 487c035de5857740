//! Colour model shared by the UI and the 2D renderers.

pub mod color;

pub use color::Color;
