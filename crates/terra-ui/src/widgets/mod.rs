//! Widgets the control pane is assembled from.

pub mod choice;
pub mod column;
pub mod folder;
pub mod graph;
pub mod label;
pub mod panel;
pub mod property;
pub mod slider;
pub mod swatch;
