//! wgpu renderers for the 2D draw stream.
//!
//! Geometry arrives in logical pixels; vertex shaders map to NDC from a
//! viewport uniform. Every renderer creates its GPU objects lazily on first
//! use and rebuilds its pipeline if the surface format changes.

mod ctx;
pub mod shapes;

pub use ctx::{RenderCtx, RenderTarget};
