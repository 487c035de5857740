//! Terra planet: the uniform record the planet shader reads, the noise
//! volume it samples, the renderer that draws it and the startup pipeline
//! that wires all of it to the control pane.

pub mod binder;
pub mod controls;
pub mod error;
pub mod monitor;
pub mod noise;
pub mod renderer;
pub mod shader;
pub mod startup;
pub mod uniforms;

pub use binder::{bind, RenderBinding, RenderScale, UniformHandle};
pub use error::StartupError;
pub use monitor::FrameMonitor;
pub use noise::{GeneratedNoise, NoiseFile, NoiseSource, NoiseVolume, TextureLoadError};
pub use renderer::PlanetRenderer;
pub use shader::ShaderProgram;
pub use startup::{start, Canvas, Session, Startup, StartupEvent};
pub use uniforms::{PlanetUniformBlock, PlanetUniforms, Quality, UniformField, UniformValue};
