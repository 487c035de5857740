use thiserror::Error;

use crate::noise::TextureLoadError;

/// Why the viewer could not start. Any of these halts startup at the stage
/// that produced it.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("noise texture failed to load: {0}")]
    TextureLoadFailed(#[from] TextureLoadError),
    #[error("shader `{label}` failed to compile: {message}")]
    ShaderCompileFailed { label: String, message: String },
}

impl StartupError {
    /// One-word stage name for titles and logs.
    pub fn stage(&self) -> &'static str {
        match self {
            StartupError::ContextUnavailable(_) => "context",
            StartupError::TextureLoadFailed(_) => "texture",
            StartupError::ShaderCompileFailed { .. } => "shader",
        }
    }
}
