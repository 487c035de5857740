use std::borrow::Cow;

/// A vertex and a fragment WGSL program, compiled as separate modules.
/// Entry points are `vs_main` and `fs_main`.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    pub label:    Cow<'static, str>,
    pub vertex:   Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

impl ShaderProgram {
    pub const VERTEX_ENTRY: &'static str = "vs_main";
    pub const FRAGMENT_ENTRY: &'static str = "fs_main";

    pub fn new(
        label: impl Into<Cow<'static, str>>,
        vertex: impl Into<Cow<'static, str>>,
        fragment: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self { label: label.into(), vertex: vertex.into(), fragment: fragment.into() }
    }

    /// The built-in planet program.
    pub fn planet() -> Self {
        Self::new("planet", include_str!("shaders/fullscreen.wgsl"), include_str!("shaders/planet.wgsl"))
    }
}
