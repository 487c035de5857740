//! The startup sequence as a typestate pipeline.
//!
//! Each stage consumes the previous one, so the order (context, texture,
//! binding, reveal, panel, control groups) cannot be rearranged, and an
//! error at any stage leaves nothing later to call.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use terra_ui::pane::Pane;

use crate::binder::{bind, RenderBinding, UniformHandle};
use crate::controls::{
    add_light_controls, add_monitor, add_planet_controls, add_quality_control, add_rotation_controls, CanvasDrag,
};
use crate::error::StartupError;
use crate::monitor::FrameMonitor;
use crate::noise::{NoiseSource, NoiseVolume};
use crate::shader::ShaderProgram;
use crate::uniforms::PlanetUniforms;

pub const PANEL_TITLE: &str = "Controls";

/// The drawing surface as startup sees it.
pub trait Canvas {
    fn acquire_context(&mut self) -> Result<(), StartupError>;

    fn upload_noise(&mut self, volume: &NoiseVolume) -> Result<(), StartupError>;

    fn compile(&mut self, program: &ShaderProgram) -> Result<(), StartupError>;

    /// Makes the canvas visible. Called once, after binding succeeded.
    fn reveal(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupEvent {
    Acquired,
    TextureLoaded,
    Bound,
    Revealed,
    PanelBuilt,
    GroupAttached(&'static str),
}

impl fmt::Display for StartupEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupEvent::Acquired => f.write_str("graphics context acquired"),
            StartupEvent::TextureLoaded => f.write_str("noise texture loaded"),
            StartupEvent::Bound => f.write_str("renderer bound"),
            StartupEvent::Revealed => f.write_str("canvas revealed"),
            StartupEvent::PanelBuilt => f.write_str("panel built"),
            StartupEvent::GroupAttached(name) => write!(f, "{name} controls attached"),
        }
    }
}

pub struct Acquired;
pub struct TextureReady;

pub struct Bound {
    uniforms: UniformHandle,
    binding:  RenderBinding,
}

pub struct Revealed {
    uniforms: UniformHandle,
    binding:  RenderBinding,
}

/// What control groups register against.
pub struct PanelReady {
    pub uniforms: UniformHandle,
    pub binding:  RenderBinding,
    pub pane:     Pane<PlanetUniforms>,
    /// Set by the rotation group.
    pub drag:     Option<CanvasDrag>,
    pub monitor:  Rc<RefCell<FrameMonitor>>,
}

/// A startup in progress, at stage `S`.
pub struct Startup<S> {
    stage: S,
    trace: Vec<StartupEvent>,
}

impl<S> Startup<S> {
    pub fn trace(&self) -> &[StartupEvent] {
        &self.trace
    }

    fn advance<T>(mut self, stage: T, event: StartupEvent) -> Startup<T> {
        log::info!("startup: {event}");
        self.trace.push(event);
        Startup { stage, trace: self.trace }
    }
}

impl Startup<Acquired> {
    pub fn acquire(canvas: &mut impl Canvas) -> Result<Self, StartupError> {
        canvas.acquire_context()?;
        let empty = Startup { stage: (), trace: Vec::new() };
        Ok(empty.advance(Acquired, StartupEvent::Acquired))
    }

    pub fn load_texture(
        self,
        canvas: &mut impl Canvas,
        source: &dyn NoiseSource,
    ) -> Result<Startup<TextureReady>, StartupError> {
        log::info!("loading noise: {}", source.describe());
        let volume = source.load()?;
        canvas.upload_noise(&volume)?;
        Ok(self.advance(TextureReady, StartupEvent::TextureLoaded))
    }
}

impl Startup<TextureReady> {
    pub fn bind(
        self,
        canvas: &mut impl Canvas,
        program: &ShaderProgram,
        defaults: PlanetUniforms,
    ) -> Result<Startup<Bound>, StartupError> {
        canvas.compile(program)?;
        let (uniforms, binding) = bind(defaults);
        Ok(self.advance(Bound { uniforms, binding }, StartupEvent::Bound))
    }
}

impl Startup<Bound> {
    pub fn uniforms(&self) -> &UniformHandle {
        &self.stage.uniforms
    }

    pub fn reveal(self, canvas: &mut impl Canvas) -> Startup<Revealed> {
        canvas.reveal();
        let Bound { uniforms, binding } = self.stage;
        let next = Revealed { uniforms, binding };
        Startup { stage: (), trace: self.trace }.advance(next, StartupEvent::Revealed)
    }
}

impl Startup<Revealed> {
    pub fn build_panel(self, title: &str) -> Startup<PanelReady> {
        let Revealed { uniforms, binding } = self.stage;
        let pane = Pane::new(title, uniforms.shared());
        let next = PanelReady {
            uniforms,
            binding,
            pane,
            drag: None,
            monitor: Rc::new(RefCell::new(FrameMonitor::default())),
        };
        Startup { stage: (), trace: self.trace }.advance(next, StartupEvent::PanelBuilt)
    }
}

impl Startup<PanelReady> {
    pub fn pane(&self) -> &Pane<PlanetUniforms> {
        &self.stage.pane
    }

    /// Runs `register` against the pane and records `name` as attached.
    pub fn attach(mut self, name: &'static str, register: impl FnOnce(&mut PanelReady)) -> Self {
        register(&mut self.stage);
        let stage = self.stage;
        Startup { stage: (), trace: self.trace }.advance(stage, StartupEvent::GroupAttached(name))
    }

    /// The five standard groups, in panel order.
    pub fn attach_standard_groups(self) -> Self {
        self.attach("quality", |s| add_quality_control(&mut s.pane, &s.uniforms, s.binding.render_scale()))
            .attach("rotation", |s| s.drag = Some(add_rotation_controls(&mut s.pane, &s.uniforms)))
            .attach("planet", |s| add_planet_controls(&mut s.pane, &s.uniforms))
            .attach("light", |s| add_light_controls(&mut s.pane, &s.uniforms))
            .attach("monitor", |s| add_monitor(&mut s.pane, &s.monitor))
    }

    pub fn finish(self) -> Session {
        let PanelReady { uniforms, binding, pane, drag, monitor } = self.stage;
        Session {
            drag: drag.unwrap_or_else(|| CanvasDrag::new(uniforms.clone())),
            uniforms,
            binding,
            pane,
            monitor,
            trace: self.trace,
        }
    }
}

/// Everything a running viewer needs, produced by a completed startup.
pub struct Session {
    pub uniforms: UniformHandle,
    pub binding:  RenderBinding,
    pub pane:     Pane<PlanetUniforms>,
    pub drag:     CanvasDrag,
    pub monitor:  Rc<RefCell<FrameMonitor>>,
    pub trace:    Vec<StartupEvent>,
}

/// Runs the whole startup against `canvas`.
pub fn start(
    canvas: &mut impl Canvas,
    source: &dyn NoiseSource,
    program: &ShaderProgram,
    defaults: PlanetUniforms,
) -> Result<Session, StartupError> {
    let session = Startup::acquire(canvas)?
        .load_texture(canvas, source)?
        .bind(canvas, program, defaults)?
        .reveal(canvas)
        .build_panel(PANEL_TITLE)
        .attach_standard_groups()
        .finish();
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::TextureLoadError;

    #[derive(Default)]
    struct FakeCanvas {
        calls:          Vec<&'static str>,
        refuse_context: bool,
        refuse_compile: bool,
    }

    impl Canvas for FakeCanvas {
        fn acquire_context(&mut self) -> Result<(), StartupError> {
            self.calls.push("acquire");
            if self.refuse_context {
                return Err(StartupError::ContextUnavailable("no adapter".into()));
            }
            Ok(())
        }

        fn upload_noise(&mut self, _volume: &NoiseVolume) -> Result<(), StartupError> {
            self.calls.push("upload");
            Ok(())
        }

        fn compile(&mut self, _program: &ShaderProgram) -> Result<(), StartupError> {
            self.calls.push("compile");
            if self.refuse_compile {
                return Err(StartupError::ShaderCompileFailed {
                    label:   "planet fragment".into(),
                    message: "1:1: expected identifier".into(),
                });
            }
            Ok(())
        }

        fn reveal(&mut self) {
            self.calls.push("reveal");
        }
    }

    struct Fixed(Result<Vec<u8>, ()>);

    impl NoiseSource for Fixed {
        fn describe(&self) -> String {
            "fixed".into()
        }

        fn load(&self) -> Result<NoiseVolume, TextureLoadError> {
            match &self.0 {
                Ok(bytes) => NoiseVolume::from_raw(bytes.clone()),
                Err(()) => Err(TextureLoadError::Empty),
            }
        }
    }

    fn cube() -> Fixed {
        Fixed(Ok(vec![128; 8]))
    }

    #[test]
    fn full_startup_runs_stages_in_order() {
        let mut canvas = FakeCanvas::default();
        let session = start(&mut canvas, &cube(), &ShaderProgram::planet(), PlanetUniforms::default()).unwrap();

        assert_eq!(canvas.calls, vec!["acquire", "upload", "compile", "reveal"]);
        assert_eq!(session.trace, vec![
            StartupEvent::Acquired,
            StartupEvent::TextureLoaded,
            StartupEvent::Bound,
            StartupEvent::Revealed,
            StartupEvent::PanelBuilt,
            StartupEvent::GroupAttached("quality"),
            StartupEvent::GroupAttached("rotation"),
            StartupEvent::GroupAttached("planet"),
            StartupEvent::GroupAttached("light"),
            StartupEvent::GroupAttached("monitor"),
        ]);
        assert_eq!(session.pane.title(), "Controls");
    }

    #[test]
    fn reveal_precedes_panel_precedes_groups() {
        let mut canvas = FakeCanvas::default();
        let trace = start(&mut canvas, &cube(), &ShaderProgram::planet(), PlanetUniforms::default()).unwrap().trace;

        let pos = |e: &StartupEvent| trace.iter().position(|t| t == e).unwrap();
        let panel = pos(&StartupEvent::PanelBuilt);
        assert!(pos(&StartupEvent::Revealed) < panel);
        for (i, e) in trace.iter().enumerate() {
            if matches!(e, StartupEvent::GroupAttached(_)) {
                assert!(i > panel);
            }
        }
    }

    #[test]
    fn session_starts_from_the_defaults() {
        let mut canvas = FakeCanvas::default();
        let session = start(&mut canvas, &cube(), &ShaderProgram::planet(), PlanetUniforms::default()).unwrap();
        assert_eq!(session.uniforms.snapshot(), PlanetUniforms::default());
        assert_eq!(session.binding.uniforms().snapshot(), PlanetUniforms::default());
    }

    #[test]
    fn texture_failure_halts_before_binding() {
        let mut canvas = FakeCanvas::default();
        let result = start(&mut canvas, &Fixed(Err(())), &ShaderProgram::planet(), PlanetUniforms::default());

        assert!(matches!(result, Err(StartupError::TextureLoadFailed(TextureLoadError::Empty))));
        assert_eq!(canvas.calls, vec!["acquire"]);
    }

    #[test]
    fn shader_failure_halts_before_reveal_and_panel() {
        let mut canvas = FakeCanvas { refuse_compile: true, ..FakeCanvas::default() };
        let result = start(&mut canvas, &cube(), &ShaderProgram::planet(), PlanetUniforms::default());
        assert!(matches!(result, Err(StartupError::ShaderCompileFailed { .. })));
        assert_eq!(canvas.calls, vec!["acquire", "upload", "compile"]);

        let mut canvas = FakeCanvas { refuse_compile: true, ..FakeCanvas::default() };
        let loaded = Startup::acquire(&mut canvas).unwrap().load_texture(&mut canvas, &cube()).unwrap();
        assert_eq!(loaded.trace().last(), Some(&StartupEvent::TextureLoaded));
        let err = loaded.bind(&mut canvas, &ShaderProgram::planet(), PlanetUniforms::default()).err().unwrap();
        assert_eq!(err.stage(), "shader");
        assert!(!canvas.calls.contains(&"reveal"));
    }

    #[test]
    fn context_failure_halts_everything() {
        let mut canvas = FakeCanvas { refuse_context: true, ..FakeCanvas::default() };
        let result = start(&mut canvas, &cube(), &ShaderProgram::planet(), PlanetUniforms::default());
        assert!(matches!(result, Err(StartupError::ContextUnavailable(_))));
        assert_eq!(canvas.calls, vec!["acquire"]);
    }

    #[test]
    fn stages_can_be_driven_one_by_one() {
        let mut canvas = FakeCanvas::default();
        let bound = Startup::acquire(&mut canvas)
            .unwrap()
            .load_texture(&mut canvas, &cube())
            .unwrap()
            .bind(&mut canvas, &ShaderProgram::planet(), PlanetUniforms::default())
            .unwrap();
        assert_eq!(bound.trace().len(), 3);
        bound.uniforms().update(|u| u.clouds_density = 0.9);

        let panel = bound.reveal(&mut canvas).build_panel("Custom").attach("planet", |s| {
            add_planet_controls(&mut s.pane, &s.uniforms)
        });
        assert_eq!(panel.pane().title(), "Custom");
        assert_eq!(panel.pane().folder_titles(), vec!["Planet"]);

        let session = panel.finish();
        assert_eq!(session.uniforms.snapshot().clouds_density, 0.9);
    }
}
