use terra_engine::core::{App, AppControl, FrameCtx, WindowCtx};
use terra_engine::input::{Key, MouseButton};
use terra_engine::paint::Color;
use terra_engine::render::shapes::{RectRenderer, TextRenderer};
use terra_engine::window::CursorIcon;
use terra_planet::{
    PlanetRenderer, PlanetUniforms, RenderScale, Session, ShaderProgram, StartupError, UniformField,
    UniformHandle,
};
use terra_ui::prelude::*;

use crate::canvas::GpuCanvas;
use crate::config::StudioConfig;
use crate::fonts;

const PANE_WIDTH: f32 = 300.0;
const PANE_MARGIN: f32 = 12.0;
/// Seconds the planet takes to fade in after the canvas is revealed.
const FADE_IN: f32 = 0.8;

const BACKGROUND: Color = Color::BLACK;
const FAILED_BACKGROUND: Color = Color::from_premul(0.18, 0.02, 0.03, 1.0);

enum Phase {
    /// No GPU context yet; startup runs on the first frame.
    Starting,
    Running {
        session:     Session,
        revealed_at: Option<f32>,
    },
    Failed {
        message: String,
    },
}

pub struct PlanetApp {
    config:       StudioConfig,
    phase:        Phase,
    theme:        Theme,
    scene:        UiScene,
    planet:       PlanetRenderer,
    rects:        RectRenderer,
    texts:        TextRenderer,
    paused_speed: Option<f32>,
    last_pointer: Option<Vec2>,
}

impl PlanetApp {
    pub fn new(config: StudioConfig) -> Self {
        let mut scene = UiScene::new();
        let mut theme = Theme::default();
        match fonts::system_font() {
            Some((path, bytes)) => match scene.load_font(&bytes) {
                Ok(id) => {
                    log::debug!("font {path}");
                    theme = theme.with_font(id);
                }
                Err(err) => log::warn!("font {path} rejected: {err}"),
            },
            None => log::warn!("no system font found; the control pane will have no text"),
        }

        Self {
            config,
            phase: Phase::Starting,
            theme,
            scene,
            planet: PlanetRenderer::new(),
            rects: RectRenderer::new(),
            texts: TextRenderer::new(),
            paused_speed: None,
            last_pointer: None,
        }
    }

    fn start(&mut self, ctx: &FrameCtx<'_, '_>) {
        let (w, h) = ctx.window.physical_size();
        let mut canvas = GpuCanvas::new(&*ctx.gpu, &mut self.planet);
        let result = run_startup(&self.config, &mut canvas, [w as f32, h as f32]);
        let revealed_at = canvas.revealed().then_some(ctx.time.elapsed);
        self.settle(result, revealed_at, &ctx.window);
    }

    fn settle(&mut self, result: Result<Session, StartupError>, revealed_at: Option<f32>, window: &WindowCtx<'_>) {
        match result {
            Ok(session) => {
                for event in &session.trace {
                    log::debug!("startup: {event}");
                }
                self.phase = Phase::Running { session, revealed_at };
            }
            Err(err) => {
                log::error!("startup failed at {} stage: {err}", err.stage());
                window.set_title(&format!("{} ({err})", self.config.title));
                self.phase = Phase::Failed { message: err.to_string() };
            }
        }
    }
}

fn run_startup(config: &StudioConfig, canvas: &mut GpuCanvas<'_>, resolution: [f32; 2]) -> Result<Session, StartupError> {
    let source = config.noise_source();
    log::info!("starting with noise from {}", source.describe());
    let defaults = PlanetUniforms::with_resolution(resolution[0], resolution[1]);
    terra_planet::start(canvas, source.as_ref(), &ShaderProgram::planet(), defaults)
}

impl App for PlanetApp {
    fn on_gpu_unavailable(&mut self, window: &WindowCtx<'_>, err: &anyhow::Error) {
        let (w, h) = window.physical_size();
        let mut canvas = GpuCanvas::unavailable(format!("{err:#}"), &mut self.planet);
        let result = run_startup(&self.config, &mut canvas, [w as f32, h as f32]);
        self.settle(result, None, window);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }
        if matches!(self.phase, Phase::Starting) {
            self.start(ctx);
        }

        let (w, h) = ctx.window.logical_size();
        let viewport = Vec2::new(w, h);
        self.scene.scale = ctx.window.scale_factor();
        let input = UiInput {
            mouse_pos:  ctx.input.pointer_pos.map(|(x, y)| Vec2::new(x, y)),
            mouse_down: ctx.input.button_down(MouseButton::Left),
        };

        // ── Update + UI ───────────────────────────────────────────────────
        let mut clear = BACKGROUND;
        let frame = match &self.phase {
            Phase::Starting => None,
            Phase::Failed { message } => {
                clear = FAILED_BACKGROUND;
                self.scene.frame(failure_element(&self.theme, message), viewport, Placement::Fill, &input);
                None
            }
            Phase::Running { session, revealed_at } => {
                if ctx.input_frame.key_pressed(Key::Space) {
                    toggle_pause(session, &mut self.paused_speed);
                }
                if ctx.input_frame.key_pressed(Key::H) {
                    session.pane.set_collapsed(!session.pane.is_collapsed());
                }
                if ctx.input_frame.key_pressed(Key::R) {
                    reset_controls(&session.uniforms, session.binding.render_scale());
                    self.paused_speed = None;
                }

                session.monitor.borrow_mut().record(ctx.time.dt);
                let (pw, ph) = ctx.window.physical_size();
                session.binding.advance(ctx.time.dt, [pw as f32, ph as f32]);

                self.scene.frame(
                    session.pane.element(&self.theme),
                    viewport,
                    Placement::top_right(PANE_WIDTH, PANE_MARGIN),
                    &input,
                );

                // Held since an earlier frame, and not a drag the pane owns.
                let dragging = input.mouse_down
                    && !ctx.input_frame.button_pressed(MouseButton::Left)
                    && !self.scene.owns_drag();
                if let (true, Some(prev), Some(now)) = (dragging, self.last_pointer, input.mouse_pos) {
                    session.drag.drag(now.x - prev.x, w);
                }
                let cursor = match input.mouse_pos {
                    Some(pos) if !self.scene.contains(pos) && dragging => CursorIcon::Grabbing,
                    Some(pos) if !self.scene.contains(pos) => CursorIcon::Grab,
                    _ => CursorIcon::Default,
                };
                ctx.window.set_cursor(cursor);

                let opacity = revealed_at.map_or(0.0, |t| fade_in(ctx.time.elapsed - t));
                Some((session.binding.block(), session.binding.render_scale().get(), opacity))
            }
        };

        self.last_pointer = input.mouse_pos;

        // ── Render ────────────────────────────────────────────────────────
        let planet = &mut self.planet;
        let rects = &mut self.rects;
        let texts = &mut self.texts;
        let dl = &mut self.scene.draw_list;
        let fonts = &self.scene.fonts;

        ctx.render(clear, |rctx, target| {
            if let Some((block, scale, opacity)) = frame {
                planet.render(rctx, target, block, scale, opacity);
            }
            rects.render(rctx, target, dl);
            texts.render(rctx, target, dl, fonts);
        })
    }
}

fn fade_in(since_reveal: f32) -> f32 {
    (since_reveal / FADE_IN).clamp(0.0, 1.0)
}

/// Stops the rotation, or restores the speed it had when stopped.
fn toggle_pause(session: &Session, paused_speed: &mut Option<f32>) {
    let speed = match paused_speed.take() {
        Some(speed) => speed,
        None => {
            *paused_speed = Some(session.uniforms.read().rotation_speed);
            0.0
        }
    };
    let key = UniformField::RotationSpeed.shader_name();
    if let Err(err) = session.pane.set(key, BindingValue::Scalar(speed)) {
        log::warn!("pause: {err}");
    }
}

/// Puts every control back to its default. Time and resolution keep running.
fn reset_controls(uniforms: &UniformHandle, scale: &RenderScale) {
    let defaults = PlanetUniforms::default();
    scale.set_quality(defaults.quality);
    uniforms.update(|u| {
        *u = PlanetUniforms { time: u.time, resolution: u.resolution, ..defaults };
    });
    log::info!("controls reset");
}

fn failure_element(theme: &Theme, message: &str) -> Element {
    Column::new()
        .spacing(theme.spacing * 2.0)
        .padding(Edges::all(24.0))
        .child(Label::new("The planet could not be shown.", theme.font, theme.title_size * 1.5, theme.value))
        .child(Label::new(message, theme.font, theme.text_size * 1.2, theme.label))
        .into()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use terra_planet::controls::CanvasDrag;
    use terra_planet::{bind, FrameMonitor, Quality};

    use super::*;

    fn session() -> Session {
        let (uniforms, binding) = bind(PlanetUniforms::default());
        let mut pane = Pane::new("Controls", uniforms.shared());
        pane.add_slider("Speed", terra_planet::uniforms::fields::ROTATION_SPEED, 0.0, 5.0);
        Session {
            drag: CanvasDrag::new(uniforms.clone()),
            uniforms,
            binding,
            pane,
            monitor: Rc::new(RefCell::new(FrameMonitor::default())),
            trace: Vec::new(),
        }
    }

    // ── fade ──────────────────────────────────────────────────────────────

    #[test]
    fn fade_runs_from_transparent_to_opaque() {
        assert_eq!(fade_in(-1.0), 0.0);
        assert_eq!(fade_in(0.0), 0.0);
        assert!((fade_in(FADE_IN * 0.5) - 0.5).abs() < 1e-6);
        assert_eq!(fade_in(FADE_IN * 3.0), 1.0);
    }

    // ── keys ──────────────────────────────────────────────────────────────

    #[test]
    fn pause_stops_and_restores_rotation() {
        let s = session();
        s.uniforms.update(|u| u.rotation_speed = 2.5);
        let mut paused = None;

        toggle_pause(&s, &mut paused);
        assert_eq!(s.uniforms.read().rotation_speed, 0.0);
        assert_eq!(paused, Some(2.5));

        toggle_pause(&s, &mut paused);
        assert_eq!(s.uniforms.read().rotation_speed, 2.5);
        assert_eq!(paused, None);
    }

    #[test]
    fn reset_keeps_time_and_resolution() {
        let s = session();
        s.binding.render_scale().set_quality(Quality::Ultra);
        s.uniforms.update(|u| {
            u.planet_radius = 2.9;
            u.quality = Quality::Ultra;
            u.time = 12.0;
            u.resolution = [640.0, 480.0];
        });

        reset_controls(&s.uniforms, s.binding.render_scale());

        let u = s.uniforms.snapshot();
        assert_eq!(u.planet_radius, PlanetUniforms::default().planet_radius);
        assert_eq!(u.quality, PlanetUniforms::default().quality);
        assert_eq!(u.time, 12.0);
        assert_eq!(u.resolution, [640.0, 480.0]);
        assert_eq!(s.binding.render_scale().get(), PlanetUniforms::default().quality.render_scale());
    }
}
