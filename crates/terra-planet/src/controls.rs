//! Control groups. Each one adds its bindings to the pane and owns a
//! disjoint set of uniform fields.

use std::cell::RefCell;
use std::f32::consts::PI;
use std::rc::Rc;

use terra_ui::pane::Pane;

use crate::binder::{RenderScale, UniformHandle};
use crate::monitor::FrameMonitor;
use crate::uniforms::{fields, PlanetUniforms, Quality};

/// Quality picker. Also retargets the renderer's offscreen scale.
pub fn add_quality_control(pane: &mut Pane<PlanetUniforms>, _uniforms: &UniformHandle, scale: &RenderScale) {
    let scale = scale.clone();
    pane.add_choice_with("Quality", fields::QUALITY, Quality::ALL.map(Quality::label), move |i| {
        if let Some(q) = Quality::from_index(i) {
            log::info!("quality -> {}", q.label());
            scale.set_quality(q);
        }
    });
}

/// Rotation speed slider, plus the canvas drag that turns the planet by hand.
pub fn add_rotation_controls(pane: &mut Pane<PlanetUniforms>, uniforms: &UniformHandle) -> CanvasDrag {
    pane.add_folder("Rotation").add_slider("Speed", fields::ROTATION_SPEED, 0.0, 5.0);
    CanvasDrag::new(uniforms.clone())
}

pub fn add_planet_controls(pane: &mut Pane<PlanetUniforms>, _uniforms: &UniformHandle) {
    pane.add_folder("Planet")
        .add_slider("Radius", fields::PLANET_RADIUS, 0.5, 3.0)
        .add_slider("Noise strength", fields::NOISE_STRENGTH, 0.0, 1.0)
        .add_slider("Terrain scale", fields::TERRAIN_SCALE, 0.1, 3.0)
        .add_slider("Clouds density", fields::CLOUDS_DENSITY, 0.0, 1.0)
        .add_slider("Clouds scale", fields::CLOUDS_SCALE, 0.1, 3.0)
        .add_slider("Clouds speed", fields::CLOUDS_SPEED, 0.0, 5.0)
        .add_slider("Atmosphere", fields::ATMOSPHERE_DENSITY, 0.0, 1.0)
        .add_color("Atmosphere color", fields::ATMOSPHERE_COLOR);
}

pub fn add_light_controls(pane: &mut Pane<PlanetUniforms>, _uniforms: &UniformHandle) {
    pane.add_folder("Light")
        .add_point("Sun direction", fields::SUN_DIRECTION, -2.0, 2.0)
        .add_slider("Sun intensity", fields::SUN_INTENSITY, 0.0, 10.0)
        .add_slider("Ambient", fields::AMBIENT_LIGHT, 0.0, 0.02);
}

/// Read-only FPS graph.
pub fn add_monitor(pane: &mut Pane<PlanetUniforms>, monitor: &Rc<RefCell<FrameMonitor>>) {
    let monitor = Rc::clone(monitor);
    pane.add_folder("Monitor").add_graph("FPS", move || monitor.borrow().snapshot());
}

/// Turns horizontal pointer drags over the canvas into `rotation_offset`.
/// A drag across the full width is half a turn.
#[derive(Debug, Clone)]
pub struct CanvasDrag {
    uniforms: UniformHandle,
}

impl CanvasDrag {
    pub fn new(uniforms: UniformHandle) -> Self {
        Self { uniforms }
    }

    /// `dx` and `width` in the same units, usually logical pixels.
    pub fn drag(&self, dx: f32, width: f32) {
        if width <= 0.0 || dx == 0.0 {
            return;
        }
        self.uniforms.update(|u| u.rotation_offset += dx / width * PI);
    }
}
