//! The live uniform record and what the render loop does with it.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use crate::uniforms::{PlanetUniformBlock, PlanetUniforms, Quality};

/// Shared handle to the live uniform record. Clones alias the same record.
#[derive(Debug, Clone)]
pub struct UniformHandle(Rc<RefCell<PlanetUniforms>>);

impl UniformHandle {
    pub fn new(uniforms: PlanetUniforms) -> Self {
        Self(Rc::new(RefCell::new(uniforms)))
    }

    /// The underlying cell, as the pane binds to it.
    pub fn shared(&self) -> Rc<RefCell<PlanetUniforms>> {
        Rc::clone(&self.0)
    }

    pub fn read(&self) -> Ref<'_, PlanetUniforms> {
        self.0.borrow()
    }

    pub fn snapshot(&self) -> PlanetUniforms {
        self.0.borrow().clone()
    }

    pub fn update<T>(&self, f: impl FnOnce(&mut PlanetUniforms) -> T) -> T {
        f(&mut self.0.borrow_mut())
    }
}

/// Offscreen render scale, shared between the renderer and the quality
/// control.
#[derive(Debug, Clone)]
pub struct RenderScale(Rc<Cell<f32>>);

impl RenderScale {
    pub fn new(quality: Quality) -> Self {
        Self(Rc::new(Cell::new(quality.render_scale())))
    }

    pub fn get(&self) -> f32 {
        self.0.get()
    }

    pub fn set_quality(&self, quality: Quality) {
        self.0.set(quality.render_scale());
    }
}

/// The render side of a bound uniform record: advances time, tracks the
/// drawable size and produces the block uploaded each frame.
#[derive(Debug, Clone)]
pub struct RenderBinding {
    uniforms: UniformHandle,
    scale:    RenderScale,
}

impl RenderBinding {
    pub fn uniforms(&self) -> &UniformHandle {
        &self.uniforms
    }

    pub fn render_scale(&self) -> &RenderScale {
        &self.scale
    }

    /// Moves time forward by `dt` seconds and records the drawable size.
    pub fn advance(&self, dt: f32, resolution: [f32; 2]) {
        self.uniforms.update(|u| {
            u.time += dt;
            if u.resolution != resolution {
                log::debug!("resolution {:?} -> {:?}", u.resolution, resolution);
                u.resolution = resolution;
            }
        });
    }

    pub fn block(&self) -> PlanetUniformBlock {
        PlanetUniformBlock::from(&*self.uniforms.read())
    }
}

/// Takes ownership of `defaults` as the live record. Returns the handle
/// controls write through and the binding the render loop reads.
pub fn bind(defaults: PlanetUniforms) -> (UniformHandle, RenderBinding) {
    let scale = RenderScale::new(defaults.quality);
    let uniforms = UniformHandle::new(defaults);
    (uniforms.clone(), RenderBinding { uniforms, scale })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_handle_holds_exactly_the_defaults() {
        let (handle, binding) = bind(PlanetUniforms::default());
        assert_eq!(handle.snapshot(), PlanetUniforms::default());
        assert_eq!(binding.render_scale().get(), Quality::Medium.render_scale());
    }

    #[test]
    fn handle_and_binding_share_the_record() {
        let (handle, binding) = bind(PlanetUniforms::default());
        handle.update(|u| u.planet_radius = 3.5);
        assert_eq!(binding.block().planet_radius, 3.5);
    }

    #[test]
    fn advance_accumulates_time_and_tracks_size() {
        let (handle, binding) = bind(PlanetUniforms::default());
        binding.advance(0.25, [800.0, 600.0]);
        binding.advance(0.5, [800.0, 600.0]);
        let u = handle.snapshot();
        assert_eq!(u.time, 0.75);
        assert_eq!(u.resolution, [800.0, 600.0]);

        let mut expected = PlanetUniforms::default();
        expected.time = 0.75;
        expected.resolution = [800.0, 600.0];
        assert_eq!(u, expected);
    }

    #[test]
    fn render_scale_follows_quality() {
        let scale = RenderScale::new(Quality::Low);
        let alias = scale.clone();
        alias.set_quality(Quality::High);
        assert_eq!(scale.get(), 1.0);
    }
}
