use terra_engine::device::Gpu;
use terra_planet::{Canvas, NoiseVolume, PlanetRenderer, ShaderProgram, StartupError};

enum Context<'a> {
    Ready {
        device:  &'a wgpu::Device,
        queue:   &'a wgpu::Queue,
        adapter: wgpu::AdapterInfo,
    },
    /// The runtime could not create a GPU for the window.
    Unavailable(String),
}

/// The window's GPU surface seen as a startup canvas.
pub struct GpuCanvas<'a> {
    context:  Context<'a>,
    renderer: &'a mut PlanetRenderer,
    revealed: bool,
}

impl<'a> GpuCanvas<'a> {
    pub fn new(gpu: &'a Gpu<'_>, renderer: &'a mut PlanetRenderer) -> Self {
        let context = Context::Ready { device: gpu.device(), queue: gpu.queue(), adapter: gpu.adapter_info() };
        Self { context, renderer, revealed: false }
    }

    /// A canvas whose context acquisition fails with `reason`.
    pub fn unavailable(reason: impl Into<String>, renderer: &'a mut PlanetRenderer) -> Self {
        Self { context: Context::Unavailable(reason.into()), renderer, revealed: false }
    }

    pub fn revealed(&self) -> bool {
        self.revealed
    }

    fn device(&self) -> Result<(&'a wgpu::Device, &'a wgpu::Queue), StartupError> {
        match &self.context {
            Context::Ready { device, queue, .. } => Ok((*device, *queue)),
            Context::Unavailable(reason) => Err(StartupError::ContextUnavailable(reason.clone())),
        }
    }
}

impl Canvas for GpuCanvas<'_> {
    fn acquire_context(&mut self) -> Result<(), StartupError> {
        match &self.context {
            Context::Ready { adapter, .. } => {
                log::info!("canvas on {} ({:?})", adapter.name, adapter.backend);
                Ok(())
            }
            Context::Unavailable(reason) => Err(StartupError::ContextUnavailable(reason.clone())),
        }
    }

    fn upload_noise(&mut self, volume: &NoiseVolume) -> Result<(), StartupError> {
        let (device, queue) = self.device()?;
        self.renderer.upload_noise(device, queue, volume)
    }

    fn compile(&mut self, program: &ShaderProgram) -> Result<(), StartupError> {
        let (device, _) = self.device()?;
        self.renderer.compile(device, program)
    }

    fn reveal(&mut self) {
        self.revealed = true;
    }
}

#[cfg(test)]
mod tests {
    use terra_planet::{GeneratedNoise, PlanetUniforms};

    use super::*;

    #[test]
    fn missing_gpu_fails_at_the_context_stage() {
        let mut renderer = PlanetRenderer::new();
        let mut canvas = GpuCanvas::unavailable("no adapter found", &mut renderer);

        let result = terra_planet::start(
            &mut canvas,
            &GeneratedNoise::new(4, 0),
            &ShaderProgram::planet(),
            PlanetUniforms::default(),
        );

        let err = result.err().unwrap();
        assert!(matches!(err, StartupError::ContextUnavailable(ref r) if r == "no adapter found"));
        assert_eq!(err.stage(), "context");
        assert!(!canvas.revealed());
        assert!(!renderer.is_ready());
    }
}
