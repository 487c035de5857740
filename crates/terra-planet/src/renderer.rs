//! GPU side of the planet: noise texture, shader pipeline and the
//! offscreen pass that lets quality trade resolution for speed.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use terra_engine::render::{RenderCtx, RenderTarget};

use crate::error::StartupError;
use crate::noise::NoiseVolume;
use crate::shader::ShaderProgram;
use crate::uniforms::PlanetUniformBlock;

/// The planet is drawn here before being scaled onto the surface.
const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct BlitUniform {
    opacity: f32,
    _pad:    [f32; 3],
}

struct Offscreen {
    view: wgpu::TextureView,
    size: (u32, u32),
}

/// Draws the planet program into an offscreen target at the current render
/// scale, then blits it over the frame.
///
/// Everything is created on demand: the noise texture by
/// [`upload_noise`](Self::upload_noise), the planet pipeline by
/// [`compile`](Self::compile), and the offscreen target and blit pipeline on
/// the first [`render`](Self::render) that needs them.
#[derive(Default)]
pub struct PlanetRenderer {
    noise_view:        Option<wgpu::TextureView>,
    noise_sampler:     Option<wgpu::Sampler>,
    planet_pipeline:   Option<wgpu::RenderPipeline>,
    planet_bgl:        Option<wgpu::BindGroupLayout>,
    planet_bind_group: Option<wgpu::BindGroup>,
    planet_ubo:        Option<wgpu::Buffer>,

    offscreen:         Option<Offscreen>,

    blit_format:       Option<wgpu::TextureFormat>,
    blit_pipeline:     Option<wgpu::RenderPipeline>,
    blit_bgl:          Option<wgpu::BindGroupLayout>,
    blit_bind_group:   Option<wgpu::BindGroup>,
    blit_ubo:          Option<wgpu::Buffer>,
    blit_sampler:      Option<wgpu::Sampler>,
}

impl PlanetRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether both the noise texture and the planet pipeline exist.
    pub fn is_ready(&self) -> bool {
        self.noise_view.is_some() && self.planet_pipeline.is_some()
    }

    /// Creates the 3D noise texture and its repeat sampler.
    pub fn upload_noise(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        volume: &NoiseVolume,
    ) -> Result<(), StartupError> {
        volume.fits(device.limits().max_texture_dimension_3d)?;
        let n = volume.size();

        let extent = wgpu::Extent3d { width: n, height: n, depth_or_array_layers: n };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label:           Some("terra noise volume"),
            size:            extent,
            mip_level_count: 1,
            sample_count:    1,
            dimension:       wgpu::TextureDimension::D3,
            format:          wgpu::TextureFormat::R8Unorm,
            usage:           wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats:    &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture:   &texture,
                mip_level: 0,
                origin:    wgpu::Origin3d::ZERO,
                aspect:    wgpu::TextureAspect::All,
            },
            volume.data(),
            wgpu::TexelCopyBufferLayout { offset: 0, bytes_per_row: Some(n), rows_per_image: Some(n) },
            extent,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label:          Some("terra noise sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter:     wgpu::FilterMode::Linear,
            min_filter:     wgpu::FilterMode::Linear,
            mipmap_filter:  wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        self.noise_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.noise_sampler = Some(sampler);
        self.planet_bind_group = None;
        log::info!("noise volume uploaded: {n}^3");
        Ok(())
    }

    /// Compiles `program` and builds the planet pipeline.
    ///
    /// Everything is created inside a validation error scope, so a broken
    /// program comes back as `ShaderCompileFailed` instead of reaching the
    /// device's uncaptured-error handler.
    pub fn compile(&mut self, device: &wgpu::Device, program: &ShaderProgram) -> Result<(), StartupError> {
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let vertex_label = format!("{} vertex", program.label);
        let fragment_label = format!("{} fragment", program.label);
        let (vertex, vertex_errors) = compile_module(device, &vertex_label, &program.vertex);
        let (fragment, fragment_errors) = compile_module(device, &fragment_label, &program.fragment);

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terra planet bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding:    0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty:                 wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size:   NonZeroU64::new(PlanetUniformBlock::SIZE),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding:    1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type:    wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D3,
                        multisampled:   false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding:    2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty:         wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count:      None,
                },
            ],
        });

        let pipeline = fullscreen_pipeline(
            device,
            "terra planet pipeline",
            &vertex,
            &fragment,
            &bgl,
            OFFSCREEN_FORMAT,
            None,
        );

        let captured = pollster::block_on(scope.pop());
        let failure = compile_failure(
            &program.label,
            [(vertex_label.as_str(), vertex_errors), (fragment_label.as_str(), fragment_errors)],
            captured.map(|e| e.to_string()),
        );
        if let Some(err) = failure {
            return Err(err);
        }

        self.planet_ubo = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label:              Some("terra planet uniforms"),
            size:               PlanetUniformBlock::SIZE,
            usage:              wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.planet_pipeline = Some(pipeline);
        self.planet_bgl = Some(bgl);
        self.planet_bind_group = None;
        log::info!("shader program `{}` compiled", program.label);
        Ok(())
    }

    /// Draws one frame of the planet over `target`.
    ///
    /// `render_scale` sizes the offscreen pass relative to the drawable;
    /// `opacity` fades the result over whatever the target already holds.
    /// The block's resolution is replaced by the offscreen size.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        mut block: PlanetUniformBlock,
        render_scale: f32,
        opacity: f32,
    ) {
        if !self.is_ready() {
            return;
        }

        let size = offscreen_size(ctx.physical_size(), render_scale);
        self.ensure_offscreen(ctx.device, size);
        self.ensure_planet_bind_group(ctx.device);
        self.ensure_blit_pipeline(ctx);
        self.ensure_blit_bind_group(ctx.device);

        let (
            Some(planet_pipeline),
            Some(planet_bind_group),
            Some(planet_ubo),
            Some(offscreen),
            Some(blit_pipeline),
            Some(blit_bind_group),
            Some(blit_ubo),
        ) = (
            self.planet_pipeline.as_ref(),
            self.planet_bind_group.as_ref(),
            self.planet_ubo.as_ref(),
            self.offscreen.as_ref(),
            self.blit_pipeline.as_ref(),
            self.blit_bind_group.as_ref(),
            self.blit_ubo.as_ref(),
        ) else {
            return;
        };

        block.resolution = [size.0 as f32, size.1 as f32];
        ctx.queue.write_buffer(planet_ubo, 0, bytemuck::bytes_of(&block));
        let blit = BlitUniform { opacity: opacity.clamp(0.0, 1.0), _pad: [0.0; 3] };
        ctx.queue.write_buffer(blit_ubo, 0, bytemuck::bytes_of(&blit));

        {
            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("terra planet pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view:           &offscreen.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load:  wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes:         None,
                occlusion_query_set:      None,
                multiview_mask:           None,
            });
            rpass.set_pipeline(planet_pipeline);
            rpass.set_bind_group(0, planet_bind_group, &[]);
            rpass.draw(0..3, 0..1);
        }

        let mut rpass = target.load_pass("terra planet blit");
        rpass.set_pipeline(blit_pipeline);
        rpass.set_bind_group(0, blit_bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }

    fn ensure_offscreen(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        if self.offscreen.as_ref().is_some_and(|o| o.size == size) {
            return;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label:           Some("terra planet offscreen"),
            size:            wgpu::Extent3d { width: size.0, height: size.1, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count:    1,
            dimension:       wgpu::TextureDimension::D2,
            format:          OFFSCREEN_FORMAT,
            usage:           wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats:    &[],
        });
        log::debug!("planet offscreen target {}x{}", size.0, size.1);
        self.offscreen = Some(Offscreen { view: texture.create_view(&wgpu::TextureViewDescriptor::default()), size });
        self.blit_bind_group = None;
    }

    fn ensure_planet_bind_group(&mut self, device: &wgpu::Device) {
        if self.planet_bind_group.is_some() {
            return;
        }
        let (Some(bgl), Some(ubo), Some(view), Some(sampler)) =
            (self.planet_bgl.as_ref(), self.planet_ubo.as_ref(), self.noise_view.as_ref(), self.noise_sampler.as_ref())
        else {
            return;
        };
        self.planet_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label:  Some("terra planet bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(view) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(sampler) },
            ],
        }));
    }

    fn ensure_blit_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.blit_format == Some(ctx.surface_format) && self.blit_pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label:  Some("terra blit shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/blit.wgsl").into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terra blit bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding:    0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty:                 wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size:   NonZeroU64::new(size_of::<BlitUniform>() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding:    1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type:    wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled:   false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding:    2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty:         wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count:      None,
                },
            ],
        });

        let pipeline = fullscreen_pipeline(
            ctx.device,
            "terra blit pipeline",
            &shader,
            &shader,
            &bgl,
            ctx.surface_format,
            Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
        );

        if self.blit_ubo.is_none() {
            self.blit_ubo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label:              Some("terra blit uniforms"),
                size:               size_of::<BlitUniform>() as u64,
                usage:              wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
        }
        if self.blit_sampler.is_none() {
            self.blit_sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label:         Some("terra blit sampler"),
                mag_filter:    wgpu::FilterMode::Linear,
                min_filter:    wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            }));
        }

        self.blit_format = Some(ctx.surface_format);
        self.blit_pipeline = Some(pipeline);
        self.blit_bgl = Some(bgl);
        self.blit_bind_group = None;
    }

    fn ensure_blit_bind_group(&mut self, device: &wgpu::Device) {
        if self.blit_bind_group.is_some() {
            return;
        }
        let (Some(bgl), Some(ubo), Some(offscreen), Some(sampler)) =
            (self.blit_bgl.as_ref(), self.blit_ubo.as_ref(), self.offscreen.as_ref(), self.blit_sampler.as_ref())
        else {
            return;
        };
        self.blit_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label:  Some("terra blit bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&offscreen.view) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(sampler) },
            ],
        }));
    }
}

/// Offscreen size for a drawable of `physical` pixels at `scale`; never zero.
fn offscreen_size(physical: (u32, u32), scale: f32) -> (u32, u32) {
    let scale = if scale.is_finite() { scale.clamp(0.1, 1.0) } else { 1.0 };
    let dim = |v: u32| ((v as f32 * scale).round() as u32).max(1);
    (dim(physical.0), dim(physical.1))
}

/// Creates a module and collects its compiler errors. Warnings and notes
/// are only logged.
fn compile_module(device: &wgpu::Device, label: &str, source: &str) -> (wgpu::ShaderModule, Vec<String>) {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label:  Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let info = pollster::block_on(module.get_compilation_info());
    let mut errors = Vec::new();
    for msg in &info.messages {
        let at = msg.location.as_ref().map(|l| (l.line_number, l.line_position));
        let line = describe_message(at, &msg.message);
        match msg.message_type {
            wgpu::CompilationMessageType::Error => errors.push(line),
            wgpu::CompilationMessageType::Warning => log::warn!("{label}: {line}"),
            wgpu::CompilationMessageType::Info => log::debug!("{label}: {line}"),
        }
    }

    (module, errors)
}

/// Builds the compile error, if any. Per-module compiler messages carry line
/// positions, so they win over the error the scope captured; the scope
/// still catches what the compiler does not report, like pipeline
/// interface mismatches.
fn compile_failure<'a>(
    program: &str,
    modules: impl IntoIterator<Item = (&'a str, Vec<String>)>,
    captured: Option<String>,
) -> Option<StartupError> {
    let mut failed = Vec::new();
    let mut lines = Vec::new();
    for (label, errors) in modules {
        if !errors.is_empty() {
            failed.push(label);
            lines.extend(errors);
        }
    }

    if failed.is_empty() {
        return captured.map(|message| StartupError::ShaderCompileFailed { label: program.to_owned(), message });
    }
    let label = match failed.as_slice() {
        [only] => *only,
        _ => program,
    };
    Some(StartupError::ShaderCompileFailed { label: label.to_owned(), message: lines.join("\n") })
}

fn describe_message(at: Option<(u32, u32)>, message: &str) -> String {
    match at {
        Some((line, col)) => format!("{line}:{col}: {message}"),
        None => message.to_owned(),
    }
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    vertex: &wgpu::ShaderModule,
    fragment: &wgpu::ShaderModule,
    bind_group_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label:              Some(label),
        bind_group_layouts: &[bind_group_layout],
        immediate_size:     0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module:              vertex,
            entry_point:         Some(ShaderProgram::VERTEX_ENTRY),
            compilation_options: Default::default(),
            buffers:             &[],
        },
        fragment: Some(wgpu::FragmentState {
            module:              fragment,
            entry_point:         Some(ShaderProgram::FRAGMENT_ENTRY),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive:      wgpu::PrimitiveState::default(),
        depth_stencil:  None,
        multisample:    wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache:          None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offscreen_follows_render_scale() {
        assert_eq!(offscreen_size((1280, 720), 0.5), (640, 360));
        assert_eq!(offscreen_size((1280, 720), 0.75), (960, 540));
        assert_eq!(offscreen_size((1280, 720), 1.0), (1280, 720));
    }

    #[test]
    fn offscreen_is_never_empty_or_oversized() {
        assert_eq!(offscreen_size((0, 0), 0.5), (1, 1));
        assert_eq!(offscreen_size((100, 100), 4.0), (100, 100));
        assert_eq!(offscreen_size((100, 100), f32::NAN), (100, 100));
    }

    #[test]
    fn compiler_messages_carry_position() {
        assert_eq!(describe_message(Some((3, 14)), "unknown type"), "3:14: unknown type");
        assert_eq!(describe_message(None, "bad"), "bad");
    }

    #[test]
    fn failure_names_the_broken_module() {
        let err = compile_failure(
            "planet",
            [("planet vertex", vec![]), ("planet fragment", vec!["1:13: expected identifier".to_owned()])],
            Some("Validation Error".to_owned()),
        );
        match err {
            Some(StartupError::ShaderCompileFailed { label, message }) => {
                assert_eq!(label, "planet fragment");
                assert_eq!(message, "1:13: expected identifier");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failure_falls_back_to_the_scope_error() {
        let none: [(&str, Vec<String>); 2] = [("v", vec![]), ("f", vec![])];
        assert!(compile_failure("planet", none.clone(), None).is_none());

        let err = compile_failure("planet", none, Some("entry point mismatch".to_owned())).unwrap();
        assert_eq!(err.stage(), "shader");
        assert!(err.to_string().contains("`planet`"));
        assert!(err.to_string().contains("entry point mismatch"));
    }

    #[test]
    fn failure_in_both_modules_is_reported_for_the_program() {
        let err = compile_failure("planet", [("v", vec!["a".to_owned()]), ("f", vec!["b".to_owned()])], None).unwrap();
        assert!(matches!(err, StartupError::ShaderCompileFailed { ref label, ref message } if label == "planet" && message == "a\nb"));
    }

    /// A real device when the machine has one; GPU-less runners skip.
    fn device() -> Option<wgpu::Device> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default())).ok()?;
        let (device, _queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            required_limits: wgpu::Limits::downlevel_defaults(),
            ..Default::default()
        }))
        .ok()?;
        Some(device)
    }

    #[test]
    fn broken_program_is_an_error_not_a_device_panic() {
        let Some(device) = device() else {
            return;
        };
        let mut renderer = PlanetRenderer::new();
        let broken = ShaderProgram::new("broken", include_str!("shaders/fullscreen.wgsl"), "fn fs_main( {");

        let err = renderer.compile(&device, &broken).unwrap_err();
        assert!(matches!(err, StartupError::ShaderCompileFailed { ref label, .. } if label.starts_with("broken")));
        assert!(renderer.planet_pipeline.is_none());

        renderer.compile(&device, &ShaderProgram::planet()).unwrap();
        assert!(renderer.planet_pipeline.is_some());
    }

    #[test]
    fn blit_uniform_is_one_vec4() {
        assert_eq!(size_of::<BlitUniform>(), 16);
    }
}
