use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};
use wgpu::util::DeviceExt;

use crate::coords::Rect;
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{DrawCmd, DrawList};
use crate::text::FontSystem;

use super::atlas::ShelfPacker;
use super::common::{
    clip_runs, ensure_instance_buffer, instanced_pipeline, scissor_for, ViewportUniform,
    QUAD_INDICES, QUAD_VERTICES,
};

const ATLAS_SIZE: u32 = 1024;
const GLYPH_PADDING: u32 = 1;

/// Draws `DrawCmd::Text` through an R8 glyph atlas.
///
/// Glyphs are laid out and rasterized at physical size so text stays sharp
/// on scaled displays; the pass uses a physical-pixel viewport.
pub struct TextRenderer {
    pipeline_format:   Option<wgpu::TextureFormat>,
    pipeline:          Option<wgpu::RenderPipeline>,
    bind_group:        Option<wgpu::BindGroup>,
    viewport_ubo:      Option<wgpu::Buffer>,
    atlas:             Option<wgpu::Texture>,
    packer:            ShelfPacker,
    glyphs:            HashMap<GlyphRasterConfig, ([f32; 2], [f32; 2])>,
    warned_full:       bool,
    quad_vbo:          Option<wgpu::Buffer>,
    quad_ibo:          Option<wgpu::Buffer>,
    instance_vbo:      Option<wgpu::Buffer>,
    instance_capacity: usize,
    layout:            Layout<()>,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            pipeline_format:   None,
            pipeline:          None,
            bind_group:        None,
            viewport_ubo:      None,
            atlas:             None,
            packer:            ShelfPacker::new(ATLAS_SIZE, GLYPH_PADDING),
            glyphs:            HashMap::new(),
            warned_full:       false,
            quad_vbo:          None,
            quad_ibo:          None,
            instance_vbo:      None,
            instance_capacity: 0,
            layout:            Layout::new(CoordinateSystem::PositiveYDown),
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &mut DrawList,
        fonts: &FontSystem,
    ) {
        let texts: Vec<_> = draw_list
            .items()
            .iter()
            .filter_map(|item| match &item.cmd {
                DrawCmd::Text(cmd) if !cmd.text.is_empty() => Some((cmd.clone(), item.clip)),
                _ => None,
            })
            .collect();
        if texts.is_empty() {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_quad(ctx);

        let scale = ctx.scale_factor.max(0.5);
        let mut instances: Vec<GlyphInstance> = Vec::new();
        let mut clips: Vec<Option<Rect>> = Vec::new();

        for (cmd, clip) in &texts {
            let Some(font) = fonts.get(cmd.font) else {
                log::warn!("text references unknown font {:?}", cmd.font);
                continue;
            };

            self.layout.reset(&LayoutSettings {
                x: cmd.origin.x * scale,
                y: cmd.origin.y * scale,
                max_width: cmd.max_width.map(|w| w * scale),
                ..LayoutSettings::default()
            });
            self.layout.append(&[font], &TextStyle::new(&cmd.text, cmd.size * scale, 0));

            let placed: Vec<_> = self
                .layout
                .glyphs()
                .iter()
                .filter(|g| g.char_data.rasterize() && g.width > 0 && g.height > 0)
                .map(|g| (g.key, g.x.round(), g.y.round(), g.width as f32, g.height as f32))
                .collect();

            for (key, x, y, w, h) in placed {
                let Some((uv_min, uv_max)) = self.glyph_uv(ctx, font, key) else { continue };
                instances.push(GlyphInstance {
                    dst_min: [x, y],
                    dst_max: [x + w, y + h],
                    uv_min,
                    uv_max,
                    color: cmd.color.to_array(),
                });
                clips.push(*clip);
            }
        }

        if instances.is_empty() {
            return;
        }

        ensure_instance_buffer(
            ctx.device,
            "terra text instances",
            &mut self.instance_vbo,
            &mut self.instance_capacity,
            instances.len(),
            size_of::<GlyphInstance>(),
        );

        let (Some(pipeline), Some(bind_group), Some(ubo), Some(quad_vbo), Some(quad_ibo), Some(instance_vbo)) = (
            self.pipeline.as_ref(),
            self.bind_group.as_ref(),
            self.viewport_ubo.as_ref(),
            self.quad_vbo.as_ref(),
            self.quad_ibo.as_ref(),
            self.instance_vbo.as_ref(),
        ) else {
            return;
        };

        let (pw, ph) = ctx.physical_size();
        let vp = ViewportUniform::new(pw as f32, ph as f32);
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&vp));
        ctx.queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(&instances));

        let mut rpass = target.load_pass("terra text pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);

        for (range, clip) in clip_runs(&clips) {
            if let Some((x, y, w, h)) = scissor_for(clip, ctx.viewport, ctx.scale_factor) {
                rpass.set_scissor_rect(x, y, w, h);
                rpass.draw_indexed(0..6, 0, range);
            }
        }
    }

    /// Cached UVs for a glyph, rasterizing and uploading it on first use.
    fn glyph_uv(
        &mut self,
        ctx: &RenderCtx<'_>,
        font: &fontdue::Font,
        key: GlyphRasterConfig,
    ) -> Option<([f32; 2], [f32; 2])> {
        if let Some(uv) = self.glyphs.get(&key) {
            return Some(*uv);
        }

        let (metrics, bitmap) = font.rasterize_config(key);
        let (w, h) = (metrics.width as u32, metrics.height as u32);
        if w == 0 || h == 0 {
            return None;
        }

        let Some(slot) = self.packer.allocate(w, h) else {
            let size = self.packer.size();
            if !self.packer.is_full() {
                log::debug!("glyph {w}x{h} does not fit a {size}px atlas");
            } else if !self.warned_full {
                log::warn!("glyph atlas full ({size}x{size}); new glyphs are dropped");
                self.warned_full = true;
            }
            return None;
        };

        let atlas = self.atlas.as_ref()?;
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture:   atlas,
                mip_level: 0,
                origin:    wgpu::Origin3d { x: slot.0, y: slot.1, z: 0 },
                aspect:    wgpu::TextureAspect::All,
            },
            &bitmap,
            wgpu::TexelCopyBufferLayout { offset: 0, bytes_per_row: Some(w), rows_per_image: Some(h) },
            wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
        );

        let uv = self.packer.uv(slot, w, h);
        self.glyphs.insert(key, uv);
        Some(uv)
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label:  Some("terra text shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/text.wgsl").into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terra text bgl"),
            entries: &[
                ViewportUniform::layout_entry(),
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

        let pipeline = instanced_pipeline(
            ctx.device,
            "terra text pipeline",
            &shader,
            &bgl,
            GlyphInstance::layout(),
            ctx.surface_format,
        );

        // A fresh atlas goes with a fresh bind group; cached UVs would be stale.
        let atlas = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("terra glyph atlas"),
            size: wgpu::Extent3d { width: ATLAS_SIZE, height: ATLAS_SIZE, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count:    1,
            dimension:       wgpu::TextureDimension::D2,
            format:          wgpu::TextureFormat::R8Unorm,
            usage:           wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats:    &[],
        });
        let atlas_view = atlas.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label:         Some("terra glyph sampler"),
            mag_filter:    wgpu::FilterMode::Linear,
            min_filter:    wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });
        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label:              Some("terra text viewport"),
            size:               ViewportUniform::SIZE.get(),
            usage:              wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label:  Some("terra text bind group"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&atlas_view) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(&sampler) },
            ],
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.atlas = Some(atlas);
        self.packer = ShelfPacker::new(ATLAS_SIZE, GLYPH_PADDING);
        self.glyphs.clear();
        self.warned_full = false;
        self.viewport_ubo = Some(ubo);
        self.bind_group = Some(bind_group);
    }

    fn ensure_quad(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() {
            return;
        }
        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("terra text quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage:    wgpu::BufferUsages::VERTEX,
        }));
        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("terra text quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage:    wgpu::BufferUsages::INDEX,
        }));
    }
}

/// Per-glyph instance, physical pixels.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GlyphInstance {
    dst_min: [f32; 2],
    dst_max: [f32; 2],
    uv_min:  [f32; 2],
    uv_max:  [f32; 2],
    color:   [f32; 4],
}

impl GlyphInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x2,
        2 => Float32x2,
        3 => Float32x2,
        4 => Float32x2,
        5 => Float32x4
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<GlyphInstance>() as u64,
            step_mode:    wgpu::VertexStepMode::Instance,
            attributes:   &Self::ATTRS,
        }
    }
}
