use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::Rect;
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{DrawCmd, DrawList};

use super::common::{
    clip_runs, ensure_instance_buffer, instanced_pipeline, scissor_for, ViewportUniform,
    QUAD_INDICES, QUAD_VERTICES,
};

/// Solid rectangles, one instance each.
#[derive(Default)]
pub struct RectRenderer {
    pipeline_format:   Option<wgpu::TextureFormat>,
    pipeline:          Option<wgpu::RenderPipeline>,
    bind_group:        Option<wgpu::BindGroup>,
    viewport_ubo:      Option<wgpu::Buffer>,
    quad_vbo:          Option<wgpu::Buffer>,
    quad_ibo:          Option<wgpu::Buffer>,
    instance_vbo:      Option<wgpu::Buffer>,
    instance_capacity: usize,
}

impl RectRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws every `DrawCmd::Rect` in `draw_list`, in paint order.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, draw_list: &mut DrawList) {
        let (instances, clips) = collect_instances(draw_list);
        if instances.is_empty() {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_quad(ctx);
        ensure_instance_buffer(
            ctx.device,
            "terra rect instances",
            &mut self.instance_vbo,
            &mut self.instance_capacity,
            instances.len(),
            size_of::<RectInstance>(),
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

        let vp = ViewportUniform::new(ctx.viewport.width, ctx.viewport.height);
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&vp));
        ctx.queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(&instances));

        let mut rpass = target.load_pass("terra rect pass");
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

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label:  Some("terra rect shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/rect.wgsl").into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label:   Some("terra rect bgl"),
            entries: &[ViewportUniform::layout_entry()],
        });

        let pipeline = instanced_pipeline(
            ctx.device,
            "terra rect pipeline",
            &shader,
            &bgl,
            RectInstance::layout(),
            ctx.surface_format,
        );

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label:              Some("terra rect viewport"),
            size:               ViewportUniform::SIZE.get(),
            usage:              wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label:   Some("terra rect bind group"),
            layout:  &bgl,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() }],
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.viewport_ubo = Some(ubo);
        self.bind_group = Some(bind_group);
    }

    fn ensure_quad(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() {
            return;
        }
        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("terra rect quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage:    wgpu::BufferUsages::VERTEX,
        }));
        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("terra rect quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage:    wgpu::BufferUsages::INDEX,
        }));
    }
}

fn collect_instances(draw_list: &mut DrawList) -> (Vec<RectInstance>, Vec<Option<Rect>>) {
    let mut instances = Vec::new();
    let mut clips = Vec::new();
    for item in draw_list.items() {
        let DrawCmd::Rect(cmd) = &item.cmd else { continue };
        if cmd.rect.is_empty() || cmd.color.a <= 0.0 {
            continue;
        }
        instances.push(RectInstance {
            origin: [cmd.rect.origin.x, cmd.rect.origin.y],
            size:   [cmd.rect.size.x, cmd.rect.size.y],
            color:  cmd.color.to_array(),
        });
        clips.push(item.clip);
    }
    (instances, clips)
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct RectInstance {
    origin: [f32; 2],
    size:   [f32; 2],
    color:  [f32; 4],
}

impl RectInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2,
        2 => Float32x2,
        3 => Float32x4
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<RectInstance>() as u64,
            step_mode:    wgpu::VertexStepMode::Instance,
            attributes:   &Self::ATTRS,
        }
    }
}
