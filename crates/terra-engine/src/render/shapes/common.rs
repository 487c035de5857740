use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};

use crate::coords::{Rect, Viewport};

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING
}

// ── viewport uniform ──────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct ViewportUniform {
    pub viewport: [f32; 2],
    pub _pad:     [f32; 2],
}

impl ViewportUniform {
    pub const SIZE: NonZeroU64 = match NonZeroU64::new(size_of::<ViewportUniform>() as u64) {
        Some(n) => n,
        None => panic!("ViewportUniform is zero-sized"),
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { viewport: [width.max(1.0), height.max(1.0)], _pad: [0.0; 2] }
    }

    pub fn layout_entry() -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: Some(Self::SIZE),
            },
            count: None,
        }
    }
}

// ── unit quad ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct QuadVertex {
    pub pos: [f32; 2],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<QuadVertex>() as u64,
            step_mode:    wgpu::VertexStepMode::Vertex,
            attributes:   &Self::ATTRS,
        }
    }
}

pub(super) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

pub(super) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

pub(super) fn instanced_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bind_group_layout: &wgpu::BindGroupLayout,
    instance_layout: wgpu::VertexBufferLayout<'_>,
    format: wgpu::TextureFormat,
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
            module:              shader,
            entry_point:         Some("vs_main"),
            compilation_options: Default::default(),
            buffers:             &[QuadVertex::layout(), instance_layout],
        },
        fragment: Some(wgpu::FragmentState {
            module:              shader,
            entry_point:         Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend:      Some(premul_alpha_blend()),
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

/// Grows `buffer` to hold `required` instances of `stride` bytes.
/// Capacity is rounded to a power of two, minimum 64.
pub(super) fn ensure_instance_buffer(
    device: &wgpu::Device,
    label: &str,
    buffer: &mut Option<wgpu::Buffer>,
    capacity: &mut usize,
    required: usize,
    stride: usize,
) {
    if required <= *capacity && buffer.is_some() {
        return;
    }
    let cap = required.next_power_of_two().max(64);
    *buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
        label:              Some(label),
        size:               (cap * stride) as u64,
        usage:              wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    }));
    *capacity = cap;
}

// ── scissor ───────────────────────────────────────────────────────────────

/// Physical scissor `(x, y, w, h)` for a logical clip, clamped to the
/// viewport. `None` when nothing would be visible.
pub(super) fn scissor_for(clip: Option<Rect>, viewport: Viewport, scale: f32) -> Option<(u32, u32, u32, u32)> {
    let (vw, vh) = viewport.physical(scale);
    let Some(r) = clip else {
        return Some((0, 0, vw, vh));
    };

    let to_px = |v: f32, max: u32| ((v * scale).round().max(0.0) as u32).min(max);
    let x0 = to_px(r.origin.x, vw);
    let y0 = to_px(r.origin.y, vh);
    let x1 = to_px(r.right(), vw);
    let y1 = to_px(r.bottom(), vh);

    (x1 > x0 && y1 > y0).then_some((x0, y0, x1 - x0, y1 - y0))
}

/// Index ranges of consecutive instances sharing a clip.
pub(super) fn clip_runs(clips: &[Option<Rect>]) -> Vec<(std::ops::Range<u32>, Option<Rect>)> {
    let mut runs = Vec::new();
    let mut start = 0usize;
    for i in 1..=clips.len() {
        if i == clips.len() || clips[i] != clips[start] {
            runs.push((start as u32..i as u32, clips[start]));
            start = i;
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_clip_covers_viewport() {
        let vp = Viewport::new(100.0, 50.0);
        assert_eq!(scissor_for(None, vp, 2.0), Some((0, 0, 200, 100)));
    }

    #[test]
    fn clip_is_scaled_and_clamped() {
        let vp = Viewport::new(100.0, 50.0);
        let clip = Rect::new(90.0, -10.0, 40.0, 20.0);
        assert_eq!(scissor_for(Some(clip), vp, 1.0), Some((90, 0, 10, 10)));
    }

    #[test]
    fn empty_clip_skips_draw() {
        let vp = Viewport::new(100.0, 50.0);
        assert_eq!(scissor_for(Some(Rect::default()), vp, 1.0), None);
    }

    #[test]
    fn runs_group_equal_neighbours() {
        let a = Some(Rect::new(0.0, 0.0, 1.0, 1.0));
        let runs = clip_runs(&[None, None, a, a, None]);
        let ranges: Vec<_> = runs.iter().map(|(r, _)| r.clone()).collect();
        assert_eq!(ranges, vec![0..2, 2..4, 4..5]);
        assert!(clip_runs(&[]).is_empty());
    }
}
