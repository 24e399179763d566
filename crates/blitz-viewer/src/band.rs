use anyhow::Result;

use blitz_display::backend::UniformLocation;
use blitz_display::core::FrameCtx;
use blitz_display::device::WgpuBackend;
use blitz_display::frames::{Advance, FrameSource};
use blitz_display::render::RenderCtx;

use crate::cycle::{ColorCycle, BAND_UNIFORM};

/// Draws the band whose matrix [`ColorCycle`] commits to `BAND_UNIFORM`.
///
/// The pipeline is built lazily from the surface format and the blend state
/// the session configured, and rebuilt when either changes.
#[derive(Default)]
pub struct BandPainter {
    pipeline_key: Option<(wgpu::TextureFormat, Option<wgpu::BlendState>)>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,

    warned_depth: bool,
}

impl BandPainter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the band into the frame in flight, if any.
    pub fn paint(&mut self, backend: &mut WgpuBackend, location: UniformLocation) {
        if self.bind_group.is_none() {
            // Nothing to bind until the matrix has been uploaded once.
            let Some(uniform) = backend.uniform_buffer(location) else { return };
            let device = backend.gpu().device();
            let layout = self
                .bind_group_layout
                .get_or_insert_with(|| create_bind_group_layout(device));
            self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("blitz band bind group"),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                }],
            }));
        }

        let Some((ctx, mut target)) = backend.frame() else { return };
        if target.depth_view.is_some() {
            if !self.warned_depth {
                log::warn!("band pipeline has no depth state; run without a depth buffer");
                self.warned_depth = true;
            }
            return;
        }

        self.ensure_pipeline(&ctx);
        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };

        let mut pass = target.begin_pass("blitz band pass");
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..6, 0..1);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        let key = (ctx.surface_format, ctx.blend);
        if self.pipeline_key == Some(key) && self.pipeline.is_some() {
            return;
        }
        let Some(bind_group_layout) = self.bind_group_layout.as_ref() else { return };

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blitz band shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/band.wgsl").into()),
        });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("blitz band pipeline layout"),
                bind_group_layouts: &[bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blitz band pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: ctx.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("band pipeline built for {:?}", ctx.surface_format);
        self.pipeline_key = Some(key);
        self.pipeline = Some(pipeline);
    }
}

fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("blitz band bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// [`ColorCycle`] plus the band drawn on top of each cleared frame.
pub struct Letterbox {
    cycle: ColorCycle,
    band: BandPainter,
}

impl Letterbox {
    pub fn new(cycle: ColorCycle) -> Self {
        Self {
            cycle,
            band: BandPainter::new(),
        }
    }
}

impl FrameSource<WgpuBackend> for Letterbox {
    fn next_frame(&mut self, ctx: &mut FrameCtx<'_, WgpuBackend>) -> Result<Advance> {
        let advance = self.cycle.next_frame(ctx)?;
        if advance == Advance::Frame {
            self.band.paint(ctx.backend, BAND_UNIFORM);
        }
        Ok(advance)
    }
}
