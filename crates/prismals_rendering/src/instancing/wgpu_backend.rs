//! wgpu implementation of [`InstanceBackend`].
//!
//! Buffer growth and uploads go straight to the device and queue. Draws are
//! queued and replayed into a render pass by the owner of the pass, because
//! a `wgpu::RenderPass` borrows every buffer it binds for its whole lifetime.

use std::sync::Arc;

use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::pipeline::FrameUniforms;

use super::backend::{DrawCall, DrawKind, InstanceBackend};
use super::behavior::RenderBehavior;
use super::buffer::BufferSlot;
use super::instance_data::{BranchInstanceRecord, InstanceRecord, StarRecord};

/// Render pipelines for every bucket plus the star point list.
pub struct BehaviorPipelines {
    blocks: Vec<wgpu::RenderPipeline>,
    stars: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
}

impl BehaviorPipelines {
    /// Returns the WGSL source shared by all block and star pipelines.
    #[must_use]
    pub fn shader_source() -> &'static str {
        include_str!("../../shaders/blocks.wgsl")
    }

    /// Builds all pipelines for the given target formats.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Block Shader"),
            source: wgpu::ShaderSource::Wgsl(Self::shader_source().into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Block Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let build = |label: &str,
                     vs: &str,
                     fs: &str,
                     buffer: wgpu::VertexBufferLayout<'static>,
                     topology: wgpu::PrimitiveTopology,
                     blend: wgpu::BlendState,
                     depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: vs,
                    buffers: &[buffer],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: fs,
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
                    format,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            })
        };

        let tri = wgpu::PrimitiveTopology::TriangleList;
        let blocks = RenderBehavior::ALL
            .iter()
            .map(|behavior| match behavior {
                RenderBehavior::StaticDefault => build(
                    "Static Default",
                    "vs_static",
                    "fs_block",
                    InstanceRecord::desc(),
                    tri,
                    wgpu::BlendState::REPLACE,
                    true,
                ),
                RenderBehavior::AnimatedWater => build(
                    "Animated Water",
                    "vs_water",
                    "fs_block",
                    InstanceRecord::desc(),
                    tri,
                    wgpu::BlendState::ALPHA_BLENDING,
                    true,
                ),
                RenderBehavior::AnimatedWireframe => build(
                    "Animated Wireframe",
                    "vs_wireframe",
                    "fs_wireframe",
                    InstanceRecord::desc(),
                    tri,
                    wgpu::BlendState::REPLACE,
                    true,
                ),
                RenderBehavior::StaticBranch => build(
                    "Static Branch",
                    "vs_branch",
                    "fs_block",
                    BranchInstanceRecord::desc(),
                    tri,
                    wgpu::BlendState::REPLACE,
                    true,
                ),
                RenderBehavior::AnimatedTransparentWave => build(
                    "Transparent Wave",
                    "vs_wave",
                    "fs_block",
                    InstanceRecord::desc(),
                    tri,
                    wgpu::BlendState::ALPHA_BLENDING,
                    false,
                ),
            })
            .collect();

        let stars = build(
            "Stars",
            "vs_star",
            "fs_star",
            StarRecord::desc(),
            wgpu::PrimitiveTopology::PointList,
            wgpu::BlendState::REPLACE,
            false,
        );

        Self {
            blocks,
            stars,
            uniform_layout,
        }
    }

    /// Layout of the frame uniform bind group (group 0).
    #[must_use]
    pub fn uniform_layout(&self) -> &wgpu::BindGroupLayout {
        &self.uniform_layout
    }

    fn pipeline_for(&self, slot: BufferSlot) -> &wgpu::RenderPipeline {
        match slot {
            BufferSlot::Behavior(b) => &self.blocks[b.index()],
            BufferSlot::Stars => &self.stars,
        }
    }
}

/// [`InstanceBackend`] over a wgpu device.
pub struct WgpuInstanceBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    buffers: [Option<wgpu::Buffer>; BufferSlot::COUNT],
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    pending: Vec<DrawCall>,
}

impl WgpuInstanceBackend {
    /// Creates a backend whose uniform bind group matches `pipelines`.
    #[must_use]
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>, pipelines: &BehaviorPipelines) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: FrameUniforms::SIZE as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Uniform Bind Group"),
            layout: pipelines.uniform_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            device,
            queue,
            buffers: std::array::from_fn(|_| None),
            uniform_buffer,
            uniform_bind_group,
            pending: Vec::new(),
        }
    }

    /// Drops draws queued by the previous frame.
    pub fn begin_frame(&mut self) {
        self.pending.clear();
    }

    /// Uploads this frame's uniforms.
    pub fn write_uniforms(&self, uniforms: &FrameUniforms) {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Draws queued since [`Self::begin_frame`].
    #[must_use]
    pub fn pending(&self) -> &[DrawCall] {
        &self.pending
    }

    /// Records every queued draw into `pass`.
    pub fn replay<'p>(&'p self, pass: &mut wgpu::RenderPass<'p>, pipelines: &'p BehaviorPipelines) {
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        for call in &self.pending {
            let Some(buffer) = &self.buffers[call.slot.index()] else {
                continue;
            };
            pass.set_pipeline(pipelines.pipeline_for(call.slot));
            pass.set_vertex_buffer(0, buffer.slice(..));
            match call.kind {
                DrawKind::Cubes => pass.draw(0..call.vertex_count, 0..call.instance_count),
                DrawKind::Points => pass.draw(0..call.vertex_count, 0..1),
            }
        }
    }
}

impl InstanceBackend for WgpuInstanceBackend {
    fn ensure_capacity(&mut self, slot: BufferSlot, bytes: u64) -> RenderResult<()> {
        let size = bytes.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        if size > self.device.limits().max_buffer_size {
            return Err(RenderError::Backend {
                slot: slot.to_string(),
                reason: format!("{size} bytes exceeds the device buffer limit"),
            });
        }
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        debug!(%slot, size, "allocated instance buffer");
        self.buffers[slot.index()] = Some(buffer);
        Ok(())
    }

    fn upload(&mut self, slot: BufferSlot, data: &[u8]) -> RenderResult<()> {
        let buffer = self.buffers[slot.index()]
            .as_ref()
            .ok_or_else(|| RenderError::MissingBuffer(slot.to_string()))?;
        if data.len() as u64 > buffer.size() {
            return Err(RenderError::Backend {
                slot: slot.to_string(),
                reason: format!("upload of {} bytes exceeds buffer size {}", data.len(), buffer.size()),
            });
        }
        self.queue.write_buffer(buffer, 0, data);
        Ok(())
    }

    fn draw(&mut self, call: DrawCall) -> RenderResult<()> {
        if self.buffers[call.slot.index()].is_none() {
            return Err(RenderError::MissingBuffer(call.slot.to_string()));
        }
        self.pending.push(call);
        Ok(())
    }
}
