//! Draw submission through a single in-order command stream.
//!
//! The [`Executor`] owns the command stream, the current outputs and
//! bindings, the per-draw constant ring and the frame statistics. Bindings
//! recorded on the command list are lost when it is submitted; the executor
//! keeps the logical frame state and re-records whatever a draw needs.

mod stream;

pub use stream::CommandStream;

use std::sync::Arc;

use crate::backend::{
    GpuBackend, GpuCommand, NativeBindingLayout, RenderRect, ResourceState, ScissorRect,
};
use crate::buffer::{ConstantRing, IndexBuffer, RingAllocation, VertexBuffer};
use crate::config::DeviceConfig;
use crate::error::{RhiError, RhiResult};
use crate::pipeline::PipelineState;
use crate::resource::GpuResource;
use crate::shader::ShaderInstance;
use crate::texture::{DepthStencil, RenderTarget};

/// Draw statistics accumulated since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub faces: u32,
}

/// What the frame logically uses.
#[derive(Default)]
struct FrameState {
    render_targets: Vec<Arc<RenderTarget>>,
    depth_stencil: Option<Arc<DepthStencil>>,
    pipeline: Option<Arc<PipelineState>>,
    vertex_buffer: Option<Arc<VertexBuffer>>,
    index_buffer: Option<Arc<IndexBuffer>>,
    render_rect: Option<RenderRect>,
    scissor_rect: Option<ScissorRect>,
}

/// What is currently recorded on the open command list.
#[derive(Default)]
struct BoundState {
    outputs: bool,
    render_rect: bool,
    scissor_rect: bool,
    pipeline: Option<Arc<PipelineState>>,
    binding_layout: Option<NativeBindingLayout>,
    vertex_buffer: Option<Arc<VertexBuffer>>,
    index_buffer: Option<Arc<IndexBuffer>>,
}

fn same<T>(a: &Option<Arc<T>>, b: &Arc<T>) -> bool {
    a.as_ref().is_some_and(|a| Arc::ptr_eq(a, b))
}

/// Records draws into the command stream and submits them.
pub struct Executor {
    stream: CommandStream,
    frame: FrameState,
    bound: BoundState,
    stats: FrameStats,
    constants: ConstantRing,
}

impl Executor {
    pub fn new(backend: &Arc<dyn GpuBackend>, config: &DeviceConfig) -> RhiResult<Self> {
        Ok(Self {
            stream: CommandStream::new(backend)?,
            frame: FrameState::default(),
            bound: BoundState::default(),
            stats: FrameStats::default(),
            constants: ConstantRing::new(
                backend,
                config.constant_ring_size,
                config.constant_alignment,
            )?,
        })
    }

    /// The command stream, for recording resource initialization.
    pub fn stream_mut(&mut self) -> &mut CommandStream {
        &mut self.stream
    }

    pub fn constant_ring(&self) -> &ConstantRing {
        &self.constants
    }

    /// Transition a resource through the executor's stream.
    pub fn transition(&mut self, resource: &GpuResource, to: ResourceState) {
        resource.transition(&mut self.stream, to);
    }

    // Outputs

    /// Make `render_targets` the active color outputs.
    pub fn set_render_targets(&mut self, render_targets: Vec<Arc<RenderTarget>>) {
        self.frame.render_targets = render_targets;
        self.bind_outputs();
    }

    /// Make `depth_stencil` the active depth output.
    pub fn set_depth_stencil(&mut self, depth_stencil: Option<Arc<DepthStencil>>) {
        self.frame.depth_stencil = depth_stencil;
        self.bind_outputs();
    }

    /// Replace both color and depth outputs with one output-merger binding.
    pub fn set_outputs(
        &mut self,
        render_targets: Vec<Arc<RenderTarget>>,
        depth_stencil: Option<Arc<DepthStencil>>,
    ) {
        self.frame.render_targets = render_targets;
        self.frame.depth_stencil = depth_stencil;
        self.bind_outputs();
    }

    /// Forget the active outputs without recording anything.
    pub fn clear_outputs(&mut self) {
        self.frame.render_targets.clear();
        self.frame.depth_stencil = None;
        self.bound.outputs = false;
    }

    pub fn current_render_targets(&self) -> &[Arc<RenderTarget>] {
        &self.frame.render_targets
    }

    pub fn current_depth_stencil(&self) -> Option<&Arc<DepthStencil>> {
        self.frame.depth_stencil.as_ref()
    }

    /// Pipeline of the most recent draw.
    pub fn current_pipeline(&self) -> Option<&Arc<PipelineState>> {
        self.frame.pipeline.as_ref()
    }

    fn bind_outputs(&mut self) {
        for target in &self.frame.render_targets {
            target
                .resource()
                .transition_if_needed(&mut self.stream, ResourceState::RENDER_TARGET);
        }
        if let Some(depth) = &self.frame.depth_stencil {
            depth
                .resource()
                .transition_if_needed(&mut self.stream, ResourceState::DEPTH_WRITE);
        }
        self.stream.record(GpuCommand::SetRenderTargets {
            render_targets: self
                .frame
                .render_targets
                .iter()
                .map(|rt| rt.render_target_view().handle())
                .collect(),
            depth_stencil: self
                .frame
                .depth_stencil
                .as_ref()
                .map(|ds| ds.depth_stencil_view().handle()),
        });
        self.bound.outputs = true;
    }

    pub fn set_render_rect(&mut self, rect: RenderRect) {
        self.frame.render_rect = Some(rect);
        self.stream.record(GpuCommand::SetViewport(rect));
        self.bound.render_rect = true;
    }

    pub fn set_scissor_rect(&mut self, rect: ScissorRect) {
        self.frame.scissor_rect = Some(rect);
        self.stream.record(GpuCommand::SetScissorRect(rect));
        self.bound.scissor_rect = true;
    }

    pub fn clear_render_target(&mut self, target: &RenderTarget, color: [f32; 4]) {
        target
            .resource()
            .transition_if_needed(&mut self.stream, ResourceState::RENDER_TARGET);
        self.stream.record(GpuCommand::ClearRenderTarget {
            view: target.render_target_view().handle(),
            color,
        });
    }

    pub fn clear_depth_stencil(&mut self, target: &DepthStencil, depth: f32, stencil: u8) {
        target
            .resource()
            .transition_if_needed(&mut self.stream, ResourceState::DEPTH_WRITE);
        self.stream.record(GpuCommand::ClearDepthStencil {
            view: target.depth_stencil_view().handle(),
            depth,
            stencil,
        });
    }

    // Bindings

    /// Make `pipeline` current, compiling it if needed.
    pub fn set_pipeline_state(&mut self, pipeline: &Arc<PipelineState>) -> RhiResult<()> {
        pipeline.create()?;
        self.frame.pipeline = Some(Arc::clone(pipeline));
        self.bind_pipeline()
    }

    fn bind_pipeline(&mut self) -> RhiResult<()> {
        let Some(pipeline) = self.frame.pipeline.clone() else {
            return Ok(());
        };
        if same(&self.bound.pipeline, &pipeline) {
            return Ok(());
        }
        let native = pipeline.create()?;
        self.stream.record(GpuCommand::SetPipelineState(native));
        let layout = pipeline.binding_layout().handle();
        if self.bound.binding_layout != Some(layout) {
            self.stream.record(GpuCommand::SetBindingLayout(layout));
            self.bound.binding_layout = Some(layout);
        }
        self.bound.pipeline = Some(pipeline);
        Ok(())
    }

    pub fn set_vertex_buffer(&mut self, buffer: &Arc<VertexBuffer>) {
        self.frame.vertex_buffer = Some(Arc::clone(buffer));
        self.bind_vertex_buffer();
    }

    fn bind_vertex_buffer(&mut self) {
        let Some(buffer) = self.frame.vertex_buffer.clone() else {
            return;
        };
        if same(&self.bound.vertex_buffer, &buffer) {
            return;
        }
        self.stream.record(GpuCommand::SetVertexBuffer {
            resource: buffer.resource().handle(),
            size: buffer.size(),
            stride: buffer.stride(),
        });
        self.bound.vertex_buffer = Some(buffer);
    }

    pub fn set_index_buffer(&mut self, buffer: &Arc<IndexBuffer>) {
        self.frame.index_buffer = Some(Arc::clone(buffer));
        self.bind_index_buffer();
    }

    fn bind_index_buffer(&mut self) {
        let Some(buffer) = self.frame.index_buffer.clone() else {
            return;
        };
        if same(&self.bound.index_buffer, &buffer) {
            return;
        }
        self.stream.record(GpuCommand::SetIndexBuffer {
            resource: buffer.resource().handle(),
            size: buffer.size(),
            format: buffer.format(),
        });
        self.bound.index_buffer = Some(buffer);
    }

    /// Re-record any frame state the open command list has lost.
    fn rebind(&mut self) -> RhiResult<()> {
        if !self.bound.outputs
            && (!self.frame.render_targets.is_empty() || self.frame.depth_stencil.is_some())
        {
            self.bind_outputs();
        }
        if !self.bound.render_rect {
            if let Some(rect) = self.frame.render_rect {
                self.set_render_rect(rect);
            }
        }
        if !self.bound.scissor_rect {
            if let Some(rect) = self.frame.scissor_rect {
                self.set_scissor_rect(rect);
            }
        }
        self.bind_pipeline()?;
        self.bind_vertex_buffer();
        self.bind_index_buffer();
        Ok(())
    }

    // Drawing

    /// Record an indexed draw of `instance` with the current bindings.
    ///
    /// Every declared constant buffer is copied into the constant ring and
    /// bound by offset. Bound textures are made shader readable first.
    pub fn draw_shader_instance(
        &mut self,
        instance: &ShaderInstance,
        num_indices: u32,
        base_index: u32,
        base_vertex: i32,
    ) -> RhiResult<()> {
        if self.frame.pipeline.is_none() {
            return Err(RhiError::InvalidParameter(
                "draw without a pipeline state".to_string(),
            ));
        }

        let shader = instance.shader();
        let layout = shader.uniform_layout();

        let payloads: Vec<(u32, &[u8])> = layout
            .constant_buffers()
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(register, _)| {
                let register = register as u32;
                (
                    layout.constant_buffer_root_index(register),
                    bytemuck::cast_slice(instance.constant_buffer_data(register)),
                )
            })
            .collect();
        let allocations = self.allocate_constants(&payloads)?;
        for ((_, data), allocation) in payloads.iter().zip(&allocations) {
            self.constants.write(*allocation, data)?;
        }

        self.rebind()?;

        for (&(root_index, _), allocation) in payloads.iter().zip(&allocations) {
            self.stream.record(GpuCommand::SetConstantBuffer {
                root_index,
                resource: self.constants.handle(),
                offset: allocation.offset,
            });
        }

        for (register, texture) in instance.textures().iter().enumerate() {
            let Some(texture) = texture else {
                continue;
            };
            let texture = texture.texture();
            let Some(view) = texture.shader_resource_view() else {
                log::warn!("Texture {:?} has no shader-resource view", texture.label());
                continue;
            };
            texture
                .resource()
                .transition_if_needed(&mut self.stream, ResourceState::PIXEL_SHADER_RESOURCE);
            self.stream.record(GpuCommand::SetShaderResource {
                root_index: layout.texture_root_index(register as u32),
                view: view.handle(),
            });
        }

        self.stream.record(GpuCommand::DrawIndexed {
            index_count: num_indices,
            start_index: base_index,
            base_vertex,
        });
        self.stats.draw_calls += 1;
        self.stats.faces += num_indices / 3;
        Ok(())
    }

    /// Reserve ring space for every payload of one draw, flushing and
    /// rewinding the ring when it is full.
    fn allocate_constants(&mut self, payloads: &[(u32, &[u8])]) -> RhiResult<Vec<RingAllocation>> {
        if let Some(allocations) = self.try_allocate_constants(payloads) {
            return Ok(allocations);
        }
        log::debug!("Constant ring full, flushing mid-frame");
        self.submit()?;
        self.wait_idle()?;
        self.constants.reset();
        self.try_allocate_constants(payloads).ok_or_else(|| {
            let total: usize = payloads.iter().map(|(_, data)| data.len()).sum();
            RhiError::InvalidParameter(format!(
                "{} bytes of constants exceed the constant ring capacity of {}",
                total,
                self.constants.capacity()
            ))
        })
    }

    fn try_allocate_constants(&mut self, payloads: &[(u32, &[u8])]) -> Option<Vec<RingAllocation>> {
        payloads
            .iter()
            .map(|(_, data)| self.constants.allocate(data.len() as u64))
            .collect()
    }

    // Statistics

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn clear_stats(&mut self) {
        self.stats = FrameStats::default();
    }

    // Submission

    /// Execute everything recorded so far. Returns the fence value that marks
    /// its completion.
    pub fn submit(&mut self) -> RhiResult<u64> {
        let value = self.stream.submit()?;
        self.bound = BoundState::default();
        Ok(value)
    }

    /// Block until the GPU reaches `value`.
    pub fn wait_for(&self, value: u64) -> RhiResult<()> {
        self.stream.wait_for(value)
    }

    /// Block until all submitted work has finished.
    pub fn wait_idle(&self) -> RhiResult<()> {
        self.stream.wait_for(self.stream.last_signaled())
    }

    /// Submit, wait for the GPU and rewind the constant ring.
    pub fn finish_frame(&mut self) -> RhiResult<u64> {
        let value = self.submit()?;
        self.wait_for(value)?;
        self.constants.reset();
        Ok(value)
    }
}
