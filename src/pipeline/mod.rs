//! Pipeline state objects and their cache.

mod cache;

pub use cache::{PipelineCacheStats, PipelineStateCache};

use std::sync::Arc;

use bitflags::bitflags;
use parking_lot::Mutex;

use crate::backend::{
    BindingLayoutDesc, GpuBackend, NativePipeline, PipelineStateDesc, PixelFormat,
};
use crate::error::RhiResult;
use crate::shader::{BindingLayout, Shader, ShaderStageId, VertexLayout};

bitflags! {
    /// Fixed-function state baked into a pipeline.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderState: u32 {
        /// Test fragments against the depth buffer.
        const DEPTH_TEST = 1 << 0;
        /// Write passing fragments' depth.
        const DEPTH_WRITE = 1 << 1;
        /// Source-alpha blending.
        const ALPHA_BLEND = 1 << 2;
        /// Wireframe fill.
        const WIREFRAME = 1 << 3;
        /// Disable back-face culling.
        const CULL_NONE = 1 << 4;
        /// Cull front faces instead of back faces.
        const CULL_FRONT = 1 << 5;
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::DEPTH_TEST | Self::DEPTH_WRITE
    }
}

/// Structural identity of a pipeline state object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub vertex_shader: ShaderStageId,
    pub pixel_shader: ShaderStageId,
    pub vertex_layout: VertexLayout,
    /// Root signature shape of the shader's uniform layout.
    pub binding_layout: BindingLayoutDesc,
    pub render_target_formats: Vec<PixelFormat>,
    pub depth_stencil_format: Option<PixelFormat>,
    pub render_state: RenderState,
}

/// A pipeline state object for one [`PipelineKey`].
///
/// The native object is compiled by [`create`](Self::create) and released
/// when the state is dropped.
pub struct PipelineState {
    backend: Arc<dyn GpuBackend>,
    key: PipelineKey,
    shader: Arc<Shader>,
    binding_layout: Arc<BindingLayout>,
    compiled: Mutex<Option<NativePipeline>>,
}

impl PipelineState {
    /// Describe a pipeline for `shader` with the targets and layout of `key`.
    pub fn new(
        backend: &Arc<dyn GpuBackend>,
        key: PipelineKey,
        shader: Arc<Shader>,
        binding_layout: Arc<BindingLayout>,
    ) -> Self {
        debug_assert_eq!(key.binding_layout, binding_layout.desc());
        Self {
            backend: Arc::clone(backend),
            key,
            shader,
            binding_layout,
            compiled: Mutex::new(None),
        }
    }

    /// Compile the native pipeline if needed and return it.
    pub fn create(&self) -> RhiResult<NativePipeline> {
        let mut compiled = self.compiled.lock();
        if let Some(pipeline) = *compiled {
            return Ok(pipeline);
        }
        let desc = PipelineStateDesc {
            vertex_shader: Arc::clone(self.shader.vertex_stage().bytecode()),
            pixel_shader: Arc::clone(self.shader.pixel_stage().bytecode()),
            input_layout: self.key.vertex_layout.elements().to_vec(),
            binding_layout: self.binding_layout.handle(),
            render_target_formats: self.key.render_target_formats.clone(),
            depth_stencil_format: self.key.depth_stencil_format,
            render_state: self.key.render_state,
        };
        let pipeline = self.backend.create_pipeline_state(&desc)?;
        log::debug!(
            "Compiled pipeline {:?} for shader {:?} ({} targets, depth {:?}, {:?})",
            pipeline,
            self.shader.label(),
            self.key.render_target_formats.len(),
            self.key.depth_stencil_format,
            self.key.render_state
        );
        *compiled = Some(pipeline);
        Ok(pipeline)
    }

    /// The compiled native pipeline, if [`create`](Self::create) succeeded.
    pub fn native(&self) -> Option<NativePipeline> {
        *self.compiled.lock()
    }

    pub fn key(&self) -> &PipelineKey {
        &self.key
    }

    pub fn shader(&self) -> &Arc<Shader> {
        &self.shader
    }

    pub fn binding_layout(&self) -> &Arc<BindingLayout> {
        &self.binding_layout
    }
}

impl Drop for PipelineState {
    fn drop(&mut self) {
        if let Some(pipeline) = self.compiled.get_mut().take() {
            self.backend.release_pipeline_state(pipeline);
        }
    }
}

impl std::fmt::Debug for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineState")
            .field("key", &self.key)
            .field("compiled", &self.native())
            .finish()
    }
}

static_assertions::assert_impl_all!(PipelineState: Send, Sync);
