//! The device: adapter selection, resource factories and draw entry points.

use std::sync::Arc;

use raw_window_handle::RawWindowHandle;

use crate::backend::{
    AdapterInfo, DeviceArchitecture, GpuBackend, IndexFormat, PixelFormat, RenderRect,
    ScissorRect,
};
use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::config::DeviceConfig;
use crate::descriptor::DescriptorAllocator;
use crate::error::{RhiError, RhiResult};
use crate::executor::{Executor, FrameStats};
use crate::pipeline::{PipelineStateCache, RenderState};
use crate::shader::{
    CompiledShaderStage, InputSemantic, NagaCompiler, Shader, ShaderCompiler, ShaderDescriptor,
    ShaderInstance, ShaderStage, VertexLayout,
};
use crate::texture::{DepthStencil, RenderTarget, Texture2D, TextureDescriptor};
use crate::viewport::Viewport;

/// Composition root of the RHI.
///
/// Owns the descriptor tables, the pipeline cache and the executor. All
/// recording goes through `&mut Device` on one thread.
pub struct Device {
    backend: Arc<dyn GpuBackend>,
    config: DeviceConfig,
    adapter: AdapterInfo,
    architecture: DeviceArchitecture,
    allocator: Arc<DescriptorAllocator>,
    pipelines: PipelineStateCache,
    executor: Executor,
    compiler: Box<dyn ShaderCompiler>,
}

impl Device {
    /// Open a device on the first adapter that is neither a software
    /// rasterizer nor a unified-memory GPU.
    pub fn new(backend: Arc<dyn GpuBackend>, config: DeviceConfig) -> RhiResult<Self> {
        log::info!("Creating device on {} backend", backend.name());
        if config.debug_layer {
            log::debug!("Enabling backend validation layer");
            backend.enable_validation();
        }

        let (adapter, architecture) = select_adapter(backend.as_ref())?;
        log::info!(
            "Using adapter '{}' ({}, {:?})",
            adapter.name,
            adapter.vendor,
            adapter.device_type
        );

        let allocator = DescriptorAllocator::new(&backend, config.descriptor_capacities)?;
        let pipelines = PipelineStateCache::new(&backend);
        let executor = Executor::new(&backend, &config)?;

        Ok(Self {
            backend,
            config,
            adapter,
            architecture,
            allocator,
            pipelines,
            executor,
            compiler: Box::new(NagaCompiler::new()),
        })
    }

    /// Replace the shader compiler.
    pub fn with_compiler(mut self, compiler: impl ShaderCompiler + 'static) -> Self {
        self.compiler = Box::new(compiler);
        self
    }

    pub fn backend(&self) -> &Arc<dyn GpuBackend> {
        &self.backend
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn adapter_info(&self) -> &AdapterInfo {
        &self.adapter
    }

    pub fn architecture(&self) -> DeviceArchitecture {
        self.architecture
    }

    pub fn descriptor_allocator(&self) -> &Arc<DescriptorAllocator> {
        &self.allocator
    }

    pub fn pipeline_cache(&self) -> &PipelineStateCache {
        &self.pipelines
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut Executor {
        &mut self.executor
    }

    // Factories

    /// Create a swapchain-backed viewport for `window`.
    pub fn create_viewport(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        window: RawWindowHandle,
    ) -> RhiResult<Viewport> {
        Viewport::new(
            &self.backend,
            &self.allocator,
            window,
            width,
            height,
            format,
            self.config.back_buffer_count,
            self.config.sync_interval,
        )
    }

    /// Compile the `VS` or `PS` entry point of `source`.
    pub fn create_shader_stage(
        &self,
        source: &str,
        stage: ShaderStage,
    ) -> RhiResult<Arc<CompiledShaderStage>> {
        match self.compiler.compile(source, stage) {
            Ok(bytecode) => {
                log::debug!("Compiled {:?} stage ({} bytes)", stage, bytecode.len());
                Ok(Arc::new(CompiledShaderStage::from_bytecode(stage, bytecode)))
            }
            Err(err) => {
                log::error!("{err}");
                Err(err)
            }
        }
    }

    pub fn create_shader(&self, descriptor: ShaderDescriptor) -> RhiResult<Arc<Shader>> {
        let shader = Shader::new(descriptor)?;
        log::trace!(
            "Created shader {:?} with {} parameters",
            shader.label(),
            shader.parameters().len()
        );
        Ok(Arc::new(shader))
    }

    pub fn create_shader_instance(&self, shader: &Arc<Shader>) -> ShaderInstance {
        ShaderInstance::new(Arc::clone(shader))
    }

    /// Create a vertex buffer whose layout follows `semantics`.
    pub fn create_vertex_buffer(
        &mut self,
        num_vertices: u32,
        semantics: &[InputSemantic],
        data: Option<&[u8]>,
        dynamic: bool,
    ) -> RhiResult<Arc<VertexBuffer>> {
        self.create_vertex_buffer_with_layout(
            num_vertices,
            VertexLayout::from_semantics(semantics),
            data,
            dynamic,
        )
    }

    /// Create a vertex buffer with an explicit layout.
    pub fn create_vertex_buffer_with_layout(
        &mut self,
        num_vertices: u32,
        layout: VertexLayout,
        data: Option<&[u8]>,
        dynamic: bool,
    ) -> RhiResult<Arc<VertexBuffer>> {
        if layout.is_empty() {
            return Err(RhiError::InvalidParameter(
                "vertex layout has no elements".to_string(),
            ));
        }
        Ok(Arc::new(VertexBuffer::new(
            &self.backend,
            self.executor.stream_mut(),
            num_vertices,
            layout,
            data,
            dynamic,
        )?))
    }

    pub fn create_index_buffer(
        &mut self,
        num_indices: u32,
        format: IndexFormat,
        data: Option<&[u8]>,
        dynamic: bool,
    ) -> RhiResult<Arc<IndexBuffer>> {
        Ok(Arc::new(IndexBuffer::new(
            &self.backend,
            self.executor.stream_mut(),
            num_indices,
            format,
            data,
            dynamic,
        )?))
    }

    /// Create a sampled texture from tightly packed pixel rows.
    pub fn create_texture(
        &mut self,
        desc: &TextureDescriptor,
        data: &[u8],
    ) -> RhiResult<Arc<Texture2D>> {
        Ok(Arc::new(Texture2D::new(
            &self.backend,
            &self.allocator,
            self.executor.stream_mut(),
            desc,
            data,
        )?))
    }

    pub fn create_render_target(&self, desc: &TextureDescriptor) -> RhiResult<Arc<RenderTarget>> {
        Ok(Arc::new(RenderTarget::new(&self.backend, &self.allocator, desc)?))
    }

    pub fn create_depth_stencil(
        &mut self,
        desc: &TextureDescriptor,
    ) -> RhiResult<Arc<DepthStencil>> {
        Ok(Arc::new(DepthStencil::new(
            &self.backend,
            &self.allocator,
            self.executor.stream_mut(),
            desc,
        )?))
    }

    // Drawing

    /// Draw `num_indices` indices of `index_buffer` with `instance`.
    ///
    /// The pipeline is looked up from the instance's shader, the vertex
    /// layout, the active outputs and `render_state`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_indexed(
        &mut self,
        instance: &ShaderInstance,
        vertex_buffer: &Arc<VertexBuffer>,
        index_buffer: &Arc<IndexBuffer>,
        render_state: RenderState,
        num_indices: u32,
        base_index: u32,
        base_vertex: i32,
    ) -> RhiResult<()> {
        let pipeline = self.pipelines.get(
            instance.shader(),
            vertex_buffer.layout(),
            self.executor.current_render_targets(),
            self.executor.current_depth_stencil(),
            render_state,
        )?;
        self.executor.set_pipeline_state(&pipeline)?;
        self.executor.set_vertex_buffer(vertex_buffer);
        self.executor.set_index_buffer(index_buffer);
        self.executor
            .draw_shader_instance(instance, num_indices, base_index, base_vertex)
    }

    /// Bind the color targets and optional depth target.
    pub fn set_outputs(
        &mut self,
        render_targets: &[Arc<RenderTarget>],
        depth_stencil: Option<&Arc<DepthStencil>>,
    ) {
        self.executor
            .set_outputs(render_targets.to_vec(), depth_stencil.cloned());
    }

    pub fn set_render_rect(&mut self, rect: RenderRect) {
        self.executor.set_render_rect(rect);
    }

    pub fn set_scissor_rect(&mut self, rect: ScissorRect) {
        self.executor.set_scissor_rect(rect);
    }

    pub fn clear_render_target(&mut self, target: &RenderTarget, color: [f32; 4]) {
        self.executor.clear_render_target(target, color);
    }

    pub fn clear_depth_stencil(&mut self, target: &DepthStencil, depth: f32, stencil: u8) {
        self.executor.clear_depth_stencil(target, depth, stencil);
    }

    /// Statistics since the last call.
    pub fn get_and_clear_stats(&mut self) -> FrameStats {
        let stats = self.executor.stats();
        self.executor.clear_stats();
        stats
    }

    /// Drop every cached pipeline so the next draws rebuild them.
    pub fn reload_shaders(&mut self) {
        log::info!("Reloading shaders");
        self.pipelines.clear();
    }

    /// Submit recorded work, wait for it and rewind per-frame allocations.
    pub fn end_frame(&mut self) -> RhiResult<()> {
        self.executor.finish_frame()?;
        Ok(())
    }

    pub fn wait_idle(&self) -> RhiResult<()> {
        self.executor.wait_idle()
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if let Err(err) = self.executor.wait_idle() {
            log::error!("Failed to wait for the GPU on device drop: {err}");
        }
        self.backend.close_device();
    }
}

fn select_adapter(backend: &dyn GpuBackend) -> RhiResult<(AdapterInfo, DeviceArchitecture)> {
    for (index, info) in backend.enumerate_adapters().into_iter().enumerate() {
        if info.is_software() {
            log::debug!("Skipping software adapter '{}'", info.name);
            continue;
        }
        let architecture = match backend.open_device(index) {
            Ok(architecture) => architecture,
            Err(err) => {
                log::debug!("Skipping adapter '{}': {}", info.name, err);
                continue;
            }
        };
        if architecture.unified_memory {
            log::debug!("Skipping unified-memory adapter '{}'", info.name);
            backend.close_device();
            continue;
        }
        return Ok((info, architecture));
    }
    log::error!("No discrete hardware adapter available");
    Err(RhiError::NoSuitableAdapter)
}

static_assertions::assert_impl_all!(Device: Send, Sync);
