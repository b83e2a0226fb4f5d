//! Structural cache of pipeline state objects.

use std::collections::HashMap;
use std::sync::Arc;

use super::{PipelineKey, PipelineState, RenderState};
use crate::backend::{BindingLayoutDesc, GpuBackend};
use crate::error::RhiResult;
use crate::shader::{BindingLayout, Shader, VertexLayout};
use crate::texture::{DepthStencil, RenderTarget};

/// Hit and miss counters of a [`PipelineStateCache`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineCacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Maps [`PipelineKey`]s to compiled pipeline states.
///
/// Identical keys never compile twice. A failed compile leaves no entry.
/// Binding layouts are built once per [`BindingLayoutDesc`] and shared by
/// every pipeline with that shape.
pub struct PipelineStateCache {
    backend: Arc<dyn GpuBackend>,
    entries: HashMap<PipelineKey, Arc<PipelineState>>,
    binding_layouts: HashMap<BindingLayoutDesc, Arc<BindingLayout>>,
    stats: PipelineCacheStats,
}

impl PipelineStateCache {
    pub fn new(backend: &Arc<dyn GpuBackend>) -> Self {
        Self {
            backend: Arc::clone(backend),
            entries: HashMap::new(),
            binding_layouts: HashMap::new(),
            stats: PipelineCacheStats::default(),
        }
    }

    /// Look up or compile the pipeline for this shader, input layout,
    /// output set and render state.
    pub fn get(
        &mut self,
        shader: &Arc<Shader>,
        vertex_layout: &VertexLayout,
        render_targets: &[Arc<RenderTarget>],
        depth_stencil: Option<&Arc<DepthStencil>>,
        render_state: RenderState,
    ) -> RhiResult<Arc<PipelineState>> {
        let key = PipelineKey {
            vertex_shader: shader.vertex_stage().id(),
            pixel_shader: shader.pixel_stage().id(),
            vertex_layout: vertex_layout.clone(),
            binding_layout: shader.uniform_layout().binding_layout_desc(),
            render_target_formats: render_targets.iter().map(|rt| rt.format()).collect(),
            depth_stencil_format: depth_stencil.map(|ds| ds.format()),
            render_state,
        };

        if let Some(pipeline) = self.entries.get(&key) {
            self.stats.hits += 1;
            log::trace!("Pipeline cache hit for shader {:?}", shader.label());
            return Ok(Arc::clone(pipeline));
        }

        self.stats.misses += 1;
        log::trace!("Pipeline cache miss for shader {:?}", shader.label());
        let binding_layout = self.binding_layout(key.binding_layout)?;
        let pipeline =
            PipelineState::new(&self.backend, key.clone(), Arc::clone(shader), binding_layout);
        pipeline.create()?;
        let pipeline = Arc::new(pipeline);
        self.entries.insert(key, Arc::clone(&pipeline));
        Ok(pipeline)
    }

    /// The shared binding layout for `desc`, created on first use.
    pub fn binding_layout(&mut self, desc: BindingLayoutDesc) -> RhiResult<Arc<BindingLayout>> {
        if let Some(layout) = self.binding_layouts.get(&desc) {
            return Ok(Arc::clone(layout));
        }
        let layout = Arc::new(BindingLayout::new(&self.backend, desc)?);
        self.binding_layouts.insert(desc, Arc::clone(&layout));
        Ok(layout)
    }

    /// Number of distinct binding layouts built so far.
    pub fn binding_layout_count(&self) -> usize {
        self.binding_layouts.len()
    }

    /// Evict every pipeline. Later lookups rebuild lazily. Binding layouts
    /// depend only on shape and are kept.
    pub fn clear(&mut self) {
        log::debug!("Clearing {} cached pipelines", self.entries.len());
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> PipelineCacheStats {
        self.stats
    }
}
