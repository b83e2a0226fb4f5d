use std::sync::Arc;

use super::BufferStorage;
use crate::backend::{GpuBackend, ResourceState};
use crate::error::RhiResult;
use crate::executor::CommandStream;
use crate::resource::GpuResource;
use crate::shader::VertexLayout;

/// A buffer of vertices described by a [`VertexLayout`].
#[derive(Debug)]
pub struct VertexBuffer {
    storage: BufferStorage,
    num_vertices: u32,
    layout: VertexLayout,
}

impl VertexBuffer {
    /// Create a vertex buffer of `num_vertices` elements.
    ///
    /// Static buffers are uploaded through a staging copy and end in the
    /// vertex-and-constant-buffer state; `data` is then required.
    pub fn new(
        backend: &Arc<dyn GpuBackend>,
        stream: &mut CommandStream,
        num_vertices: u32,
        layout: VertexLayout,
        data: Option<&[u8]>,
        dynamic: bool,
    ) -> RhiResult<Self> {
        let size = u64::from(num_vertices) * u64::from(layout.stride());
        let storage = BufferStorage::new(
            backend,
            stream,
            size,
            data,
            dynamic,
            ResourceState::VERTEX_AND_CONSTANT_BUFFER,
            "vertex buffer",
        )?;
        log::trace!(
            "Created {} vertex buffer: {} vertices, stride {}",
            if dynamic { "dynamic" } else { "static" },
            num_vertices,
            layout.stride()
        );
        Ok(Self {
            storage,
            num_vertices,
            layout,
        })
    }

    pub fn num_vertices(&self) -> u32 {
        self.num_vertices
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn stride(&self) -> u32 {
        self.layout.stride()
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.storage.size
    }

    pub fn is_dynamic(&self) -> bool {
        self.storage.dynamic
    }

    pub fn resource(&self) -> &Arc<GpuResource> {
        self.storage.resource()
    }

    /// Whether a staging copy source is held.
    pub fn has_uploader(&self) -> bool {
        self.storage.has_uploader()
    }

    /// Rewrite the contents of a dynamic buffer.
    ///
    /// The caller must make sure the GPU is no longer reading the old data.
    pub fn update(&self, data: &[u8]) -> RhiResult<()> {
        self.storage.update(data)
    }
}

static_assertions::assert_impl_all!(VertexBuffer: Send, Sync);
