use std::sync::Arc;

use super::BufferStorage;
use crate::backend::{GpuBackend, IndexFormat, ResourceState};
use crate::error::RhiResult;
use crate::executor::CommandStream;
use crate::resource::GpuResource;

/// A buffer of 16- or 32-bit indices.
#[derive(Debug)]
pub struct IndexBuffer {
    storage: BufferStorage,
    num_indices: u32,
    format: IndexFormat,
}

impl IndexBuffer {
    /// Create an index buffer of `num_indices` elements.
    pub fn new(
        backend: &Arc<dyn GpuBackend>,
        stream: &mut CommandStream,
        num_indices: u32,
        format: IndexFormat,
        data: Option<&[u8]>,
        dynamic: bool,
    ) -> RhiResult<Self> {
        let size = u64::from(num_indices) * u64::from(format.size());
        let storage = BufferStorage::new(
            backend,
            stream,
            size,
            data,
            dynamic,
            ResourceState::INDEX_BUFFER,
            "index buffer",
        )?;
        log::trace!(
            "Created {} index buffer: {} indices ({:?})",
            if dynamic { "dynamic" } else { "static" },
            num_indices,
            format
        );
        Ok(Self {
            storage,
            num_indices,
            format,
        })
    }

    pub fn num_indices(&self) -> u32 {
        self.num_indices
    }

    pub fn format(&self) -> IndexFormat {
        self.format
    }

    pub fn size(&self) -> u64 {
        self.storage.size
    }

    pub fn is_dynamic(&self) -> bool {
        self.storage.dynamic
    }

    pub fn resource(&self) -> &Arc<GpuResource> {
        self.storage.resource()
    }

    /// Rewrite the contents of a dynamic buffer.
    pub fn update(&self, data: &[u8]) -> RhiResult<()> {
        self.storage.update(data)
    }
}

static_assertions::assert_impl_all!(IndexBuffer: Send, Sync);
