//! Vertex, index and constant buffers.
//!
//! Static buffers live on the default heap and are filled once through an
//! upload-heap staging copy. Dynamic buffers live on the upload heap and can
//! be rewritten by the CPU at any time.

mod index;
mod ring_buffer;
mod vertex;

pub use index::IndexBuffer;
pub use ring_buffer::{ConstantRing, RingAllocation};
pub use vertex::VertexBuffer;

pub(crate) use ring_buffer::align_up;

use std::sync::Arc;

use crate::backend::{GpuBackend, GpuCommand, HeapType, ResourceDesc, ResourceState};
use crate::error::{RhiError, RhiResult};
use crate::executor::CommandStream;
use crate::resource::{GpuResource, ResourceOwner};

/// Storage shared by vertex and index buffers.
#[derive(Debug)]
struct BufferStorage {
    owner: ResourceOwner,
    /// Staging copy source, kept alive until the buffer is dropped.
    uploader: ResourceOwner,
    size: u64,
    dynamic: bool,
}

impl BufferStorage {
    fn new(
        backend: &Arc<dyn GpuBackend>,
        stream: &mut CommandStream,
        size: u64,
        data: Option<&[u8]>,
        dynamic: bool,
        ready_state: ResourceState,
        label: &str,
    ) -> RhiResult<Self> {
        if size == 0 {
            return Err(RhiError::InvalidParameter(format!(
                "{label} cannot be empty"
            )));
        }
        let data = match data {
            Some(data) if (data.len() as u64) < size => {
                return Err(RhiError::InvalidParameter(format!(
                    "{label} needs {size} bytes of initial data, got {}",
                    data.len()
                )));
            }
            Some(data) => Some(&data[..size as usize]),
            None => None,
        };

        if dynamic {
            let resource = GpuResource::new_committed(
                backend,
                HeapType::Upload,
                ResourceState::GENERIC_READ,
                ResourceDesc::buffer(size),
                Some(label),
            )?;
            if let Some(data) = data {
                resource.write(0, data)?;
            }
            return Ok(Self {
                owner: ResourceOwner::exclusive(resource),
                uploader: ResourceOwner::none(),
                size,
                dynamic,
            });
        }

        let data = data.ok_or_else(|| {
            RhiError::InvalidParameter(format!("static {label} requires initial data"))
        })?;
        let resource = GpuResource::new_committed(
            backend,
            HeapType::Default,
            ResourceState::COMMON,
            ResourceDesc::buffer(size),
            Some(label),
        )?;
        let uploader = GpuResource::new_committed(
            backend,
            HeapType::Upload,
            ResourceState::GENERIC_READ,
            ResourceDesc::buffer(size),
            Some("buffer_uploader"),
        )?;
        uploader.write(0, data)?;

        resource.transition(stream, ResourceState::COPY_DEST);
        stream.record(GpuCommand::CopyBufferRegion {
            dst: resource.handle(),
            src: uploader.handle(),
            size,
        });
        resource.transition(stream, ready_state);

        Ok(Self {
            owner: ResourceOwner::exclusive(resource),
            uploader: ResourceOwner::exclusive(uploader),
            size,
            dynamic,
        })
    }

    fn resource(&self) -> &Arc<GpuResource> {
        match self.owner.resource() {
            Some(resource) => resource,
            None => unreachable!("buffer storage always owns its resource"),
        }
    }

    fn update(&self, data: &[u8]) -> RhiResult<()> {
        if !self.dynamic {
            return Err(RhiError::InvalidParameter(
                "only dynamic buffers can be updated".to_string(),
            ));
        }
        if data.len() as u64 > self.size {
            return Err(RhiError::InvalidParameter(format!(
                "update of {} bytes overflows buffer of {} bytes",
                data.len(),
                self.size
            )));
        }
        self.resource().write(0, data)
    }

    fn has_uploader(&self) -> bool {
        self.uploader.is_some()
    }
}
