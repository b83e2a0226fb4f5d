//! A single native allocation plus its tracked GPU-visible state.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::{
    ClearValue, GpuBackend, GpuCommand, HeapType, NativeResource, ResourceDesc, ResourceFlags,
    ResourceState,
};
use crate::error::{RhiError, RhiResult};
use crate::executor::CommandStream;

/// A committed GPU resource.
///
/// The tracked state is the state the resource is in once every command
/// recorded so far has executed. Any use that needs a different state must
/// go through [`transition`](Self::transition) first. Dropping the resource
/// releases the native allocation.
pub struct GpuResource {
    backend: Arc<dyn GpuBackend>,
    handle: NativeResource,
    desc: ResourceDesc,
    heap: HeapType,
    state: Mutex<ResourceState>,
    label: Option<String>,
}

impl GpuResource {
    /// Create a committed resource on `heap` in `initial_state`.
    ///
    /// Depth-stencil resources get an optimized clear of depth 1.0 and
    /// stencil 0; render targets get opaque black.
    pub fn new_committed(
        backend: &Arc<dyn GpuBackend>,
        heap: HeapType,
        initial_state: ResourceState,
        desc: ResourceDesc,
        label: Option<&str>,
    ) -> RhiResult<Self> {
        let optimized_clear = if desc.flags.contains(ResourceFlags::ALLOW_DEPTH_STENCIL) {
            Some(ClearValue::depth_stencil(1.0, 0))
        } else if desc.flags.contains(ResourceFlags::ALLOW_RENDER_TARGET) {
            Some(ClearValue::color(0.0, 0.0, 0.0, 1.0))
        } else {
            None
        };
        let handle =
            backend.create_committed_resource(heap, initial_state, &desc, optimized_clear)?;
        log::trace!(
            "Created resource {:?} ({:?}) on {:?} heap in {:?}",
            label,
            handle,
            heap,
            initial_state
        );
        Ok(Self {
            backend: Arc::clone(backend),
            handle,
            desc,
            heap,
            state: Mutex::new(initial_state),
            label: label.map(str::to_string),
        })
    }

    /// Wrap a native resource created outside the RHI (swapchain buffers).
    pub fn from_native(
        backend: &Arc<dyn GpuBackend>,
        handle: NativeResource,
        desc: ResourceDesc,
        state: ResourceState,
        label: Option<&str>,
    ) -> Self {
        Self {
            backend: Arc::clone(backend),
            handle,
            desc,
            heap: HeapType::Default,
            state: Mutex::new(state),
            label: label.map(str::to_string),
        }
    }

    pub fn handle(&self) -> NativeResource {
        self.handle
    }

    pub fn desc(&self) -> &ResourceDesc {
        &self.desc
    }

    pub fn heap_type(&self) -> HeapType {
        self.heap
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The tracked state.
    pub fn state(&self) -> ResourceState {
        *self.state.lock()
    }

    /// Record a barrier from the tracked state to `to`.
    ///
    /// Transitioning to the current state records nothing and logs a warning.
    pub fn transition(&self, stream: &mut CommandStream, to: ResourceState) {
        let mut state = self.state.lock();
        if *state == to {
            log::warn!(
                "Redundant transition of resource {:?} ({:?}) to {:?}",
                self.label,
                self.handle,
                to
            );
            return;
        }
        stream.record(GpuCommand::ResourceBarrier {
            resource: self.handle,
            before: *state,
            after: to,
        });
        *state = to;
    }

    /// Transition only when the tracked state does not already satisfy
    /// `required`. Returns whether a barrier was recorded.
    pub fn transition_if_needed(&self, stream: &mut CommandStream, required: ResourceState) -> bool {
        if self.state().satisfies(required) {
            return false;
        }
        self.transition(stream, required);
        true
    }

    /// Write CPU data into an upload-heap resource.
    pub fn write(&self, offset: u64, data: &[u8]) -> RhiResult<()> {
        if self.heap != HeapType::Upload {
            return Err(RhiError::InvalidParameter(format!(
                "resource {:?} is on the {:?} heap and cannot be written by the CPU",
                self.label, self.heap
            )));
        }
        self.backend.write_resource(self.handle, offset, data)?;
        Ok(())
    }
}

impl Drop for GpuResource {
    fn drop(&mut self) {
        log::trace!("Releasing resource {:?} ({:?})", self.label, self.handle);
        self.backend.release_resource(self.handle);
    }
}

impl std::fmt::Debug for GpuResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuResource")
            .field("handle", &self.handle)
            .field("label", &self.label)
            .field("heap", &self.heap)
            .field("state", &self.state())
            .finish()
    }
}

static_assertions::assert_impl_all!(GpuResource: Send, Sync);
