//! Views of a resource living in a descriptor slot.

use std::sync::{Arc, Weak};

use super::DescriptorAllocator;
use crate::backend::{DescriptorHandle, PixelFormat, ViewDesc, ViewKind};
use crate::resource::GpuResource;

/// A shader-resource, render-target or depth-stencil view.
///
/// The view does not keep its resource alive. Dropping it frees the slot.
pub struct View {
    kind: ViewKind,
    handle: DescriptorHandle,
    format: PixelFormat,
    resource: Weak<GpuResource>,
    allocator: Arc<DescriptorAllocator>,
}

impl View {
    /// Allocate a slot and write a 2D view of `resource` into it.
    pub fn new(
        allocator: &Arc<DescriptorAllocator>,
        kind: ViewKind,
        resource: &Arc<GpuResource>,
        format: PixelFormat,
    ) -> Self {
        let handle = allocator.allocate(kind);
        allocator
            .backend()
            .create_view(resource.handle(), &ViewDesc { kind, format }, handle);
        log::trace!(
            "Created {:?} view of {:?} in slot {}",
            kind,
            resource.label(),
            handle.index
        );
        Self {
            kind,
            handle,
            format,
            resource: Arc::downgrade(resource),
            allocator: Arc::clone(allocator),
        }
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn handle(&self) -> DescriptorHandle {
        self.handle
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// The backing resource, if it is still alive.
    pub fn resource(&self) -> Option<Arc<GpuResource>> {
        self.resource.upgrade()
    }

    /// Whether the backing resource is still alive.
    pub fn is_valid(&self) -> bool {
        self.resource.strong_count() > 0
    }
}

impl Drop for View {
    fn drop(&mut self) {
        self.allocator.free(self.kind, self.handle);
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("kind", &self.kind)
            .field("slot", &self.handle.index)
            .field("format", &self.format)
            .field("valid", &self.is_valid())
            .finish()
    }
}

static_assertions::assert_impl_all!(View: Send, Sync);
