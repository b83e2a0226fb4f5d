//! Fixed-capacity descriptor tables, one per view kind.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::{DescriptorHandle, GpuBackend, NativeDescriptorHeap, ViewKind};
use crate::config::DescriptorCapacities;
use crate::error::RhiResult;

#[derive(Debug)]
struct DescriptorTable {
    kind: ViewKind,
    heap: NativeDescriptorHeap,
    capacity: u32,
    next: u32,
    free: Vec<u32>,
}

impl DescriptorTable {
    fn allocate(&mut self) -> Option<u32> {
        if let Some(index) = self.free.pop() {
            return Some(index);
        }
        if self.next < self.capacity {
            let index = self.next;
            self.next += 1;
            return Some(index);
        }
        None
    }

    fn allocated(&self) -> u32 {
        self.next - self.free.len() as u32
    }
}

/// Allocates descriptor slots for shader-resource, render-target and
/// depth-stencil views.
///
/// Slots come from a bump pointer, reusing freed slots first. Tables have a
/// fixed budget; running out is fatal.
pub struct DescriptorAllocator {
    backend: Arc<dyn GpuBackend>,
    tables: Mutex<Vec<DescriptorTable>>,
}

impl DescriptorAllocator {
    /// Create one descriptor heap per view kind.
    pub fn new(
        backend: &Arc<dyn GpuBackend>,
        capacities: DescriptorCapacities,
    ) -> RhiResult<Arc<Self>> {
        let mut tables = Vec::with_capacity(ViewKind::ALL.len());
        for kind in ViewKind::ALL {
            let capacity = match kind {
                ViewKind::ShaderResource => capacities.shader_resource,
                ViewKind::RenderTarget => capacities.render_target,
                ViewKind::DepthStencil => capacities.depth_stencil,
            };
            let heap = backend.create_descriptor_heap(kind, capacity)?;
            log::debug!("Created {:?} descriptor table with {} slots", kind, capacity);
            tables.push(DescriptorTable {
                kind,
                heap,
                capacity,
                next: 0,
                free: Vec::new(),
            });
        }
        Ok(Arc::new(Self {
            backend: Arc::clone(backend),
            tables: Mutex::new(tables),
        }))
    }

    pub(crate) fn backend(&self) -> &Arc<dyn GpuBackend> {
        &self.backend
    }

    /// Reserve a slot for a view of `kind`.
    ///
    /// # Panics
    ///
    /// Panics when the table is exhausted.
    pub fn allocate(&self, kind: ViewKind) -> DescriptorHandle {
        let mut tables = self.tables.lock();
        let table = &mut tables[kind.table_index()];
        match table.allocate() {
            Some(index) => DescriptorHandle {
                heap: table.heap,
                index,
            },
            None => panic!(
                "{:?} descriptor table exhausted ({} slots)",
                table.kind, table.capacity
            ),
        }
    }

    /// Return a slot to its table.
    pub fn free(&self, kind: ViewKind, handle: DescriptorHandle) {
        let mut tables = self.tables.lock();
        let table = &mut tables[kind.table_index()];
        debug_assert_eq!(table.heap, handle.heap);
        debug_assert!(!table.free.contains(&handle.index));
        table.free.push(handle.index);
    }

    /// Number of slots of `kind` currently in use.
    pub fn allocated(&self, kind: ViewKind) -> u32 {
        self.tables.lock()[kind.table_index()].allocated()
    }

    /// Total slots of `kind`.
    pub fn capacity(&self, kind: ViewKind) -> u32 {
        self.tables.lock()[kind.table_index()].capacity
    }
}

impl Drop for DescriptorAllocator {
    fn drop(&mut self) {
        for table in self.tables.get_mut().iter() {
            self.backend.release_descriptor_heap(table.heap);
        }
    }
}

static_assertions::assert_impl_all!(DescriptorAllocator: Send, Sync);
