//! Constant ring for streaming per-draw shader constants.
//!
//! Every draw writes its constant buffers into consecutive, aligned regions
//! of one upload-heap buffer and binds them by offset. The ring is rewound
//! once the GPU has finished reading, normally at the end of a frame.

use std::sync::Arc;

use crate::backend::{GpuBackend, HeapType, NativeResource, ResourceDesc, ResourceState};
use crate::error::{RhiError, RhiResult};
use crate::resource::{GpuResource, ResourceOwner};

/// A region of the constant ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RingAllocation {
    /// Byte offset into the ring.
    pub offset: u64,
    /// Size of the region in bytes.
    pub size: u64,
}

impl RingAllocation {
    pub fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    pub fn end(&self) -> u64 {
        self.offset + self.size
    }
}

/// Upload-heap ring of constant buffer data.
///
/// Allocations never wrap. When the ring is full [`allocate`](Self::allocate)
/// returns `None`; the caller must wait for the GPU and [`reset`](Self::reset).
pub struct ConstantRing {
    buffer: ResourceOwner,
    handle: NativeResource,
    capacity: u64,
    write_offset: u64,
    alignment: u64,
    reset_count: u64,
}

impl ConstantRing {
    /// Constant buffer placement alignment.
    pub const DEFAULT_ALIGNMENT: u64 = 256;

    /// Create a ring of `capacity` bytes aligned to `alignment`.
    pub fn new(backend: &Arc<dyn GpuBackend>, capacity: u64, alignment: u64) -> RhiResult<Self> {
        if !alignment.is_power_of_two() {
            return Err(RhiError::InvalidParameter(format!(
                "alignment must be a power of 2, got {alignment}"
            )));
        }
        if capacity == 0 {
            return Err(RhiError::InvalidParameter(
                "constant ring capacity cannot be zero".to_string(),
            ));
        }

        let capacity = align_up(capacity, alignment);
        let resource = GpuResource::new_committed(
            backend,
            HeapType::Upload,
            ResourceState::GENERIC_READ,
            ResourceDesc::buffer(capacity),
            Some("constant_ring"),
        )?;
        let handle = resource.handle();
        log::debug!("Created constant ring of {} bytes", capacity);

        Ok(Self {
            buffer: ResourceOwner::exclusive(resource),
            handle,
            capacity,
            write_offset: 0,
            alignment,
            reset_count: 0,
        })
    }

    /// Native handle of the ring buffer.
    pub fn handle(&self) -> NativeResource {
        self.handle
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn write_offset(&self) -> u64 {
        self.write_offset
    }

    /// Number of resets that reclaimed space.
    pub fn reset_count(&self) -> u64 {
        self.reset_count
    }

    pub fn remaining(&self) -> u64 {
        self.capacity - self.write_offset
    }

    /// Reserve an aligned region of `size` bytes.
    pub fn allocate(&mut self, size: u64) -> Option<RingAllocation> {
        if size == 0 {
            return Some(RingAllocation::new(self.write_offset, 0));
        }
        let aligned_offset = align_up(self.write_offset, self.alignment);
        if aligned_offset + size > self.capacity {
            return None;
        }
        self.write_offset = aligned_offset + size;
        Some(RingAllocation::new(aligned_offset, size))
    }

    /// Copy `data` into a region returned by [`allocate`](Self::allocate).
    pub fn write(&self, allocation: RingAllocation, data: &[u8]) -> RhiResult<()> {
        if data.len() as u64 > allocation.size {
            return Err(RhiError::InvalidParameter(format!(
                "{} bytes do not fit a ring allocation of {} bytes",
                data.len(),
                allocation.size
            )));
        }
        match self.buffer.resource() {
            Some(resource) => resource.write(allocation.offset, data),
            None => unreachable!("constant ring always owns its buffer"),
        }
    }

    /// Rewind to the start. The GPU must be done reading.
    pub fn reset(&mut self) {
        if self.write_offset > 0 {
            self.reset_count += 1;
            self.write_offset = 0;
        }
    }
}

impl std::fmt::Debug for ConstantRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstantRing")
            .field("capacity", &self.capacity)
            .field("write_offset", &self.write_offset)
            .field("alignment", &self.alignment)
            .field("reset_count", &self.reset_count)
            .finish()
    }
}

/// Align a value up to the given power-of-two alignment.
#[inline]
pub(crate) fn align_up(value: u64, alignment: u64) -> u64 {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}
