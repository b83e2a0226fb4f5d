//! Ownership-tagged resource handle.

use std::sync::Arc;

use super::GpuResource;

/// How a [`ResourceOwner`] holds its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnershipMode {
    /// Holds nothing.
    #[default]
    None,
    /// Sole owner. No other strong reference may outlive it.
    Exclusive,
    /// One of several owners.
    Shared,
}

/// Wraps a [`GpuResource`] with an ownership discipline.
///
/// An exclusive owner must be the only strong reference when it releases the
/// resource. Violating that is a lifetime bug in the caller and panics.
#[derive(Debug, Default)]
pub struct ResourceOwner {
    mode: OwnershipMode,
    resource: Option<Arc<GpuResource>>,
}

impl ResourceOwner {
    /// An owner holding nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Take sole ownership of a freshly created resource.
    pub fn exclusive(resource: GpuResource) -> Self {
        Self {
            mode: OwnershipMode::Exclusive,
            resource: Some(Arc::new(resource)),
        }
    }

    /// Share ownership of `resource`.
    pub fn shared(resource: Arc<GpuResource>) -> Self {
        Self {
            mode: OwnershipMode::Shared,
            resource: Some(resource),
        }
    }

    /// Release the current resource, then hold `resource` with `mode`.
    pub fn own(&mut self, mode: OwnershipMode, resource: Arc<GpuResource>) {
        self.release();
        if mode == OwnershipMode::None {
            return;
        }
        self.mode = mode;
        self.resource = Some(resource);
    }

    /// Release the held resource, checking the exclusive invariant.
    pub fn release(&mut self) {
        let Some(resource) = self.resource.take() else {
            self.mode = OwnershipMode::None;
            return;
        };
        let mode = std::mem::take(&mut self.mode);
        if mode == OwnershipMode::Exclusive {
            let count = Arc::strong_count(&resource);
            if count != 1 {
                panic!(
                    "exclusively owned resource {:?} ({:?}) released with {} outstanding references",
                    resource.label(),
                    resource.handle(),
                    count - 1
                );
            }
        }
    }

    pub fn mode(&self) -> OwnershipMode {
        self.mode
    }

    pub fn resource(&self) -> Option<&Arc<GpuResource>> {
        self.resource.as_ref()
    }

    pub fn is_some(&self) -> bool {
        self.resource.is_some()
    }
}

impl Drop for ResourceOwner {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DummyBackend, GpuBackend, HeapType, ResourceDesc, ResourceState};

    fn make_resource(backend: &Arc<dyn GpuBackend>) -> GpuResource {
        GpuResource::new_committed(
            backend,
            HeapType::Default,
            ResourceState::COMMON,
            ResourceDesc::buffer(32),
            Some("owned"),
        )
        .unwrap()
    }

    #[test]
    fn test_exclusive_release() {
        let dummy = Arc::new(DummyBackend::new());
        let backend: Arc<dyn GpuBackend> = dummy.clone();
        let owner = ResourceOwner::exclusive(make_resource(&backend));
        assert_eq!(owner.mode(), OwnershipMode::Exclusive);
        assert_eq!(dummy.live_resource_count(), 1);
        drop(owner);
        assert_eq!(dummy.live_resource_count(), 0);
    }

    #[test]
    #[should_panic(expected = "outstanding references")]
    fn test_exclusive_with_clone_panics() {
        let backend: Arc<dyn GpuBackend> = Arc::new(DummyBackend::new());
        let owner = ResourceOwner::exclusive(make_resource(&backend));
        let _extra = owner.resource().cloned();
        drop(owner);
    }

    #[test]
    fn test_shared_owners_keep_resource_alive() {
        let dummy = Arc::new(DummyBackend::new());
        let backend: Arc<dyn GpuBackend> = dummy.clone();
        let resource = Arc::new(make_resource(&backend));
        let first = ResourceOwner::shared(Arc::clone(&resource));
        let second = ResourceOwner::shared(resource);
        drop(first);
        assert_eq!(dummy.live_resource_count(), 1);
        assert_eq!(second.mode(), OwnershipMode::Shared);
        drop(second);
        assert_eq!(dummy.live_resource_count(), 0);
    }

    #[test]
    fn test_own_replaces_previous() {
        let dummy = Arc::new(DummyBackend::new());
        let backend: Arc<dyn GpuBackend> = dummy.clone();
        let mut owner = ResourceOwner::none();
        assert!(!owner.is_some());
        owner.own(OwnershipMode::Exclusive, Arc::new(make_resource(&backend)));
        owner.own(OwnershipMode::Exclusive, Arc::new(make_resource(&backend)));
        assert_eq!(dummy.live_resource_count(), 1);
        owner.release();
        assert_eq!(owner.mode(), OwnershipMode::None);
        assert_eq!(dummy.live_resource_count(), 0);
    }
}
