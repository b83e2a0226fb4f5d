use std::ops::Deref;
use std::sync::Arc;

use super::{Texture, TextureDescriptor};
use crate::backend::{GpuBackend, HeapType, ResourceDesc, ResourceFlags, ResourceState, ViewKind};
use crate::descriptor::{DescriptorAllocator, View};
use crate::error::{RhiError, RhiResult};
use crate::executor::CommandStream;
use crate::resource::{GpuResource, ResourceOwner};

/// A depth-stencil target, cleared to depth 1.0 and stencil 0 by default.
#[derive(Debug)]
pub struct DepthStencil {
    texture: Texture,
    depth_stencil_view: View,
}

impl DepthStencil {
    /// Create the target and record its transition to the depth-write state.
    pub fn new(
        backend: &Arc<dyn GpuBackend>,
        allocator: &Arc<DescriptorAllocator>,
        stream: &mut CommandStream,
        desc: &TextureDescriptor,
    ) -> RhiResult<Self> {
        desc.validate()?;
        if !desc.format.is_depth_stencil() {
            return Err(RhiError::InvalidParameter(format!(
                "depth-stencil {:?} needs a depth format, got {:?}",
                desc.label, desc.format
            )));
        }
        let resource = GpuResource::new_committed(
            backend,
            HeapType::Default,
            ResourceState::COMMON,
            ResourceDesc::texture_2d(desc.width, desc.height, desc.format)
                .with_flags(ResourceFlags::ALLOW_DEPTH_STENCIL),
            desc.label.as_deref(),
        )?;
        resource.transition(stream, ResourceState::DEPTH_WRITE);

        let texture = Texture::new(ResourceOwner::exclusive(resource), desc);
        let depth_stencil_view = View::new(
            allocator,
            ViewKind::DepthStencil,
            texture.resource(),
            desc.format,
        );
        log::trace!(
            "Created depth-stencil {:?} {}x{} {:?}",
            desc.label,
            desc.width,
            desc.height,
            desc.format
        );

        Ok(Self {
            texture,
            depth_stencil_view,
        })
    }

    pub fn depth_stencil_view(&self) -> &View {
        &self.depth_stencil_view
    }
}

impl Deref for DepthStencil {
    type Target = Texture;

    fn deref(&self) -> &Texture {
        &self.texture
    }
}
