use std::ops::Deref;
use std::sync::Arc;

use super::{Texture, TextureDescriptor};
use crate::backend::{
    GpuBackend, HeapType, PixelFormat, ResourceDesc, ResourceFlags, ResourceState, ViewKind,
};
use crate::descriptor::{DescriptorAllocator, View};
use crate::error::{RhiError, RhiResult};
use crate::resource::{GpuResource, ResourceOwner};

/// A color texture that can be rendered into.
///
/// Offscreen targets also get a shader-resource view so later passes can
/// sample them. Swapchain back buffers share their resource with the
/// swapchain and have no shader-resource view.
#[derive(Debug)]
pub struct RenderTarget {
    texture: Texture,
    render_target_view: View,
}

impl RenderTarget {
    /// Create an offscreen render target in the render-target state.
    pub fn new(
        backend: &Arc<dyn GpuBackend>,
        allocator: &Arc<DescriptorAllocator>,
        desc: &TextureDescriptor,
    ) -> RhiResult<Self> {
        desc.validate()?;
        if desc.format.is_depth_stencil() {
            return Err(RhiError::InvalidParameter(format!(
                "render target {:?} cannot use depth format {:?}",
                desc.label, desc.format
            )));
        }
        let resource = GpuResource::new_committed(
            backend,
            HeapType::Default,
            ResourceState::RENDER_TARGET,
            ResourceDesc::texture_2d(desc.width, desc.height, desc.format)
                .with_flags(ResourceFlags::ALLOW_RENDER_TARGET),
            desc.label.as_deref(),
        )?;

        let mut texture = Texture::new(ResourceOwner::exclusive(resource), desc);
        let render_target_view = View::new(
            allocator,
            ViewKind::RenderTarget,
            texture.resource(),
            desc.format,
        );
        texture.shader_resource_view = Some(View::new(
            allocator,
            ViewKind::ShaderResource,
            texture.resource(),
            desc.format,
        ));
        log::trace!(
            "Created render target {:?} {}x{} {:?}",
            desc.label,
            desc.width,
            desc.height,
            desc.format
        );

        Ok(Self {
            texture,
            render_target_view,
        })
    }

    /// Wrap a swapchain back buffer, sharing ownership of its resource.
    pub fn from_swapchain_buffer(
        allocator: &Arc<DescriptorAllocator>,
        resource: Arc<GpuResource>,
        format: PixelFormat,
    ) -> Self {
        let desc = TextureDescriptor {
            label: resource.label().map(str::to_string),
            width: resource.desc().width as u32,
            height: resource.desc().height,
            format,
        };
        let render_target_view = View::new(allocator, ViewKind::RenderTarget, &resource, format);
        Self {
            texture: Texture::new(ResourceOwner::shared(resource), &desc),
            render_target_view,
        }
    }

    pub fn render_target_view(&self) -> &View {
        &self.render_target_view
    }
}

impl Deref for RenderTarget {
    type Target = Texture;

    fn deref(&self) -> &Texture {
        &self.texture
    }
}
