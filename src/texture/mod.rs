//! Textures: the shared [`Texture`] base and its sampled, render-target and
//! depth-stencil flavours.

mod depth_stencil;
mod render_target;
mod texture_2d;

pub use depth_stencil::DepthStencil;
pub use render_target::RenderTarget;
pub use texture_2d::Texture2D;

use std::sync::Arc;

use crate::backend::{PixelFormat, ResourceState};
use crate::descriptor::View;
use crate::error::{RhiError, RhiResult};
use crate::resource::{GpuResource, ResourceOwner};

/// Describes a 2D texture to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl TextureDescriptor {
    pub fn new_2d(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            label: None,
            width,
            height,
            format,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub(crate) fn validate(&self) -> RhiResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RhiError::InvalidParameter(format!(
                "texture {:?} has zero size {}x{}",
                self.label, self.width, self.height
            )));
        }
        if self.format == PixelFormat::Unknown {
            return Err(RhiError::InvalidParameter(format!(
                "texture {:?} has no format",
                self.label
            )));
        }
        Ok(())
    }
}

/// Common part of every texture: the owned resource, its size and format,
/// and an optional shader-resource view.
#[derive(Debug)]
pub struct Texture {
    owner: ResourceOwner,
    width: u32,
    height: u32,
    format: PixelFormat,
    label: Option<String>,
    shader_resource_view: Option<View>,
}

impl Texture {
    fn new(owner: ResourceOwner, desc: &TextureDescriptor) -> Self {
        Self {
            owner,
            width: desc.width,
            height: desc.height,
            format: desc.format,
            label: desc.label.clone(),
            shader_resource_view: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn owner(&self) -> &ResourceOwner {
        &self.owner
    }

    pub fn resource(&self) -> &Arc<GpuResource> {
        match self.owner.resource() {
            Some(resource) => resource,
            None => unreachable!("textures always own a resource"),
        }
    }

    /// Tracked state of the texture resource.
    pub fn state(&self) -> ResourceState {
        self.resource().state()
    }

    pub fn shader_resource_view(&self) -> Option<&View> {
        self.shader_resource_view.as_ref()
    }
}

/// A texture that can be bound to a shader texture slot.
#[derive(Debug, Clone)]
pub enum SampledTexture {
    Texture2D(Arc<Texture2D>),
    RenderTarget(Arc<RenderTarget>),
}

impl SampledTexture {
    pub fn texture(&self) -> &Texture {
        match self {
            Self::Texture2D(texture) => texture,
            Self::RenderTarget(target) => target,
        }
    }
}

impl From<Arc<Texture2D>> for SampledTexture {
    fn from(texture: Arc<Texture2D>) -> Self {
        Self::Texture2D(texture)
    }
}

impl From<Arc<RenderTarget>> for SampledTexture {
    fn from(target: Arc<RenderTarget>) -> Self {
        Self::RenderTarget(target)
    }
}

static_assertions::assert_impl_all!(Texture: Send, Sync);
