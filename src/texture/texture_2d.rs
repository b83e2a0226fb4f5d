use std::ops::Deref;
use std::sync::Arc;

use super::{Texture, TextureDescriptor};
use crate::backend::{
    GpuBackend, GpuCommand, HeapType, ResourceDesc, ResourceState, TextureFootprint, ViewKind,
};
use crate::buffer::align_up;
use crate::descriptor::{DescriptorAllocator, View};
use crate::error::{RhiError, RhiResult};
use crate::executor::CommandStream;
use crate::resource::{GpuResource, ResourceOwner};

/// Row pitch alignment of texture data in upload buffers.
pub const TEXTURE_DATA_PITCH_ALIGNMENT: u64 = 256;

/// A sampled 2D texture filled once from CPU data.
///
/// Pixel data goes through an upload-heap staging buffer that the texture
/// keeps alive. After creation the texture is readable by every shader stage.
#[derive(Debug)]
pub struct Texture2D {
    texture: Texture,
    uploader: ResourceOwner,
}

impl Texture2D {
    /// Create the texture and record its upload into `stream`.
    ///
    /// `data` holds tightly packed rows of `width * pixel_size` bytes.
    pub fn new(
        backend: &Arc<dyn GpuBackend>,
        allocator: &Arc<DescriptorAllocator>,
        stream: &mut CommandStream,
        desc: &TextureDescriptor,
        data: &[u8],
    ) -> RhiResult<Self> {
        desc.validate()?;
        if desc.format.is_depth_stencil() {
            return Err(RhiError::InvalidParameter(format!(
                "sampled texture {:?} cannot use depth format {:?}",
                desc.label, desc.format
            )));
        }
        let row_size = u64::from(desc.width) * u64::from(desc.format.pixel_size());
        let expected = row_size * u64::from(desc.height);
        if (data.len() as u64) < expected {
            return Err(RhiError::InvalidParameter(format!(
                "texture {:?} needs {} bytes of pixel data, got {}",
                desc.label,
                expected,
                data.len()
            )));
        }

        let resource = GpuResource::new_committed(
            backend,
            HeapType::Default,
            ResourceState::COMMON,
            ResourceDesc::texture_2d(desc.width, desc.height, desc.format),
            desc.label.as_deref(),
        )?;

        let row_pitch = align_up(row_size, TEXTURE_DATA_PITCH_ALIGNMENT);
        let uploader = GpuResource::new_committed(
            backend,
            HeapType::Upload,
            ResourceState::GENERIC_READ,
            ResourceDesc::buffer(row_pitch * u64::from(desc.height)),
            Some("texture_uploader"),
        )?;
        for (row, bytes) in data[..expected as usize]
            .chunks_exact(row_size as usize)
            .enumerate()
        {
            uploader.write(row as u64 * row_pitch, bytes)?;
        }

        resource.transition(stream, ResourceState::COPY_DEST);
        stream.record(GpuCommand::CopyTextureRegion {
            dst: resource.handle(),
            src: uploader.handle(),
            footprint: TextureFootprint {
                offset: 0,
                format: desc.format,
                width: desc.width,
                height: desc.height,
                row_pitch: row_pitch as u32,
            },
        });
        resource.transition(stream, ResourceState::ALL_SHADER_RESOURCE);

        let mut texture = Texture::new(ResourceOwner::exclusive(resource), desc);
        texture.shader_resource_view = Some(View::new(
            allocator,
            ViewKind::ShaderResource,
            texture.resource(),
            desc.format,
        ));
        log::trace!(
            "Created texture {:?} {}x{} {:?}",
            desc.label,
            desc.width,
            desc.height,
            desc.format
        );

        Ok(Self {
            texture,
            uploader: ResourceOwner::exclusive(uploader),
        })
    }

    /// The staging buffer the pixels were uploaded from.
    pub fn uploader(&self) -> &ResourceOwner {
        &self.uploader
    }
}

impl Deref for Texture2D {
    type Target = Texture;

    fn deref(&self) -> &Texture {
        &self.texture
    }
}
