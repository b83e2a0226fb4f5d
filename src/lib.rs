//! Graphics RHI - a render hardware interface over an explicit-mode GPU API
//!
//! The RHI tracks GPU resource lifetime and state, serializes state
//! transitions, caches pipeline state objects by structural key and submits
//! draws through a single in-order command stream.
//!
//! # Architecture
//!
//! - [`backend`]: the [`GpuBackend`] trait every GPU API implements, and the
//!   recording [`DummyBackend`]
//! - [`resource`]: committed resources, state transitions and ownership
//! - [`descriptor`]: fixed-capacity descriptor tables and views
//! - [`texture`], [`buffer`]: textures, render targets, depth buffers,
//!   vertex/index buffers and the constant ring
//! - [`shader`]: compiled stages, vertex and uniform layouts, materials
//! - [`pipeline`]: pipeline state objects and their cache
//! - [`executor`]: command recording, bindings and submission
//! - [`Device`]: the composition root and factory
//! - [`Viewport`], [`scene`]: presentation and a reference frame loop
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use graphics_rhi::{Device, DeviceConfig, DummyBackend};
//!
//! let mut device = Device::new(Arc::new(DummyBackend::new()), DeviceConfig::default())?;
//! let mut viewport = device.create_viewport(1280, 720, PixelFormat::R8G8B8A8Unorm, window)?;
//! viewport.begin_draw(&mut device, [0.0, 0.0, 0.0, 1.0])?;
//! device.draw_indexed(&material, &vertices, &indices, RenderState::default(), 36, 0, 0)?;
//! viewport.end_draw(&mut device)?;
//! device.end_frame()?;
//! ```

pub mod backend;
pub mod buffer;
pub mod config;
pub mod descriptor;
pub mod device;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod resource;
pub mod scene;
pub mod shader;
pub mod texture;
pub mod viewport;

pub use backend::{
    AdapterInfo, AdapterType, DummyAdapter, DummyBackend, GpuBackend, IndexFormat, PixelFormat,
    RenderRect, ResourceState, ScissorRect,
};
pub use buffer::{ConstantRing, IndexBuffer, VertexBuffer};
pub use config::{DescriptorCapacities, DeviceConfig};
pub use descriptor::{DescriptorAllocator, View};
pub use device::Device;
pub use error::{RhiError, RhiResult};
pub use executor::{Executor, FrameStats};
pub use pipeline::{PipelineKey, PipelineState, PipelineStateCache, RenderState};
pub use resource::{GpuResource, OwnershipMode, ResourceOwner};
pub use scene::{RenderItem, RenderScene, SceneRenderer};
pub use shader::{
    CompiledShaderStage, InputSemantic, NagaCompiler, Shader, ShaderCompiler, ShaderDescriptor,
    ShaderInstance, ShaderStage, UniformLayout, VertexLayout,
};
pub use texture::{DepthStencil, RenderTarget, SampledTexture, Texture, Texture2D, TextureDescriptor};
pub use viewport::Viewport;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the library version. Call once after installing a logger.
pub fn init() {
    log::info!("Graphics RHI v{}", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
