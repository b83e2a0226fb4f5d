//! Value types shared between the RHI core and backends.
//!
//! These mirror the shapes of an explicit graphics API: pixel formats, heap
//! types, resource states, resource descriptions and the commands recorded
//! into a command list.

use bitflags::bitflags;

use super::traits::{
    NativeBindingLayout, NativeDescriptorHeap, NativePipeline, NativeResource,
};
use crate::pipeline::RenderState;
use crate::shader::VertexElement;

/// Pixel format of textures, render targets and vertex attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// No format (buffers).
    #[default]
    Unknown,
    /// 8-bit RGBA, unsigned normalized.
    R8G8B8A8Unorm,
    /// 8-bit RGBA, sRGB.
    R8G8B8A8UnormSrgb,
    /// 8-bit BGRA, unsigned normalized.
    B8G8R8A8Unorm,
    /// 16-bit RGBA, float.
    R16G16B16A16Float,
    /// 32-bit RGBA, float.
    R32G32B32A32Float,
    /// 32-bit RGB, float.
    R32G32B32Float,
    /// 32-bit RG, float.
    R32G32Float,
    /// 32-bit R, float.
    R32Float,
    /// 32-bit R, unsigned integer.
    R32Uint,
    /// 16-bit R, unsigned integer.
    R16Uint,
    /// 24-bit depth with 8-bit stencil.
    D24UnormS8Uint,
    /// 32-bit float depth.
    D32Float,
}

impl PixelFormat {
    /// Size in bytes of one pixel (or one vertex element).
    pub fn pixel_size(&self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::R16Uint => 2,
            Self::R8G8B8A8Unorm
            | Self::R8G8B8A8UnormSrgb
            | Self::B8G8R8A8Unorm
            | Self::R32Float
            | Self::R32Uint
            | Self::D24UnormS8Uint
            | Self::D32Float => 4,
            Self::R16G16B16A16Float | Self::R32G32Float => 8,
            Self::R32G32B32Float => 12,
            Self::R32G32B32A32Float => 16,
        }
    }

    /// Returns true for depth/stencil formats.
    pub fn is_depth_stencil(&self) -> bool {
        matches!(self, Self::D24UnormS8Uint | Self::D32Float)
    }
}

bitflags! {
    /// GPU-visible usage state of a resource.
    ///
    /// `COMMON` and `PRESENT` share the empty bit pattern, as they do in the
    /// underlying API.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResourceState: u32 {
        const COMMON = 0;
        const PRESENT = 0;
        const VERTEX_AND_CONSTANT_BUFFER = 0x1;
        const INDEX_BUFFER = 0x2;
        const RENDER_TARGET = 0x4;
        const UNORDERED_ACCESS = 0x8;
        const DEPTH_WRITE = 0x10;
        const DEPTH_READ = 0x20;
        const NON_PIXEL_SHADER_RESOURCE = 0x40;
        const PIXEL_SHADER_RESOURCE = 0x80;
        const INDIRECT_ARGUMENT = 0x200;
        const COPY_DEST = 0x400;
        const COPY_SOURCE = 0x800;
        const ALL_SHADER_RESOURCE = Self::NON_PIXEL_SHADER_RESOURCE.bits()
            | Self::PIXEL_SHADER_RESOURCE.bits();
        const GENERIC_READ = Self::VERTEX_AND_CONSTANT_BUFFER.bits()
            | Self::INDEX_BUFFER.bits()
            | Self::NON_PIXEL_SHADER_RESOURCE.bits()
            | Self::PIXEL_SHADER_RESOURCE.bits()
            | Self::INDIRECT_ARGUMENT.bits()
            | Self::COPY_SOURCE.bits();
    }
}

impl ResourceState {
    /// Whether pixel shaders can read a resource in this state.
    pub fn is_shader_readable(&self) -> bool {
        self.contains(Self::PIXEL_SHADER_RESOURCE)
    }

    /// Whether a resource in this state can be used as `required` without
    /// a barrier.
    pub fn satisfies(&self, required: ResourceState) -> bool {
        if required.is_empty() {
            self.is_empty()
        } else {
            self.contains(required)
        }
    }
}

/// Memory heap a committed resource lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeapType {
    /// GPU-local memory, not CPU visible.
    #[default]
    Default,
    /// CPU-writable memory used as a copy source.
    Upload,
    /// CPU-readable memory used as a copy destination.
    Readback,
}

/// Dimension of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceDimension {
    /// Linear buffer.
    Buffer,
    /// 2D texture.
    Texture2D,
}

bitflags! {
    /// Creation flags for a resource.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResourceFlags: u32 {
        /// Resource can be bound as a render target.
        const ALLOW_RENDER_TARGET = 1 << 0;
        /// Resource can be bound as a depth-stencil target.
        const ALLOW_DEPTH_STENCIL = 1 << 1;
    }
}

/// Description of a native resource allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceDesc {
    pub dimension: ResourceDimension,
    /// Width in texels, or size in bytes for buffers.
    pub width: u64,
    pub height: u32,
    pub depth_or_array_size: u16,
    pub mip_levels: u16,
    pub format: PixelFormat,
    pub flags: ResourceFlags,
}

impl ResourceDesc {
    /// Describe a linear buffer of `size` bytes.
    pub fn buffer(size: u64) -> Self {
        Self {
            dimension: ResourceDimension::Buffer,
            width: size,
            height: 1,
            depth_or_array_size: 1,
            mip_levels: 1,
            format: PixelFormat::Unknown,
            flags: ResourceFlags::empty(),
        }
    }

    /// Describe a single-mip 2D texture.
    pub fn texture_2d(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            dimension: ResourceDimension::Texture2D,
            width: u64::from(width),
            height,
            depth_or_array_size: 1,
            mip_levels: 1,
            format,
            flags: ResourceFlags::empty(),
        }
    }

    /// Set the creation flags.
    pub fn with_flags(mut self, flags: ResourceFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Clear value for render targets and depth-stencil targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// RGBA color.
    Color([f32; 4]),
    /// Depth and stencil values.
    DepthStencil { depth: f32, stencil: u8 },
}

impl ClearValue {
    /// Create a color clear value.
    pub fn color(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::Color([r, g, b, a])
    }

    /// Create a depth-stencil clear value.
    pub fn depth_stencil(depth: f32, stencil: u8) -> Self {
        Self::DepthStencil { depth, stencil }
    }
}

/// Viewport rectangle used for rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderRect {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl RenderRect {
    /// Full-surface rectangle with the `[0, 1]` depth range.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            top_left_x: 0.0,
            top_left_y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Scissor rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScissorRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl ScissorRect {
    /// Scissor covering a whole `width` x `height` surface.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
        }
    }
}

/// Index element format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

impl IndexFormat {
    /// Size of one index in bytes.
    pub fn size(&self) -> u32 {
        match self {
            Self::Uint16 => 2,
            Self::Uint32 => 4,
        }
    }
}

/// Kind of view a descriptor slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    ShaderResource,
    RenderTarget,
    DepthStencil,
}

impl ViewKind {
    /// All view kinds, in table order.
    pub const ALL: [ViewKind; 3] = [
        ViewKind::ShaderResource,
        ViewKind::RenderTarget,
        ViewKind::DepthStencil,
    ];

    pub(crate) fn table_index(&self) -> usize {
        match self {
            Self::ShaderResource => 0,
            Self::RenderTarget => 1,
            Self::DepthStencil => 2,
        }
    }
}

/// Description of a 2D view written into a descriptor slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewDesc {
    pub kind: ViewKind,
    pub format: PixelFormat,
}

/// A slot inside a descriptor heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorHandle {
    pub heap: NativeDescriptorHeap,
    pub index: u32,
}

/// Description of a binding layout (root signature).
///
/// Root parameters are laid out as one constant buffer view per constant
/// buffer register, followed by one single-entry texture table per texture
/// register. A linear-wrap static sampler is always bound at register 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingLayoutDesc {
    pub constant_buffers: u32,
    pub textures: u32,
}

impl BindingLayoutDesc {
    /// Total number of root parameters.
    pub fn parameter_count(&self) -> u32 {
        self.constant_buffers + self.textures
    }
}

/// Description of a graphics pipeline state object.
#[derive(Debug, Clone)]
pub struct PipelineStateDesc {
    pub vertex_shader: std::sync::Arc<[u8]>,
    pub pixel_shader: std::sync::Arc<[u8]>,
    pub input_layout: Vec<VertexElement>,
    pub binding_layout: NativeBindingLayout,
    pub render_target_formats: Vec<PixelFormat>,
    pub depth_stencil_format: Option<PixelFormat>,
    pub render_state: RenderState,
}

/// Placement of texture data inside an upload buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureFootprint {
    pub offset: u64,
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub row_pitch: u32,
}

/// A command recorded into a command list.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    ResourceBarrier {
        resource: NativeResource,
        before: ResourceState,
        after: ResourceState,
    },
    CopyBufferRegion {
        dst: NativeResource,
        src: NativeResource,
        size: u64,
    },
    CopyTextureRegion {
        dst: NativeResource,
        src: NativeResource,
        footprint: TextureFootprint,
    },
    ClearRenderTarget {
        view: DescriptorHandle,
        color: [f32; 4],
    },
    ClearDepthStencil {
        view: DescriptorHandle,
        depth: f32,
        stencil: u8,
    },
    SetRenderTargets {
        render_targets: Vec<DescriptorHandle>,
        depth_stencil: Option<DescriptorHandle>,
    },
    SetViewport(RenderRect),
    SetScissorRect(ScissorRect),
    SetPipelineState(NativePipeline),
    SetBindingLayout(NativeBindingLayout),
    SetConstantBuffer {
        root_index: u32,
        resource: NativeResource,
        offset: u64,
    },
    SetShaderResource {
        root_index: u32,
        view: DescriptorHandle,
    },
    SetVertexBuffer {
        resource: NativeResource,
        size: u64,
        stride: u32,
    },
    SetIndexBuffer {
        resource: NativeResource,
        size: u64,
        format: IndexFormat,
    },
    DrawIndexed {
        index_count: u32,
        start_index: u32,
        base_vertex: i32,
    },
}

/// Type of graphics adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterType {
    /// Discrete GPU (dedicated graphics card).
    Discrete,
    /// Integrated GPU (shared with CPU).
    Integrated,
    /// Software renderer.
    Software,
    /// Unknown adapter type.
    Unknown,
}

/// Information about a graphics adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterInfo {
    /// Adapter name.
    pub name: String,
    /// Adapter vendor.
    pub vendor: String,
    /// Device type (discrete, integrated, etc.).
    pub device_type: AdapterType,
}

impl AdapterInfo {
    /// Returns true for software-emulated adapters.
    pub fn is_software(&self) -> bool {
        self.device_type == AdapterType::Software
    }
}

/// Architecture facts queried from an opened device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceArchitecture {
    /// CPU and GPU share one memory pool.
    pub unified_memory: bool,
}
