//! Core backend abstraction trait
//!
//! The trait mirrors an explicit-mode graphics API: committed resources on
//! typed heaps, descriptor heaps with fixed slots, binding layouts, pipeline
//! state objects, a single direct command list and queue, fences and a
//! swapchain. Every method takes `&self`; implementations keep their own
//! interior state.

use crate::backend::types::*;
use raw_window_handle::RawWindowHandle;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to create device: {0}")]
    DeviceCreationFailed(String),
    #[error("Failed to create resource: {0}")]
    ResourceCreationFailed(String),
    #[error("Failed to write resource: {0}")]
    ResourceWriteFailed(String),
    #[error("Failed to create descriptor heap: {0}")]
    DescriptorHeapCreationFailed(String),
    #[error("Failed to create binding layout: {0}")]
    BindingLayoutCreationFailed(String),
    #[error("Failed to create pipeline state: {0}")]
    PipelineCreationFailed(String),
    #[error("Failed to submit command list: {0}")]
    SubmissionFailed(String),
    #[error("Swapchain operation failed: {0}")]
    SwapchainFailed(String),
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Device lost")]
    DeviceLost,
}

pub type BackendResult<T> = Result<T, BackendError>;

macro_rules! native_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) u64);

        impl $name {
            /// Wrap a raw backend identifier.
            pub fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw backend identifier.
            pub fn raw(&self) -> u64 {
                self.0
            }
        }
    };
}

native_handle!(
    /// Handle to a committed resource (buffer or texture)
    NativeResource
);
native_handle!(
    /// Handle to a descriptor heap
    NativeDescriptorHeap
);
native_handle!(
    /// Handle to a binding layout (root signature)
    NativeBindingLayout
);
native_handle!(
    /// Handle to a compiled pipeline state object
    NativePipeline
);
native_handle!(
    /// Handle to a command list
    NativeCommandList
);
native_handle!(
    /// Handle to a fence
    NativeFence
);
native_handle!(
    /// Handle to a swapchain
    NativeSwapchain
);

/// Main GPU backend trait
pub trait GpuBackend: Send + Sync {
    /// Backend name, for logging
    fn name(&self) -> &str;

    // Adapter and device

    /// Turn on the API validation layer. Must be called before any device
    /// is opened.
    fn enable_validation(&self);

    /// List the adapters the backend can open, in preference order
    fn enumerate_adapters(&self) -> Vec<AdapterInfo>;

    /// Open a device on the adapter at `adapter_index`
    fn open_device(&self, adapter_index: usize) -> BackendResult<DeviceArchitecture>;

    /// Close the currently open device
    fn close_device(&self);

    // Resources

    /// Create a committed resource on `heap` in `initial_state`
    fn create_committed_resource(
        &self,
        heap: HeapType,
        initial_state: ResourceState,
        desc: &ResourceDesc,
        optimized_clear: Option<ClearValue>,
    ) -> BackendResult<NativeResource>;

    /// Write CPU data into an upload-heap resource
    fn write_resource(
        &self,
        resource: NativeResource,
        offset: u64,
        data: &[u8],
    ) -> BackendResult<()>;

    /// Release a committed resource
    fn release_resource(&self, resource: NativeResource);

    // Descriptors

    /// Create a descriptor heap holding `capacity` views of `kind`
    fn create_descriptor_heap(
        &self,
        kind: ViewKind,
        capacity: u32,
    ) -> BackendResult<NativeDescriptorHeap>;

    /// Write a view of `resource` into the `destination` slot
    fn create_view(&self, resource: NativeResource, desc: &ViewDesc, destination: DescriptorHandle);

    /// Release a descriptor heap
    fn release_descriptor_heap(&self, heap: NativeDescriptorHeap);

    // Pipelines

    /// Create a binding layout
    fn create_binding_layout(&self, desc: &BindingLayoutDesc)
        -> BackendResult<NativeBindingLayout>;

    /// Release a binding layout
    fn release_binding_layout(&self, layout: NativeBindingLayout);

    /// Compile a graphics pipeline state object
    fn create_pipeline_state(&self, desc: &PipelineStateDesc) -> BackendResult<NativePipeline>;

    /// Release a pipeline state object
    fn release_pipeline_state(&self, pipeline: NativePipeline);

    // Command recording and execution

    /// Create a command list in the recording state
    fn create_command_list(&self) -> BackendResult<NativeCommandList>;

    /// Record a command
    fn record(&self, list: NativeCommandList, command: GpuCommand);

    /// Close the list, execute it on the queue and reset it for recording
    fn execute_command_list(&self, list: NativeCommandList) -> BackendResult<()>;

    /// Create a fence with an initial value of zero
    fn create_fence(&self) -> BackendResult<NativeFence>;

    /// Signal `value` on the queue once preceding work completes
    fn signal(&self, fence: NativeFence, value: u64) -> BackendResult<()>;

    /// Last value the GPU reached on `fence`
    fn completed_value(&self, fence: NativeFence) -> u64;

    /// Block until the GPU reaches `value` on `fence`
    fn wait_for_fence(&self, fence: NativeFence, value: u64) -> BackendResult<()>;

    // Swapchain

    /// Create a swapchain for a native window
    fn create_swapchain(
        &self,
        window: RawWindowHandle,
        width: u32,
        height: u32,
        format: PixelFormat,
        buffer_count: u32,
    ) -> BackendResult<NativeSwapchain>;

    /// Get the back buffer at `index`, in the present state
    fn swapchain_buffer(
        &self,
        swapchain: NativeSwapchain,
        index: u32,
    ) -> BackendResult<(NativeResource, ResourceDesc)>;

    /// Index of the back buffer to draw into next
    fn current_back_buffer_index(&self, swapchain: NativeSwapchain) -> u32;

    /// Present the current back buffer
    fn present(&self, swapchain: NativeSwapchain, sync_interval: u32) -> BackendResult<()>;

    /// Resize the swapchain buffers. All buffer handles must have been released.
    fn resize_swapchain(
        &self,
        swapchain: NativeSwapchain,
        width: u32,
        height: u32,
    ) -> BackendResult<()>;

    /// Release a swapchain
    fn release_swapchain(&self, swapchain: NativeSwapchain);
}
