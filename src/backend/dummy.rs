//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't perform actual GPU operations. It keeps every native
//! object in memory, records every command in submission order and lets tests
//! inspect what the RHI asked the GPU to do. Fences are signaled as soon as
//! they are queued, so the simulated GPU is always idle.

use std::collections::HashMap;

use parking_lot::Mutex;
use raw_window_handle::RawWindowHandle;

use super::traits::*;
use super::types::*;

/// An adapter exposed by [`DummyBackend`].
#[derive(Debug, Clone)]
pub struct DummyAdapter {
    pub info: AdapterInfo,
    /// Reported by the opened device.
    pub unified_memory: bool,
    /// When false, opening a device on this adapter fails.
    pub supported: bool,
}

impl DummyAdapter {
    /// A discrete GPU with dedicated memory.
    pub fn discrete(name: &str) -> Self {
        Self {
            info: AdapterInfo {
                name: name.to_string(),
                vendor: "Dummy".to_string(),
                device_type: AdapterType::Discrete,
            },
            unified_memory: false,
            supported: true,
        }
    }

    /// An integrated GPU sharing memory with the CPU.
    pub fn integrated(name: &str) -> Self {
        Self {
            info: AdapterInfo {
                name: name.to_string(),
                vendor: "Dummy".to_string(),
                device_type: AdapterType::Integrated,
            },
            unified_memory: true,
            supported: true,
        }
    }

    /// A software rasterizer.
    pub fn software(name: &str) -> Self {
        Self {
            info: AdapterInfo {
                name: name.to_string(),
                vendor: "Dummy".to_string(),
                device_type: AdapterType::Software,
            },
            unified_memory: true,
            supported: true,
        }
    }

    /// Mark the adapter as unable to open a device.
    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }
}

#[derive(Debug, Clone)]
struct DummyResource {
    heap: HeapType,
    desc: ResourceDesc,
    data: Vec<u8>,
}

#[derive(Debug)]
struct DummySwapchain {
    width: u32,
    height: u32,
    format: PixelFormat,
    buffers: Vec<NativeResource>,
    current: u32,
}

#[derive(Debug, Default)]
struct DummyState {
    next_id: u64,
    opened_adapter: Option<usize>,
    validation_enabled: bool,
    resources: HashMap<NativeResource, DummyResource>,
    heaps: HashMap<NativeDescriptorHeap, (ViewKind, u32)>,
    views: HashMap<DescriptorHandle, (NativeResource, ViewDesc)>,
    binding_layouts: HashMap<NativeBindingLayout, BindingLayoutDesc>,
    binding_layouts_created: usize,
    pipelines: HashMap<NativePipeline, PipelineStateDesc>,
    pipelines_created: usize,
    command_lists: HashMap<NativeCommandList, Vec<GpuCommand>>,
    recorded: Vec<GpuCommand>,
    submissions: usize,
    fences: HashMap<NativeFence, u64>,
    swapchains: HashMap<NativeSwapchain, DummySwapchain>,
    presents: usize,
    fail_pipeline_creation: bool,
}

impl DummyState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Dummy GPU backend.
#[derive(Debug)]
pub struct DummyBackend {
    adapters: Vec<DummyAdapter>,
    state: Mutex<DummyState>,
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyBackend {
    /// Create a backend with a single discrete adapter.
    pub fn new() -> Self {
        Self::with_adapters(vec![DummyAdapter::discrete("Dummy Discrete GPU")])
    }

    /// Create a backend exposing `adapters` in enumeration order.
    pub fn with_adapters(adapters: Vec<DummyAdapter>) -> Self {
        Self {
            adapters,
            state: Mutex::new(DummyState::default()),
        }
    }

    /// Make every following pipeline state creation fail.
    pub fn set_fail_pipeline_creation(&self, fail: bool) {
        self.state.lock().fail_pipeline_creation = fail;
    }

    /// Whether the validation layer was turned on.
    pub fn validation_enabled(&self) -> bool {
        self.state.lock().validation_enabled
    }

    /// Index of the adapter the device was opened on.
    pub fn opened_adapter(&self) -> Option<usize> {
        self.state.lock().opened_adapter
    }

    /// Every command recorded so far, in recording order.
    pub fn recorded_commands(&self) -> Vec<GpuCommand> {
        self.state.lock().recorded.clone()
    }

    /// Forget the recorded command log.
    pub fn clear_recorded(&self) {
        self.state.lock().recorded.clear();
    }

    /// All recorded barriers as `(resource, before, after)`.
    pub fn barriers(&self) -> Vec<(NativeResource, ResourceState, ResourceState)> {
        self.state
            .lock()
            .recorded
            .iter()
            .filter_map(|command| match command {
                GpuCommand::ResourceBarrier {
                    resource,
                    before,
                    after,
                } => Some((*resource, *before, *after)),
                _ => None,
            })
            .collect()
    }

    /// Recorded barriers of one resource as `(before, after)`.
    pub fn barriers_for(&self, resource: NativeResource) -> Vec<(ResourceState, ResourceState)> {
        self.barriers()
            .into_iter()
            .filter(|(r, _, _)| *r == resource)
            .map(|(_, before, after)| (before, after))
            .collect()
    }

    /// Number of indexed draws recorded.
    pub fn draw_count(&self) -> usize {
        self.state
            .lock()
            .recorded
            .iter()
            .filter(|command| matches!(command, GpuCommand::DrawIndexed { .. }))
            .count()
    }

    /// Number of pipeline state objects compiled since creation.
    pub fn pipelines_created(&self) -> usize {
        self.state.lock().pipelines_created
    }

    /// Number of pipeline state objects not yet released.
    pub fn live_pipeline_count(&self) -> usize {
        self.state.lock().pipelines.len()
    }

    /// Number of binding layouts created since creation.
    pub fn binding_layouts_created(&self) -> usize {
        self.state.lock().binding_layouts_created
    }

    /// Number of committed resources not yet released.
    pub fn live_resource_count(&self) -> usize {
        self.state.lock().resources.len()
    }

    /// Whether `resource` is still alive.
    pub fn is_resource_alive(&self, resource: NativeResource) -> bool {
        self.state.lock().resources.contains_key(&resource)
    }

    /// Description of a live resource.
    pub fn resource_desc(&self, resource: NativeResource) -> Option<ResourceDesc> {
        self.state.lock().resources.get(&resource).map(|r| r.desc.clone())
    }

    /// Heap of a live resource.
    pub fn resource_heap(&self, resource: NativeResource) -> Option<HeapType> {
        self.state.lock().resources.get(&resource).map(|r| r.heap)
    }

    /// Bytes written into a live upload resource.
    pub fn resource_data(&self, resource: NativeResource) -> Option<Vec<u8>> {
        self.state.lock().resources.get(&resource).map(|r| r.data.clone())
    }

    /// View written into a descriptor slot.
    pub fn view(&self, handle: DescriptorHandle) -> Option<(NativeResource, ViewDesc)> {
        self.state.lock().views.get(&handle).copied()
    }

    /// Description of a live pipeline state object.
    pub fn pipeline_desc(&self, pipeline: NativePipeline) -> Option<PipelineStateDesc> {
        self.state.lock().pipelines.get(&pipeline).cloned()
    }

    /// Number of command list executions.
    pub fn submission_count(&self) -> usize {
        self.state.lock().submissions
    }

    /// Number of presents.
    pub fn present_count(&self) -> usize {
        self.state.lock().presents
    }

    /// Size of a swapchain as `(width, height)`.
    pub fn swapchain_size(&self, swapchain: NativeSwapchain) -> Option<(u32, u32)> {
        self.state
            .lock()
            .swapchains
            .get(&swapchain)
            .map(|s| (s.width, s.height))
    }
}

impl GpuBackend for DummyBackend {
    fn name(&self) -> &str {
        "Dummy Backend"
    }

    fn enable_validation(&self) {
        log::trace!("DummyBackend: enabling validation layer");
        self.state.lock().validation_enabled = true;
    }

    fn enumerate_adapters(&self) -> Vec<AdapterInfo> {
        self.adapters.iter().map(|a| a.info.clone()).collect()
    }

    fn open_device(&self, adapter_index: usize) -> BackendResult<DeviceArchitecture> {
        let adapter = self.adapters.get(adapter_index).ok_or_else(|| {
            BackendError::DeviceCreationFailed(format!("no adapter at index {}", adapter_index))
        })?;
        if !adapter.supported {
            return Err(BackendError::DeviceCreationFailed(format!(
                "adapter '{}' does not support the required feature level",
                adapter.info.name
            )));
        }
        log::trace!("DummyBackend: opening device on '{}'", adapter.info.name);
        self.state.lock().opened_adapter = Some(adapter_index);
        Ok(DeviceArchitecture {
            unified_memory: adapter.unified_memory,
        })
    }

    fn close_device(&self) {
        self.state.lock().opened_adapter = None;
    }

    fn create_committed_resource(
        &self,
        heap: HeapType,
        _initial_state: ResourceState,
        desc: &ResourceDesc,
        _optimized_clear: Option<ClearValue>,
    ) -> BackendResult<NativeResource> {
        if desc.width == 0 || desc.height == 0 {
            return Err(BackendError::ResourceCreationFailed(format!(
                "zero-sized resource {}x{}",
                desc.width, desc.height
            )));
        }
        let mut state = self.state.lock();
        let handle = NativeResource(state.next_id());
        log::trace!(
            "DummyBackend: creating {:?} resource {:?} on {:?} heap ({}x{})",
            desc.dimension,
            handle,
            heap,
            desc.width,
            desc.height
        );
        state.resources.insert(
            handle,
            DummyResource {
                heap,
                desc: desc.clone(),
                data: Vec::new(),
            },
        );
        Ok(handle)
    }

    fn write_resource(
        &self,
        resource: NativeResource,
        offset: u64,
        data: &[u8],
    ) -> BackendResult<()> {
        let mut state = self.state.lock();
        let entry = state.resources.get_mut(&resource).ok_or_else(|| {
            BackendError::ResourceWriteFailed(format!("unknown resource {:?}", resource))
        })?;
        if entry.heap != HeapType::Upload {
            return Err(BackendError::ResourceWriteFailed(format!(
                "resource {:?} is not CPU visible",
                resource
            )));
        }
        let end = offset as usize + data.len();
        if end as u64 > entry.desc.width {
            return Err(BackendError::ResourceWriteFailed(format!(
                "write of {} bytes at {} overflows resource of {} bytes",
                data.len(),
                offset,
                entry.desc.width
            )));
        }
        if entry.data.len() < end {
            entry.data.resize(end, 0);
        }
        entry.data[offset as usize..end].copy_from_slice(data);
        Ok(())
    }

    fn release_resource(&self, resource: NativeResource) {
        log::trace!("DummyBackend: releasing resource {:?}", resource);
        self.state.lock().resources.remove(&resource);
    }

    fn create_descriptor_heap(
        &self,
        kind: ViewKind,
        capacity: u32,
    ) -> BackendResult<NativeDescriptorHeap> {
        if capacity == 0 {
            return Err(BackendError::DescriptorHeapCreationFailed(
                "zero capacity".to_string(),
            ));
        }
        let mut state = self.state.lock();
        let handle = NativeDescriptorHeap(state.next_id());
        state.heaps.insert(handle, (kind, capacity));
        Ok(handle)
    }

    fn create_view(&self, resource: NativeResource, desc: &ViewDesc, destination: DescriptorHandle) {
        self.state.lock().views.insert(destination, (resource, *desc));
    }

    fn release_descriptor_heap(&self, heap: NativeDescriptorHeap) {
        let mut state = self.state.lock();
        state.heaps.remove(&heap);
        state.views.retain(|slot, _| slot.heap != heap);
    }

    fn create_binding_layout(
        &self,
        desc: &BindingLayoutDesc,
    ) -> BackendResult<NativeBindingLayout> {
        let mut state = self.state.lock();
        let handle = NativeBindingLayout(state.next_id());
        log::trace!(
            "DummyBackend: creating binding layout {:?} ({} constant buffers, {} textures)",
            handle,
            desc.constant_buffers,
            desc.textures
        );
        state.binding_layouts.insert(handle, *desc);
        state.binding_layouts_created += 1;
        Ok(handle)
    }

    fn release_binding_layout(&self, layout: NativeBindingLayout) {
        self.state.lock().binding_layouts.remove(&layout);
    }

    fn create_pipeline_state(&self, desc: &PipelineStateDesc) -> BackendResult<NativePipeline> {
        let mut state = self.state.lock();
        if state.fail_pipeline_creation {
            return Err(BackendError::PipelineCreationFailed(
                "pipeline creation disabled".to_string(),
            ));
        }
        if !state.binding_layouts.contains_key(&desc.binding_layout) {
            return Err(BackendError::PipelineCreationFailed(format!(
                "unknown binding layout {:?}",
                desc.binding_layout
            )));
        }
        let handle = NativePipeline(state.next_id());
        log::trace!(
            "DummyBackend: creating pipeline state {:?} ({} render targets)",
            handle,
            desc.render_target_formats.len()
        );
        state.pipelines.insert(handle, desc.clone());
        state.pipelines_created += 1;
        Ok(handle)
    }

    fn release_pipeline_state(&self, pipeline: NativePipeline) {
        self.state.lock().pipelines.remove(&pipeline);
    }

    fn create_command_list(&self) -> BackendResult<NativeCommandList> {
        let mut state = self.state.lock();
        let handle = NativeCommandList(state.next_id());
        state.command_lists.insert(handle, Vec::new());
        Ok(handle)
    }

    fn record(&self, list: NativeCommandList, command: GpuCommand) {
        let mut state = self.state.lock();
        state.recorded.push(command.clone());
        if let Some(pending) = state.command_lists.get_mut(&list) {
            pending.push(command);
        }
    }

    fn execute_command_list(&self, list: NativeCommandList) -> BackendResult<()> {
        let mut state = self.state.lock();
        let pending = state.command_lists.get_mut(&list).ok_or_else(|| {
            BackendError::SubmissionFailed(format!("unknown command list {:?}", list))
        })?;
        log::trace!("DummyBackend: executing {} commands", pending.len());
        pending.clear();
        state.submissions += 1;
        Ok(())
    }

    fn create_fence(&self) -> BackendResult<NativeFence> {
        let mut state = self.state.lock();
        let handle = NativeFence(state.next_id());
        state.fences.insert(handle, 0);
        Ok(handle)
    }

    fn signal(&self, fence: NativeFence, value: u64) -> BackendResult<()> {
        let mut state = self.state.lock();
        let completed = state.fences.get_mut(&fence).ok_or_else(|| {
            BackendError::SubmissionFailed(format!("unknown fence {:?}", fence))
        })?;
        *completed = (*completed).max(value);
        Ok(())
    }

    fn completed_value(&self, fence: NativeFence) -> u64 {
        self.state.lock().fences.get(&fence).copied().unwrap_or(0)
    }

    fn wait_for_fence(&self, fence: NativeFence, value: u64) -> BackendResult<()> {
        let completed = self.completed_value(fence);
        if completed < value {
            return Err(BackendError::SubmissionFailed(format!(
                "waiting for fence value {} that was never signaled (completed {})",
                value, completed
            )));
        }
        Ok(())
    }

    fn create_swapchain(
        &self,
        _window: RawWindowHandle,
        width: u32,
        height: u32,
        format: PixelFormat,
        buffer_count: u32,
    ) -> BackendResult<NativeSwapchain> {
        if buffer_count == 0 || width == 0 || height == 0 {
            return Err(BackendError::SwapchainFailed(format!(
                "invalid swapchain {}x{} with {} buffers",
                width, height, buffer_count
            )));
        }
        let mut state = self.state.lock();
        let handle = NativeSwapchain(state.next_id());
        let buffers = (0..buffer_count)
            .map(|_| NativeResource(state.next_id()))
            .collect();
        log::trace!(
            "DummyBackend: creating swapchain {:?} {}x{} {:?}",
            handle,
            width,
            height,
            format
        );
        state.swapchains.insert(
            handle,
            DummySwapchain {
                width,
                height,
                format,
                buffers,
                current: 0,
            },
        );
        Ok(handle)
    }

    fn swapchain_buffer(
        &self,
        swapchain: NativeSwapchain,
        index: u32,
    ) -> BackendResult<(NativeResource, ResourceDesc)> {
        let mut state = self.state.lock();
        let chain = state.swapchains.get(&swapchain).ok_or_else(|| {
            BackendError::SwapchainFailed(format!("unknown swapchain {:?}", swapchain))
        })?;
        let handle = *chain.buffers.get(index as usize).ok_or_else(|| {
            BackendError::SwapchainFailed(format!("no back buffer at index {}", index))
        })?;
        let desc = ResourceDesc::texture_2d(chain.width, chain.height, chain.format)
            .with_flags(ResourceFlags::ALLOW_RENDER_TARGET);
        state.resources.insert(
            handle,
            DummyResource {
                heap: HeapType::Default,
                desc: desc.clone(),
                data: Vec::new(),
            },
        );
        Ok((handle, desc))
    }

    fn current_back_buffer_index(&self, swapchain: NativeSwapchain) -> u32 {
        self.state
            .lock()
            .swapchains
            .get(&swapchain)
            .map(|s| s.current)
            .unwrap_or(0)
    }

    fn present(&self, swapchain: NativeSwapchain, _sync_interval: u32) -> BackendResult<()> {
        let mut state = self.state.lock();
        let chain = state.swapchains.get_mut(&swapchain).ok_or_else(|| {
            BackendError::SwapchainFailed(format!("unknown swapchain {:?}", swapchain))
        })?;
        chain.current = (chain.current + 1) % chain.buffers.len() as u32;
        state.presents += 1;
        Ok(())
    }

    fn resize_swapchain(
        &self,
        swapchain: NativeSwapchain,
        width: u32,
        height: u32,
    ) -> BackendResult<()> {
        let mut state = self.state.lock();
        let DummyState {
            next_id,
            resources,
            swapchains,
            ..
        } = &mut *state;
        let chain = swapchains.get_mut(&swapchain).ok_or_else(|| {
            BackendError::SwapchainFailed(format!("unknown swapchain {:?}", swapchain))
        })?;
        if chain.buffers.iter().any(|b| resources.contains_key(b)) {
            return Err(BackendError::SwapchainFailed(
                "back buffers are still referenced".to_string(),
            ));
        }
        chain.width = width;
        chain.height = height;
        chain.current = 0;
        for buffer in chain.buffers.iter_mut() {
            *next_id += 1;
            *buffer = NativeResource(*next_id);
        }
        Ok(())
    }

    fn release_swapchain(&self, swapchain: NativeSwapchain) {
        let mut state = self.state.lock();
        if let Some(chain) = state.swapchains.remove(&swapchain) {
            for buffer in chain.buffers {
                state.resources.remove(&buffer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_backend_creation() {
        let backend = DummyBackend::new();
        assert_eq!(backend.name(), "Dummy Backend");
        assert_eq!(backend.enumerate_adapters().len(), 1);
    }

    #[test]
    fn test_unsupported_adapter_fails_to_open() {
        let backend = DummyBackend::with_adapters(vec![DummyAdapter::discrete("a").unsupported()]);
        assert!(backend.open_device(0).is_err());
        assert!(backend.open_device(1).is_err());
        assert_eq!(backend.opened_adapter(), None);
    }

    #[test]
    fn test_write_upload_resource() {
        let backend = DummyBackend::new();
        let upload = backend
            .create_committed_resource(
                HeapType::Upload,
                ResourceState::GENERIC_READ,
                &ResourceDesc::buffer(8),
                None,
            )
            .unwrap();
        backend.write_resource(upload, 4, &[1, 2, 3, 4]).unwrap();
        assert_eq!(backend.resource_data(upload).unwrap(), vec![0, 0, 0, 0, 1, 2, 3, 4]);
        assert!(backend.write_resource(upload, 6, &[0; 4]).is_err());

        let local = backend
            .create_committed_resource(
                HeapType::Default,
                ResourceState::COMMON,
                &ResourceDesc::buffer(8),
                None,
            )
            .unwrap();
        assert!(backend.write_resource(local, 0, &[0; 4]).is_err());

        backend.release_resource(upload);
        backend.release_resource(local);
        assert_eq!(backend.live_resource_count(), 0);
    }

    #[test]
    fn test_swapchain_rotation_and_resize() {
        let backend = DummyBackend::new();
        let window = RawWindowHandle::Web(raw_window_handle::WebWindowHandle::new(1));
        let chain = backend
            .create_swapchain(window, 64, 32, PixelFormat::R8G8B8A8Unorm, 2)
            .unwrap();
        assert_eq!(backend.current_back_buffer_index(chain), 0);
        backend.present(chain, 1).unwrap();
        assert_eq!(backend.current_back_buffer_index(chain), 1);
        backend.present(chain, 1).unwrap();
        assert_eq!(backend.current_back_buffer_index(chain), 0);

        let (buffer, desc) = backend.swapchain_buffer(chain, 0).unwrap();
        assert_eq!(desc.width, 64);
        assert!(backend.resize_swapchain(chain, 128, 128).is_err());
        backend.release_resource(buffer);
        backend.resize_swapchain(chain, 128, 128).unwrap();
        assert_eq!(backend.swapchain_size(chain), Some((128, 128)));

        backend.release_swapchain(chain);
        assert_eq!(backend.live_resource_count(), 0);
    }

    #[test]
    fn test_fences_signal_immediately() {
        let backend = DummyBackend::new();
        let fence = backend.create_fence().unwrap();
        assert_eq!(backend.completed_value(fence), 0);
        backend.signal(fence, 3).unwrap();
        assert_eq!(backend.completed_value(fence), 3);
        assert!(backend.wait_for_fence(fence, 3).is_ok());
        assert!(backend.wait_for_fence(fence, 4).is_err());
    }
}
