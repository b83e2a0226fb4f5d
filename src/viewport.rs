//! Swapchain-backed presentation surface.

use std::sync::Arc;

use raw_window_handle::RawWindowHandle;

use crate::backend::{
    GpuBackend, NativeSwapchain, PixelFormat, RenderRect, ResourceState, ScissorRect,
};
use crate::descriptor::DescriptorAllocator;
use crate::device::Device;
use crate::error::{RhiError, RhiResult};
use crate::resource::GpuResource;
use crate::texture::RenderTarget;

/// A window surface with its swapchain and back buffers.
///
/// Each frame is bracketed by [`begin_draw`](Self::begin_draw) and
/// [`end_draw`](Self::end_draw). Back buffers are render targets sharing
/// their resource with the swapchain.
pub struct Viewport {
    backend: Arc<dyn GpuBackend>,
    allocator: Arc<DescriptorAllocator>,
    swapchain: NativeSwapchain,
    width: u32,
    height: u32,
    format: PixelFormat,
    sync_interval: u32,
    back_buffers: Vec<Arc<RenderTarget>>,
    frame_fences: Vec<u64>,
    drawing: Option<usize>,
}

impl Viewport {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        backend: &Arc<dyn GpuBackend>,
        allocator: &Arc<DescriptorAllocator>,
        window: RawWindowHandle,
        width: u32,
        height: u32,
        format: PixelFormat,
        buffer_count: u32,
        sync_interval: u32,
    ) -> RhiResult<Self> {
        if width == 0 || height == 0 {
            return Err(RhiError::InvalidParameter(format!(
                "viewport has zero size {width}x{height}"
            )));
        }
        if format.is_depth_stencil() {
            return Err(RhiError::InvalidParameter(format!(
                "viewport cannot present depth format {format:?}"
            )));
        }
        let swapchain = backend.create_swapchain(window, width, height, format, buffer_count)?;
        let mut viewport = Self {
            backend: Arc::clone(backend),
            allocator: Arc::clone(allocator),
            swapchain,
            width,
            height,
            format,
            sync_interval,
            back_buffers: Vec::new(),
            frame_fences: vec![0; buffer_count as usize],
            drawing: None,
        };
        viewport.acquire_back_buffers()?;
        log::info!(
            "Created viewport {}x{} {:?} with {} back buffers",
            width,
            height,
            format,
            buffer_count
        );
        Ok(viewport)
    }

    fn acquire_back_buffers(&mut self) -> RhiResult<()> {
        for index in 0..self.frame_fences.len() as u32 {
            let (handle, desc) = self.backend.swapchain_buffer(self.swapchain, index)?;
            let resource = Arc::new(GpuResource::from_native(
                &self.backend,
                handle,
                desc,
                ResourceState::PRESENT,
                Some("back_buffer"),
            ));
            self.back_buffers.push(Arc::new(RenderTarget::from_swapchain_buffer(
                &self.allocator,
                resource,
                self.format,
            )));
        }
        Ok(())
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

    pub fn swapchain(&self) -> NativeSwapchain {
        self.swapchain
    }

    pub fn back_buffers(&self) -> &[Arc<RenderTarget>] {
        &self.back_buffers
    }

    /// The back buffer the next frame draws into.
    pub fn current_back_buffer(&self) -> &Arc<RenderTarget> {
        let index = self.backend.current_back_buffer_index(self.swapchain) as usize;
        &self.back_buffers[index % self.back_buffers.len()]
    }

    /// Start a frame: wait until the current back buffer is free, bind it as
    /// the only output, clear it and cover it with the render and scissor
    /// rects.
    pub fn begin_draw(&mut self, device: &mut Device, clear_color: [f32; 4]) -> RhiResult<()> {
        if self.drawing.is_some() {
            return Err(RhiError::InvalidParameter(
                "begin_draw called twice without end_draw".to_string(),
            ));
        }
        let index = self.backend.current_back_buffer_index(self.swapchain) as usize;
        let executor = device.executor_mut();
        executor.wait_for(self.frame_fences[index])?;

        let back_buffer = Arc::clone(&self.back_buffers[index]);
        executor.set_outputs(vec![Arc::clone(&back_buffer)], None);
        executor.clear_render_target(&back_buffer, clear_color);
        executor.set_render_rect(RenderRect::from_size(self.width, self.height));
        executor.set_scissor_rect(ScissorRect::from_size(self.width, self.height));
        self.drawing = Some(index);
        Ok(())
    }

    /// Finish a frame: transition the back buffer to present, submit and
    /// present it.
    pub fn end_draw(&mut self, device: &mut Device) -> RhiResult<()> {
        let Some(index) = self.drawing.take() else {
            return Err(RhiError::InvalidParameter(
                "end_draw called without begin_draw".to_string(),
            ));
        };
        let executor = device.executor_mut();
        executor.transition(self.back_buffers[index].resource(), ResourceState::PRESENT);
        executor.clear_outputs();
        self.frame_fences[index] = executor.submit()?;
        self.backend.present(self.swapchain, self.sync_interval)?;
        Ok(())
    }

    /// Resize the swapchain. Waits for the GPU and recreates back buffers.
    pub fn resize(&mut self, device: &mut Device, width: u32, height: u32) -> RhiResult<()> {
        if width == 0 || height == 0 {
            return Err(RhiError::InvalidParameter(format!(
                "viewport has zero size {width}x{height}"
            )));
        }
        if width == self.width && height == self.height {
            return Ok(());
        }
        let executor = device.executor_mut();
        executor.wait_idle()?;
        executor.clear_outputs();
        self.drawing = None;
        self.back_buffers.clear();
        self.backend.resize_swapchain(self.swapchain, width, height)?;
        self.width = width;
        self.height = height;
        self.frame_fences.iter_mut().for_each(|fence| *fence = 0);
        self.acquire_back_buffers()?;
        log::info!("Resized viewport to {}x{}", width, height);
        Ok(())
    }
}

impl Drop for Viewport {
    fn drop(&mut self) {
        self.back_buffers.clear();
        self.backend.release_swapchain(self.swapchain);
    }
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("swapchain", &self.swapchain)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .finish()
    }
}
