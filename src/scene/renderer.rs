//! Per-frame renderer over a [`Device`].

use std::sync::Arc;

use raw_window_handle::RawWindowHandle;

use super::{GlobalShaderParam, RenderItem, RenderScene, ShaderParams};
use crate::backend::PixelFormat;
use crate::device::Device;
use crate::error::RhiResult;
use crate::executor::FrameStats;
use crate::texture::{DepthStencil, TextureDescriptor};
use crate::viewport::Viewport;

/// Draws a [`RenderScene`] into a window.
pub struct SceneRenderer {
    window: RawWindowHandle,
    viewport: Option<Viewport>,
    depth_stencil: Option<Arc<DepthStencil>>,
    clear_color: [f32; 4],
    params: ShaderParams,
}

impl SceneRenderer {
    pub const COLOR_FORMAT: PixelFormat = PixelFormat::R8G8B8A8Unorm;
    pub const DEPTH_FORMAT: PixelFormat = PixelFormat::D24UnormS8Uint;

    pub fn new(window: RawWindowHandle) -> Self {
        Self {
            window,
            viewport: None,
            depth_stencil: None,
            clear_color: [1.0, 1.0, 1.0, 1.0],
            params: ShaderParams::default(),
        }
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub fn params(&self) -> &ShaderParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ShaderParams {
        &mut self.params
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn depth_stencil(&self) -> Option<&Arc<DepthStencil>> {
        self.depth_stencil.as_ref()
    }

    /// Create or resize the viewport and recreate the depth buffer.
    pub fn resize(&mut self, device: &mut Device, width: u32, height: u32) -> RhiResult<()> {
        match self.viewport.as_mut() {
            Some(viewport) => viewport.resize(device, width, height)?,
            None => {
                self.viewport = Some(device.create_viewport(
                    width,
                    height,
                    Self::COLOR_FORMAT,
                    self.window,
                )?);
            }
        }
        self.depth_stencil = Some(device.create_depth_stencil(
            &TextureDescriptor::new_2d(width, height, Self::DEPTH_FORMAT)
                .with_label("scene_depth"),
        )?);
        Ok(())
    }

    /// Draw every item of `scene` and present. Does nothing before the
    /// first [`resize`](Self::resize).
    pub fn render(&mut self, device: &mut Device, scene: &mut RenderScene) -> RhiResult<FrameStats> {
        let (Some(viewport), Some(depth)) = (self.viewport.as_mut(), self.depth_stencil.as_ref())
        else {
            return Ok(FrameStats::default());
        };

        viewport.begin_draw(device, self.clear_color)?;
        device.clear_depth_stencil(depth, 1.0, 0);
        let back_buffer = Arc::clone(viewport.current_back_buffer());
        device.set_outputs(&[back_buffer], Some(depth));

        let view_proj = scene.view_proj.to_cols_array();
        let camera_pos = scene.camera_pos.extend(0.0).to_array();
        for item in scene.items.iter_mut() {
            collect_material_parameters(item, &view_proj, &camera_pos, &self.params);
            device.draw_indexed(
                &item.material,
                &item.vertex_buffer,
                &item.index_buffer,
                item.render_state,
                item.index_buffer.num_indices(),
                0,
                0,
            )?;
        }

        viewport.end_draw(device)?;
        device.end_frame()?;
        Ok(device.get_and_clear_stats())
    }
}

fn collect_material_parameters(
    item: &mut RenderItem,
    view_proj: &[f32; 16],
    camera_pos: &[f32; 4],
    params: &ShaderParams,
) {
    // per frame
    item.material.set_parameter("ViewProj", view_proj);
    item.material.set_parameter("CameraPos", camera_pos);
    // per object
    item.material
        .set_parameter("World", &item.world.to_cols_array());
    for param in GlobalShaderParam::ALL {
        item.material
            .set_parameter(param.key(), &params.get(param).to_array());
    }
}
