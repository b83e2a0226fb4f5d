//! Scene data handed to the renderer each frame, and the renderer itself.

mod renderer;

pub use renderer::SceneRenderer;

use std::sync::Arc;

use glam::{Mat4, Vec3, Vec4};

use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::pipeline::RenderState;
use crate::shader::ShaderInstance;

/// Scene-wide shader parameters pushed to every material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalShaderParam {
    SunColor,
    SunDirection,
    AmbientColor,
}

impl GlobalShaderParam {
    pub const ALL: [GlobalShaderParam; 3] = [
        GlobalShaderParam::SunColor,
        GlobalShaderParam::SunDirection,
        GlobalShaderParam::AmbientColor,
    ];

    /// Parameter name materials declare.
    pub fn key(&self) -> &'static str {
        match self {
            Self::SunColor => "SunColor",
            Self::SunDirection => "SunDirection",
            Self::AmbientColor => "AmbientColor",
        }
    }
}

/// Values of the [`GlobalShaderParam`]s.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShaderParams {
    values: [Vec4; 3],
}

impl ShaderParams {
    pub fn get(&self, param: GlobalShaderParam) -> Vec4 {
        self.values[param as usize]
    }

    pub fn set(&mut self, param: GlobalShaderParam, value: Vec4) {
        self.values[param as usize] = value;
    }
}

/// One drawable: a material, a transform and its geometry.
#[derive(Debug, Clone)]
pub struct RenderItem {
    pub material: ShaderInstance,
    pub world: Mat4,
    pub vertex_buffer: Arc<VertexBuffer>,
    pub index_buffer: Arc<IndexBuffer>,
    pub render_state: RenderState,
}

impl RenderItem {
    /// An item drawing every index of `index_buffer` with default state.
    pub fn new(
        material: ShaderInstance,
        vertex_buffer: Arc<VertexBuffer>,
        index_buffer: Arc<IndexBuffer>,
    ) -> Self {
        Self {
            material,
            world: Mat4::IDENTITY,
            vertex_buffer,
            index_buffer,
            render_state: RenderState::default(),
        }
    }

    pub fn with_world(mut self, world: Mat4) -> Self {
        self.world = world;
        self
    }

    pub fn with_render_state(mut self, render_state: RenderState) -> Self {
        self.render_state = render_state;
        self
    }
}

/// Camera and items collected for one frame.
#[derive(Debug, Clone, Default)]
pub struct RenderScene {
    pub camera_pos: Vec3,
    pub view: Mat4,
    pub view_proj: Mat4,
    pub items: Vec<RenderItem>,
}

impl RenderScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop last frame's items and camera.
    pub fn reset(&mut self) {
        self.camera_pos = Vec3::ZERO;
        self.view = Mat4::IDENTITY;
        self.view_proj = Mat4::IDENTITY;
        self.items.clear();
    }
}
