//! Common utilities for RHI integration tests.
//!
//! Every test runs on the recording dummy backend, so assertions inspect the
//! commands and native objects the RHI asked for.

#![allow(dead_code)]

use std::sync::Arc;

use graphics_rhi::backend::{DummyAdapter, DummyBackend, GpuBackend};
use graphics_rhi::shader::ShaderCompiler;
use graphics_rhi::{
    Device, DeviceConfig, IndexBuffer, IndexFormat, InputSemantic, PixelFormat, RhiError,
    RhiResult, Shader, ShaderDescriptor, ShaderStage, UniformLayout, VertexBuffer,
};
use raw_window_handle::{RawWindowHandle, WebWindowHandle};

/// Compiler that passes the source through as bytecode.
///
/// Sources containing `#error` fail with that line as diagnostics.
pub struct PassthroughCompiler;

impl ShaderCompiler for PassthroughCompiler {
    fn compile(&self, source: &str, stage: ShaderStage) -> RhiResult<Vec<u8>> {
        if let Some(line) = source.lines().find(|line| line.contains("#error")) {
            return Err(RhiError::ShaderCompilation {
                stage,
                diagnostics: line.trim().to_string(),
            });
        }
        Ok(format!("{}:{}", stage.entry_point(), source).into_bytes())
    }
}

/// Quad with positions only.
pub const QUAD_VERTICES: [f32; 12] = [
    -1.0, -1.0, 0.0, //
    1.0, -1.0, 0.0, //
    1.0, 1.0, 0.0, //
    -1.0, 1.0, 0.0, //
];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// A device on a dummy backend, plus the backend for inspection.
pub struct TestContext {
    pub dummy: Arc<DummyBackend>,
    pub device: Device,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(DeviceConfig::default())
    }

    pub fn with_config(config: DeviceConfig) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let dummy = Arc::new(DummyBackend::new());
        let backend: Arc<dyn GpuBackend> = dummy.clone();
        let device = Device::new(backend, config)
            .expect("dummy device")
            .with_compiler(PassthroughCompiler);
        Self { dummy, device }
    }

    /// A shader with one `PerObject` constant buffer holding `World`
    /// (16 floats) and `Tint` (4 floats), and an `Albedo` texture.
    pub fn create_test_shader(&self, label: &str) -> Arc<Shader> {
        let vs = self
            .device
            .create_shader_stage(label, ShaderStage::Vertex)
            .unwrap();
        let ps = self
            .device
            .create_shader_stage(label, ShaderStage::Pixel)
            .unwrap();
        self.device
            .create_shader(
                ShaderDescriptor::new(vs, ps)
                    .with_label(label)
                    .with_uniform_layout(
                        UniformLayout::new()
                            .with_constant_buffer("PerObject", 0)
                            .with_texture("Albedo", 0),
                    )
                    .with_parameter("World", 0, 0, 16)
                    .with_parameter("Tint", 0, 16, 4),
            )
            .unwrap()
    }

    pub fn create_quad(&mut self) -> (Arc<VertexBuffer>, Arc<IndexBuffer>) {
        let vertices = self
            .device
            .create_vertex_buffer(
                4,
                &[InputSemantic::Position],
                Some(bytemuck::cast_slice(&QUAD_VERTICES)),
                false,
            )
            .unwrap();
        let indices = self
            .device
            .create_index_buffer(
                6,
                IndexFormat::Uint16,
                Some(bytemuck::cast_slice(&QUAD_INDICES)),
                false,
            )
            .unwrap();
        (vertices, indices)
    }
}

/// A placeholder native window.
pub fn test_window() -> RawWindowHandle {
    RawWindowHandle::Web(WebWindowHandle::new(1))
}

/// A backend exposing `adapters`.
pub fn backend_with(adapters: Vec<DummyAdapter>) -> (Arc<DummyBackend>, Arc<dyn GpuBackend>) {
    let dummy = Arc::new(DummyBackend::with_adapters(adapters));
    let backend: Arc<dyn GpuBackend> = dummy.clone();
    (dummy, backend)
}

/// RGBA8 checkerboard of `size` x `size` pixels.
pub fn checkerboard(size: u32) -> Vec<u8> {
    (0..size * size)
        .flat_map(|i| {
            let (x, y) = (i % size, i / size);
            if (x + y) % 2 == 0 {
                [255, 255, 255, 255]
            } else {
                [0, 0, 0, 255]
            }
        })
        .collect()
}

pub const RGBA8: PixelFormat = PixelFormat::R8G8B8A8Unorm;
