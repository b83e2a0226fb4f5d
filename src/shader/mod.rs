//! Shaders: compiled stages, input and uniform layouts, and per-material
//! instances.

mod compiler;
mod instance;
mod uniform_layout;
mod vertex_layout;

pub use compiler::{NagaCompiler, ShaderCompiler};
pub use instance::ShaderInstance;
pub use uniform_layout::{BindingLayout, UniformLayout, UniformSlotKind};
pub use vertex_layout::{InputClassification, InputSemantic, VertexElement, VertexLayout};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{RhiError, RhiResult};

/// Programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

impl ShaderStage {
    /// Entry point every shader source must define for this stage.
    pub fn entry_point(&self) -> &'static str {
        match self {
            Self::Vertex => "VS",
            Self::Pixel => "PS",
        }
    }
}

/// Unique identity of a compiled shader stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderStageId(u64);

static NEXT_STAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Bytecode of one compiled stage.
#[derive(Debug)]
pub struct CompiledShaderStage {
    id: ShaderStageId,
    stage: ShaderStage,
    bytecode: Arc<[u8]>,
}

impl CompiledShaderStage {
    /// Wrap compiled bytecode. Every call yields a new identity.
    pub fn from_bytecode(stage: ShaderStage, bytecode: Vec<u8>) -> Self {
        Self {
            id: ShaderStageId(NEXT_STAGE_ID.fetch_add(1, Ordering::Relaxed)),
            stage,
            bytecode: bytecode.into(),
        }
    }

    pub fn id(&self) -> ShaderStageId {
        self.id
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn bytecode(&self) -> &Arc<[u8]> {
        &self.bytecode
    }
}

/// A named range of floats inside a constant buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderParameter {
    pub name: String,
    /// Constant buffer register.
    pub constant_buffer: u32,
    /// Offset in floats.
    pub offset: u32,
    /// Length in floats.
    pub count: u32,
}

/// Describes a shader to create.
#[derive(Debug, Clone)]
pub struct ShaderDescriptor {
    pub label: Option<String>,
    pub vertex: Arc<CompiledShaderStage>,
    pub pixel: Arc<CompiledShaderStage>,
    pub uniform_layout: UniformLayout,
    pub parameters: Vec<ShaderParameter>,
}

impl ShaderDescriptor {
    pub fn new(vertex: Arc<CompiledShaderStage>, pixel: Arc<CompiledShaderStage>) -> Self {
        Self {
            label: None,
            vertex,
            pixel,
            uniform_layout: UniformLayout::new(),
            parameters: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_uniform_layout(mut self, layout: UniformLayout) -> Self {
        self.uniform_layout = layout;
        self
    }

    /// Declare `count` floats named `name` at `offset` floats into constant
    /// buffer `constant_buffer`.
    pub fn with_parameter(mut self, name: &str, constant_buffer: u32, offset: u32, count: u32) -> Self {
        self.parameters.push(ShaderParameter {
            name: name.to_string(),
            constant_buffer,
            offset,
            count,
        });
        self
    }
}

/// A vertex and pixel stage pair with its uniform layout and parameters.
#[derive(Debug)]
pub struct Shader {
    label: Option<String>,
    vertex: Arc<CompiledShaderStage>,
    pixel: Arc<CompiledShaderStage>,
    uniform_layout: UniformLayout,
    parameters: Vec<ShaderParameter>,
    constant_buffer_sizes: Vec<u32>,
}

impl Shader {
    /// Validate `descriptor` and compute constant buffer sizes.
    pub fn new(descriptor: ShaderDescriptor) -> RhiResult<Self> {
        if descriptor.vertex.stage() != ShaderStage::Vertex {
            return Err(RhiError::InvalidParameter(
                "vertex slot holds a non-vertex stage".to_string(),
            ));
        }
        if descriptor.pixel.stage() != ShaderStage::Pixel {
            return Err(RhiError::InvalidParameter(
                "pixel slot holds a non-pixel stage".to_string(),
            ));
        }

        let layout = &descriptor.uniform_layout;
        let mut sizes: Vec<u32> = layout
            .constant_buffers()
            .iter()
            .map(|slot| if slot.is_some() { 4 } else { 0 })
            .collect();
        for parameter in &descriptor.parameters {
            let register = parameter.constant_buffer as usize;
            if !matches!(layout.constant_buffers().get(register), Some(Some(_))) {
                return Err(RhiError::InvalidParameter(format!(
                    "parameter '{}' refers to undeclared constant buffer {}",
                    parameter.name, parameter.constant_buffer
                )));
            }
            if parameter.count == 0 {
                return Err(RhiError::InvalidParameter(format!(
                    "parameter '{}' has no components",
                    parameter.name
                )));
            }
            let end = parameter.offset + parameter.count;
            sizes[register] = sizes[register].max(end.next_multiple_of(4));
        }

        Ok(Self {
            label: descriptor.label,
            vertex: descriptor.vertex,
            pixel: descriptor.pixel,
            uniform_layout: descriptor.uniform_layout,
            parameters: descriptor.parameters,
            constant_buffer_sizes: sizes,
        })
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn vertex_stage(&self) -> &Arc<CompiledShaderStage> {
        &self.vertex
    }

    pub fn pixel_stage(&self) -> &Arc<CompiledShaderStage> {
        &self.pixel
    }

    pub fn uniform_layout(&self) -> &UniformLayout {
        &self.uniform_layout
    }

    pub fn parameters(&self) -> &[ShaderParameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ShaderParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Size in floats of constant buffer `register`; zero for holes.
    pub fn constant_buffer_size(&self, register: u32) -> u32 {
        self.constant_buffer_sizes
            .get(register as usize)
            .copied()
            .unwrap_or(0)
    }
}

static_assertions::assert_impl_all!(Shader: Send, Sync);
