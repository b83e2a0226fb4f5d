//! Shader source compilation.

use super::ShaderStage;
use crate::error::{RhiError, RhiResult};

/// Turns shader source into backend bytecode.
///
/// Failures are [`RhiError::ShaderCompilation`] carrying the compiler's
/// diagnostic text.
pub trait ShaderCompiler: Send + Sync {
    /// Compile the entry point of `stage` (see [`ShaderStage::entry_point`]).
    fn compile(&self, source: &str, stage: ShaderStage) -> RhiResult<Vec<u8>>;
}

/// WGSL to SPIR-V compiler built on naga.
#[derive(Debug, Default, Clone, Copy)]
pub struct NagaCompiler;

impl NagaCompiler {
    pub fn new() -> Self {
        Self
    }
}

fn failure(stage: ShaderStage, diagnostics: String) -> RhiError {
    RhiError::ShaderCompilation { stage, diagnostics }
}

impl ShaderCompiler for NagaCompiler {
    fn compile(&self, source: &str, stage: ShaderStage) -> RhiResult<Vec<u8>> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|e| failure(stage, e.emit_to_string(source)))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        let info = validator
            .validate(&module)
            .map_err(|e| failure(stage, format!("validation error: {e}")))?;

        let naga_stage = match stage {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Pixel => naga::ShaderStage::Fragment,
        };
        let entry_point = stage.entry_point();
        if !module
            .entry_points
            .iter()
            .any(|ep| ep.name == entry_point && ep.stage == naga_stage)
        {
            return Err(failure(
                stage,
                format!("entry point '{entry_point}' not found for stage {stage:?}"),
            ));
        }

        let options = naga::back::spv::Options::default();
        let pipeline_options = naga::back::spv::PipelineOptions {
            shader_stage: naga_stage,
            entry_point: entry_point.to_string(),
        };
        let words = naga::back::spv::write_vec(&module, &info, &options, Some(&pipeline_options))
            .map_err(|e| failure(stage, format!("SPIR-V generation error: {e}")))?;

        Ok(bytemuck::cast_slice(&words).to_vec())
    }
}
