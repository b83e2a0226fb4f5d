//! Per-material parameter values and textures for a shader.

use std::sync::Arc;

use super::Shader;
use crate::texture::SampledTexture;

/// Parameter values and bound textures of one material.
///
/// Constant buffer contents are kept on the CPU and streamed to the GPU on
/// every draw.
#[derive(Debug, Clone)]
pub struct ShaderInstance {
    shader: Arc<Shader>,
    constants: Vec<Vec<f32>>,
    textures: Vec<Option<SampledTexture>>,
}

impl ShaderInstance {
    pub fn new(shader: Arc<Shader>) -> Self {
        let layout = shader.uniform_layout();
        let constants = (0..layout.constant_buffers().len() as u32)
            .map(|register| vec![0.0; shader.constant_buffer_size(register) as usize])
            .collect();
        let textures = vec![None; layout.textures().len()];
        Self {
            shader,
            constants,
            textures,
        }
    }

    pub fn shader(&self) -> &Arc<Shader> {
        &self.shader
    }

    /// Set the floats of parameter `name`.
    ///
    /// Unknown names are ignored and return `false`. Extra values beyond the
    /// declared count are dropped.
    pub fn set_parameter(&mut self, name: &str, values: &[f32]) -> bool {
        let Some(parameter) = self.shader.parameter(name) else {
            log::trace!(
                "Shader {:?} has no parameter '{}', ignoring",
                self.shader.label(),
                name
            );
            return false;
        };
        let count = values.len().min(parameter.count as usize);
        if values.len() > count {
            log::warn!(
                "Parameter '{}' takes {} floats, got {}",
                name,
                parameter.count,
                values.len()
            );
        }
        let start = parameter.offset as usize;
        let buffer = &mut self.constants[parameter.constant_buffer as usize];
        buffer[start..start + count].copy_from_slice(&values[..count]);
        true
    }

    /// Current floats of parameter `name`.
    pub fn parameter(&self, name: &str) -> Option<&[f32]> {
        let parameter = self.shader.parameter(name)?;
        let start = parameter.offset as usize;
        let end = start + parameter.count as usize;
        Some(&self.constants[parameter.constant_buffer as usize][start..end])
    }

    /// Bind `texture` to the texture slot named `name`.
    pub fn set_texture(&mut self, name: &str, texture: impl Into<SampledTexture>) -> bool {
        let Some(register) = self.shader.uniform_layout().texture_register(name) else {
            log::trace!(
                "Shader {:?} has no texture '{}', ignoring",
                self.shader.label(),
                name
            );
            return false;
        };
        self.textures[register as usize] = Some(texture.into());
        true
    }

    /// Contents of constant buffer `register`.
    pub fn constant_buffer_data(&self, register: u32) -> &[f32] {
        self.constants
            .get(register as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Texture bound to `register`.
    pub fn texture(&self, register: u32) -> Option<&SampledTexture> {
        self.textures.get(register as usize).and_then(Option::as_ref)
    }

    /// All texture slots in register order.
    pub fn textures(&self) -> &[Option<SampledTexture>] {
        &self.textures
    }
}

static_assertions::assert_impl_all!(ShaderInstance: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{CompiledShaderStage, ShaderDescriptor, ShaderStage, UniformLayout};

    fn shader() -> Arc<Shader> {
        let vs = Arc::new(CompiledShaderStage::from_bytecode(ShaderStage::Vertex, vec![0]));
        let ps = Arc::new(CompiledShaderStage::from_bytecode(ShaderStage::Pixel, vec![0]));
        Arc::new(
            Shader::new(
                ShaderDescriptor::new(vs, ps)
                    .with_label("lit")
                    .with_uniform_layout(
                        UniformLayout::new()
                            .with_constant_buffer("PerObject", 0)
                            .with_texture("Albedo", 0),
                    )
                    .with_parameter("World", 0, 0, 16)
                    .with_parameter("Tint", 0, 16, 4),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_set_parameter() {
        let mut instance = ShaderInstance::new(shader());
        assert!(instance.set_parameter("Tint", &[0.5, 0.25, 1.0, 1.0]));
        assert_eq!(instance.parameter("Tint").unwrap(), &[0.5, 0.25, 1.0, 1.0]);
        assert_eq!(instance.constant_buffer_data(0).len(), 20);
        assert_eq!(&instance.constant_buffer_data(0)[16..], &[0.5, 0.25, 1.0, 1.0]);
    }

    #[test]
    fn test_unknown_parameter_is_ignored() {
        let mut instance = ShaderInstance::new(shader());
        assert!(!instance.set_parameter("SunColor", &[1.0; 4]));
        assert!(instance.parameter("SunColor").is_none());
        assert!(instance.constant_buffer_data(0).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_extra_values_are_truncated() {
        let mut instance = ShaderInstance::new(shader());
        assert!(instance.set_parameter("Tint", &[1.0; 8]));
        assert_eq!(instance.parameter("Tint").unwrap(), &[1.0; 4]);
        assert_eq!(instance.parameter("World").unwrap(), &[0.0; 16]);
    }

    #[test]
    fn test_short_values_update_prefix() {
        let mut instance = ShaderInstance::new(shader());
        instance.set_parameter("Tint", &[0.5, 0.5]);
        assert_eq!(instance.parameter("Tint").unwrap(), &[0.5, 0.5, 0.0, 0.0]);
        assert!(instance.texture(0).is_none());
        assert_eq!(instance.textures().len(), 1);
    }
}
