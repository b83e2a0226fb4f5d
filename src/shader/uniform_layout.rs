//! Constant buffer and texture slot tables of a shader.

use std::sync::Arc;

use crate::backend::{BindingLayoutDesc, GpuBackend, NativeBindingLayout};
use crate::error::RhiResult;

/// Kind of uniform slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformSlotKind {
    ConstantBuffer,
    Texture,
}

/// A native binding layout built from a [`UniformLayout`] shape.
///
/// Layouts are shared by every pipeline whose shaders have the same
/// [`BindingLayoutDesc`]; the pipeline cache owns the lookup.
pub struct BindingLayout {
    backend: Arc<dyn GpuBackend>,
    handle: NativeBindingLayout,
    desc: BindingLayoutDesc,
}

impl BindingLayout {
    pub fn new(backend: &Arc<dyn GpuBackend>, desc: BindingLayoutDesc) -> RhiResult<Self> {
        let handle = backend.create_binding_layout(&desc)?;
        log::debug!(
            "Created binding layout {:?}: {} constant buffers, {} textures",
            handle,
            desc.constant_buffers,
            desc.textures
        );
        Ok(Self {
            backend: Arc::clone(backend),
            handle,
            desc,
        })
    }

    pub fn handle(&self) -> NativeBindingLayout {
        self.handle
    }

    pub fn desc(&self) -> BindingLayoutDesc {
        self.desc
    }
}

impl Drop for BindingLayout {
    fn drop(&mut self) {
        self.backend.release_binding_layout(self.handle);
    }
}

impl std::fmt::Debug for BindingLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingLayout")
            .field("handle", &self.handle)
            .field("desc", &self.desc)
            .finish()
    }
}

/// Register-indexed tables of constant buffers and textures.
///
/// Pushing a register past the end grows the table and leaves unnamed holes.
/// Root parameters follow register order: constant buffers first, then one
/// table per texture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UniformLayout {
    constant_buffers: Vec<Option<String>>,
    textures: Vec<Option<String>>,
}

impl UniformLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the slot `register` of `kind`.
    pub fn push(&mut self, name: &str, register: u32, kind: UniformSlotKind) {
        let table = match kind {
            UniformSlotKind::ConstantBuffer => &mut self.constant_buffers,
            UniformSlotKind::Texture => &mut self.textures,
        };
        let register = register as usize;
        if table.len() <= register {
            table.resize(register + 1, None);
        }
        table[register] = Some(name.to_string());
    }

    pub fn with_constant_buffer(mut self, name: &str, register: u32) -> Self {
        self.push(name, register, UniformSlotKind::ConstantBuffer);
        self
    }

    pub fn with_texture(mut self, name: &str, register: u32) -> Self {
        self.push(name, register, UniformSlotKind::Texture);
        self
    }

    pub fn constant_buffers(&self) -> &[Option<String>] {
        &self.constant_buffers
    }

    pub fn textures(&self) -> &[Option<String>] {
        &self.textures
    }

    pub fn constant_buffer_register(&self, name: &str) -> Option<u32> {
        find_register(&self.constant_buffers, name)
    }

    pub fn texture_register(&self, name: &str) -> Option<u32> {
        find_register(&self.textures, name)
    }

    /// Root parameter index of constant buffer `register`.
    pub fn constant_buffer_root_index(&self, register: u32) -> u32 {
        register
    }

    /// Root parameter index of texture `register`.
    pub fn texture_root_index(&self, register: u32) -> u32 {
        self.constant_buffers.len() as u32 + register
    }

    pub fn binding_layout_desc(&self) -> BindingLayoutDesc {
        BindingLayoutDesc {
            constant_buffers: self.constant_buffers.len() as u32,
            textures: self.textures.len() as u32,
        }
    }
}

fn find_register(table: &[Option<String>], name: &str) -> Option<u32> {
    table
        .iter()
        .position(|slot| slot.as_deref() == Some(name))
        .map(|index| index as u32)
}
