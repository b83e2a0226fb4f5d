//! Vertex input layouts.

use crate::backend::PixelFormat;

/// Whether an element advances per vertex or per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputClassification {
    #[default]
    PerVertex,
    PerInstance,
}

/// One attribute of a vertex layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexElement {
    pub semantic_name: String,
    pub semantic_index: u32,
    pub format: PixelFormat,
    pub classification: InputClassification,
    /// Byte offset from the start of the vertex.
    pub byte_offset: u32,
}

/// Ordered list of vertex elements with tightly packed offsets.
///
/// The offset of each element is the sum of the sizes of the elements pushed
/// before it. Equality and hashing are structural, so the layout doubles as
/// the vertex-input signature of a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    elements: Vec<VertexElement>,
    stride: u32,
}

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element after the existing ones.
    pub fn push(
        &mut self,
        name: &str,
        index: u32,
        format: PixelFormat,
        classification: InputClassification,
    ) {
        self.elements.push(VertexElement {
            semantic_name: name.to_string(),
            semantic_index: index,
            format,
            classification,
            byte_offset: self.stride,
        });
        self.stride += format.pixel_size();
    }

    /// Builder form of [`push`](Self::push) for per-vertex elements.
    pub fn with_element(mut self, name: &str, index: u32, format: PixelFormat) -> Self {
        self.push(name, index, format, InputClassification::PerVertex);
        self
    }

    /// Build a layout from a list of well-known semantics.
    pub fn from_semantics(semantics: &[InputSemantic]) -> Self {
        let mut layout = Self::new();
        for semantic in semantics {
            let (name, index, format) = semantic.element();
            layout.push(name, index, format, InputClassification::PerVertex);
        }
        layout
    }

    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    /// Size in bytes of one vertex.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Well-known vertex semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSemantic {
    Position,
    Normal,
    Tangent,
    TexCoord0,
    TexCoord1,
    Color,
}

impl InputSemantic {
    /// Semantic name, index and format.
    pub fn element(&self) -> (&'static str, u32, PixelFormat) {
        match self {
            Self::Position => ("POSITION", 0, PixelFormat::R32G32B32Float),
            Self::Normal => ("NORMAL", 0, PixelFormat::R32G32B32Float),
            Self::Tangent => ("TANGENT", 0, PixelFormat::R32G32B32A32Float),
            Self::TexCoord0 => ("TEXCOORD", 0, PixelFormat::R32G32Float),
            Self::TexCoord1 => ("TEXCOORD", 1, PixelFormat::R32G32Float),
            Self::Color => ("COLOR", 0, PixelFormat::R32G32B32A32Float),
        }
    }
}
