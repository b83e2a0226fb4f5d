//! RHI error types.

use thiserror::Error;

use crate::backend::BackendError;
use crate::shader::ShaderStage;

/// Errors returned by RHI operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RhiError {
    /// A backend call failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    /// A shader stage failed to compile.
    #[error("failed to compile {stage:?} shader:\n{diagnostics}")]
    ShaderCompilation {
        stage: ShaderStage,
        diagnostics: String,
    },
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// No adapter is a discrete hardware GPU.
    #[error("no suitable graphics adapter found")]
    NoSuitableAdapter,
}

/// Result alias for RHI operations.
pub type RhiResult<T> = Result<T, RhiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RhiError::NoSuitableAdapter;
        assert_eq!(err.to_string(), "no suitable graphics adapter found");

        let err = RhiError::InvalidParameter("zero width".to_string());
        assert_eq!(err.to_string(), "invalid parameter: zero width");

        let err: RhiError = BackendError::OutOfMemory.into();
        assert_eq!(err.to_string(), "backend error: Out of memory");
    }
}
