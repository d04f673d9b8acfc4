use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;
use thiserror::Error;

/// Backend resolution failures. Raised at startup and fatal to process initialization.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendConfigError {
    #[error(
        "Both a Sierra compiler path ({compiler_path:?}) and a Cairo compiler manifest \
         ({manifest_path:?}) were given; specify at most one."
    )]
    ConflictingBackendConfig { compiler_path: PathBuf, manifest_path: PathBuf },
    #[error("Compiler binary not found at {0:?}.")]
    BinaryNotFound(PathBuf),
    #[error("Compiler binary at {0:?} is not an executable file.")]
    BinaryNotExecutable(PathBuf),
    #[error("Cairo compiler manifest not found or not readable at {0:?}.")]
    ManifestNotFound(PathBuf),
    #[error(
        "No prebuilt Sierra compiler is shipped for {arch}-{os}. Pass a compiler path or a Cairo \
         compiler manifest instead."
    )]
    UnsupportedHostPlatform { arch: String, os: String },
}

/// Failures of a single compilation.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
pub enum CompileError {
    #[error("Building the Sierra compiler from {manifest_path:?} failed: {message}")]
    BuildFailed { manifest_path: PathBuf, message: String },
    #[error("Compiler binary not found at {0:?}.")]
    BinaryNotFound(PathBuf),
    #[error("Invalid Sierra artifact: {0}")]
    InvalidInput(String),
    #[error("Starknet Sierra compilation error: {stderr_excerpt}")]
    CompilationFailed { stderr_excerpt: String },
    #[error("Compilation did not finish within {timeout:?}.")]
    InvocationTimeout { timeout: Duration },
    #[error("Unexpected compilation error: {0}")]
    UnexpectedError(String),
}

impl CompileError {
    /// Whether compiling the same artifact on the same backend may succeed later. Transient
    /// failures are not cached.
    pub fn is_transient(&self) -> bool {
        matches!(self, CompileError::InvocationTimeout { .. } | CompileError::UnexpectedError(_))
    }

    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl From<std::io::Error> for CompileError {
    fn from(error: std::io::Error) -> Self {
        CompileError::UnexpectedError(error.to_string())
    }
}

/// The error returned to the transaction layer by a class declaration. Each variant carries the
/// diagnostic text of the underlying failure.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
pub enum DeclarationError {
    #[error("Compiler build failed: {0}")]
    BuildFailed(String),
    #[error("Compiler binary not found: {0}")]
    BinaryNotFound(String),
    #[error("Invalid class: {0}")]
    InvalidInput(String),
    #[error("Compilation failed: {0}")]
    CompilationFailed(String),
    #[error("Compilation timed out: {0}")]
    InvocationTimeout(String),
    #[error("Internal compiler error: {0}")]
    UnexpectedError(String),
}

impl DeclarationError {
    /// The taxonomy tag, e.g. `"CompilationFailed"`.
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Whether the caller may retry the same declaration.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DeclarationError::InvocationTimeout(_) | DeclarationError::UnexpectedError(_)
        )
    }
}

impl From<CompileError> for DeclarationError {
    fn from(error: CompileError) -> Self {
        let message = error.to_string();
        match error {
            CompileError::BuildFailed { .. } => DeclarationError::BuildFailed(message),
            CompileError::BinaryNotFound(_) => DeclarationError::BinaryNotFound(message),
            CompileError::InvalidInput(_) => DeclarationError::InvalidInput(message),
            CompileError::CompilationFailed { .. } => DeclarationError::CompilationFailed(message),
            CompileError::InvocationTimeout { .. } => DeclarationError::InvocationTimeout(message),
            CompileError::UnexpectedError(_) => DeclarationError::UnexpectedError(message),
        }
    }
}
