//! Types shared by the Sierra-to-CASM compilation components and the transaction layer that
//! declares classes through them.

pub mod config;
pub mod errors;

#[cfg(any(feature = "testing", test))]
pub mod test_utils;


use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
#[cfg(any(feature = "testing", test))]
use mockall::automock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use crate::config::{CompilerArgsConfig, ResourceLimitsConfig, SierraCompilationConfig};
pub use crate::errors::{BackendConfigError, CompileError, DeclarationError};

pub type RawClass = Bytes;
pub type CompileResult = Result<CasmArtifact, CompileError>;
pub type DeclarationResult<T> = Result<T, DeclarationError>;

pub type SharedClassDeclarerClient = Arc<dyn ClassDeclarerClient>;

/// Deterministic content hash (SHA-256) of a Sierra artifact; the cache key of its compilation.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassFingerprint(pub [u8; 32]);

impl ClassFingerprint {
    pub fn of(sierra: &[u8]) -> Self {
        Self(Sha256::digest(sierra).into())
    }
}

impl fmt::Display for ClassFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// The hash under which a declared class is registered. Computed outside the compilation
/// subsystem.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassHash(pub [u8; 32]);

impl fmt::Display for ClassHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// The compiler implementation used for the whole process lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompilerBackend {
    /// The prebuilt binary shipped with the network for the host platform.
    EmbeddedBinary { path: PathBuf },
    /// A prebuilt binary supplied by the operator.
    CustomBinaryPath { path: PathBuf },
    /// A compiler built from source on first use, driven by a cargo manifest.
    ManifestBuild { manifest_path: PathBuf },
}

impl CompilerBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            CompilerBackend::EmbeddedBinary { .. } => "embedded",
            CompilerBackend::CustomBinaryPath { .. } => "custom",
            CompilerBackend::ManifestBuild { .. } => "manifest",
        }
    }

    fn path(&self) -> &Path {
        match self {
            CompilerBackend::EmbeddedBinary { path }
            | CompilerBackend::CustomBinaryPath { path } => path,
            CompilerBackend::ManifestBuild { manifest_path } => manifest_path,
        }
    }

    pub fn id(&self) -> BackendId {
        BackendId(format!("{}:{}", self.kind(), self.path().display()))
    }
}

impl fmt::Display for CompilerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Printable identity of a resolved backend, e.g. `custom:/usr/local/bin/starknet-sierra-compile`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BackendId(pub String);

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compiled CASM, as emitted by the compiler, together with the fingerprint of the Sierra
/// artifact it was compiled from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasmArtifact {
    pub bytes: Bytes,
    pub fingerprint: ClassFingerprint,
}

impl CasmArtifact {
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.bytes)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredClass {
    pub class_hash: ClassHash,
    pub casm: CasmArtifact,
}

/// Serves as the declaration boundary used by the transaction layer.
/// Requires `Send + Sync` to allow transferring and sharing resources (inputs, futures) across
/// threads.
#[cfg_attr(any(feature = "testing", test), automock)]
#[async_trait]
pub trait ClassDeclarerClient: Send + Sync {
    /// Compiles a Sierra artifact and returns its class hash and CASM.
    async fn declare(&self, sierra: RawClass) -> DeclarationResult<DeclaredClass>;
}
