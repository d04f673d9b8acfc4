use std::fs::File;
use std::path::{Path, PathBuf};

use devnet_compilation_utils::paths::{
    default_embedded_compiler_dir,
    embedded_binary_path,
    is_executable_file,
    HostPlatform,
    EMBEDDED_COMPILERS_DIR_NAME,
};
use devnet_compile_to_casm_types::{BackendConfigError, CompilerBackend, SierraCompilationConfig};
use tracing::info;

#[cfg(test)]
#[path = "resolver_test.rs"]
mod resolver_test;

/// Picks the compiler backend for the lifetime of the process. Checks the filesystem only; no
/// process is spawned and a manifest build is deferred to the first compilation.
pub fn resolve_backend(
    config: &SierraCompilationConfig,
    host: HostPlatform,
) -> Result<CompilerBackend, BackendConfigError> {
    let backend = match (&config.sierra_compiler_path, &config.cairo_compiler_manifest) {
        (Some(compiler_path), Some(manifest_path)) => {
            return Err(BackendConfigError::ConflictingBackendConfig {
                compiler_path: compiler_path.clone(),
                manifest_path: manifest_path.clone(),
            });
        }
        (Some(compiler_path), None) => {
            CompilerBackend::CustomBinaryPath { path: checked_binary(compiler_path)? }
        }
        (None, Some(manifest_path)) => {
            CompilerBackend::ManifestBuild { manifest_path: checked_manifest(manifest_path)? }
        }
        (None, None) => CompilerBackend::EmbeddedBinary {
            path: embedded_binary(config.embedded_compiler_dir.as_deref(), host)?,
        },
    };
    info!("Resolved the Sierra compiler backend: {backend}.");
    Ok(backend)
}

fn checked_binary(path: &Path) -> Result<PathBuf, BackendConfigError> {
    if !path.exists() {
        return Err(BackendConfigError::BinaryNotFound(path.to_path_buf()));
    }
    if !is_executable_file(path) {
        return Err(BackendConfigError::BinaryNotExecutable(path.to_path_buf()));
    }
    Ok(path.to_path_buf())
}

fn checked_manifest(manifest_path: &Path) -> Result<PathBuf, BackendConfigError> {
    let is_readable_file = manifest_path.is_file() && File::open(manifest_path).is_ok();
    if !is_readable_file {
        return Err(BackendConfigError::ManifestNotFound(manifest_path.to_path_buf()));
    }
    Ok(manifest_path.to_path_buf())
}

fn embedded_binary(
    embedded_compiler_dir: Option<&Path>,
    host: HostPlatform,
) -> Result<PathBuf, BackendConfigError> {
    let target_triple =
        host.embedded_target_triple().ok_or_else(|| BackendConfigError::UnsupportedHostPlatform {
            arch: host.arch.to_owned(),
            os: host.os.to_owned(),
        })?;
    let embedded_compiler_dir = match embedded_compiler_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_embedded_compiler_dir().map_err(|_| {
            BackendConfigError::BinaryNotFound(PathBuf::from(EMBEDDED_COMPILERS_DIR_NAME))
        })?,
    };
    checked_binary(&embedded_binary_path(&embedded_compiler_dir, target_triple))
}
