use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use devnet_compile_to_casm_types::CompileError;
use tokio::process::Command;
use tracing::info;

use crate::compiler_utils::{stderr_excerpt, MAX_STDERR_EXCERPT_BYTES};
use crate::paths::{is_executable_file, manifest_build_binary_path, SIERRA_COMPILER_BINARY_NAME};

#[cfg(test)]
#[path = "build_utils_test.rs"]
mod build_utils_test;

pub const CARGO_PROGRAM: &str = "cargo";

/// Builds the Sierra compiler binary of the toolchain described by `manifest_path` into
/// `target_dir` and returns the path of the built binary.
pub async fn build_compiler_from_manifest(
    build_program: &OsStr,
    manifest_path: &Path,
    target_dir: &Path,
) -> Result<PathBuf, CompileError> {
    let build_failed = |message: String| CompileError::BuildFailed {
        manifest_path: manifest_path.to_path_buf(),
        message,
    };

    info!(
        ?manifest_path,
        ?target_dir,
        "Building {SIERRA_COMPILER_BINARY_NAME} from source. This may take a few minutes."
    );
    let build_output = Command::new(build_program)
        .args(["build", "--release", "--manifest-path"])
        .arg(manifest_path)
        .args(["--bin", SIERRA_COMPILER_BINARY_NAME, "--target-dir"])
        .arg(target_dir)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|error| build_failed(format!("Failed to run {build_program:?}: {error}")))?;

    if !build_output.status.success() {
        return Err(build_failed(format!(
            "Exit status: {}\nStderr: {}",
            build_output.status,
            stderr_excerpt(&build_output.stderr, MAX_STDERR_EXCERPT_BYTES)
        )));
    }

    let binary_path = manifest_build_binary_path(target_dir);
    if !is_executable_file(&binary_path) {
        return Err(build_failed(format!(
            "The build succeeded but produced no executable at {binary_path:?}."
        )));
    }
    info!("Successfully built the Sierra compiler: {:?}", binary_path.display());
    Ok(binary_path)
}
