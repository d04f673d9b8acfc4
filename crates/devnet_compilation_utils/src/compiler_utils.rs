use std::ffi::OsString;
use std::io::ErrorKind;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use devnet_compile_to_casm_types::CompileError;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::debug;

use crate::resource_limits::ResourceLimits;

#[cfg(test)]
#[path = "compiler_utils_test.rs"]
mod compiler_utils_test;

/// Upper bound on the compiler stderr kept in a `CompilationFailed` error.
pub const MAX_STDERR_EXCERPT_BYTES: usize = 4096;

/// Runs the compiler at `compiler_binary_path` on `sierra` and returns its stdout.
///
/// The input is written to a temporary file whose path is handed to `compose_args`. The child is
/// killed if it does not exit within `timeout`.
pub async fn compile_with_args(
    compiler_binary_path: &Path,
    sierra: &[u8],
    compose_args: impl FnOnce(&Path) -> Vec<OsString>,
    resource_limits: ResourceLimits,
    timeout: Duration,
) -> Result<Vec<u8>, CompileError> {
    let input_file = NamedTempFile::new()?;
    tokio::fs::write(input_file.path(), sierra).await?;

    let mut command = Command::new(compiler_binary_path);
    command
        .args(compose_args(input_file.path()))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    resource_limits.apply(&mut command);

    let compile_output = run_to_completion(command, compiler_binary_path, timeout).await?;
    debug!(
        status = %compile_output.status,
        stdout_bytes = compile_output.stdout.len(),
        "Compiler process exited."
    );

    if !compile_output.status.success() {
        return Err(CompileError::CompilationFailed {
            stderr_excerpt: failure_report(compile_output.status, &compile_output.stderr),
        });
    }
    Ok(compile_output.stdout)
}

/// Runs `compiler_binary_path --version` and returns its trimmed stdout.
pub async fn compiler_version(
    compiler_binary_path: &Path,
    timeout: Duration,
) -> Result<String, CompileError> {
    let mut command = Command::new(compiler_binary_path);
    command
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    let version_output = run_to_completion(command, compiler_binary_path, timeout).await?;
    if !version_output.status.success() {
        return Err(CompileError::CompilationFailed {
            stderr_excerpt: failure_report(version_output.status, &version_output.stderr),
        });
    }
    Ok(String::from_utf8_lossy(&version_output.stdout).trim().to_owned())
}

async fn run_to_completion(
    mut command: Command,
    compiler_binary_path: &Path,
    timeout: Duration,
) -> Result<Output, CompileError> {
    let child = command.spawn().map_err(|error| match error.kind() {
        ErrorKind::NotFound => CompileError::BinaryNotFound(compiler_binary_path.to_path_buf()),
        _ => CompileError::UnexpectedError(format!(
            "Failed to spawn {compiler_binary_path:?}: {error}"
        )),
    })?;

    // Dropping the pending output future drops the child, which kills it.
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => Ok(output?),
        Err(_) => Err(CompileError::InvocationTimeout { timeout }),
    }
}

/// Exit status, signal information and a bounded excerpt of the compiler's stderr.
pub fn failure_report(status: ExitStatus, stderr: &[u8]) -> String {
    let signal_info = match status.signal() {
        Some(9) => {
            "SIGKILL (9): Process was forcefully killed (for example, because it exceeded CPU \
             limit)."
                .to_owned()
        }
        Some(25) => "SIGXFSZ (25): File size limit exceeded.".to_owned(),
        None => "Process exited with non-zero status but no signal (likely a handled error, e.g., \
                 memory allocation failure)."
            .to_owned(),
        Some(signal) => format!("Process terminated by unexpected signal: {signal}"),
    };
    format!(
        "Exit status: {status}\nStderr: {}\nSignal info: {signal_info}",
        stderr_excerpt(stderr, MAX_STDERR_EXCERPT_BYTES)
    )
}

/// The lossily decoded prefix of `stderr`, cut at a char boundary at most `max_bytes` long.
pub fn stderr_excerpt(stderr: &[u8], max_bytes: usize) -> String {
    let decoded = String::from_utf8_lossy(stderr);
    let decoded = decoded.trim_end();
    if decoded.len() <= max_bytes {
        return decoded.to_owned();
    }
    let mut end = max_bytes;
    while !decoded.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &decoded[..end])
}
