//! Stub compiler and build-tool scripts for exercising real process invocation in tests.
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const STUB_COMPILER_VERSION: &str = "starknet-sierra-compile 2.11.4";

/// Echoes the Sierra input file as its "CASM" output, and answers `--version`.
pub const ECHO_COMPILER_SCRIPT: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
    echo "starknet-sierra-compile 2.11.4"
    exit 0
fi
cat "$1"
"#;

/// Prints the argument vector it was invoked with, one argument per line, to stderr and fails.
pub const ARGS_REPORTING_COMPILER_SCRIPT: &str = r#"#!/bin/sh
for arg in "$@"; do
    echo "arg: $arg" >&2
done
exit 1
"#;

pub const FAILING_COMPILER_SCRIPT: &str = r#"#!/bin/sh
echo "Error: Invalid Sierra program: unsupported version." >&2
exit 1
"#;

pub const NON_JSON_COMPILER_SCRIPT: &str = r#"#!/bin/sh
echo "this is not casm"
"#;

/// A `cargo` replacement that fails like a build of a broken manifest.
pub const FAILING_CARGO_SCRIPT: &str = r#"#!/bin/sh
echo "error: failed to parse manifest" >&2
exit 101
"#;

/// Like [`ECHO_COMPILER_SCRIPT`], after sleeping for `delay`.
pub fn slow_compiler_script(delay: Duration) -> String {
    format!("#!/bin/sh\nsleep {}\ncat \"$1\"\n", delay.as_secs_f64())
}

/// A `cargo` replacement that "builds" [`ECHO_COMPILER_SCRIPT`] into `<target-dir>/release` and
/// appends a line to `<target-dir>/builds.log` on every run.
pub fn stub_cargo_script() -> String {
    format!(
        r#"#!/bin/sh
target_dir=""
while [ $# -gt 0 ]; do
    if [ "$1" = "--target-dir" ]; then
        target_dir="$2"
        shift
    fi
    shift
done
mkdir -p "$target_dir/release"
echo "build" >> "$target_dir/builds.log"
cat > "$target_dir/release/starknet-sierra-compile" <<'COMPILER'
{ECHO_COMPILER_SCRIPT}COMPILER
chmod 755 "$target_dir/release/starknet-sierra-compile"
"#
    )
}

/// The number of builds recorded by [`stub_cargo_script`] in `target_dir`.
pub fn stub_cargo_builds(target_dir: &Path) -> usize {
    fs::read_to_string(target_dir.join("builds.log")).map(|log| log.lines().count()).unwrap_or(0)
}

/// Writes `contents` to `dir/name` with mode 755.
pub fn write_executable_script(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write the stub script.");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make the stub script executable.");
    path
}
