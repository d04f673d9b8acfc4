use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

#[cfg(test)]
#[path = "paths_test.rs"]
mod paths_test;

pub const SIERRA_COMPILER_BINARY_NAME: &str = "starknet-sierra-compile";
pub const EMBEDDED_COMPILERS_DIR_NAME: &str = "compilers";

/// The operating system and CPU architecture the process runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostPlatform {
    pub arch: &'static str,
    pub os: &'static str,
}

impl HostPlatform {
    pub fn current() -> Self {
        Self { arch: std::env::consts::ARCH, os: std::env::consts::OS }
    }

    /// The target triple of the prebuilt compiler shipped for this platform, if any.
    pub fn embedded_target_triple(&self) -> Option<&'static str> {
        match (self.arch, self.os) {
            ("x86_64", "linux") => Some("x86_64-unknown-linux-gnu"),
            _ => None,
        }
    }
}

/// The `compilers` directory next to the running executable.
pub fn default_embedded_compiler_dir() -> io::Result<PathBuf> {
    let executable = std::env::current_exe()?;
    let executable_dir = executable.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, format!("{executable:?} has no parent directory."))
    })?;
    Ok(executable_dir.join(EMBEDDED_COMPILERS_DIR_NAME))
}

pub fn embedded_binary_path(embedded_compiler_dir: &Path, target_triple: &str) -> PathBuf {
    embedded_compiler_dir.join(target_triple).join(SIERRA_COMPILER_BINARY_NAME)
}

/// Where `cargo build --release` places the compiler binary under `target_dir`.
pub fn manifest_build_binary_path(target_dir: &Path) -> PathBuf {
    target_dir.join("release").join(SIERRA_COMPILER_BINARY_NAME)
}

/// `target` next to the manifest, matching cargo's default for a standalone package.
pub fn default_manifest_target_dir(manifest_path: &Path) -> PathBuf {
    manifest_path.parent().unwrap_or_else(|| Path::new(".")).join("target")
}

/// Whether `path` is a regular file (following symlinks) with any execute bit set.
pub fn is_executable_file(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}
