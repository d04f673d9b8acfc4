use std::io;

use devnet_compile_to_casm_types::ResourceLimitsConfig;
use rlimit::{setrlimit, Resource};
use tokio::process::Command;
use tracing::debug;

#[cfg(test)]
#[path = "resource_limits_test.rs"]
mod resource_limits_test;

/// A limit on an individual OS resource. Soft and hard limits are equal, so the limited process
/// can't raise it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RLimit {
    /// All resource constants are available on all unix platforms.
    /// See <https://docs.rs/rlimit/latest/rlimit/struct.Resource.html> for more information.
    resource: Resource,
    limit: u64,
}

impl RLimit {
    /// Sets the resource limit for the current process.
    fn set(&self) -> io::Result<()> {
        setrlimit(self.resource, self.limit, self.limit)
    }
}

/// Resource limits for a compiler process. A `None` limit is left untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceLimits {
    /// A limit (in seconds) on the amount of CPU time that the process can consume.
    cpu_time: Option<RLimit>,
    /// The maximum size (in bytes) of files that the process may create.
    file_size: Option<RLimit>,
    /// The maximum size (in bytes) of the process's virtual memory (address space).
    memory_size: Option<RLimit>,
}

impl ResourceLimits {
    pub fn new(cpu_time: Option<u64>, file_size: Option<u64>, memory_size: Option<u64>) -> Self {
        Self {
            cpu_time: cpu_time.map(|limit| RLimit { resource: Resource::CPU, limit }),
            file_size: file_size.map(|limit| RLimit { resource: Resource::FSIZE, limit }),
            memory_size: memory_size.map(|limit| RLimit { resource: Resource::AS, limit }),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.cpu_time.is_none() && self.file_size.is_none() && self.memory_size.is_none()
    }

    /// Sets all defined resource limits for the current process.
    fn set(&self) -> io::Result<()> {
        [self.cpu_time.as_ref(), self.file_size.as_ref(), self.memory_size.as_ref()]
            .iter()
            .flatten()
            .try_for_each(|resource_limit| resource_limit.set())
    }

    /// Applies the limits to the process spawned by `command`. The limits are moved into a closure
    /// executed in the child right before it calls `exec`.
    pub fn apply(self, command: &mut Command) -> &mut Command {
        if self.is_unlimited() {
            return command;
        }
        // Logged here, in the parent: the child's stderr is part of the compilation diagnostics.
        debug!(
            cpu_time_secs = ?self.cpu_time.map(|rlimit| rlimit.limit),
            file_size_bytes = ?self.file_size.map(|rlimit| rlimit.limit),
            memory_size_bytes = ?self.memory_size.map(|rlimit| rlimit.limit),
            "Applying compiler resource limits."
        );
        // SAFETY: the closure runs in the forked child before `exec`, where only
        // async-signal-safe operations are allowed. It owns a fully constructed `Copy` value,
        // allocates nothing, and only calls `setrlimit`, which is async-signal-safe per the POSIX
        // `fork` specification.
        unsafe { command.pre_exec(move || self.set()) }
    }
}

impl From<&ResourceLimitsConfig> for ResourceLimits {
    fn from(config: &ResourceLimitsConfig) -> Self {
        Self::new(config.max_cpu_time, config.max_file_size, config.max_memory_usage)
    }
}
