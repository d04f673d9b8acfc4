use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use devnet_config::converters::{
    deserialize_milliseconds_to_duration,
    deserialize_whitespace_separated,
    serialize_duration_as_milliseconds,
    serialize_whitespace_separated,
};
use devnet_config::dumping::{
    prepend_sub_config_name,
    ser_optional_param,
    ser_param,
    SerializeConfig,
};
use devnet_config::{ParamPath, ParamPrivacy, SerializedParam};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::{Validate, ValidationError};

/// Makes the compiler emit hints in their pythonic form, which the devnet runtime executes.
pub const DEFAULT_COMPILER_ARG: &str = "--add-pythonic-hints";
pub const DEFAULT_COMPILATION_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_CPU_TIME: u64 = 60;
pub const DEFAULT_MAX_MEMORY_USAGE: u64 = 4 * 1024 * 1024 * 1024;
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Where container images expect the host to mount a statically-linked compiler. Operators pass
/// this path as the Sierra compiler path.
pub const CONTAINER_SIERRA_COMPILER_PATH: &str = "/usr/local/bin/starknet-sierra-compile";

/// Operator flags forwarded verbatim to every compiler invocation. Never empty: an empty list
/// falls back to the single default flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerArgsConfig(Vec<String>);

impl CompilerArgsConfig {
    pub fn new(args: Vec<String>) -> Self {
        if args.is_empty() { Self::default() } else { Self(args) }
    }

    /// Parses the whitespace-separated value of `--compiler-args`. The result replaces the default
    /// flag entirely; a blank value keeps the default.
    pub fn from_whitespace_separated(raw: &str) -> Self {
        Self::new(raw.split_whitespace().map(str::to_owned).collect())
    }

    pub fn args(&self) -> &[String] {
        &self.0
    }
}

impl Default for CompilerArgsConfig {
    fn default() -> Self {
        Self(vec![DEFAULT_COMPILER_ARG.to_owned()])
    }
}

impl Serialize for CompilerArgsConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_whitespace_separated(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for CompilerArgsConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_whitespace_separated(deserializer).map(Self::new)
    }
}

/// OS resource limits applied to every compiler process. `None` leaves a resource unlimited.
#[derive(Clone, Debug, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct ResourceLimitsConfig {
    /// Compilation CPU time limit (in seconds).
    pub max_cpu_time: Option<u64>,
    /// Compilation process's virtual memory (address space) byte limit.
    pub max_memory_usage: Option<u64>,
    /// Limit (in bytes) on the size of files the compiler may create.
    pub max_file_size: Option<u64>,
}

impl Default for ResourceLimitsConfig {
    fn default() -> Self {
        Self {
            max_cpu_time: Some(DEFAULT_MAX_CPU_TIME),
            max_memory_usage: Some(DEFAULT_MAX_MEMORY_USAGE),
            max_file_size: Some(DEFAULT_MAX_FILE_SIZE),
        }
    }
}

impl ResourceLimitsConfig {
    pub fn unlimited() -> Self {
        Self { max_cpu_time: None, max_memory_usage: None, max_file_size: None }
    }
}

impl SerializeConfig for ResourceLimitsConfig {
    fn dump(&self) -> BTreeMap<ParamPath, SerializedParam> {
        let mut dump = ser_optional_param(
            &self.max_cpu_time,
            DEFAULT_MAX_CPU_TIME,
            "max_cpu_time",
            "Limitation of compilation cpu time (seconds).",
            ParamPrivacy::Public,
        );
        dump.extend(ser_optional_param(
            &self.max_memory_usage,
            DEFAULT_MAX_MEMORY_USAGE,
            "max_memory_usage",
            "Limitation of compilation process's virtual memory (bytes).",
            ParamPrivacy::Public,
        ));
        dump.extend(ser_optional_param(
            &self.max_file_size,
            DEFAULT_MAX_FILE_SIZE,
            "max_file_size",
            "Limitation of the size of files created by the compiler (bytes).",
            ParamPrivacy::Public,
        ));
        dump
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate, PartialEq)]
#[validate(schema(function = "validate_single_backend_override"))]
pub struct SierraCompilationConfig {
    /// Prebuilt Sierra-to-CASM compiler binary path.
    pub sierra_compiler_path: Option<PathBuf>,
    /// Cargo manifest of a compiler toolchain to build the compiler from.
    pub cairo_compiler_manifest: Option<PathBuf>,
    /// Flags forwarded to every compilation.
    pub compiler_args: CompilerArgsConfig,
    /// Upper bound on a single compilation.
    #[serde(
        serialize_with = "serialize_duration_as_milliseconds",
        deserialize_with = "deserialize_milliseconds_to_duration"
    )]
    pub compilation_timeout: Duration,
    /// Directory holding the prebuilt compilers shipped with the network. Defaults to `compilers`
    /// next to the running executable.
    pub embedded_compiler_dir: Option<PathBuf>,
    /// Cargo target directory for the manifest build. Defaults to `target` next to the manifest.
    pub manifest_build_target_dir: Option<PathBuf>,
    #[validate(nested)]
    pub resource_limits: ResourceLimitsConfig,
}

impl Default for SierraCompilationConfig {
    fn default() -> Self {
        Self {
            sierra_compiler_path: None,
            cairo_compiler_manifest: None,
            compiler_args: CompilerArgsConfig::default(),
            compilation_timeout: DEFAULT_COMPILATION_TIMEOUT,
            embedded_compiler_dir: None,
            manifest_build_target_dir: None,
            resource_limits: ResourceLimitsConfig::default(),
        }
    }
}

impl SierraCompilationConfig {
    pub fn create_for_testing() -> Self {
        Self {
            compilation_timeout: Duration::from_secs(10),
            resource_limits: ResourceLimitsConfig::unlimited(),
            ..Self::default()
        }
    }
}

impl SerializeConfig for SierraCompilationConfig {
    fn dump(&self) -> BTreeMap<ParamPath, SerializedParam> {
        let mut dump = BTreeMap::from([
            ser_param(
                "compiler_args",
                &self.compiler_args.args().join(" "),
                "Whitespace-separated flags passed to every compilation. Replaces the default \
                 '--add-pythonic-hints' flag.",
                ParamPrivacy::Public,
            ),
            ser_param(
                "compilation_timeout",
                &u64::try_from(self.compilation_timeout.as_millis()).unwrap_or(u64::MAX),
                "Upper bound on a single compilation (milliseconds).",
                ParamPrivacy::Public,
            ),
        ]);
        dump.extend(ser_optional_param(
            &self.sierra_compiler_path,
            "".into(),
            "sierra_compiler_path",
            "The path to a prebuilt Sierra-to-CASM compiler binary.",
            ParamPrivacy::Public,
        ));
        dump.extend(ser_optional_param(
            &self.cairo_compiler_manifest,
            "".into(),
            "cairo_compiler_manifest",
            "The path to a Cargo.toml of the Cairo compiler, built on first use.",
            ParamPrivacy::Public,
        ));
        dump.extend(ser_optional_param(
            &self.embedded_compiler_dir,
            "".into(),
            "embedded_compiler_dir",
            "The directory holding the prebuilt compilers shipped with the network.",
            ParamPrivacy::Public,
        ));
        dump.extend(ser_optional_param(
            &self.manifest_build_target_dir,
            "".into(),
            "manifest_build_target_dir",
            "The cargo target directory used when building the compiler from a manifest.",
            ParamPrivacy::Public,
        ));
        dump.append(&mut prepend_sub_config_name(self.resource_limits.dump(), "resource_limits"));
        dump
    }
}

fn validate_single_backend_override(
    config: &SierraCompilationConfig,
) -> Result<(), ValidationError> {
    if config.sierra_compiler_path.is_some() && config.cairo_compiler_manifest.is_some() {
        let mut error = ValidationError::new("conflicting_backend_config");
        error.message = Some(
            "Specify at most one of the Sierra compiler path and the Cairo compiler manifest."
                .into(),
        );
        return Err(error);
    }
    Ok(())
}
