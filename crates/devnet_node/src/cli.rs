use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use devnet_compile_to_casm_types::{CompilerArgsConfig, SierraCompilationConfig};
use devnet_config::loading::load_from_file;
use devnet_infra_utils::tracing_utils::parse_level_filter;
use tracing::level_filters::LevelFilter;

#[cfg(test)]
#[path = "cli_test.rs"]
mod cli_test;

#[derive(Parser, Debug)]
#[clap(
    name = "devnet_node",
    about = "Compiles Sierra classes to CASM as the devnet does on declaration."
)]
pub struct DevnetNodeCommand {
    #[clap(flatten)]
    pub compilation: CompilationArgs,
    /// One of error, warn, info, debug, trace or off. Overrides `RUST_LOG` when given.
    #[clap(long, global = true, value_parser = parse_log_level)]
    pub log_level: Option<LevelFilter>,
    #[clap(subcommand)]
    pub command: Command,
}

/// Compiler startup options. Each given option overrides the value in `--config-file`.
#[derive(Args, Debug, Default)]
pub struct CompilationArgs {
    /// A config file previously written by `dump-config`.
    #[clap(long, global = true)]
    pub config_file: Option<PathBuf>,
    /// Cargo manifest of the Cairo compiler to build `starknet-sierra-compile` from, on first use.
    #[clap(long, global = true)]
    pub cairo_compiler_manifest: Option<PathBuf>,
    /// A prebuilt `starknet-sierra-compile` binary, e.g.
    /// /usr/local/bin/starknet-sierra-compile inside the container image.
    #[clap(long, global = true)]
    pub sierra_compiler_path: Option<PathBuf>,
    /// Whitespace-separated flags passed to every compilation instead of --add-pythonic-hints.
    #[clap(long, global = true, allow_hyphen_values = true)]
    pub compiler_args: Option<String>,
    #[clap(long, global = true)]
    pub compilation_timeout_ms: Option<u64>,
    /// Directory of the prebuilt compilers shipped with the devnet.
    #[clap(long, global = true)]
    pub embedded_compiler_dir: Option<PathBuf>,
    /// CPU time limit of a compilation, in seconds.
    #[clap(long, global = true)]
    pub max_cpu_time: Option<u64>,
    /// Address space limit of a compilation, in bytes.
    #[clap(long, global = true)]
    pub max_memory_usage: Option<u64>,
    /// Limit on the size of files a compilation may create, in bytes.
    #[clap(long, global = true)]
    pub max_file_size: Option<u64>,
}

impl CompilationArgs {
    /// The config file (or the defaults) with the command line options applied on top.
    pub fn into_config(self) -> anyhow::Result<SierraCompilationConfig> {
        let mut config = match &self.config_file {
            Some(config_file) => load_from_file(config_file)
                .with_context(|| format!("Failed to load the config file {config_file:?}"))?,
            None => SierraCompilationConfig::default(),
        };

        if let Some(manifest_path) = self.cairo_compiler_manifest {
            config.cairo_compiler_manifest = Some(manifest_path);
        }
        if let Some(compiler_path) = self.sierra_compiler_path {
            config.sierra_compiler_path = Some(compiler_path);
        }
        if let Some(compiler_args) = self.compiler_args {
            config.compiler_args = CompilerArgsConfig::from_whitespace_separated(&compiler_args);
        }
        if let Some(timeout_ms) = self.compilation_timeout_ms {
            config.compilation_timeout = Duration::from_millis(timeout_ms);
        }
        if let Some(embedded_compiler_dir) = self.embedded_compiler_dir {
            config.embedded_compiler_dir = Some(embedded_compiler_dir);
        }
        if let Some(max_cpu_time) = self.max_cpu_time {
            config.resource_limits.max_cpu_time = Some(max_cpu_time);
        }
        if let Some(max_memory_usage) = self.max_memory_usage {
            config.resource_limits.max_memory_usage = Some(max_memory_usage);
        }
        if let Some(max_file_size) = self.max_file_size {
            config.resource_limits.max_file_size = Some(max_file_size);
        }
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Declares a Sierra class and prints its class hash and CASM.
    Compile {
        /// The Sierra contract class JSON file.
        #[clap(long)]
        sierra: PathBuf,
        /// Writes the CASM to this file instead of stdout.
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// Writes the effective config as a flattened JSON file.
    DumpConfig {
        #[clap(long)]
        output: PathBuf,
    },
    /// Prints the version of the resolved compiler.
    CompilerVersion,
}

fn parse_log_level(level: &str) -> Result<LevelFilter, String> {
    parse_level_filter(level).ok_or_else(|| format!("Unknown log level: {level}"))
}
