use std::path::PathBuf;
use std::time::Duration;

use assert_matches::assert_matches;
use clap::{CommandFactory, Parser};
use devnet_compile_to_casm_types::config::{CONTAINER_SIERRA_COMPILER_PATH, DEFAULT_COMPILER_ARG};
use devnet_compile_to_casm_types::{ResourceLimitsConfig, SierraCompilationConfig};
use devnet_config::dumping::SerializeConfig;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tracing::level_filters::LevelFilter;

use crate::cli::{Command, DevnetNodeCommand};

fn parse(args: &[&str]) -> DevnetNodeCommand {
    DevnetNodeCommand::try_parse_from(std::iter::once("devnet_node").chain(args.iter().copied()))
        .unwrap()
}

#[test]
fn command_definition_is_consistent() {
    DevnetNodeCommand::command().debug_assert();
}

#[test]
fn defaults_without_options() {
    let command = parse(&["compiler-version"]);
    assert_matches!(command.command, Command::CompilerVersion);
    assert_eq!(command.log_level, None);
    assert_eq!(command.compilation.into_config().unwrap(), SierraCompilationConfig::default());
}

#[test]
fn options_build_the_config() {
    let command = parse(&[
        "compile",
        "--sierra",
        "class.sierra.json",
        "--sierra-compiler-path",
        CONTAINER_SIERRA_COMPILER_PATH,
        "--compiler-args",
        "--flagA --flagB",
        "--compilation-timeout-ms",
        "1500",
        "--max-cpu-time",
        "5",
        "--log-level",
        "debug",
    ]);
    assert_matches!(
        &command.command,
        Command::Compile { sierra, output: None } if sierra == &PathBuf::from("class.sierra.json")
    );
    assert_eq!(command.log_level, Some(LevelFilter::DEBUG));

    let config = command.compilation.into_config().unwrap();
    assert_eq!(config.sierra_compiler_path, Some(PathBuf::from(CONTAINER_SIERRA_COMPILER_PATH)));
    assert_eq!(config.compiler_args.args(), ["--flagA", "--flagB"]);
    assert!(!config.compiler_args.args().contains(&DEFAULT_COMPILER_ARG.to_owned()));
    assert_eq!(config.compilation_timeout, Duration::from_millis(1500));
    assert_eq!(
        config.resource_limits,
        ResourceLimitsConfig { max_cpu_time: Some(5), ..ResourceLimitsConfig::default() }
    );
}

#[test]
fn both_backend_overrides_are_accepted_by_the_parser() {
    // The conflict is reported when the backend is resolved.
    let config = parse(&[
        "compiler-version",
        "--sierra-compiler-path",
        "/bin/false",
        "--cairo-compiler-manifest",
        "/cairo/Cargo.toml",
    ])
    .compilation
    .into_config()
    .unwrap();
    assert!(config.sierra_compiler_path.is_some() && config.cairo_compiler_manifest.is_some());
}

#[test]
fn command_line_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let config_file = dir.path().join("config.json");
    let file_config = SierraCompilationConfig {
        sierra_compiler_path: Some("/opt/compilers/starknet-sierra-compile".into()),
        compilation_timeout: Duration::from_secs(5),
        ..SierraCompilationConfig::default()
    };
    file_config.dump_to_file(&config_file).unwrap();

    let config = parse(&[
        "compiler-version",
        "--config-file",
        config_file.to_str().unwrap(),
        "--compilation-timeout-ms",
        "250",
    ])
    .compilation
    .into_config()
    .unwrap();

    assert_eq!(
        config,
        SierraCompilationConfig { compilation_timeout: Duration::from_millis(250), ..file_config }
    );
}

#[test]
fn missing_config_file() {
    let result = parse(&["compiler-version", "--config-file", "/nonexistent/config.json"])
        .compilation
        .into_config();
    assert!(result.is_err());
}

#[test]
fn unknown_log_level_is_rejected() {
    let args = ["devnet_node", "compiler-version", "--log-level", "loud"];
    assert!(DevnetNodeCommand::try_parse_from(args).is_err());
}
