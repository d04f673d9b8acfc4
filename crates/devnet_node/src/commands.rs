use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use devnet_compile_to_casm::create_class_declarer;
use devnet_compile_to_casm_types::{
    DeclaredClass,
    SharedClassDeclarerClient,
    SierraCompilationConfig,
};
use devnet_config::dumping::SerializeConfig;
use tracing::info;
use validator::Validate;

use crate::cli::{Command, DevnetNodeCommand};

#[cfg(test)]
#[path = "commands_test.rs"]
mod commands_test;

pub async fn run_devnet_node(devnet_node_command: DevnetNodeCommand) -> anyhow::Result<()> {
    info!("Starting devnet_node with command: {:?}", devnet_node_command.command);
    let config = devnet_node_command.compilation.into_config()?;
    match devnet_node_command.command {
        Command::Compile { sierra, output } => {
            let declared = compile_class(&config, &sierra, output.as_deref()).await?;
            println!("Class hash: {}", declared.class_hash);
            if output.is_none() {
                println!("{}", String::from_utf8_lossy(&declared.casm.bytes));
            }
        }
        Command::DumpConfig { output } => dump_config(&config, &output)?,
        Command::CompilerVersion => println!("{}", compiler_version(&config).await?),
    }
    Ok(())
}

/// Declares the class in `sierra_path` and writes its CASM to `output`, if given.
pub async fn compile_class(
    config: &SierraCompilationConfig,
    sierra_path: &Path,
    output: Option<&Path>,
) -> anyhow::Result<DeclaredClass> {
    let declarer: SharedClassDeclarerClient = Arc::new(create_class_declarer(config)?);
    let sierra = tokio::fs::read(sierra_path)
        .await
        .with_context(|| format!("Failed to read the Sierra class {sierra_path:?}"))?;
    let declared = declarer.declare(sierra.into()).await?;
    if let Some(output) = output {
        tokio::fs::write(output, &declared.casm.bytes)
            .await
            .with_context(|| format!("Failed to write the CASM to {output:?}"))?;
        info!("Wrote the CASM of class {} to {:?}.", declared.class_hash, output);
    }
    Ok(declared)
}

pub fn dump_config(config: &SierraCompilationConfig, output: &Path) -> anyhow::Result<()> {
    config.validate()?;
    config.dump_to_file(output)?;
    info!("Wrote the config to {:?}.", output);
    Ok(())
}

pub async fn compiler_version(config: &SierraCompilationConfig) -> anyhow::Result<String> {
    let declarer = create_class_declarer(config)?;
    info!("Querying the version of the {} compiler.", declarer.compiler().backend());
    Ok(declarer.compiler().compiler_version().await?)
}
