use clap::Parser;
use devnet_infra_utils::tracing_utils::{change_tracing_level, configure_tracing};
use devnet_node::cli::DevnetNodeCommand;
use devnet_node::commands::run_devnet_node;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    configure_tracing().await;
    let devnet_node_command = DevnetNodeCommand::parse();
    if let Some(log_level) = devnet_node_command.log_level {
        change_tracing_level(log_level);
    }
    run_devnet_node(devnet_node_command).await
}
