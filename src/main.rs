use clap::Parser;
use docindex_mcp::cli::Cli;
use docindex_mcp::config::Config;
use docindex_mcp::state::IndexState;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interfere with MCP traffic on stdout
    docindex_mcp::tracing::init(cli.log_format, cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(index) = cli.index.clone() {
        config.index = Some(index);
    }
    tracing::debug!("Configuration: {:?}", config);

    let state = Arc::new(IndexState::new(config));
    cli.run(state).await
}
