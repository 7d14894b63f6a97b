//! Command-line interface.
//!
//! Without a subcommand the binary serves MCP over stdio. The other commands
//! run one tool against the configured (or `--index`) payload and print the
//! same text an MCP client would receive.

use crate::discover::{discover, resolve_index_path};
use crate::search::SearchMode;
use crate::server::IndexServer;
use crate::state::{IndexState, spawn_reload_watcher};
use crate::tools::{
    ListPagesRequest, ReadSectionRequest, SearchRequest, ValidateRequest, handle_list_pages,
    handle_read_section, handle_search, handle_validate,
};
use crate::tracing::LogFormat;
use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use rmcp::{ServiceExt, transport::stdio};
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "docindex-mcp", version)]
#[command(about = "Search generated documentation search indices", long_about = None)]
pub struct Cli {
    /// Config file (default: $DOCINDEX_CONFIG, then the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// search_index.js or a built documentation directory
    #[arg(short, long, global = true)]
    pub index: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve MCP tools over stdio (the default)
    Serve,
    /// Search records by title and prose
    Search {
        query: String,
        #[arg(short, long, value_enum, default_value_t = SearchMode::Substring)]
        mode: SearchMode,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        page: Option<String>,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Outline pages and their sections
    Pages {
        #[arg(short, long)]
        page: Option<String>,
    },
    /// Print the prose of one section
    Show {
        /// Section anchor, e.g. "#Usage"
        location: String,
        #[arg(short, long)]
        page: Option<String>,
    },
    /// Report malformed entries and duplicate anchors
    Validate,
    /// Write the index back out as JavaScript
    Emit {
        /// Always use the `documenterSearchIndex` binding
        #[arg(long)]
        documenter: bool,
    },
    /// List search-index payloads under a directory
    Discover { dir: PathBuf },
}

impl Cli {
    /// Execute the selected command against `state`.
    pub async fn run(self, state: Arc<IndexState>) -> anyhow::Result<()> {
        match self.command.unwrap_or(Commands::Serve) {
            Commands::Serve => serve(state).await,
            Commands::Search {
                query,
                mode,
                category,
                page,
                limit,
            } => {
                let mut request = SearchRequest::new(query);
                request.mode = Some(mode);
                request.category = category;
                request.page = page;
                request.limit = limit;
                print_tool_output(handle_search(&state, request).await)
            }
            Commands::Pages { page } => {
                let request = ListPagesRequest { page, index: None };
                print_tool_output(handle_list_pages(&state, request).await)
            }
            Commands::Show { location, page } => {
                let request = ReadSectionRequest {
                    location,
                    page,
                    index: None,
                };
                print_tool_output(handle_read_section(&state, request).await)
            }
            Commands::Validate => {
                let loaded = crate::tools::resolve_index(&state, None)
                    .await
                    .map_err(|e| anyhow!(e))?;
                let output = handle_validate(&state, ValidateRequest::default()).await;
                print_tool_output(output)?;
                if !loaded.index.validate().is_clean() {
                    bail!("search index has problems");
                }
                Ok(())
            }
            Commands::Emit { documenter } => {
                let loaded = crate::tools::resolve_index(&state, None)
                    .await
                    .map_err(|e| anyhow!(e))?;
                let js = if documenter {
                    loaded.index.to_documenter_js()
                } else {
                    loaded.index.to_js()
                };
                std::io::stdout()
                    .write_all(js.as_bytes())
                    .context("Failed to write index to stdout")
            }
            Commands::Discover { dir } => {
                let found = discover(&dir);
                if found.is_empty() {
                    bail!("No search index found under {}", dir.display());
                }
                for entry in found {
                    match entry.version {
                        Some(version) => println!("{}\t{}", version, entry.path.display()),
                        None => println!("-\t{}", entry.path.display()),
                    }
                }
                Ok(())
            }
        }
    }
}

async fn serve(state: Arc<IndexState>) -> anyhow::Result<()> {
    if let Some(configured) = state.config().index.clone() {
        match resolve_index_path(&configured) {
            Ok(path) => {
                if let Err(e) = state.activate(&path).await {
                    tracing::warn!("Configured index not loaded: {}", e);
                }
            }
            Err(e) => tracing::warn!("Configured index not loaded: {:#}", e),
        }
    }

    if let Some(period) = state.config().reload_interval() {
        spawn_reload_watcher(state.clone(), period);
    }

    tracing::info!("Starting docindex-mcp MCP server");

    let server = IndexServer::new(state);
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}

/// Print a tool's answer; tool errors become the process error.
fn print_tool_output(output: Result<String, String>) -> anyhow::Result<()> {
    let text = output.map_err(|e| anyhow!(e))?;
    print!("{}", text);
    Ok(())
}
