//! quarry - command-line client for a remote search service

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quarry::Config;

mod commands;
mod logging;

use commands::{
  cmd_clear_analytics, cmd_config_init, cmd_config_path, cmd_config_show, cmd_index_metrics, cmd_index_remove,
  cmd_index_sync, cmd_index_update, cmd_search, cmd_shell, cmd_suggest,
};
use logging::init_logging;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Search, typeahead and index maintenance for a remote search service")]
#[command(after_help = "\
QUICK START:
  quarry config init              # Write a config template
  quarry search \"lathe\"           # One-shot search
  quarry suggest \"lat\"            # Typeahead suggestions
  quarry shell                    # Interactive search session

CONFIG LOCATIONS:
  --config <PATH> > $QUARRY_CONFIG > ~/.config/quarry/config.toml")]
struct Cli {
  /// Config file to use instead of the default locations
  #[arg(long, global = true, value_name = "PATH")]
  config: Option<PathBuf>,
  #[command(subcommand)]
  command: Commands,
}

/// Subcommands for `quarry index`
#[derive(Subcommand)]
pub enum IndexCommand {
  /// Create or replace one index entry from a JSON file
  Update {
    /// JSON file holding a single entry
    file: PathBuf,
  },
  /// Remove one entry from the index
  Remove {
    /// Entry ID
    id: String,
  },
  /// Push many entries at once from a JSON array
  Sync {
    /// JSON file holding an array of entries
    file: PathBuf,
    /// Drop index entries that are not in the file
    #[arg(long)]
    full: bool,
  },
  /// Show search analytics
  Metrics {
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
  /// Reset search analytics
  ClearAnalytics,
}

/// Subcommands for `quarry config`
#[derive(Subcommand)]
pub enum ConfigCommand {
  /// Show the effective configuration
  Show,
  /// Write a commented config template
  Init {
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
  },
  /// Print the config file path in use
  Path,
}

#[derive(Subcommand)]
enum Commands {
  /// Run one search and print the results
  #[command(after_help = "\
EXAMPLES:
  quarry search \"lathe\" --filter type=course,reel
  quarry search \"mill\" --sort date --direction asc --page 2
  quarry search \"drill\" --page-size 50 --json")]
  Search {
    /// Query text
    query: String,
    /// Facet selection as FACET=V1,V2 (repeatable)
    #[arg(short, long, value_name = "FACET=VALUES")]
    filter: Vec<String>,
    /// Sort field (relevance, date, title, popularity)
    #[arg(long)]
    sort: Option<String>,
    /// Sort direction (asc, desc)
    #[arg(long)]
    direction: Option<String>,
    /// Page number, starting at 1
    #[arg(long)]
    page: Option<u32>,
    /// Results per page
    #[arg(long)]
    page_size: Option<u32>,
    /// Skip facet counts
    #[arg(long)]
    no_facets: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
  /// Show typeahead suggestions for partial text
  Suggest {
    /// Partial query text
    text: String,
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
  /// Maintain the remote index (admin)
  Index {
    #[command(subcommand)]
    command: IndexCommand,
  },
  /// Manage configuration
  Config {
    #[command(subcommand)]
    command: ConfigCommand,
  },
  /// Interactive search session
  #[command(after_help = "\
COMMANDS:
  <text>               Set the query and show suggestions
  /go                  Search
  /filter k=v1,v2      Select facet values
  /unfilter k          Drop a facet
  /reset               Drop all facets
  /clear               Clear text and results
  /page N  /size N     Paginate
  /sort FIELD [DIR]    Sort
  /open N              Open result N
  /state               Dump the session state
  /quit                Leave")]
  Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  // Writing or locating a config must work even when the current one is broken
  let config = match &cli.command {
    Commands::Config {
      command: ConfigCommand::Init { .. } | ConfigCommand::Path,
    } => Config::default(),
    _ => Config::load(cli.config.as_deref()).context("Failed to load configuration")?,
  };

  let _guard = init_logging(&config.logging);

  match cli.command {
    Commands::Search {
      query,
      filter,
      sort,
      direction,
      page,
      page_size,
      no_facets,
      json,
    } => {
      cmd_search(
        &config,
        &query,
        &filter,
        sort.as_deref(),
        direction.as_deref(),
        page,
        page_size,
        no_facets,
        json,
      )
      .await
    }
    Commands::Suggest { text, json } => cmd_suggest(&config, &text, json).await,

    Commands::Index { command } => match command {
      IndexCommand::Update { file } => cmd_index_update(&config, &file).await,
      IndexCommand::Remove { id } => cmd_index_remove(&config, &id).await,
      IndexCommand::Sync { file, full } => cmd_index_sync(&config, &file, full).await,
      IndexCommand::Metrics { json } => cmd_index_metrics(&config, json).await,
      IndexCommand::ClearAnalytics => cmd_clear_analytics(&config).await,
    },

    Commands::Config { command } => match command {
      ConfigCommand::Show => cmd_config_show(&config, cli.config.as_deref()),
      ConfigCommand::Init { force } => cmd_config_init(cli.config.as_deref(), force),
      ConfigCommand::Path => cmd_config_path(cli.config.as_deref()),
    },

    Commands::Shell => cmd_shell(&config).await,
  }
}
