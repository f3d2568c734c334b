use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vizkit_core::configs::visualization::VisualizationConfig;
use vizkit_core::visualization_manager::open_file_cache;
use vizkit_core::VisualizationManager;
use vizkit_plugin_ckan::CkanSource;
use vizkit_plugin_protocol::VisualizationSource;

mod commands;

/// vizkit - preview data visualisations backed by remote datasets
#[derive(Parser)]
#[command(name = "vizkit")]
#[command(about = "Preview data visualisations backed by CKAN datasets")]
#[command(version)]
struct Cli {
    /// Path to the visualisation file
    #[arg(short, long, default_value = "visualization.yml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved fields and labels
    Fields,
    /// Show records grouped by the split field
    Records {
        /// Print the groups as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the configuration form as JSON
    Form,
    /// Print the JSON Schema of visualisation files
    Schema,
    /// Manage the payload cache
    Cache {
        #[command(subcommand)]
        cache_command: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// List cached payloads
    List,
    /// Clear the payload cache
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("VIZKIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Schema => commands::schema::execute(),
        Commands::Cache { cache_command } => {
            let config = VisualizationManager::load_config(&cli.config)?;
            let cache = open_file_cache(&config.settings, config_dir(&cli.config));
            commands::cache::execute(&cache, cache_command)
        }
        Commands::Fields => commands::fields::execute(&build_manager(&cli.config)?).await,
        Commands::Records { json } => {
            commands::records::execute(&build_manager(&cli.config)?, json).await
        }
        Commands::Form => commands::form::execute(&build_manager(&cli.config)?).await,
    }
}

fn config_dir(config_path: &Path) -> &Path {
    config_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn build_manager(config_path: &Path) -> Result<VisualizationManager> {
    let config = VisualizationManager::load_config(config_path)?;
    let cache = Arc::new(open_file_cache(&config.settings, config_dir(config_path)));
    let source = build_source(&config, cache)?;

    Ok(VisualizationManager::new(config, source))
}

fn build_source(
    config: &VisualizationConfig,
    cache: Arc<vizkit_core::cache::FileCacheStore>,
) -> Result<Arc<dyn VisualizationSource>> {
    match config.source.plugin.as_str() {
        vizkit_plugin_ckan::PLUGIN_KEY => Ok(Arc::new(CkanSource::from_config(config, cache)?)),
        other => bail!(
            "Unknown source plugin '{}'. Available plugins: {}",
            other,
            vizkit_plugin_ckan::PLUGIN_KEY
        ),
    }
}
