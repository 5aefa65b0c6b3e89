use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use semantic_search::Result;
use semantic_search::commands::{index_file, serve, show_config, write_config};
use semantic_search::config::{Config, get_config_dir};

#[derive(Parser)]
#[command(name = "semantic-search")]
#[command(about = "Single-document semantic search server with a generative model proxy")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind, overriding the configuration
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on, overriding the configuration
        #[arg(long)]
        port: Option<u16>,
        /// Directory holding the front-end, overriding the configuration
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Index a document and print the passages closest to a query
    Index {
        /// PDF or plain text file to index
        file: PathBuf,
        /// Query to search for
        #[arg(long, short)]
        query: String,
        /// Number of passages to print
        #[arg(short, default_value_t = 3)]
        k: usize,
    },
    /// Show or write the configuration file
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config_dir = get_config_dir().context("Failed to locate configuration directory")?;
    let mut config = Config::load(&config_dir)?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            static_dir,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(static_dir) = static_dir {
                config.server.static_dir = static_dir;
            }
            serve(&config).await?;
        }
        Commands::Index { file, query, k } => {
            index_file(&config, &file, &query, k).await?;
        }
        Commands::Config { show } => {
            if show {
                show_config(&config)?;
            } else {
                write_config(&config)?;
            }
        }
    }

    Ok(())
}
