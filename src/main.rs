//! # fileshelf CLI
//!
//! - `fileshelf serve` - Run the HTTP API
//! - `fileshelf ingest <PATH>...` - Extract and store local files
//! - `fileshelf list` - Print every stored record as JSON
//! - `fileshelf export <ID> --format csv` - Write one record's export

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fileshelf::config::Config;
use fileshelf::files::{ExportFormat, FileService, Upload};
use fileshelf::gateway;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fileshelf")]
#[command(about = "Upload files, keep their extracted text, export it as JSON or CSV")]
#[command(version)]
struct Cli {
    /// Path to config file (default: platform config dir/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Extract and store local files; nothing is stored if any file fails
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Print every stored record as JSON
    List,

    /// Export one record
    Export {
        id: i64,

        /// Output format (json, csv)
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(level: &str, verbose: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(if verbose { "debug" } else { level })
            .with_context(|| format!("Invalid log level '{level}'"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    init_tracing(&config.logging.level, cli.verbose)?;

    let store = config.storage.open_store()?;
    let service = FileService::new(store);

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            gateway::serve(&config.server, service).await?;
        }
        Commands::Ingest { paths } => {
            let mut uploads = Vec::with_capacity(paths.len());
            for path in &paths {
                let data = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
                uploads.push(Upload::new(file_name, data));
            }
            let records = service.ingest(uploads).await?;
            info!("Stored {} file record(s)", records.len());
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::List => {
            println!("{}", serde_json::to_string_pretty(&service.list()?)?);
        }
        Commands::Export { id, format, output } => {
            let body = service.export(id, format)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, &body)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Exported file {} as {} to {}", id, format, path.display());
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&body)?;
                    stdout.flush()?;
                }
            }
        }
    }

    Ok(())
}
