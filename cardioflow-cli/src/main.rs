//! Cardioflow CLI: run pipeline stages and serve the risk form.

mod commands;

use cardioflow_ml::{ConfigOverrides, PipelineConfig, ValidationPolicy};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Cardioflow: heart-disease training pipeline and risk form
#[derive(Parser, Debug)]
#[command(name = "cardioflow", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (artifact root)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Copy the source CSV into the raw snapshot
    Ingest,
    /// Check the raw snapshot against schema.yaml
    Validate {
        /// Fail on any finding instead of only logging it
        #[arg(long)]
        strict: bool,
    },
    /// Standardize features into the transformed artifact
    Transform,
    /// Fit the classifier on the training split
    Train,
    /// Score the model on the held-out split
    Evaluate,
    /// Run every stage in order, stopping at the first failure
    Run {
        /// Fail validation on any finding
        #[arg(long)]
        strict: bool,
        /// Evaluate the existing model instead of training a new one
        #[arg(long)]
        skip_train: bool,
    },
    /// Serve the risk form
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,
        /// Port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Write a default cardioflow.toml into the workspace
    Init,
    /// Print the resolved configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| cli.workspace.clone());

    let overrides = config_overrides(&cli.command);
    let config =
        cardioflow_ml::load_config(Some(&workspace), cli.config.as_deref(), Some(&overrides))
            .map_err(|e| anyhow::anyhow!("Configuration error: {e}"))?;

    let _guard = init_tracing(cli.verbose, cli.quiet, &workspace, &config);

    commands::handle_command(cli.command, &workspace, config).await
}

/// Command flags that take precedence over file and environment settings.
fn config_overrides(command: &Commands) -> ConfigOverrides {
    let mut overrides = ConfigOverrides::default();
    match command {
        Commands::Validate { strict: true } | Commands::Run { strict: true, .. } => {
            overrides.validation.policy = Some(ValidationPolicy::Strict);
        }
        Commands::Serve { host, port } => {
            overrides.serving.host = host.clone();
            overrides.serving.port = *port;
        }
        _ => {}
    }
    overrides
}

fn stderr_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Human-readable stderr plus an optional daily-rolling JSON file.
fn init_tracing(
    verbose: u8,
    quiet: bool,
    workspace: &Path,
    config: &PipelineConfig,
) -> Option<WorkerGuard> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(stderr_filter(verbose, quiet)));

    let mut guard = None;
    let json_layer = if config.logging.json_file {
        let log_dir = workspace.join(&config.logging.dir);
        match std::fs::create_dir_all(&log_dir) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::daily(&log_dir, "cardioflow.log");
                let (non_blocking, worker) = tracing_appender::non_blocking(file_appender);
                guard = Some(worker);
                Some(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking)
                        .with_filter(EnvFilter::new("debug")),
                )
            }
            Err(e) => {
                eprintln!("Cannot create log directory {}: {e}", log_dir.display());
                None
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();
    guard
}
