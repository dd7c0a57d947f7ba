// ABOUTME: Main entry point for the quoordinates bot
// ABOUTME: Parses CLI, loads config, initializes logging and metrics, and serves the gateway

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use quoordinates::{
    app::{self, App},
    config::Config,
    gateway::{self, GatewayState},
    metrics, paths,
};
use quoordinates_core::workflow::{UsageTracker, WorkflowTracker};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::task::TaskTracker;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "quoordinates", version, about = "Quote discovery bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Console log format (overrides [logging].json)
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    /// Also write daily-rotated JSON log files
    #[arg(long, global = true)]
    log_file: bool,

    /// Directory for log files (defaults to [logging].dir, then the data dir)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the interaction gateway (default)
    Serve,
    /// Print slash command definitions as JSON for platform registration
    Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    match &cli.command {
        None | Some(Command::Serve) => serve(&cli).await,
        Some(Command::Commands) => print_commands(),
    }
}

async fn serve(cli: &Cli) -> Result<()> {
    let config = Config::load()?;

    let json = match cli.log_format {
        Some(format) => format == LogFormat::Json,
        None => config.logging.json,
    };
    let log_dir = if cli.log_file || cli.log_dir.is_some() {
        Some(
            cli.log_dir
                .clone()
                .or_else(|| config.logging.dir.as_ref().map(PathBuf::from))
                .unwrap_or_else(paths::log_dir),
        )
    } else {
        config.logging.dir.as_ref().map(PathBuf::from)
    };
    let _guard = init_logging(&config.logging.filter, json, log_dir.as_deref())?;

    tracing::info!(
        gateway = %format!("{}:{}", config.gateway.host, config.gateway.port),
        platform = %config.platform.api_base,
        search_url = %config.quotes.search_url,
        books = config.books.len(),
        "Configuration loaded"
    );

    let metrics_handle =
        metrics::init_metrics().context("Failed to initialize Prometheus metrics")?;
    let app = App::build(&config)?;

    let state = GatewayState {
        dispatcher: app.dispatcher,
        surfaces: Arc::new(app.platform),
        api_key: config.gateway.api_key.clone(),
        metrics: metrics_handle,
        tasks: TaskTracker::new(),
    };

    gateway::start_gateway(
        &config.gateway.host,
        config.gateway.port,
        state,
        shutdown_signal(),
    )
    .await?;

    log_usage_summary(&app.tracker).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

/// Definitions depend only on the handlers, so no credentials are needed
fn print_commands() -> Result<()> {
    let config = Config::default();
    let collaborators = app::collaborators(&config)?;
    let tracker: Arc<dyn WorkflowTracker> = Arc::new(UsageTracker::new());
    let registry = app::registry(&collaborators, &tracker)?;

    let json = serde_json::to_string_pretty(&registry.definitions())
        .context("Failed to serialize command definitions")?;
    println!("{}", json);
    Ok(())
}

fn init_logging(filter: &str, json: bool, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "quoordinates.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    if let Some(dir) = log_dir {
        tracing::info!(dir = %dir.display(), "Writing log files");
    }
    Ok(guard)
}

async fn log_usage_summary(tracker: &UsageTracker) {
    let snapshot = tracker.snapshot().await;
    let invocations: u64 = snapshot
        .values()
        .flat_map(|u| u.invocations.values())
        .sum();
    tracing::info!(
        users = snapshot.len(),
        invocations,
        "Usage since startup"
    );
}
