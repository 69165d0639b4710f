//! Standalone desktop receiver: binds a notification port for a workspace
//! and surfaces incoming messages as OS desktop notifications with a
//! focus-back action.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use editor_notify::focus::CommandFocusRaiser;
use editor_notify::port::BASE_PORT;
use editor_notify::server;
use editor_notify::sink::DesktopSink;

/// Desktop notification receiver for a single workspace
#[derive(Parser)]
#[command(name = "editor-notifyd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Workspace root to register under (defaults to the current directory)
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    /// First port the allocator tries
    #[arg(long, default_value_t = BASE_PORT)]
    base_port: u16,

    /// Command used to raise the editor window when the focus action fires
    #[arg(long, default_value = "code")]
    focus_command: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let workspace = match cli.workspace {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let workspace = workspace
        .canonicalize()
        .with_context(|| format!("Workspace does not exist: {}", workspace.display()))?;

    let focus = Arc::new(CommandFocusRaiser::new(cli.focus_command));
    let sink = Arc::new(DesktopSink::new(workspace.clone(), focus));

    let handle = server::spawn(workspace, cli.base_port, sink).await?;
    info!("ready, press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    handle.shutdown().await;
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let log_dir = directories::ProjectDirs::from("", "", "editor-notify")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("editor-notify"));

    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::File::create(log_dir.join("editor-notifyd.log"))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(log_file))
        .init();

    info!("editor-notifyd starting");
    Ok(())
}
