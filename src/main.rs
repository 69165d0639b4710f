use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use editor_notify::client::{self, Target};
use editor_notify::error::NotifyError;
use editor_notify::protocol::{NotificationKind, NotificationRequest};

const EXAMPLES: &str = "\
Examples:
  editor-notify \"Build completed successfully\"
  editor-notify --type error \"Tests failed!\"
  editor-notify -t warning \"Low disk space\"
  editor-notify --port 7532 \"Custom port notification\"
  editor-notify --all \"Deployment finished\"";

/// Send a notification to a running editor instance
#[derive(Parser)]
#[command(name = "editor-notify")]
#[command(author, version, about, after_help = EXAMPLES)]
struct Cli {
    /// Notification text (trailing words are joined with spaces)
    #[arg(trailing_var_arg = true)]
    message: Vec<String>,

    /// Notification type: info, warning, error
    #[arg(short = 't', long = "type", default_value = "info")]
    kind: String,

    /// Specific port to connect to (skips discovery)
    #[arg(short, long)]
    port: Option<u16>,

    /// Send to every editor instance in the well-known port window
    #[arg(short, long)]
    all: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays script-friendly
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Input validation happens before any network activity
    let kind: NotificationKind = cli
        .kind
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let message = cli.message.join(" ");
    if message.trim().is_empty() {
        anyhow::bail!("no message provided");
    }

    let cwd = std::env::current_dir().context("Failed to determine current directory")?;

    let target = if let Some(port) = cli.port {
        Target::Explicit(port)
    } else if cli.all {
        Target::Broadcast
    } else {
        Target::Discover
    };

    let mut request = NotificationRequest::new(message, kind);
    request.workspace_path = Some(cwd.display().to_string());

    match client::send(&request, &target, &cwd) {
        Ok(delivery) => {
            for port in &delivery.delivered {
                println!("✓ Notification sent to editor on port {}", port);
            }
            for (port, e) in &delivery.failed {
                tracing::debug!("port {} failed: {}", port, e);
            }
            Ok(())
        }
        Err(NotifyError::NoListener(port)) => {
            eprintln!(
                "✗ Could not connect to an editor on port {}. Is the notification server running?",
                port
            );
            Err(NotifyError::NoListener(port).into())
        }
        Err(NotifyError::AllTargetsFailed) => {
            eprintln!("✗ Could not send notification to any editor instance");
            Err(NotifyError::AllTargetsFailed.into())
        }
        Err(e) => {
            eprintln!("✗ Error: {}", e);
            Err(e.into())
        }
    }
}
