//! Error taxonomy for the notification pipeline

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// No free port in the probed window
    #[error("no available port found ({attempts} candidates from {start})")]
    NoAvailablePort { start: u16, attempts: u16 },

    /// The receiver's real bind failed after the probe succeeded
    #[error("failed to bind 127.0.0.1:{port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Connection refused, nobody is listening on this port
    #[error("no listener on port {0}")]
    NoListener(u16),

    /// Transport-level failure other than connection refusal
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered but the body was not a valid result
    #[error("malformed response from port {0}")]
    MalformedResponse(u16),

    /// The server answered with an error payload
    #[error("port {port} rejected the notification: {reason}")]
    Rejected { port: u16, reason: String },

    /// Broadcast exhausted every candidate without a single delivery
    #[error("could not deliver the notification to any port")]
    AllTargetsFailed,
}

#[derive(Debug, Error)]
pub enum FocusError {
    #[error("failed to run focus command: {0}")]
    Command(#[from] std::io::Error),

    #[error("focus command exited with {0}")]
    ExitStatus(std::process::ExitStatus),
}
