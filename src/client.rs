//! Sender side: target resolution and HTTP delivery

use std::path::Path;

use crate::error::NotifyError;
use crate::port::{BASE_PORT, PORT_WINDOW};
use crate::protocol::{NotificationRequest, NotificationResponse};
use crate::registry;

/// How the sender picks the port(s) to deliver to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Caller-supplied port, used verbatim
    Explicit(u16),
    /// Every port in the well-known window
    Broadcast,
    /// Ancestor-walk discovery with a fallback to the base port
    Discover,
}

/// Outcome of a delivery run. `delivered` is never empty.
#[derive(Debug)]
pub struct Delivery {
    pub delivered: Vec<u16>,
    pub failed: Vec<(u16, NotifyError)>,
}

/// Resolve a target to the concrete candidate list, in priority order:
/// explicit port, broadcast window, then a live registry record found by
/// walking ancestors of `cwd`, then the base port as a last guess.
pub fn resolve_targets(target: &Target, cwd: &Path) -> Vec<u16> {
    match target {
        Target::Explicit(port) => vec![*port],
        Target::Broadcast => (0..PORT_WINDOW).map(|i| BASE_PORT + i).collect(),
        Target::Discover => match registry::discover(cwd) {
            Some(info) => vec![info.port],
            None => {
                tracing::debug!("no live registry file found, falling back to {}", BASE_PORT);
                vec![BASE_PORT]
            }
        },
    }
}

/// Deliver `request` according to `target`. Non-broadcast stops at the first
/// success; broadcast attempts every candidate and aggregates. Fails only if
/// nothing was delivered.
pub fn send(
    request: &NotificationRequest,
    target: &Target,
    cwd: &Path,
) -> Result<Delivery, NotifyError> {
    let ports = resolve_targets(target, cwd);
    let broadcast = matches!(target, Target::Broadcast);
    deliver(&ports, broadcast, request)
}

/// One `POST /notify` per candidate port.
pub fn deliver(
    ports: &[u16],
    try_all: bool,
    request: &NotificationRequest,
) -> Result<Delivery, NotifyError> {
    let mut delivered = Vec::new();
    let mut failed = Vec::new();

    for &port in ports {
        match send_to_port(port, request) {
            Ok(()) => {
                delivered.push(port);
                if !try_all {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!("delivery to port {} failed: {}", port, e);
                failed.push((port, e));
            }
        }
    }

    if delivered.is_empty() {
        // A single-target run surfaces its specific failure; broadcast
        // reports the aggregate
        return Err(match (failed.len(), failed.pop()) {
            (1, Some((_, e))) if !try_all => e,
            _ => NotifyError::AllTargetsFailed,
        });
    }

    Ok(Delivery { delivered, failed })
}

/// Single synchronous HTTP round trip. Connection refusal maps to
/// [`NotifyError::NoListener`] so callers can tell "nothing there" apart
/// from other I/O failures.
pub fn send_to_port(port: u16, request: &NotificationRequest) -> Result<(), NotifyError> {
    let url = format!("http://127.0.0.1:{}/notify", port);
    let client = reqwest::blocking::Client::new();

    let response = match client.post(&url).json(request).send() {
        Ok(response) => response,
        Err(e) if e.is_connect() => return Err(NotifyError::NoListener(port)),
        Err(e) => return Err(NotifyError::Http(e)),
    };

    let status = response.status();
    let body: NotificationResponse = response
        .json()
        .map_err(|_| NotifyError::MalformedResponse(port))?;

    match body {
        NotificationResponse::Success { success: true } if status.is_success() => Ok(()),
        NotificationResponse::Error { error } => Err(NotifyError::Rejected {
            port,
            reason: error,
        }),
        _ => Err(NotifyError::MalformedResponse(port)),
    }
}
