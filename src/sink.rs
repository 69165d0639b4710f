//! Rendering sinks for decoded notifications
//!
//! The receiver hands every accepted request to a [`RenderSink`]. Two
//! variants exist: an in-process sink that forwards requests to the host's
//! own UI loop, and a desktop sink that raises an OS notification with a
//! focus-back action.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::focus::FocusRaiser;
use crate::protocol::{NotificationKind, NotificationRequest};

/// Where decoded notifications (and receiver-side errors) end up.
pub trait RenderSink: Send + Sync + 'static {
    /// Display one notification. Must not block the request handler.
    fn render(&self, request: &NotificationRequest);

    /// Error channel for receiver-side failures (bind errors and the like),
    /// so a degraded host can still tell the user what happened.
    fn report_error(&self, message: &str);
}

/// In-process variant: forwards requests over a channel to the host UI loop,
/// which maps the kind onto its three severity display calls.
pub struct ChannelSink {
    tx: mpsc::Sender<NotificationRequest>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<NotificationRequest>) -> Self {
        Self { tx }
    }
}

impl RenderSink for ChannelSink {
    fn render(&self, request: &NotificationRequest) {
        if self.tx.try_send(request.clone()).is_err() {
            tracing::warn!("host UI channel full or closed, dropping notification");
        }
    }

    fn report_error(&self, message: &str) {
        let request = NotificationRequest::new(message, NotificationKind::Error);
        if self.tx.try_send(request).is_err() {
            tracing::warn!("host UI channel full or closed, dropping error report");
        }
    }
}

/// Default visible duration when the sender does not ask for one
const DEFAULT_TIMEOUT_MS: u32 = 8_000;

/// Desktop variant: OS-level notification with sound, a bounded visible
/// duration, and one "focus" action that raises the owning editor window.
pub struct DesktopSink {
    workspace: PathBuf,
    focus: Arc<dyn FocusRaiser>,
}

impl DesktopSink {
    pub fn new(workspace: PathBuf, focus: Arc<dyn FocusRaiser>) -> Self {
        Self { workspace, focus }
    }

    fn title(&self, kind: NotificationKind) -> String {
        compose_title(kind, &self.workspace)
    }
}

impl RenderSink for DesktopSink {
    fn render(&self, request: &NotificationRequest) {
        let timeout = request.duration.unwrap_or(DEFAULT_TIMEOUT_MS);
        show_desktop_notification(
            self.title(request.kind),
            request.message.clone(),
            timeout,
            Some((Arc::clone(&self.focus), self.workspace.clone())),
        );
    }

    fn report_error(&self, message: &str) {
        tracing::error!("{}", message);
        show_desktop_notification(
            self.title(NotificationKind::Error),
            message.to_string(),
            DEFAULT_TIMEOUT_MS,
            None,
        );
    }
}

fn severity_glyph(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Info => "ℹ",
        NotificationKind::Warning => "⚠",
        NotificationKind::Error => "✖",
    }
}

fn compose_title(kind: NotificationKind, workspace: &Path) -> String {
    let name = workspace
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("editor");
    format!("{} {}", severity_glyph(kind), name)
}

/// Fire the OS notification without blocking the caller. The focus action
/// (where supported) is awaited on a detached thread; by the time the user
/// clicks it, the HTTP response has long been sent, so failures are only
/// logged.
#[cfg(all(unix, not(target_os = "macos")))]
fn show_desktop_notification(
    title: String,
    body: String,
    timeout_ms: u32,
    focus: Option<(Arc<dyn FocusRaiser>, PathBuf)>,
) {
    use notify_rust::{Notification, Timeout};

    std::thread::spawn(move || {
        let mut notification = Notification::new();
        notification
            .summary(&title)
            .body(&body)
            .sound_name("message-new-instant")
            .timeout(Timeout::Milliseconds(timeout_ms));

        if focus.is_some() {
            notification.action("focus", "Focus window");
        }

        match notification.show() {
            Ok(handle) => {
                if let Some((raiser, workspace)) = focus {
                    handle.wait_for_action(|action| {
                        if action == "focus" {
                            if let Err(e) = raiser.bring_to_front(&workspace) {
                                tracing::warn!("could not focus editor window: {}", e);
                            }
                        }
                    });
                }
            }
            Err(e) => tracing::warn!("failed to show desktop notification: {}", e),
        }
    });
}

#[cfg(any(not(unix), target_os = "macos"))]
fn show_desktop_notification(
    title: String,
    body: String,
    timeout_ms: u32,
    _focus: Option<(Arc<dyn FocusRaiser>, PathBuf)>,
) {
    use notify_rust::{Notification, Timeout};

    // No action support here; plain notification only
    std::thread::spawn(move || {
        if let Err(e) = Notification::new()
            .summary(&title)
            .body(&body)
            .timeout(Timeout::Milliseconds(timeout_ms))
            .show()
        {
            tracing::warn!("failed to show desktop notification: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_forwards_request() {
        let (tx, mut rx) = mpsc::channel(4);
        let sink = ChannelSink::new(tx);

        let request = NotificationRequest::new("done", NotificationKind::Warning);
        sink.render(&request);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.message, "done");
        assert_eq!(received.kind, NotificationKind::Warning);
    }

    #[tokio::test]
    async fn test_channel_sink_error_report_is_error_kind() {
        let (tx, mut rx) = mpsc::channel(4);
        let sink = ChannelSink::new(tx);

        sink.report_error("bind failed");

        let received = rx.recv().await.unwrap();
        assert_eq!(received.kind, NotificationKind::Error);
        assert!(received.message.contains("bind failed"));
    }

    #[test]
    fn test_title_composition() {
        let title = compose_title(NotificationKind::Warning, Path::new("/home/me/my-project"));
        assert_eq!(title, "⚠ my-project");

        let title = compose_title(NotificationKind::Info, Path::new("/"));
        assert_eq!(title, "ℹ editor");
    }
}
