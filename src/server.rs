//! Localhost HTTP receiver for notifications
//!
//! One editor instance owns one receiver. The receiver claims a port from
//! the well-known window, binds to 127.0.0.1 only, writes the workspace's
//! port registry file, and serves exactly one route: `POST /notify`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::NotifyError;
use crate::port::{self, PORT_WINDOW};
use crate::protocol::{NotificationRequest, NotificationResponse};
use crate::registry::{self, PortInfo};
use crate::sink::RenderSink;

#[derive(Clone)]
struct AppState {
    sink: Arc<dyn RenderSink>,
}

/// Running receiver. Dropping the handle stops the server but leaves the
/// registry file behind; call [`ServerHandle::shutdown`] to also clean it up.
pub struct ServerHandle {
    port: u16,
    workspace_root: PathBuf,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Close the listener, then best-effort remove the registry file. The
    /// removal runs even if the server task ended abnormally.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            tracing::warn!("notification server task ended abnormally: {}", e);
        }
        registry::remove(&self.workspace_root);
        tracing::info!("notification server stopped");
    }
}

/// Allocate a port from `[base_port, base_port + 10)`, bind the receiver,
/// and write the registry file for `workspace_root`.
///
/// Failures are reported through the sink's error channel as well as the
/// returned error, so an embedding host can keep running without
/// notification support.
pub async fn spawn(
    workspace_root: PathBuf,
    base_port: u16,
    sink: Arc<dyn RenderSink>,
) -> Result<ServerHandle, NotifyError> {
    match try_spawn(workspace_root, base_port, Arc::clone(&sink)).await {
        Ok(handle) => Ok(handle),
        Err(e) => {
            sink.report_error(&format!("notifications unavailable: {}", e));
            Err(e)
        }
    }
}

async fn try_spawn(
    workspace_root: PathBuf,
    base_port: u16,
    sink: Arc<dyn RenderSink>,
) -> Result<ServerHandle, NotifyError> {
    let port = port::find_available_port(base_port, PORT_WINDOW)?;

    // The probe released the port, so this bind can still lose a race; its
    // error is the authoritative one.
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .map_err(|source| NotifyError::Bind { port, source })?;

    // Registry is written only once the listener is confirmed bound. A
    // write failure degrades discovery but the receiver still works for
    // explicit-port and broadcast senders.
    if let Err(e) = registry::write(&workspace_root, &PortInfo::new(port, &workspace_root)) {
        tracing::warn!("failed to write port registry: {:#}", e);
    }

    let app = Router::new()
        .route("/notify", post(handle_notify).fallback(not_found))
        .fallback(not_found)
        .with_state(AppState { sink });

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let serve = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });
        if let Err(e) = serve.await {
            tracing::error!("notification server error: {}", e);
        }
    });

    tracing::info!("notification server listening on http://127.0.0.1:{}", port);

    Ok(ServerHandle {
        port,
        workspace_root,
        shutdown_tx,
        task,
    })
}

async fn handle_notify(
    State(state): State<AppState>,
    body: Result<Json<NotificationRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("rejected notification request: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(NotificationResponse::error(rejection.body_text())),
            );
        }
    };

    if request.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(NotificationResponse::error("message must not be empty")),
        );
    }

    tracing::debug!(
        "notification received: kind={}, from={:?}",
        request.kind.as_str(),
        request.workspace_path
    );
    state.sink.render(&request);
    (StatusCode::OK, Json(NotificationResponse::success()))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(NotificationResponse::error("Not found")),
    )
}
