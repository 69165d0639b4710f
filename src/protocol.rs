//! Wire types for the `/notify` endpoint

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Severity of a notification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(NotificationKind::Info),
            "warning" => Ok(NotificationKind::Warning),
            "error" => Ok(NotificationKind::Error),
            other => Err(format!(
                "invalid type \"{}\": must be info, warning, or error",
                other
            )),
        }
    }
}

/// Notification payload POSTed to a receiver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    /// Text shown to the user
    pub message: String,
    /// Severity (defaults to info when absent)
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    /// Sender's working directory, if it cares to say
    #[serde(default)]
    pub workspace_path: Option<String>,
    /// Desired visible duration in milliseconds (desktop sink only)
    #[serde(default)]
    pub duration: Option<u32>,
}

impl NotificationRequest {
    pub fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
            workspace_path: None,
            duration: None,
        }
    }
}

/// Synchronous result echoed back to the sender
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationResponse {
    Success { success: bool },
    Error { error: String },
}

impl NotificationResponse {
    pub fn success() -> Self {
        NotificationResponse::Success { success: true }
    }

    pub fn error(message: impl Into<String>) -> Self {
        NotificationResponse::Error {
            error: message.into(),
        }
    }
}
