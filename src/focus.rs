//! Raising the owning editor window after a notification action

use std::path::Path;
use std::process::Command;

use crate::error::FocusError;

/// Platform capability for bringing an editor window to the front.
pub trait FocusRaiser: Send + Sync + 'static {
    fn bring_to_front(&self, workspace: &Path) -> Result<(), FocusError>;
}

/// Shells out to an editor launcher command with the workspace path.
///
/// Re-opening an already open workspace raises its window, so `code <dir>`
/// doubles as a focus command for VS Code style editors.
pub struct CommandFocusRaiser {
    command: String,
}

impl CommandFocusRaiser {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl FocusRaiser for CommandFocusRaiser {
    fn bring_to_front(&self, workspace: &Path) -> Result<(), FocusError> {
        let status = Command::new(&self.command).arg(workspace).status()?;
        if !status.success() {
            return Err(FocusError::ExitStatus(status));
        }
        Ok(())
    }
}

/// No-op for platforms (or tests) without window-raising support.
pub struct NoopFocusRaiser;

impl FocusRaiser for NoopFocusRaiser {
    fn bring_to_front(&self, _workspace: &Path) -> Result<(), FocusError> {
        Ok(())
    }
}
