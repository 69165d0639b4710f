//! Per-workspace port registry files
//!
//! Each editor instance advertises its listener by writing a small JSON
//! marker under the workspace root. Senders discover a live instance by
//! walking ancestor directories and verifying the recorded owner process is
//! still alive. The file is an ephemeral cache, not a source of truth: a
//! record whose pid is gone is simply skipped.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory under the workspace root holding the marker
pub const REGISTRY_DIR: &str = ".vscode";

/// Fixed marker file name
pub const REGISTRY_FILE: &str = "editor-notify-port.json";

/// Persisted record describing one listening editor instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortInfo {
    pub port: u16,
    pub workspace: String,
    pub pid: u32,
    pub timestamp: DateTime<Utc>,
}

impl PortInfo {
    /// Record for the current process listening on `port`.
    pub fn new(port: u16, workspace_root: &Path) -> Self {
        Self {
            port,
            workspace: workspace_root.display().to_string(),
            pid: std::process::id(),
            timestamp: Utc::now(),
        }
    }
}

/// Marker path for a workspace root
pub fn registry_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(REGISTRY_DIR).join(REGISTRY_FILE)
}

/// Write the marker, creating `.vscode/` if needed and atomically replacing
/// any prior content. Call only after the listener is confirmed bound.
pub fn write(workspace_root: &Path, info: &PortInfo) -> Result<()> {
    let dir = workspace_root.join(REGISTRY_DIR);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = registry_path(workspace_root);

    let json = serde_json::to_string_pretty(info).context("Failed to serialize port info")?;

    // Write-then-rename so readers never observe a partial file
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, &path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    tracing::debug!("wrote port registry {}", path.display());
    Ok(())
}

/// Parse a marker file. Missing or invalid content is "absent", never an
/// error the caller has to handle.
pub fn read(path: &Path) -> Option<PortInfo> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::debug!("ignoring invalid registry file {}: {}", path.display(), e);
            None
        }
    }
}

/// Delete the marker if present. Errors are logged and swallowed so teardown
/// always completes.
pub fn remove(workspace_root: &Path) {
    let path = registry_path(workspace_root);
    match std::fs::remove_file(&path) {
        Ok(()) => tracing::debug!("removed port registry {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("failed to remove {}: {}", path.display(), e),
    }
}

/// Walk ancestors of `start_dir` (up to and including the filesystem root)
/// looking for a marker whose owner process is still alive. Stale records are
/// skipped without being deleted; some other instance owns them.
pub fn discover(start_dir: &Path) -> Option<PortInfo> {
    let mut dir = Some(start_dir);
    while let Some(current) = dir {
        let path = registry_path(current);
        if let Some(info) = read(&path) {
            if pid_alive(info.pid) {
                tracing::debug!(
                    "found live registry {} (port {}, pid {})",
                    path.display(),
                    info.port,
                    info.pid
                );
                return Some(info);
            }
            tracing::debug!(
                "skipping stale registry {} (pid {} is gone)",
                path.display(),
                info.pid
            );
        }
        dir = current.parent();
    }
    None
}

/// Probe a process with signal 0: no side effects, just an existence check.
#[cfg(unix)]
pub fn pid_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(pid) = i32::try_from(pid) else {
        return false;
    };
    kill(Pid::from_raw(pid), None).is_ok()
}

#[cfg(not(unix))]
pub fn pid_alive(_pid: u32) -> bool {
    // No cheap probe available; trust the record and let delivery fail instead
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // Far above any real pid_max, so the liveness probe always fails
    const DEAD_PID: u32 = 999_999_999;

    #[test]
    fn test_write_read_round_trip() {
        let dir = tempdir().unwrap();
        let info = PortInfo::new(7533, dir.path());

        write(dir.path(), &info).unwrap();
        let loaded = read(&registry_path(dir.path())).unwrap();
        assert_eq!(loaded, info);
    }

    #[test]
    fn test_write_replaces_previous_content() {
        let dir = tempdir().unwrap();
        write(dir.path(), &PortInfo::new(7531, dir.path())).unwrap();
        write(dir.path(), &PortInfo::new(7532, dir.path())).unwrap();

        let loaded = read(&registry_path(dir.path())).unwrap();
        assert_eq!(loaded.port, 7532);
    }

    #[test]
    fn test_read_missing_and_invalid() {
        let dir = tempdir().unwrap();
        assert!(read(&registry_path(dir.path())).is_none());

        let path = registry_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json at all").unwrap();
        assert!(read(&path).is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempdir().unwrap();
        write(dir.path(), &PortInfo::new(7531, dir.path())).unwrap();

        remove(dir.path());
        assert!(!registry_path(dir.path()).exists());
        // Second removal must not panic or error
        remove(dir.path());
    }

    #[test]
    fn test_discover_from_nested_directory() {
        let dir = tempdir().unwrap();
        let info = PortInfo::new(7533, dir.path());
        write(dir.path(), &info).unwrap();

        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();

        // Our own pid is in the record, so the record is live
        let found = discover(&nested).unwrap();
        assert_eq!(found.port, 7533);
    }

    #[test]
    fn test_discover_skips_stale_record_without_deleting() {
        let dir = tempdir().unwrap();

        // Live record at the outer root, stale record closer to the cwd
        let outer = dir.path();
        let inner = outer.join("project");
        std::fs::create_dir_all(&inner).unwrap();

        write(outer, &PortInfo::new(7531, outer)).unwrap();
        let mut stale = PortInfo::new(7539, &inner);
        stale.pid = DEAD_PID;
        write(&inner, &stale).unwrap();

        let nested = inner.join("src/deep");
        std::fs::create_dir_all(&nested).unwrap();

        let found = discover(&nested).unwrap();
        assert_eq!(found.port, 7531);
        // The stale file belongs to someone else; discovery must not touch it
        assert!(registry_path(&inner).exists());
    }

    #[test]
    fn test_discover_never_returns_stale_record() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("x/y");
        std::fs::create_dir_all(&nested).unwrap();

        let mut stale = PortInfo::new(7540, dir.path());
        stale.pid = DEAD_PID;
        write(dir.path(), &stale).unwrap();

        // The walk continues past the stale record; whatever it finds (or
        // not) in the tempdir's ancestors, the stale record is never it
        let found = discover(&nested);
        assert!(found.map_or(true, |info| info.pid != DEAD_PID));
        assert!(registry_path(dir.path()).exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_pid_alive_for_current_process() {
        assert!(pid_alive(std::process::id()));
        assert!(!pid_alive(DEAD_PID));
    }
}
