//! Local port allocation for notification receivers

use std::net::TcpListener;

use crate::error::NotifyError;

/// First port an editor instance tries to claim
pub const BASE_PORT: u16 = 7531;

/// Number of ports probed by the allocator and by broadcast discovery
pub const PORT_WINDOW: u16 = 10;

/// Find a free localhost TCP port in `[start, start + max_attempts)`.
///
/// Each candidate is probed by binding and immediately releasing a listener,
/// so another process can still grab the port before the caller binds it for
/// real. That race is accepted: the caller's own bind is the final authority.
pub fn find_available_port(start: u16, max_attempts: u16) -> Result<u16, NotifyError> {
    for offset in 0..max_attempts {
        let Some(port) = start.checked_add(offset) else {
            break;
        };
        match TcpListener::bind(("127.0.0.1", port)) {
            Ok(probe) => {
                drop(probe);
                return Ok(port);
            }
            Err(e) => {
                tracing::trace!("port {} unavailable: {}", port, e);
            }
        }
    }
    Err(NotifyError::NoAvailablePort {
        start,
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ask the OS for a port that is currently free.
    fn free_port() -> u16 {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn test_returns_port_within_window() {
        let start = free_port();
        let port = find_available_port(start, 1).unwrap();
        assert_eq!(port, start);

        // The returned port must be bindable by the caller afterwards
        let listener = TcpListener::bind(("127.0.0.1", port));
        assert!(listener.is_ok());
    }

    #[test]
    fn test_skips_occupied_port() {
        let start = free_port();
        let _occupied = TcpListener::bind(("127.0.0.1", start)).unwrap();

        let port = find_available_port(start, PORT_WINDOW).unwrap();
        assert_ne!(port, start);
        assert!(port > start && port < start + PORT_WINDOW);
    }

    #[test]
    fn test_no_available_port() {
        let start = free_port();
        let _occupied = TcpListener::bind(("127.0.0.1", start)).unwrap();

        let err = find_available_port(start, 1).unwrap_err();
        assert!(matches!(
            err,
            NotifyError::NoAvailablePort { attempts: 1, .. }
        ));
    }
}
