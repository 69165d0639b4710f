pub mod client;
pub mod error;
pub mod focus;
pub mod port;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod sink;

pub use error::{FocusError, NotifyError};
pub use protocol::{NotificationKind, NotificationRequest, NotificationResponse};
