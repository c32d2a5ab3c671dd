//! Ratatoskr bot - media relay and tagging flows
//!
//! Shared between the `ratatoskr` binary and the integration tests.

pub mod handlers;
pub mod logging;
pub mod replay;
pub mod transport;
pub mod update;

pub use handlers::{GroupMedia, Handler};
pub use transport::{is_message_not_modified_error, BotApi, DryRunBot, OutgoingMedia};
pub use update::{IncomingMessage, Route};
