// Server module entry point
// Listener creation, per-connection handling, and the server lifecycle

pub mod connection;
pub mod lifecycle;
pub mod listener;

// Re-export commonly used types
pub use connection::{handle_connection, ConnectionOptions, ConnectionOutcome, ConnectionState};
pub use lifecycle::{start, ServerHandle, ServerSettings, ServerStatus};
pub use listener::create_listener;
