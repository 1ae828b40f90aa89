//! TCP chat server and HTTP status API.

mod command;
mod config;
mod connection;
mod handler;
mod server;
mod signal;
pub mod state;

pub use command::{ParsedLine, parse_line};
pub use config::{DEFAULT_MAX_LINE_BYTES, ServerConfig};
pub use server::{RunningServer, Server, ServerError};
pub use signal::shutdown_signal;
