//! Line-based TCP chat server with named rooms.
//!
//! Clients connect with any line-oriented TCP client (e.g. `nc`) and talk with
//! `/nick`, `/join`, `/channels`, `/msg`, `/send_file` and `/quit`.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin irori-server
//! cargo run --bin irori-server -- --host 0.0.0.0 --port 9000 --http-port 8080
//! ```

use std::path::PathBuf;

use clap::Parser;
use irori_server::{
    coordinator::DEFAULT_QUEUE_CAPACITY,
    domain::DEFAULT_OUTBOUND_CAPACITY,
    ui::{DEFAULT_MAX_LINE_BYTES, Server, ServerConfig},
};
use irori_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "irori-server")]
#[command(about = "Line-based TCP chat server with named rooms", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number for chat connections
    #[arg(short = 'p', long, default_value = "8888")]
    port: u16,

    /// Port number for the HTTP status API (disabled when omitted)
    #[arg(long)]
    http_port: Option<u16>,

    /// Directory that /send_file writes into
    #[arg(long, default_value = ".")]
    files_dir: PathBuf,

    /// Capacity of the coordinator request queue
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Capacity of each client's outbound queue; clients that fall this far behind are dropped
    #[arg(long, default_value_t = DEFAULT_OUTBOUND_CAPACITY)]
    outbound_capacity: usize,

    /// Longest accepted input line in bytes; longer lines close the connection
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_BYTES)]
    max_line_bytes: usize,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            http_port: args.http_port,
            files_dir: args.files_dir,
            queue_capacity: args.queue_capacity,
            outbound_capacity: args.outbound_capacity,
            max_line_bytes: args.max_line_bytes,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();
    let server = Server::new(args.into());
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
