//! Real-time collaboration server.
//!
//! Every connected client edits the same document; updates are accepted only
//! when they are based on the current version.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin notecollab-server
//! cargo run --bin notecollab-server -- --host 0.0.0.0 --port 3000 --backing note
//! ```

use std::sync::Arc;

use clap::Parser;
use notecollab_server::{
    bootstrap::build_server,
    config::{DEFAULT_MAX_CONNECTIONS, DocumentBacking, ServerConfig},
};
use notecollab_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "notecollab-server")]
#[command(about = "Real-time collaboration server for shared notes", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Where the shared document is kept
    #[arg(short = 'b', long, value_enum, default_value_t = DocumentBacking::Memory)]
    backing: DocumentBacking,

    /// Id of the document (or note) edited through this server
    #[arg(short = 'd', long, default_value = "default")]
    document_id: String,

    /// Initial content of the document
    #[arg(long, default_value = "")]
    initial_content: String,

    /// Maximum number of simultaneous connections
    #[arg(short = 'm', long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    max_connections: usize,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            backing: args.backing,
            document_id: args.document_id,
            initial_content: args.initial_content,
            max_connections: args.max_connections,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig::from(args);
    let server = match build_server(&config, Arc::new(SystemClock)) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
