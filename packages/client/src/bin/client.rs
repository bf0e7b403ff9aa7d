//! Terminal client for a notecollab server.
//!
//! Prints every server message, keeps a local copy of the note and turns typed
//! lines into protocol messages. Plain lines are appended to the note; `/name`,
//! `/cursor`, `/ping`, `/show` and `/set` are commands.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval),
//! resuming the same participant.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin notecollab-client -- --name alice
//! cargo run --bin notecollab-client -- -u ws://127.0.0.1:8080/ws --user-id u-3
//! ```

use clap::Parser;

use notecollab_client::{ClientOptions, run_client};
use notecollab_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "notecollab-client")]
#[command(about = "Terminal client for a shared notecollab note", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Participant id to resume
    #[arg(long)]
    user_id: Option<String>,

    /// Display name announced after connecting
    #[arg(short = 'n', long)]
    name: Option<String>,
}

impl From<Args> for ClientOptions {
    fn from(args: Args) -> Self {
        Self {
            url: args.url,
            user_id: args.user_id,
            name: args.name,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run_client(args.into()).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
