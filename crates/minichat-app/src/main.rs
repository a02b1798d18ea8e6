//! minichat binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Open the SQLite key-value store
//! 3. Build the conversation controller with the HTTPS completion transport
//! 4. Render history and chat events to stdout, read input lines from stdin
//! 5. On end of input or `/quit`, wait for pending replies and exit

mod cli;
mod commands;
mod render;
mod session;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use minichat_chat::{ConversationController, HttpTransport};
use minichat_core::config::MinichatConfig;
use minichat_storage::{Database, KeyValueStore};

use cli::CliArgs;

/// Print chat events as they arrive.
async fn render_loop(controller: Arc<ConversationController>) {
    let mut rx = controller.subscribe();
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Some(text) = render::render_event(&event) {
                    println!("{}", text);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Renderer fell behind, events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = MinichatConfig::load_or_default(&config_file);

    // Tracing goes to stderr so stdout stays a clean transcript.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    tracing::info!("Starting minichat v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Storage.
    let data_dir = args.resolve_data_dir(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    let db_path = data_dir.join("minichat.db");
    let kv: Arc<dyn KeyValueStore> = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite database opened");

    // Conversation.
    let transport = HttpTransport::new(config.remote.timeout_secs.map(Duration::from_secs))?;
    let controller = Arc::new(ConversationController::new(
        kv,
        Arc::new(transport),
        &config,
    )?);

    for msg in controller.messages() {
        println!("{}", render::render_message(&msg));
    }
    let settings = controller.settings();
    println!(
        "AI: {}  (type /help for commands)",
        if settings.uses_remote() { "On" } else { "Off" }
    );

    tokio::spawn(render_loop(Arc::clone(&controller)));

    let lines = BufReader::new(tokio::io::stdin()).lines();
    session::run(controller, lines).await
}
