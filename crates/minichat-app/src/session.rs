//! Interactive input loop.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncWriteExt, Lines};
use tokio::task::JoinSet;

use minichat_chat::ConversationController;

use crate::commands::{is_confirmed, Command, HELP};

/// Print `question` and read one answer line. `None` on end of input.
async fn prompt<R>(lines: &mut Lines<R>, question: &str) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut stdout = tokio::io::stdout();
    stdout.write_all(question.as_bytes()).await?;
    stdout.flush().await?;
    lines.next_line().await
}

/// Read commands from `lines` until end of input or `/quit`.
///
/// Each submission resolves on its own task so input stays responsive while
/// the bot is "typing". Before returning, every outstanding turn is awaited so
/// no user message is left without its reply in the log.
pub async fn run<R>(
    controller: Arc<ConversationController>,
    mut lines: Lines<R>,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    let mut turns = JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Submit(text) => {
                let controller = Arc::clone(&controller);
                turns.spawn(async move {
                    if let Err(e) = controller.submit(&text).await {
                        tracing::error!(error = %e, "Failed to record turn");
                        eprintln!("error: {}", e);
                    }
                });
            }
            Command::Clear => {
                let answer = prompt(&mut lines, "Clear the chat history? [y/N] ").await?;
                if answer.as_deref().is_some_and(is_confirmed) {
                    controller.clear_history()?;
                }
            }
            Command::Remote(on) => {
                let supplied = if on && !controller.settings().has_credential() {
                    prompt(&mut lines, "Enter API key: ").await?
                } else {
                    None
                };
                let enabled = controller.set_remote_enabled(on, supplied.as_deref())?;
                if on && !enabled {
                    println!("No API key set; AI stays off.");
                }
                println!("AI: {}", if enabled { "On" } else { "Off" });
            }
            Command::SetKey(key) => {
                controller.set_credential(&key)?;
                println!("API key saved.");
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Unknown(cmd) => println!("Unknown command: {} (try /help)", cmd),
        }
    }

    if controller.is_reply_in_flight() {
        tracing::info!(pending = turns.len(), "Waiting for pending replies before exit");
    }
    while let Some(joined) = turns.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "Reply task failed");
        }
    }
    Ok(())
}
