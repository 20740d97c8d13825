use anyhow::Result;
use counsel::prelude::*;
use counsel::types::{Role, PLACEHOLDER};
use counsel::SessionSnapshot;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let relay_url =
        std::env::var("COUNSEL_RELAY_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let assistant_id = std::env::var("COUNSEL_ASSISTANT_ID")
        .map_err(|_| anyhow::anyhow!("COUNSEL_ASSISTANT_ID is required"))?;
    let format = match std::env::var("COUNSEL_WIRE_FORMAT") {
        Ok(value) => value.parse::<WireFormat>().map_err(anyhow::Error::msg)?,
        Err(_) => WireFormat::Ndjson,
    };

    let chat = Arc::new(
        ChatBuilder::new()
            .relay_url(&relay_url)
            .assistant_id(&assistant_id)
            .format(format)
            .build()?,
    );

    println!("Counsel chat");
    println!("============");
    println!("Relay: {} ({})", relay_url, format.as_str());
    println!("Commands: /new starts a new conversation, /quit exits, Ctrl+C cancels a reply");
    println!();

    tokio::spawn(print_fragments(chat.subscribe()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" => break,
            "/new" => {
                chat.reset()?;
                println!("(new conversation)");
                continue;
            }
            _ => {}
        }

        let send = chat.send(&line);
        tokio::pin!(send);
        let outcome = tokio::select! {
            outcome = &mut send => outcome,
            _ = tokio::signal::ctrl_c() => {
                chat.cancel();
                send.await
            }
        };
        println!();

        match outcome {
            Ok(TurnOutcome::Completed { usage, .. }) => {
                if let Some(usage) = usage {
                    println!("[{} tokens]", usage.total_tokens);
                }
            }
            Ok(TurnOutcome::Ignored) => {}
            Ok(TurnOutcome::Failed { kind, message }) => println!("[relay error: {kind}: {message}]"),
            Ok(TurnOutcome::Incomplete) => println!("[reply ended early]"),
            Ok(TurnOutcome::Cancelled) => println!("[cancelled]"),
            Err(e) => println!("[error: {e}]"),
        }
    }

    if let Some(thread_id) = chat.thread_id() {
        println!("Conversation thread: {}", thread_id);
    }
    Ok(())
}

/// Print the growing assistant entry as snapshots arrive.
async fn print_fragments(mut updates: watch::Receiver<SessionSnapshot>) {
    // (entry index, bytes already printed)
    let mut printed = (usize::MAX, 0usize);

    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow_and_update().clone();
        let index = snapshot.transcript.len().saturating_sub(1);
        let Some(entry) = snapshot.transcript.last() else {
            continue;
        };
        if entry.role != Role::Assistant || entry.content == PLACEHOLDER {
            continue;
        }
        if printed.0 != index {
            printed = (index, 0);
        }
        if let Some(new_text) = entry.content.get(printed.1..) {
            print!("{}", new_text);
            let _ = std::io::stdout().flush();
        }
        printed.1 = entry.content.len();
    }
}
