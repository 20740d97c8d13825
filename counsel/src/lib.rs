//! # Counsel
//!
//! Streaming chat with an assistant provider, relayed fragment by fragment:
//!
//! - **counsel-types**: the fragment protocol (frames, NDJSON and legacy codecs, transcript)
//! - **counsel-llm**: assistant provider client (threads, messages, streamed runs)
//! - **counsel-client**: incremental chat consumer and the admin backend client
//!
//! The relay server itself is the `counsel-api` binary.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use counsel::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let chat = ChatBuilder::new()
//!         .relay_url("http://localhost:8000")
//!         .assistant_id("asst_123")
//!         .build()?;
//!
//!     let mut updates = chat.subscribe();
//!     tokio::spawn(async move {
//!         while updates.changed().await.is_ok() {
//!             let snapshot = updates.borrow_and_update().clone();
//!             if let Some(entry) = snapshot.transcript.last() {
//!                 println!("{}", entry.content);
//!             }
//!         }
//!     });
//!
//!     chat.send("Olá!").await?;
//!     Ok(())
//! }
//! ```

pub use counsel_client as client;
pub use counsel_llm as llm;
pub use counsel_types as types;

pub use counsel_client::{ChatSession, ClientError, DisplayMode, SessionSnapshot, TurnOutcome};
pub use counsel_llm::{AssistantClient, OpenAIAssistantClient, RunEvent};
pub use counsel_types::{Frame, TerminalMetadata, Transcript, TranscriptEntry, WireFormat};

/// Builder for a [`ChatSession`] talking to a running relay
pub mod builder;

pub mod prelude {
    pub use crate::builder::ChatBuilder;
    pub use crate::client::{ChatSession, DisplayMode, TurnOutcome};
    pub use crate::types::{TranscriptEntry, WireFormat};
    pub use anyhow::Result;
}
