pub mod config;
pub mod openai;
pub mod sse;
pub mod streaming;
pub mod traits;

pub use config::OpenAIConfig;
pub use openai::OpenAIAssistantClient;
pub use sse::{SseEvent, SseEventParser};
pub use streaming::{RunEvent, RunEventStream, RunUsage};
pub use traits::{AssistantClient, MessageInput, RunRequest, ThreadMessage};
