// OpenAI Assistants v2 provider

pub mod client;

pub use client::OpenAIAssistantClient;
