use counsel_llm::AssistantClient;
use std::sync::Arc;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The assistant client is built once at startup and shared by every turn.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub assistant: Arc<dyn AssistantClient>,
}

impl AppState {
    pub fn new(config: Config, assistant: Arc<dyn AssistantClient>) -> Self {
        Self {
            config: Arc::new(config),
            assistant,
        }
    }
}
