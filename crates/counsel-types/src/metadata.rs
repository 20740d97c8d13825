use serde::{Deserialize, Serialize};

/// Token accounting reported by the provider when a run completes.
///
/// Field names stay snake_case on the wire, as the provider reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageData {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Out-of-band record closing a streamed turn.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub usage_data: Option<UsageData>,
}

impl TerminalMetadata {
    pub fn new(thread_id: Option<String>, usage_data: Option<UsageData>) -> Self {
        Self { thread_id, usage_data }
    }
}

/// Body of the legacy `[EXTRA_DATA]` trailer: `{ "response": { ... } }`.
///
/// `response` is absent when the provider call for a new thread failed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegacyEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<TerminalMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_metadata_shape() {
        let meta = TerminalMetadata::new(
            Some("t_123".into()),
            Some(UsageData {
                prompt_tokens: 10,
                completion_tokens: 4,
                total_tokens: 14,
            }),
        );
        let json = serde_json::to_value(&meta).unwrap();

        assert_eq!(json["threadId"], "t_123");
        assert_eq!(json["usageData"]["prompt_tokens"], 10);
        assert_eq!(json["usageData"]["total_tokens"], 14);
    }

    #[test]
    fn test_continuation_metadata_omits_thread_id() {
        let meta = TerminalMetadata::new(None, None);
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"usageData":null}"#);
    }

    #[test]
    fn test_legacy_envelope_without_response() {
        let env: LegacyEnvelope = serde_json::from_str("{}").unwrap();
        assert!(env.response.is_none());
    }
}
