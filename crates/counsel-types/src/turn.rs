use serde::{Deserialize, Serialize};

/// One conversation turn as sent by a consumer to the relay.
///
/// `thread_id == None` starts a new conversation; `Some` continues an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub assistant_id: String,
    pub message: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

impl TurnRequest {
    pub fn new(assistant_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            message: message.into(),
            thread_id: None,
        }
    }

    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    /// True when the turn continues an existing thread.
    pub fn is_continuation(&self) -> bool {
        self.thread_id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }

    /// The message with surrounding whitespace removed, or `None` when nothing is left.
    pub fn trimmed_message(&self) -> Option<&str> {
        let trimmed = self.message.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_request_wire_names() {
        let req = TurnRequest::new("asst_1", "Olá").with_thread("t_9");
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["assistantId"], "asst_1");
        assert_eq!(json["message"], "Olá");
        assert_eq!(json["threadId"], "t_9");
    }

    #[test]
    fn test_missing_thread_id_means_new_conversation() {
        let req: TurnRequest =
            serde_json::from_str(r#"{"assistantId":"a","message":"hi"}"#).unwrap();
        assert!(!req.is_continuation());

        let req: TurnRequest =
            serde_json::from_str(r#"{"assistantId":"a","message":"hi","threadId":null}"#).unwrap();
        assert!(!req.is_continuation());
    }

    #[test]
    fn test_blank_thread_id_is_not_a_continuation() {
        let req = TurnRequest::new("a", "hi").with_thread("  ");
        assert!(!req.is_continuation());
    }

    #[test]
    fn test_trimmed_message() {
        assert_eq!(TurnRequest::new("a", "  hi \n").trimmed_message(), Some("hi"));
        assert_eq!(TurnRequest::new("a", "   ").trimmed_message(), None);
        assert_eq!(TurnRequest::new("a", "").trimmed_message(), None);
    }
}
