use serde::{Deserialize, Serialize};

/// Content shown in the assistant entry until the first fragment arrives.
pub const PLACEHOLDER: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
}

impl TranscriptEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered conversation as displayed to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    /// Append a user entry followed by an assistant placeholder.
    pub fn begin_turn(&mut self, user_text: impl Into<String>) {
        self.entries.push(TranscriptEntry::user(user_text));
        self.entries.push(TranscriptEntry::assistant(PLACEHOLDER));
    }

    /// Apply one streamed fragment to the trailing assistant entry.
    ///
    /// `first` replaces the placeholder; later fragments append.
    /// Returns false when the transcript does not end with an assistant entry.
    pub fn apply_fragment(&mut self, fragment: &str, first: bool) -> bool {
        match self.last_assistant_mut() {
            Some(entry) => {
                if first {
                    entry.content.clear();
                }
                entry.content.push_str(fragment);
                true
            }
            None => false,
        }
    }

    /// Replace the trailing assistant entry's content in one step.
    pub fn replace_last_assistant(&mut self, content: impl Into<String>) -> bool {
        match self.last_assistant_mut() {
            Some(entry) => {
                entry.content = content.into();
                true
            }
            None => false,
        }
    }

    fn last_assistant_mut(&mut self) -> Option<&mut TranscriptEntry> {
        self.entries
            .last_mut()
            .filter(|entry| entry.role == Role::Assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_turn_adds_user_and_placeholder() {
        let mut transcript = Transcript::new();
        transcript.begin_turn("Olá");

        assert_eq!(
            transcript.entries(),
            &[TranscriptEntry::user("Olá"), TranscriptEntry::assistant(PLACEHOLDER)]
        );
    }

    #[test]
    fn test_fragments_replace_then_append() {
        let mut transcript = Transcript::new();
        transcript.begin_turn("Olá");

        assert!(transcript.apply_fragment("Ol", true));
        assert!(transcript.apply_fragment("á, tudo bem?", false));

        assert_eq!(transcript.last().unwrap().content, "Olá, tudo bem?");
    }

    #[test]
    fn test_fragment_equal_to_placeholder_is_kept() {
        let mut transcript = Transcript::new();
        transcript.begin_turn("?");

        transcript.apply_fragment("...", true);
        transcript.apply_fragment(" hmm", false);

        assert_eq!(transcript.last().unwrap().content, "... hmm");
    }

    #[test]
    fn test_no_assistant_entry() {
        let mut transcript = Transcript::new();
        assert!(!transcript.apply_fragment("x", true));
        assert!(!transcript.replace_last_assistant("x"));
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let mut transcript = Transcript::new();
        transcript.begin_turn("hi");
        let json = serde_json::to_string(&transcript).unwrap();
        assert_eq!(
            json,
            r#"[{"role":"user","content":"hi"},{"role":"assistant","content":"..."}]"#
        );
    }
}
