use anyhow::Result;
use counsel_types::LineBuffer;

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Value of the `event:` field; `message` when absent
    pub event: String,
    /// `data:` lines joined with `\n`
    pub data: String,
}

/// Incremental SSE parser: feed raw body bytes, collect complete events.
///
/// An event is dispatched on the blank line that ends it. Comment lines
/// (`:`) and unknown fields are ignored.
pub struct SseEventParser {
    lines: LineBuffer,
    event: Option<String>,
    data: Vec<String>,
}

impl SseEventParser {
    pub fn new() -> Self {
        Self {
            lines: LineBuffer::with_capacity(8192),
            event: None,
            data: Vec::new(),
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<SseEvent>> {
        self.lines.extend(bytes);

        let mut events = Vec::new();
        while let Some(line) = self.lines.next_line() {
            let line = line?;
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Flush an event left undispatched when the body ends without a blank line.
    pub fn finish(&mut self) -> Result<Option<SseEvent>> {
        if let Some(tail) = self.lines.take_remaining() {
            let tail = tail?;
            if let Some(event) = self.process_line(&tail) {
                return Ok(Some(event));
            }
        }
        Ok(self.dispatch())
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if self.event.is_none() && self.data.is_empty() {
            return None;
        }
        let event = self.event.take().unwrap_or_else(|| "message".to_string());
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent { event, data })
    }
}

impl Default for SseEventParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_and_data_lines() {
        let mut parser = SseEventParser::new();
        let events = parser
            .feed(b"event: thread.created\ndata: {\"id\":\"t_1\"}\n\n")
            .unwrap();

        assert_eq!(
            events,
            vec![SseEvent {
                event: "thread.created".into(),
                data: "{\"id\":\"t_1\"}".into(),
            }]
        );
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut parser = SseEventParser::new();
        assert!(parser.feed(b"event: done\nda").unwrap().is_empty());
        let events = parser.feed(b"ta: [DONE]\n\n").unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "done");
        assert_eq!(events[0].data, "[DONE]");
    }

    #[test]
    fn test_multiline_data_and_comments() {
        let mut parser = SseEventParser::new();
        let events = parser.feed(b": keep-alive\ndata: a\ndata: b\n\n").unwrap();

        assert_eq!(events[0].event, "message");
        assert_eq!(events[0].data, "a\nb");
    }

    #[test]
    fn test_finish_dispatches_pending_event() {
        let mut parser = SseEventParser::new();
        assert!(parser.feed(b"event: done\ndata: [DONE]").unwrap().is_empty());

        let event = parser.finish().unwrap().unwrap();
        assert_eq!(event.event, "done");
        assert_eq!(event.data, "[DONE]");
    }
}
