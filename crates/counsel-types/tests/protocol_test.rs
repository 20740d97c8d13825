use counsel_types::{Frame, StreamDecoder, TerminalMetadata, UsageData, WireFormat};

fn scenario_frames() -> Vec<Frame> {
    vec![
        Frame::fragment("Ol"),
        Frame::fragment("á, tudo bem?"),
        Frame::fragment("\nSegunda linha [EXTRA"),
        Frame::done(TerminalMetadata::new(
            Some("t_123".to_string()),
            Some(UsageData {
                prompt_tokens: 12,
                completion_tokens: 5,
                total_tokens: 17,
            }),
        )),
    ]
}

fn encode(format: WireFormat, frames: &[Frame]) -> Vec<u8> {
    let mut body = Vec::new();
    for frame in frames {
        if let Some(bytes) = format.encode(frame).unwrap() {
            body.extend_from_slice(&bytes);
        }
    }
    body
}

/// Feed `body` in chunks of `size` bytes and collect (text, terminal).
fn decode_in_chunks(format: WireFormat, body: &[u8], size: usize) -> (String, Option<Frame>) {
    let mut decoder: Box<dyn StreamDecoder> = format.decoder();
    let mut frames = Vec::new();
    for chunk in body.chunks(size) {
        frames.extend(decoder.push(chunk).unwrap());
    }
    frames.extend(decoder.finish().unwrap());

    let mut text = String::new();
    let mut terminal = None;
    for frame in frames {
        assert!(terminal.is_none(), "frame after terminal: {frame:?}");
        match frame {
            Frame::Fragment { text: t } => text.push_str(&t),
            other => terminal = Some(other),
        }
    }
    (text, terminal)
}

#[test]
fn test_ndjson_survives_any_chunking() {
    let frames = scenario_frames();
    let body = encode(WireFormat::Ndjson, &frames);

    for size in 1..=body.len() {
        let (text, terminal) = decode_in_chunks(WireFormat::Ndjson, &body, size);
        assert_eq!(text, "Olá, tudo bem?\nSegunda linha [EXTRA");
        assert_eq!(terminal.as_ref(), frames.last());
    }
}

#[test]
fn test_legacy_survives_any_chunking() {
    let frames = scenario_frames();
    let body = encode(WireFormat::Legacy, &frames);

    for size in 1..=body.len() {
        let (text, terminal) = decode_in_chunks(WireFormat::Legacy, &body, size);
        assert_eq!(text, "Olá, tudo bem?\nSegunda linha [EXTRA", "chunk size {size}");
        assert_eq!(terminal.as_ref(), frames.last(), "chunk size {size}");
    }
}

#[test]
fn test_legacy_stream_without_trailer_has_no_terminal() {
    let body = encode(WireFormat::Legacy, &[Frame::fragment("partial answ")]);
    let (text, terminal) = decode_in_chunks(WireFormat::Legacy, &body, 3);

    assert_eq!(text, "partial answ");
    assert!(terminal.is_none());
}

#[test]
fn test_legacy_error_frame_truncates() {
    let frames = vec![
        Frame::fragment("cut"),
        Frame::error(counsel_types::RelayErrorKind::Provider, "boom"),
    ];
    let body = encode(WireFormat::Legacy, &frames);
    assert_eq!(body, b"cut");
}
