use counsel_client::{ChatSession, ClientError, HttpRelayTransport, TurnOutcome};
use counsel_types::{TranscriptEntry, UsageData, WireFormat, PLACEHOLDER};
use mockito::Matcher;
use std::sync::Arc;

const NDJSON_BODY: &str = concat!(
    "{\"type\":\"fragment\",\"text\":\"Ol\"}\n",
    "{\"type\":\"fragment\",\"text\":\"á, tudo bem?\"}\n",
    "{\"type\":\"done\",\"meta\":{\"threadId\":\"t_123\",\"usageData\":{\"prompt_tokens\":12,\"completion_tokens\":5,\"total_tokens\":17}}}\n",
);

const LEGACY_BODY: &str = concat!(
    "Olá, tudo bem?",
    "\n[EXTRA_DATA]: ",
    "{\"response\":{\"threadId\":\"t_123\",\"usageData\":null}}",
);

fn session_for(server: &mockito::Server, format: WireFormat) -> ChatSession {
    let transport = HttpRelayTransport::new(format!("{}/api/chat/stream", server.url()));
    ChatSession::new(Arc::new(transport), "asst_1").with_format(format)
}

#[tokio::test]
async fn test_ndjson_turn_over_http() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat/stream")
        .match_query(Matcher::UrlEncoded("format".into(), "ndjson".into()))
        .match_body(Matcher::PartialJson(serde_json::json!({
            "assistantId": "asst_1",
            "message": "Olá"
        })))
        .with_status(200)
        .with_header("content-type", "application/x-ndjson")
        .with_body(NDJSON_BODY)
        .create_async()
        .await;

    let session = session_for(&server, WireFormat::Ndjson);
    let outcome = session.send("Olá").await.unwrap();

    assert_eq!(
        outcome,
        TurnOutcome::Completed {
            thread_id: Some("t_123".into()),
            usage: Some(UsageData {
                prompt_tokens: 12,
                completion_tokens: 5,
                total_tokens: 17,
            }),
        }
    );
    assert_eq!(
        session.transcript().entries(),
        &[
            TranscriptEntry::user("Olá"),
            TranscriptEntry::assistant("Olá, tudo bem?"),
        ]
    );
    assert_eq!(session.thread_id().as_deref(), Some("t_123"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_legacy_turn_then_continuation() {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("POST", "/api/chat/stream")
        .match_query(Matcher::UrlEncoded("format".into(), "legacy".into()))
        .match_body(Matcher::PartialJson(serde_json::json!({ "message": "Olá" })))
        .with_status(200)
        .with_header("content-type", "text/plain; charset=utf-8")
        .with_body(LEGACY_BODY)
        .create_async()
        .await;
    let second = server
        .mock("POST", "/api/chat/stream")
        .match_query(Matcher::UrlEncoded("format".into(), "legacy".into()))
        .match_body(Matcher::PartialJson(serde_json::json!({
            "message": "E depois?",
            "threadId": "t_123"
        })))
        .with_status(200)
        .with_body("Depois vem o resto.\n[EXTRA_DATA]: {\"response\":{\"threadId\":\"t_123\",\"usageData\":null}}")
        .create_async()
        .await;

    let session = session_for(&server, WireFormat::Legacy);
    session.send("Olá").await.unwrap();
    session.send("E depois?").await.unwrap();

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 4);
    assert_eq!(transcript.entries()[1], TranscriptEntry::assistant("Olá, tudo bem?"));
    assert_eq!(transcript.entries()[3], TranscriptEntry::assistant("Depois vem o resto."));

    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_relay_bad_gateway_surfaces_as_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/chat/stream")
        .match_query(Matcher::Any)
        .with_status(502)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"Assistant provider error"}"#)
        .create_async()
        .await;

    let session = session_for(&server, WireFormat::Ndjson);
    let err = session.send("Olá").await.unwrap_err();

    match err {
        ClientError::Relay { status, body } => {
            assert_eq!(status, 502);
            assert!(body.contains("Assistant provider error"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!session.is_loading());
    assert_eq!(
        session.transcript().last(),
        Some(&TranscriptEntry::assistant(PLACEHOLDER))
    );
}
