//! Query client against a live in-process HTTP server: request shape, both
//! reply shapes, and the failure paths.

mod common;

use common::{MockReply, MockServer};
use hoopchat::config::EndpointConfig;
use hoopchat::{QueryClient, QueryError, QueryEvent, Reply};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn client_for(server: &MockServer) -> QueryClient {
    QueryClient::new(&EndpointConfig {
        url: server.url.clone(),
        timeout_secs: Some(10),
    })
    .unwrap()
}

async fn collect_events(
    mut rx: tokio::sync::mpsc::UnboundedReceiver<QueryEvent>,
) -> Vec<QueryEvent> {
    let mut events = Vec::new();
    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn posts_query_as_json() {
    let server = MockServer::start(MockReply::json(r#"{"response": "ok"}"#)).await;
    client_for(&server).ask("Who won the 1996 finals?").await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/query");
    assert_eq!(
        request.headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
    assert_eq!(
        request.json(),
        serde_json::json!({"query": "Who won the 1996 finals?"})
    );
}

#[tokio::test]
async fn json_reply_is_buffered() {
    let server =
        MockServer::start(MockReply::json(r#"{"response": "  Chicago   Bulls. "}"#)).await;
    let reply = client_for(&server).send("q").await.unwrap();

    assert!(matches!(reply, Reply::Buffered(_)));
    assert_eq!(reply.into_text(|_| {}).await.unwrap(), "Chicago Bulls.");
}

#[tokio::test]
async fn json_content_type_is_matched_without_case() {
    let server = MockServer::start(MockReply::json_as(
        "Application/JSON; charset=UTF-8",
        r#"{"response": "Tim Duncan."}"#,
    ))
    .await;
    let reply = client_for(&server).send("q").await.unwrap();

    assert!(matches!(reply, Reply::Buffered(_)));
    assert_eq!(reply.into_text(|_| {}).await.unwrap(), "Tim Duncan.");
}

#[tokio::test]
async fn streamed_reply_strips_framing() {
    let server = MockServer::start(MockReply::stream(&[b"data:The ", b"Bulls."])).await;
    let reply = client_for(&server).send("q").await.unwrap();
    assert!(matches!(reply, Reply::Streamed(_)));

    let mut fragments = Vec::new();
    let text = reply
        .into_text(|f| fragments.push(f.to_string()))
        .await
        .unwrap();

    assert_eq!(text, "The Bulls.");
    assert_eq!(fragments.concat(), "The Bulls.");
}

#[tokio::test]
async fn streamed_reply_survives_split_characters_and_frames() {
    let frames = "data:Luka Dončić\n\ndata: dropped 60\n\n".as_bytes();
    // cut inside 'č' and inside the second "data:"
    let cut_a = "data:Luka Don".len() + 1;
    let cut_b = "data:Luka Dončić\n\nda".len();
    let server = MockServer::start(MockReply::stream(&[
        &frames[..cut_a],
        &frames[cut_a..cut_b],
        &frames[cut_b..],
    ]))
    .await;

    let text = client_for(&server).ask("q").await.unwrap();
    assert_eq!(text, "Luka Dončić dropped 60");
}

#[tokio::test]
async fn error_status_is_a_failure() {
    let server =
        MockServer::start(MockReply::error(400, r#"{"error": "No query provided"}"#)).await;
    let err = client_for(&server).ask("q").await.unwrap_err();

    match err {
        QueryError::Status { status, message } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(message, "No query provided");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn json_without_response_field_is_a_failure() {
    let server = MockServer::start(MockReply::json(r#"{"answer": "nope"}"#)).await;
    let err = client_for(&server).ask("q").await.unwrap_err();
    assert!(matches!(err, QueryError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn hangup_is_a_transport_failure() {
    let server = MockServer::start(MockReply::Hangup).await;
    let err = client_for(&server).ask("q").await.unwrap_err();
    assert!(matches!(err, QueryError::Transport { .. }), "got {err:?}");
}

#[tokio::test]
async fn spawned_query_reports_fragments_then_completion() {
    let server = MockServer::start(MockReply::stream(&[b"data:Three", b"data:-peat"])).await;
    let events = collect_events(client_for(&server).spawn_query("q".into())).await;

    let (last, fragments) = events.split_last().unwrap();
    assert_eq!(last, &QueryEvent::Completed("Three-peat".into()));
    assert!(!fragments.is_empty());
    assert!(
        fragments
            .iter()
            .all(|e| matches!(e, QueryEvent::Fragment(_)))
    );
}

#[tokio::test]
async fn spawned_query_reports_failure_once() {
    let server = MockServer::start(MockReply::error(500, "boom")).await;
    let events = collect_events(client_for(&server).spawn_query("q".into())).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], QueryEvent::Failed(msg) if msg.contains("500")));
}
