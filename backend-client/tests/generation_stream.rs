use assert_matches::assert_matches;
use codepup_backend_client::BackendInfo;
use codepup_backend_client::GenerateRequest;
use codepup_backend_client::GenerationClient;
use codepup_protocol::SessionState;
use codepup_stream::StreamError;
use pretty_assertions::assert_eq;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

fn sse_event(value: serde_json::Value) -> String {
    format!("data: {value}\n\n")
}

fn chunk(content: &str) -> String {
    sse_event(serde_json::json!({"type": "chunk", "content": content}))
}

async fn mount_stream(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path("/api/generate/stream"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/event-stream"),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> GenerationClient {
    let mut info = BackendInfo::new(server.uri());
    info.stream_idle_timeout_ms = Some(5_000);
    GenerationClient::new(info)
}

#[tokio::test]
async fn reconstructs_files_from_chunked_stream() {
    let server = MockServer::start().await;

    // Tag boundaries land mid-event on purpose.
    let body = [
        chunk("Here is your app.\n<file path=\"src/App."),
        chunk("tsx\">export default function App() {"),
        chunk("\n  return <div>hi</div>;\n}</file>\n<file path=\"src/index.css\">"),
        chunk("body { margin: 0; }</file>"),
        sse_event(serde_json::json!({"type": "complete"})),
    ]
    .concat();
    mount_stream(&server, body).await;

    let handle = client_for(&server)
        .stream_generation(&GenerateRequest::new("build me an app"))
        .await
        .expect("stream should start");
    let snapshot = handle.wait().await;

    assert_eq!(snapshot.state, SessionState::Complete);
    assert_eq!(snapshot.progress, 100);
    assert_eq!(snapshot.files.len(), 2);
    assert_eq!(snapshot.files[0].filename, "src/App.tsx");
    assert_eq!(
        snapshot.files[0].content,
        "export default function App() {\n  return <div>hi</div>;\n}"
    );
    assert!(snapshot.files[0].is_complete);
    assert_eq!(snapshot.files[1].filename, "src/index.css");
    assert_eq!(snapshot.files[1].content, "body { margin: 0; }");
}

#[tokio::test]
async fn error_event_preserves_partial_results() {
    let server = MockServer::start().await;

    let body = [
        chunk("<file path=\"src/App.tsx\">done</file><file path=\"src/main.tsx\">import"),
        sse_event(serde_json::json!({"type": "error", "message": "generation failed"})),
    ]
    .concat();
    mount_stream(&server, body).await;

    let handle = client_for(&server)
        .stream_generation(&GenerateRequest::new("build me an app"))
        .await
        .expect("stream should start");

    let error = handle.wait().await;
    assert_eq!(error.state, SessionState::Error);
    // The finished file plus the interrupted one, marked incomplete.
    assert_eq!(error.files.len(), 2);
    assert!(error.files[0].is_complete);
    assert_eq!(error.files[1].filename, "src/main.tsx");
    assert!(!error.files[1].is_complete);
}

#[tokio::test]
async fn stream_closing_without_complete_is_an_error() {
    let server = MockServer::start().await;
    mount_stream(&server, chunk("<file path=\"a.ts\">x</file>")).await;

    let handle = client_for(&server)
        .stream_generation(&GenerateRequest::new("build me an app"))
        .await
        .expect("stream should start");

    let mut snapshots = handle.snapshots();
    let snapshot = snapshots
        .wait_for(|snapshot| snapshot.state.is_terminal())
        .await
        .expect("session reaches a terminal state")
        .clone();
    assert_eq!(snapshot.state, SessionState::Error);
    assert_matches!(
        handle.last_error().await,
        Some(StreamError::ClosedBeforeComplete)
    );
    // Files seen before the disconnect stay available.
    assert_eq!(snapshot.files.len(), 1);
}

#[tokio::test]
async fn stop_cancels_a_live_stream() {
    let server = MockServer::start().await;

    // Body with data but no terminal event; delay keeps the connection open
    // long enough for stop() to race ahead of the close.
    Mock::given(method("POST"))
        .and(path("/api/generate/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    chunk("<file path=\"a.ts\">partial").into_bytes(),
                    "text/event-stream",
                )
                .set_delay(std::time::Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let handle = client_for(&server)
        .stream_generation(&GenerateRequest::new("build me an app"))
        .await
        .expect("stream should start");
    handle.stop();

    let snapshot = handle.wait().await;
    assert_eq!(snapshot.state, SessionState::Stopped);
}

#[tokio::test]
async fn non_success_status_is_a_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate/stream"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .stream_generation(&GenerateRequest::new("build me an app"))
        .await;

    assert_matches!(
        result,
        Err(codepup_backend_client::BackendError::UnexpectedStatus { status, body })
            if status.as_u16() == 500 && body == "backend exploded"
    );
}

#[tokio::test]
async fn idle_stream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(chunk("<file path=\"a.ts\">x").into_bytes(), "text/event-stream")
                .set_delay(std::time::Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let mut info = BackendInfo::new(server.uri());
    info.stream_idle_timeout_ms = Some(100);
    let handle = GenerationClient::new(info)
        .stream_generation(&GenerateRequest::new("build me an app"))
        .await
        .expect("stream should start");

    let mut snapshots = handle.snapshots();
    snapshots
        .wait_for(|snapshot| snapshot.state.is_terminal())
        .await
        .expect("session reaches a terminal state");
    assert_matches!(handle.last_error().await, Some(StreamError::IdleTimeout));
    assert_eq!(handle.wait().await.state, SessionState::Error);
}
