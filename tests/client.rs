//! Integration tests for the parsing client.
//!
//! The service side is a minimal in-process HTTP stub on a loopback port:
//! it reads one request (headers + content-length body), answers with a
//! canned response, and counts connections: enough to verify the client's
//! wire behaviour and its failure normalisation without a real parsing
//! service.

use doc2json::{ClientConfig, Doc2JsonError, ParseClient};
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

// ── Stub server ──────────────────────────────────────────────────────────────

struct Stub {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl Stub {
    fn base_url(&self) -> String {
        format!("http://{}/file_parse", self.addr)
    }

    fn connections(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Serve `response` to every connection, sequentially.
async fn spawn_stub(response: String) -> Stub {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let task_hits = Arc::clone(&hits);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            task_hits.fetch_add(1, Ordering::SeqCst);
            drain_request(&mut socket).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    Stub { addr, hits }
}

/// Accept connections but never answer, so the client's timeout fires.
async fn spawn_silent_stub() -> Stub {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let task_hits = Arc::clone(&hits);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            task_hits.fetch_add(1, Ordering::SeqCst);
            drain_request(&mut socket).await;
            tokio::time::sleep(Duration::from_secs(600)).await;
        }
    });

    Stub { addr, hits }
}

/// Read one full HTTP request: headers, then content-length body bytes.
async fn drain_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];

    let header_end = loop {
        let n = match socket.read(&mut tmp).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let content_length = parse_content_length(&buf[..header_end]);
    while buf.len() < header_end + content_length {
        let n = match socket.read(&mut tmp).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&tmp[..n]);
    }
}

fn parse_content_length(headers: &[u8]) -> usize {
    let text = String::from_utf8_lossy(headers);
    for line in text.lines() {
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                return value.trim().parse().unwrap_or(0);
            }
        }
    }
    0
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// A loopback address with nothing listening on it.
async fn dead_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

fn client_for(base_url: String, timeout_secs: u64) -> ParseClient {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let config = ClientConfig::builder()
        .base_url(base_url)
        .timeout_secs(timeout_secs)
        .probe_timeout_secs(2)
        .build()
        .expect("valid config");
    ParseClient::new(config).expect("client builds")
}

fn write_fixture(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

// ── parse: success path ──────────────────────────────────────────────────────

#[tokio::test]
async fn parse_returns_decoded_json_unchanged() {
    let expected = json!({
        "md": "# Title\n\nBody text.",
        "tables": [{"rows": 2, "cols": 3}],
        "formulas": [],
    });
    let stub = spawn_stub(http_response("200 OK", &expected.to_string())).await;

    let dir = tempfile::tempdir().unwrap();
    let file = write_fixture(&dir, "report.pdf", b"%PDF-1.7 fake");

    let client = client_for(stub.base_url(), 30);
    let result = client.parse(&[file]).await.expect("no structural error");

    assert_eq!(result, Some(expected));
    assert_eq!(stub.connections(), 1);
}

#[tokio::test]
async fn parse_single_matches_parse() {
    let stub = spawn_stub(http_response("200 OK", r#"{"ok":true}"#)).await;

    let dir = tempfile::tempdir().unwrap();
    let file = write_fixture(&dir, "notes.md", b"# notes");

    let client = client_for(stub.base_url(), 30);
    let result = client.parse_single(&file).await.unwrap();

    assert_eq!(result, Some(json!({"ok": true})));
}

#[tokio::test]
async fn parse_uploads_multiple_files_in_one_request() {
    let stub = spawn_stub(http_response("200 OK", r#"{"count":2}"#)).await;

    let dir = tempfile::tempdir().unwrap();
    let a = write_fixture(&dir, "a.pdf", b"%PDF- a");
    let b = write_fixture(&dir, "b.docx", b"PK fake docx");

    let client = client_for(stub.base_url(), 30);
    let result = client.parse(&[a, b]).await.unwrap();

    assert_eq!(result, Some(json!({"count": 2})));
    assert_eq!(stub.connections(), 1, "all files go in a single POST");
}

// ── parse: environmental failures normalise to None ──────────────────────────

#[tokio::test]
async fn non_200_status_yields_none() {
    let stub = spawn_stub(http_response(
        "500 Internal Server Error",
        r#"{"detail":"parser crashed"}"#,
    ))
    .await;

    let dir = tempfile::tempdir().unwrap();
    let file = write_fixture(&dir, "report.pdf", b"%PDF-");

    let client = client_for(stub.base_url(), 30);
    let result = client.parse(&[file]).await.unwrap();

    assert_eq!(result, None);
}

#[tokio::test]
async fn malformed_body_yields_none() {
    let stub = spawn_stub(http_response("200 OK", "<html>definitely not json</html>")).await;

    let dir = tempfile::tempdir().unwrap();
    let file = write_fixture(&dir, "report.pdf", b"%PDF-");

    let client = client_for(stub.base_url(), 30);
    let result = client.parse(&[file]).await.unwrap();

    assert_eq!(result, None);
}

#[tokio::test]
async fn unreachable_endpoint_yields_none() {
    let addr = dead_addr().await;

    let dir = tempfile::tempdir().unwrap();
    let file = write_fixture(&dir, "report.pdf", b"%PDF-");

    let client = client_for(format!("http://{addr}/file_parse"), 5);
    let result = client.parse(&[file]).await.unwrap();

    assert_eq!(result, None);
}

#[tokio::test]
async fn request_timeout_yields_none() {
    let stub = spawn_silent_stub().await;

    let dir = tempfile::tempdir().unwrap();
    let file = write_fixture(&dir, "report.pdf", b"%PDF-");

    let client = client_for(stub.base_url(), 1);
    let result = client.parse(&[file]).await.unwrap();

    assert_eq!(result, None);
}

// ── parse: structural misuse raises before any network call ─────────────────

#[tokio::test]
async fn empty_file_list_raises_invalid_input() {
    let stub = spawn_stub(http_response("200 OK", "{}")).await;
    let client = client_for(stub.base_url(), 30);

    let paths: Vec<PathBuf> = vec![];
    let err = client.parse(&paths).await.unwrap_err();

    assert!(matches!(err, Doc2JsonError::InvalidInput));
    assert_eq!(stub.connections(), 0, "validation must precede the upload");
}

#[tokio::test]
async fn missing_file_raises_file_not_found() {
    let stub = spawn_stub(http_response("200 OK", "{}")).await;
    let client = client_for(stub.base_url(), 30);

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone.pdf");
    let err = client.parse(&[missing.clone()]).await.unwrap_err();

    match err {
        Doc2JsonError::FileNotFound { path } => assert_eq!(path, missing),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
    assert_eq!(stub.connections(), 0, "validation must precede the upload");
}

#[tokio::test]
async fn directory_raises_not_a_file() {
    let stub = spawn_stub(http_response("200 OK", "{}")).await;
    let client = client_for(stub.base_url(), 30);

    let dir = tempfile::tempdir().unwrap();
    let err = client.parse(&[dir.path().to_path_buf()]).await.unwrap_err();

    assert!(matches!(err, Doc2JsonError::NotAFile { .. }));
    assert_eq!(stub.connections(), 0);
}

// ── parse_to_file ────────────────────────────────────────────────────────────

#[tokio::test]
async fn parse_to_file_writes_result_atomically() {
    let expected = json!({"md": "# out"});
    let stub = spawn_stub(http_response("200 OK", &expected.to_string())).await;

    let dir = tempfile::tempdir().unwrap();
    let file = write_fixture(&dir, "report.pdf", b"%PDF-");
    let out = dir.path().join("result.json");

    let client = client_for(stub.base_url(), 30);
    let written = client.parse_to_file(&[file], &out).await.unwrap();

    assert!(written);
    let round_trip: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(round_trip, expected);
    assert!(
        !dir.path().join("result.json.tmp").exists(),
        "temp file must be renamed away"
    );
}

#[tokio::test]
async fn parse_to_file_skips_write_on_service_failure() {
    let stub = spawn_stub(http_response("503 Service Unavailable", "overloaded")).await;

    let dir = tempfile::tempdir().unwrap();
    let file = write_fixture(&dir, "report.pdf", b"%PDF-");
    let out = dir.path().join("result.json");

    let client = client_for(stub.base_url(), 30);
    let written = client.parse_to_file(&[file], &out).await.unwrap();

    assert!(!written);
    assert!(!out.exists());
}

// ── parse_sync ───────────────────────────────────────────────────────────────

#[test]
fn parse_sync_raises_on_empty_list() {
    // No runtime here: parse_sync brings its own.
    let client = client_for("http://127.0.0.1:9/file_parse".to_string(), 5);

    let paths: Vec<PathBuf> = vec![];
    let err = client.parse_sync(&paths).unwrap_err();

    assert!(matches!(err, Doc2JsonError::InvalidInput));
}

// ── test_connection ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_connection_true_on_200() {
    let stub = spawn_stub(http_response("200 OK", "{}")).await;
    let client = client_for(stub.base_url(), 30);

    assert!(client.test_connection().await);
}

#[tokio::test]
async fn test_connection_false_on_unreachable_host() {
    let addr = dead_addr().await;
    let client = client_for(format!("http://{addr}/file_parse"), 30);

    assert!(!client.test_connection().await);
}

#[tokio::test]
async fn test_connection_false_on_error_status() {
    let stub = spawn_stub(http_response("500 Internal Server Error", "down")).await;
    let client = client_for(stub.base_url(), 30);

    assert!(!client.test_connection().await);
}
