//! Integration tests for the remote detector boundary:
//! - reply-shape tolerance (bare, fenced, prose-wrapped arrays)
//! - the no-network short circuit for empty input
//! - HTTP status mapping, exercised against a single-use local stub server

use redactcore::{parse_reply, Origin, RemoteConfig, RemoteDetector, RemoteScanError};

// =============================================================================
// Reply-shape tolerance
// =============================================================================

#[test]
fn tolerated_reply_shapes_parse_identically() {
    let shapes = [
        r#"[{"text": "Sarah", "category": "NAME"}]"#,
        "```json\n[{\"text\": \"Sarah\", \"category\": \"NAME\"}]\n```",
        "```\n[{\"text\": \"Sarah\", \"category\": \"NAME\"}]\n```",
        "Here is what I found:\n[{\"text\": \"Sarah\", \"category\": \"NAME\"}]\nLet me know!",
    ];

    for raw in shapes {
        let candidates =
            parse_reply(raw).unwrap_or_else(|e| panic!("shape {:?} failed: {}", raw, e));
        assert_eq!(candidates.len(), 1, "shape: {:?}", raw);
        assert_eq!(candidates[0].text, "Sarah");
        assert_eq!(candidates[0].origin, Origin::Contextual);
    }
}

#[test]
fn reply_without_an_array_is_an_error_not_an_empty_list() {
    let err = parse_reply("I found no JSON to give you.").unwrap_err();
    assert!(
        matches!(err, RemoteScanError::MalformedReply),
        "expected MalformedReply, got: {}",
        err
    );
}

// =============================================================================
// Local stub server
// =============================================================================

fn serve_once(response: String) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            use std::io::{Read, Write};
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                match stream.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        request.extend_from_slice(&buf[..n]);
                        if request_complete(&request) {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{}", addr)
}

// A request is complete once the headers are in and the body has reached
// the advertised content-length.
fn request_complete(request: &[u8]) -> bool {
    let header_end = match find_subslice(request, b"\r\n\r\n") {
        Some(i) => i,
        None => return false,
    };
    let headers = String::from_utf8_lossy(&request[..header_end]);
    let content_length = headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);
    request.len() - (header_end + 4) >= content_length
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    )
}

fn config_for(endpoint: String) -> RemoteConfig {
    RemoteConfig {
        api_key: "test-key".to_string(),
        model: "gemini-3-flash-preview".to_string(),
        endpoint,
    }
}

// =============================================================================
// Detector behavior
// =============================================================================

#[tokio::test]
async fn empty_input_resolves_without_touching_the_network() {
    // Port 1 is never contacted: the detector must short-circuit first
    let detector = RemoteDetector::new(config_for("http://127.0.0.1:1".to_string()));

    let candidates = detector.detect("").await.unwrap();
    assert!(candidates.is_empty());

    let candidates = detector.detect("   \n ").await.unwrap();
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn quota_status_maps_to_quota_error() {
    let endpoint = serve_once(http_response("429 Too Many Requests", ""));
    let detector = RemoteDetector::new(config_for(endpoint));

    let err = detector.detect("Sarah is here").await.unwrap_err();

    assert!(
        matches!(err, RemoteScanError::Quota(429)),
        "expected Quota(429), got: {}",
        err
    );
}

#[tokio::test]
async fn server_error_maps_to_status_error() {
    let endpoint = serve_once(http_response("500 Internal Server Error", ""));
    let detector = RemoteDetector::new(config_for(endpoint));

    let err = detector.detect("Sarah is here").await.unwrap_err();

    assert!(
        matches!(err, RemoteScanError::Status(500)),
        "expected Status(500), got: {}",
        err
    );
}

#[tokio::test]
async fn successful_reply_round_trips_into_candidates() {
    let body = r#"{"candidates":[{"content":{"parts":[{"text":"[{\"text\": \"Sarah\", \"category\": \"NAME\", \"rationale\": \"self-introduction\"}]"}]}}]}"#;
    let endpoint = serve_once(http_response("200 OK", body));
    let detector = RemoteDetector::new(config_for(endpoint));

    let candidates = detector.detect("Hi, I'm Sarah").await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].text, "Sarah");
    assert_eq!(candidates[0].origin, Origin::Contextual);
    assert_eq!(
        candidates[0].rationale.as_deref(),
        Some("self-introduction")
    );
}

#[tokio::test]
async fn non_json_success_body_is_malformed() {
    let endpoint = serve_once(http_response("200 OK", "oops, not json"));
    let detector = RemoteDetector::new(config_for(endpoint));

    let err = detector.detect("Sarah is here").await.unwrap_err();

    assert!(matches!(err, RemoteScanError::MalformedReply));
}
