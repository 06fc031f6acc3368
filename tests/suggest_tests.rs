// Suggestion client against a local stand-in for the chat completions API

use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use bulk_rename::SuggestError;
use bulk_rename::suggest::{ApiSettings, OpenAiSuggester};

/// Serve `responses` in order, one per connection, and record request bodies.
async fn serve(responses: Vec<(u16, String)>) -> (String, Arc<Mutex<Vec<serde_json::Value>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let bodies = Arc::new(Mutex::new(Vec::new()));
    let seen = bodies.clone();

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            seen.lock().unwrap().push(serde_json::from_str(&request).unwrap());

            let reason = if status == 200 { "OK" } else { "Bad Request" };
            let reply = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
    });

    (format!("http://{addr}/v1"), bodies)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).into_owned();
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return String::from_utf8_lossy(&buf[end + 4..end + 4 + length]).into_owned();
            }
        }
        if n == 0 {
            panic!("connection closed before the request was complete");
        }
    }
}

fn completion(content: &str) -> String {
    serde_json::json!({ "choices": [{ "message": { "content": content } }] }).to_string()
}

fn suggester(endpoint: String) -> OpenAiSuggester {
    OpenAiSuggester::new(ApiSettings {
        endpoint,
        api_key: Some("sk-test".into()),
        model: "test-model".into(),
    })
    .unwrap()
}

#[tokio::test]
async fn test_suggestion_sends_text_head_and_sanitizes_reply() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("draft.txt");
    fs::write(&path, "Minutes of the March budget meeting").unwrap();

    let (endpoint, bodies) = serve(vec![(200, completion("`march_budget_minutes`"))]).await;
    let name = suggester(endpoint).suggest(&path).await.unwrap();
    assert_eq!(name, "march_budget_minutes.txt");

    let bodies = bodies.lock().unwrap();
    let request = &bodies[0];
    assert_eq!(request["model"], "test-model");
    assert_eq!(request["max_tokens"], 1000);
    assert!(request["messages"][1]["content"]
        .as_str()
        .unwrap()
        .contains("March budget meeting"));
}

#[tokio::test]
async fn test_bad_request_retries_once_without_reasoning_effort() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("IMG_0042.jpg");
    fs::write(&path, [0xff, 0xd8, 0xff]).unwrap();

    let rejection = r#"{"error":{"message":"Unrecognized request argument supplied: reasoning_effort"}}"#;
    let (endpoint, bodies) = serve(vec![
        (400, rejection.to_string()),
        (200, completion("harbour_at_dusk.jpg")),
    ])
    .await;

    let name = suggester(endpoint).suggest(&path).await.unwrap();
    assert_eq!(name, "harbour_at_dusk.jpg");

    let bodies = bodies.lock().unwrap();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0]["reasoning_effort"], "low");
    assert!(bodies[1].get("reasoning_effort").is_none());
}

#[tokio::test]
async fn test_image_is_sent_as_data_url_part() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Screenshot 2024.png");
    fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

    let (endpoint, bodies) = serve(vec![(200, completion("login_form_error.png"))]).await;
    let name = suggester(endpoint).suggest(&path).await.unwrap();
    assert_eq!(name, "login_form_error.png");

    let bodies = bodies.lock().unwrap();
    let content = &bodies[0]["messages"][1]["content"];
    assert_eq!(content[0]["type"], "text");
    assert_eq!(content[1]["type"], "image_url");
    assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,iVBORw==");
    assert!(bodies[0]["messages"][0]["content"].is_string());
}

#[tokio::test]
async fn test_unrelated_bad_request_is_returned() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.md");
    fs::write(&path, "# todo").unwrap();

    let (endpoint, _) = serve(vec![(400, r#"{"error":"model not found"}"#.to_string())]).await;
    let err = suggester(endpoint).suggest(&path).await.unwrap_err();
    assert!(matches!(err, SuggestError::Api { status: 400, .. }));
}

#[tokio::test]
async fn test_unsupported_files_never_reach_the_network() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("archive.zip");
    fs::write(&path, "PK").unwrap();

    // Nothing listens here; an attempted request would be an Http error.
    let err = suggester("http://127.0.0.1:9/v1".into())
        .suggest(&path)
        .await
        .unwrap_err();
    assert!(matches!(err, SuggestError::Unsupported(_)));
}
