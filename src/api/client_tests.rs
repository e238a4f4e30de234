//! Tests for the HTTP client against a one-shot loopback server

use super::*;
use crate::api::{
    ApprovedSuggestion, FlashcardSource, ListFlashcardsParams, RegisterRequest, SessionStatus,
};
use crate::auth::{MemoryTokenStore, StaticTokenStore};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Accept one connection, answer with `status` and `body`, return the raw request
async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn client_for(base_url: &str, tokens: Arc<dyn TokenStore>) -> HttpClient {
    HttpClient::new(base_url, Duration::from_secs(5), tokens).unwrap()
}

#[test]
fn test_error_message_prefers_json_message() {
    let body = r#"{"timestamp":"2024-01-01T00:00:00Z","status":404,"error":"Not Found","message":"Session not found","path":"/ai/sessions/x"}"#;
    assert_eq!(error_message(body), "Session not found");
    assert_eq!(error_message("  plain failure \n"), "plain failure");
    assert_eq!(error_message(""), "");
}

#[test]
fn test_endpoint_urls_join_base_path() {
    let client = client_for("http://localhost:8080/", Arc::new(MemoryTokenStore::new()));
    assert_eq!(
        client.url(&["ai", "sessions"]).as_str(),
        "http://localhost:8080/ai/sessions"
    );

    let client = client_for("http://localhost:8080/api", Arc::new(MemoryTokenStore::new()));
    assert_eq!(
        client.url(&["auth", "login"]).as_str(),
        "http://localhost:8080/api/auth/login"
    );
}

#[test]
fn test_session_id_cannot_change_route() {
    let client = client_for("http://localhost:8080", Arc::new(MemoryTokenStore::new()));
    let url = client.url(&["ai", "sessions", "../flashcards?page=1#x", "approve"]);
    assert_eq!(
        url.as_str(),
        "http://localhost:8080/ai/sessions/..%2Fflashcards%3Fpage=1%23x/approve"
    );
    assert!(url.query().is_none());
}

#[test]
fn test_new_rejects_unusable_base_url() {
    let tokens: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
    assert!(HttpClient::new("not a url", Duration::from_secs(1), tokens.clone()).is_err());
    assert!(HttpClient::new("mailto:me@example.com", Duration::from_secs(1), tokens).is_err());
}

#[test]
fn test_from_config_rejects_invalid_values() {
    let tokens: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());

    let config = ApiConfig {
        timeout_secs: 0,
        ..ApiConfig::default()
    };
    assert!(matches!(
        HttpClient::from_config(&config, tokens.clone()),
        Err(FlashgenError::InvalidConfig(_))
    ));

    let config = ApiConfig {
        base_url: "  ".to_string(),
        ..ApiConfig::default()
    };
    assert!(matches!(
        HttpClient::from_config(&config, tokens.clone()),
        Err(FlashgenError::InvalidConfig(_))
    ));

    let config = ApiConfig {
        base_url: "localhost:8080".to_string(),
        ..ApiConfig::default()
    };
    assert!(matches!(
        HttpClient::from_config(&config, tokens),
        Err(FlashgenError::InvalidConfig(_))
    ));
}

#[test]
fn test_debug_does_not_expose_token() {
    let client = client_for(
        "http://localhost:8080",
        Arc::new(StaticTokenStore::new("secret-token".to_string())),
    );
    let debug = format!("{:?}", client);
    assert!(debug.contains("HttpClient"));
    assert!(!debug.contains("secret-token"));
}

#[tokio::test]
async fn test_create_session_sends_body_and_bearer() {
    let (base_url, server) = serve_once(
        "201 Created",
        r#"{"sessionId":"s-1","status":"PENDING","createdAt":"2024-05-01T10:00:00Z"}"#,
    )
    .await;
    let client = client_for(&base_url, Arc::new(StaticTokenStore::new("tok-123".to_string())));

    let response = client.create_session("some input").await.unwrap();
    assert_eq!(response.session_id, "s-1");
    assert_eq!(response.status, SessionStatus::Pending);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /ai/sessions HTTP/1.1"));
    assert!(request.to_lowercase().contains("authorization: bearer tok-123"));
    assert!(request.contains(r#"{"inputText":"some input"}"#));
}

#[tokio::test]
async fn test_request_without_token_has_no_auth_header() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"sessionId":"s-1","status":"COMPLETED","suggestions":[]}"#,
    )
    .await;
    let client = client_for(&base_url, Arc::new(MemoryTokenStore::new()));

    let response = client.get_suggestions("s-1").await.unwrap();
    assert!(response.suggestions.is_empty());

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /ai/sessions/s-1/suggestions HTTP/1.1"));
    assert!(!request.to_lowercase().contains("authorization:"));
}

#[tokio::test]
async fn test_not_found_maps_to_api_error_with_message() {
    let (base_url, _server) = serve_once(
        "404 Not Found",
        r#"{"status":404,"error":"Not Found","message":"Session not found"}"#,
    )
    .await;
    let client = client_for(&base_url, Arc::new(MemoryTokenStore::new()));

    let err = client.get_session("missing").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Api {
            code: 404,
            message: "Session not found".to_string()
        }
    );
}

#[tokio::test]
async fn test_unauthorized_clears_token_store() {
    let (base_url, _server) = serve_once("401 Unauthorized", "").await;
    let tokens = Arc::new(MemoryTokenStore::new());
    tokens.set_token("expired-on-server".to_string(), 3600);
    let client = client_for(&base_url, tokens.clone());

    let err = client.get_session("s-1").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(tokens.token().is_none());
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let (base_url, _server) = serve_once("200 OK", r#"{"sessionId": 5}"#).await;
    let client = client_for(&base_url, Arc::new(MemoryTokenStore::new()));

    let err = client.get_session("s-1").await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}", addr), Arc::new(MemoryTokenStore::new()));
    let err = client.create_session("text").await.unwrap_err();
    assert!(err.is_network(), "got {:?}", err);
}

#[tokio::test]
async fn test_approve_session_posts_partial_entries() {
    let (base_url, server) = serve_once("200 OK", "").await;
    let client = client_for(&base_url, Arc::new(MemoryTokenStore::new()));

    let request = ApproveSessionRequest {
        approved_suggestions: vec![
            ApprovedSuggestion {
                suggestion_id: "a".to_string(),
                front_content: None,
                back_content: None,
            },
            ApprovedSuggestion {
                suggestion_id: "b".to_string(),
                front_content: Some("Q".to_string()),
                back_content: Some("A".to_string()),
            },
        ],
    };
    client.approve_session("s-9", &request).await.unwrap();

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /ai/sessions/s-9/approve HTTP/1.1"));
    assert!(raw.contains(
        r#"{"approvedSuggestions":[{"suggestionId":"a"},{"suggestionId":"b","frontContent":"Q","backContent":"A"}]}"#
    ));
}

#[tokio::test]
async fn test_login_parses_token() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"username":"alice","accessToken":"jwt","expiresIn":900}"#,
    )
    .await;
    let client = client_for(&base_url, Arc::new(MemoryTokenStore::new()));

    let response = client.login("alice", "Secret1!").await.unwrap();
    assert_eq!(response.access_token, "jwt");
    assert_eq!(response.expires_in, 900);

    let raw = server.await.unwrap();
    assert!(raw.contains(r#"{"username":"alice","password":"Secret1!"}"#));
}

#[tokio::test]
async fn test_session_id_is_encoded_on_the_wire() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"sessionId":"a/b?c","status":"PENDING"}"#,
    )
    .await;
    let client = client_for(&base_url, Arc::new(MemoryTokenStore::new()));

    client.get_session("a/b?c").await.unwrap();

    let raw = server.await.unwrap();
    assert!(raw.starts_with("GET /ai/sessions/a%2Fb%3Fc HTTP/1.1"), "got {}", raw);
}

fn registration() -> RegisterRequest {
    RegisterRequest {
        username: "alice".to_string(),
        password: "Secret1!".to_string(),
        email: "alice@example.com".to_string(),
        first_name: "Alice".to_string(),
        last_name: "Liddell".to_string(),
    }
}

#[tokio::test]
async fn test_register_returns_user_id() {
    let (base_url, server) =
        serve_once("201 Created", r#""7d3f0c1e-5b1a-4c55-9d2e-0a1b2c3d4e5f""#).await;
    let client = client_for(&base_url, Arc::new(MemoryTokenStore::new()));

    let response = client.register(&registration()).await.unwrap();
    assert_eq!(response.user_id, "7d3f0c1e-5b1a-4c55-9d2e-0a1b2c3d4e5f");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /auth/register HTTP/1.1"));
    assert!(raw.contains(r#""firstName":"Alice""#));
    assert!(raw.contains(r#""email":"alice@example.com""#));
}

#[tokio::test]
async fn test_register_accepts_plain_text_id() {
    let (base_url, _server) = serve_once("201 Created", "user-42\n").await;
    let client = client_for(&base_url, Arc::new(MemoryTokenStore::new()));

    let response = client.register(&registration()).await.unwrap();
    assert_eq!(response.user_id, "user-42");
}

#[tokio::test]
async fn test_register_conflict_carries_backend_message() {
    let (base_url, _server) = serve_once(
        "409 Conflict",
        r#"{"status":409,"error":"Conflict","message":"Username already taken"}"#,
    )
    .await;
    let client = client_for(&base_url, Arc::new(MemoryTokenStore::new()));

    let err = client.register(&registration()).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Api {
            code: 409,
            message: "Username already taken".to_string()
        }
    );
}

#[tokio::test]
async fn test_list_flashcards_sends_default_query() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"content":[],"page":{"number":0,"size":20,"totalElements":0,"totalPages":0}}"#,
    )
    .await;
    let client = client_for(&base_url, Arc::new(StaticTokenStore::new("tok".to_string())));

    let page = client
        .list_flashcards(&ListFlashcardsParams::default())
        .await
        .unwrap();
    assert!(page.content.is_empty());
    assert_eq!(page.page.total_pages, 0);

    let raw = server.await.unwrap();
    assert!(
        raw.starts_with("GET /flashcards?page=0&size=20&sort=createdAt%2Cdesc HTTP/1.1"),
        "got {}",
        raw
    );
    assert!(raw.to_lowercase().contains("authorization: bearer tok"));
}

#[tokio::test]
async fn test_list_flashcards_with_source_filter() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{
            "content": [{
                "flashcardId": "id-1",
                "frontContent": "Question 1",
                "backContent": "Answer 1",
                "source": "AI",
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z"
            }],
            "page": {"number": 2, "size": 10, "totalElements": 21, "totalPages": 3}
        }"#,
    )
    .await;
    let client = client_for(&base_url, Arc::new(MemoryTokenStore::new()));

    let params = ListFlashcardsParams {
        page: 2,
        size: 10,
        source: Some(FlashcardSource::Ai),
        ..ListFlashcardsParams::default()
    };
    let page = client.list_flashcards(&params).await.unwrap();
    assert_eq!(page.content[0].flashcard_id, "id-1");
    assert_eq!(page.content[0].source, FlashcardSource::Ai);
    assert_eq!(page.page.number, 2);

    let raw = server.await.unwrap();
    assert!(
        raw.starts_with("GET /flashcards?page=2&size=10&sort=createdAt%2Cdesc&source=AI HTTP/1.1"),
        "got {}",
        raw
    );
}
