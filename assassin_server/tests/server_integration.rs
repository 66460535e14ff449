//! Integration tests for the HTTP API.
//!
//! Drives the full router with an in-memory mailer, the in-memory check-in
//! repository and a temporary upload directory.

use assassin::chain::Chain;
use assassin::checkin::{
    CheckIn, CheckInError, CheckInManager, CheckInRepository, CheckInResult, LocalImageStore,
    MemoryCheckInRepository,
};
use assassin::mail::{MailError, MailResult, Mailer, OutgoingMail, TargetNotifier};
use assassin_server::api::{ApiSettings, AppState, create_router};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower::ServiceExt; // For `oneshot` method

const BOUNDARY: &str = "assassin-test-boundary";

const ROSTER: &str = "name,email\n\
Alice,alice@example.com\n\
Bruno,bruno@example.com\n\
Chiara,chiara@example.com\n";

/// Mailer that records messages and fails for one chosen recipient
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    fail_for: Option<String>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> MailResult<()> {
        if self.fail_for.as_deref() == Some(mail.to.as_str()) {
            let err = "unreachable".parse::<lettre::Address>().unwrap_err();
            return Err(MailError::Address(err));
        }
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

/// Repository whose store is reachable or not, and which must not be listed
struct PingOnlyRepository {
    reachable: bool,
}

#[async_trait]
impl CheckInRepository for PingOnlyRepository {
    async fn insert(&self, _check_in: &CheckIn) -> CheckInResult<()> {
        Ok(())
    }

    async fn list(&self) -> CheckInResult<Vec<CheckIn>> {
        panic!("health must not read the check-in table");
    }

    async fn ping(&self) -> CheckInResult<()> {
        if self.reachable {
            Ok(())
        } else {
            Err(CheckInError::Storage(std::io::Error::other("store down")))
        }
    }
}

struct TestServer {
    app: axum::Router,
    mailer: Arc<RecordingMailer>,
    upload_dir: PathBuf,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

/// Helper to create test server around the given mailer and check-in store
fn build_test_server(
    mailer: RecordingMailer,
    repository: Arc<dyn CheckInRepository>,
) -> TestServer {
    let upload_dir = std::env::temp_dir().join(format!("assassin_server_{}", uuid::Uuid::new_v4()));
    let mailer = Arc::new(mailer);

    let state = AppState {
        notifier: Arc::new(TargetNotifier::new(mailer.clone())),
        check_ins: Arc::new(CheckInManager::new(
            repository,
            Arc::new(LocalImageStore::new(upload_dir.clone(), "/uploads")),
        )),
        settings: ApiSettings {
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "https://*.vercel.app".to_string(),
            ],
            upload_dir: Some(upload_dir.clone()),
            ..ApiSettings::default()
        },
    };

    TestServer {
        app: create_router(state),
        mailer,
        upload_dir,
    }
}

fn create_test_server_with(mailer: RecordingMailer) -> TestServer {
    build_test_server(mailer, Arc::new(MemoryCheckInRepository::new()))
}

fn create_test_server() -> TestServer {
    create_test_server_with(RecordingMailer::default())
}

/// Multipart form builder
#[derive(Default)]
struct Form {
    body: Vec<u8>,
}

impl Form {
    fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn roster(self, csv: &str) -> Self {
        self.file("file", "players.csv", "text/csv", csv.as_bytes())
    }

    fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(server: &TestServer, request: Request<Body>) -> (StatusCode, Value) {
    let response = server.app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn chain_from(body: &Value) -> Chain {
    serde_json::from_value(body["chain"].clone()).expect("response should carry a chain")
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let server = create_test_server();

    let (status, body) = send(&server, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_check_pings_store_without_listing() {
    let server = build_test_server(
        RecordingMailer::default(),
        Arc::new(PingOnlyRepository { reachable: true }),
    );
    let (status, body) = send(&server, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["check_ins"], true);

    let server = build_test_server(
        RecordingMailer::default(),
        Arc::new(PingOnlyRepository { reachable: false }),
    );
    let (status, body) = send(&server, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn test_api_test_endpoint() {
    let server = create_test_server();

    let (status, body) = send(&server, get("/api/test")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "API is working!");
}

// ============================================================================
// Chain Generation Tests
// ============================================================================

#[tokio::test]
async fn test_generate_chain_only_reveals_chain_without_mail() {
    let server = create_test_server();
    let request = Form::default()
        .roster(ROSTER)
        .text("host_email", "host@example.com")
        .into_request("/generate-chain");

    let (status, body) = send(&server, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Chain generated successfully");
    for entry in body["chain"].as_object().unwrap().values() {
        assert!(entry["target"].is_string());
        assert!(entry.get("target_name").is_none());
    }
    let chain = chain_from(&body);
    assert_eq!(chain.len(), 3);
    assert_eq!(chain.validate(), Ok(()));
    assert!(server.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_generate_game_mails_players_and_keeps_secret() {
    let server = create_test_server();
    let request = Form::default()
        .roster(ROSTER)
        .text("host_email", "host@example.com")
        .into_request("/generate");

    let (status, body) = send(&server, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Game generated successfully and emails sent");
    assert_eq!(body["chain"], "its a secret");
    assert_eq!(body["players"], 3);

    let sent = server.mailer.sent();
    assert_eq!(sent.len(), 4, "three targets plus the host confirmation");
    for player in ["alice@example.com", "bruno@example.com", "chiara@example.com"] {
        assert_eq!(sent.iter().filter(|m| m.to == player).count(), 1);
    }
    assert!(sent.iter().any(|m| m.to == "host@example.com"));
}

#[tokio::test]
async fn test_v1_seed_reproduces_chain() {
    let server = create_test_server();
    let request = || {
        Form::default()
            .roster(ROSTER)
            .text("host_email", "host@example.com")
            .text("notify", "false")
            .text("reveal", "full")
            .text("seed", "42")
            .into_request("/api/v1/chains")
    };

    let (first_status, first) = send(&server, request()).await;
    let (second_status, second) = send(&server, request()).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(chain_from(&first), chain_from(&second));
    assert!(server.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_v1_defaults_to_mailing_and_secret() {
    let server = create_test_server();
    let request = Form::default()
        .roster(ROSTER)
        .text("host_email", "host@example.com")
        .into_request("/api/v1/chains");

    let (status, body) = send(&server, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chain"], "its a secret");
    assert_eq!(server.mailer.sent().len(), 4);
}

#[tokio::test]
async fn test_v1_can_mail_and_reveal() {
    let server = create_test_server();
    let request = Form::default()
        .roster(ROSTER)
        .text("host_email", "host@example.com")
        .text("reveal", "full")
        .into_request("/api/v1/chains");

    let (status, body) = send(&server, request).await;

    assert_eq!(status, StatusCode::OK);
    let chain = chain_from(&body);
    assert_eq!(chain.validate(), Ok(()));

    let sent = server.mailer.sent();
    for (player, info) in chain.iter() {
        let mail = sent
            .iter()
            .find(|m| m.to == info.player_email)
            .unwrap_or_else(|| panic!("{player} should get mail"));
        assert!(mail.html_body.contains(&info.target_name));
    }
}

#[tokio::test]
async fn test_generate_rejects_bad_uploads() {
    let server = create_test_server();

    let cases = vec![
        (
            Form::default().text("host_email", "host@example.com"),
            "No file uploaded",
        ),
        (Form::default().roster(ROSTER), "Host email is required"),
        (
            Form::default()
                .file("file", "players.txt", "text/plain", ROSTER.as_bytes())
                .text("host_email", "host@example.com"),
            "Invalid file type",
        ),
        (
            Form::default()
                .file("file", "", "text/csv", ROSTER.as_bytes())
                .text("host_email", "host@example.com"),
            "No selected file",
        ),
    ];

    for (form, expected) in cases {
        let (status, body) = send(&server, form.into_request("/generate-chain")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], expected);
    }
}

#[tokio::test]
async fn test_generate_rejects_invalid_rosters() {
    let server = create_test_server();

    for csv in [
        "name,email\nAlice,alice@example.com\n",
        "name\nAlice\nBruno\n",
        "name,email\nAlice,alice@example.com\nAlice,other@example.com\n",
        "name,email\nAlice,not-an-address\nBruno,bruno@example.com\n",
    ] {
        let request = Form::default()
            .roster(csv)
            .text("host_email", "host@example.com")
            .into_request("/generate-chain");

        let (status, body) = send(&server, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "roster {csv:?}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_generate_reports_mail_failure_as_bad_gateway() {
    let server = create_test_server_with(RecordingMailer {
        fail_for: Some("bruno@example.com".to_string()),
        ..RecordingMailer::default()
    });
    let request = Form::default()
        .roster(ROSTER)
        .text("host_email", "host@example.com")
        .into_request("/generate");

    let (status, body) = send(&server, request).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Error sending email to bruno@example.com");
    assert!(
        !server
            .mailer
            .sent()
            .iter()
            .any(|m| m.to == "host@example.com")
    );
}

// ============================================================================
// Delivery Tests
// ============================================================================

fn delivery_chain() -> Value {
    json!({
        "Alice": {"target_name": "Bruno", "target_email": "bruno@example.com", "player_email": "alice@example.com"},
        "Bruno": {"target_name": "Chiara", "target_email": "chiara@example.com", "player_email": "bruno@example.com"},
        "Chiara": {"target": "Alice", "target_email": "alice@example.com", "player_email": "chiara@example.com"}
    })
}

#[tokio::test]
async fn test_send_emails_delivers_existing_chain() {
    let server = create_test_server();
    let request = json_request(
        "/send-emails",
        json!({"chain": delivery_chain(), "host_email": "host@example.com"}),
    );

    let (status, body) = send(&server, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Emails sent successfully");
    assert_eq!(body["players_notified"], 3);
    assert_eq!(body["host_notified"], true);

    let sent = server.mailer.sent();
    let alice = sent.iter().find(|m| m.to == "alice@example.com").unwrap();
    assert!(alice.html_body.contains("Bruno"));
}

#[tokio::test]
async fn test_deliver_rejects_broken_chain() {
    let server = create_test_server();
    let chain = json!({
        "A": {"target_name": "B", "target_email": "b@example.com", "player_email": "a@example.com"},
        "B": {"target_name": "A", "target_email": "a@example.com", "player_email": "b@example.com"},
        "C": {"target_name": "D", "target_email": "d@example.com", "player_email": "c@example.com"},
        "D": {"target_name": "C", "target_email": "c@example.com", "player_email": "d@example.com"}
    });
    let request = json_request(
        "/api/v1/chains/deliver",
        json!({"chain": chain, "host_email": "host@example.com"}),
    );

    let (status, _) = send(&server, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(server.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_deliver_requires_all_data() {
    let server = create_test_server();
    let request = json_request("/send-emails", json!({"chain": delivery_chain()}));

    let (status, body) = send(&server, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required data");
}

// ============================================================================
// Check-in Tests
// ============================================================================

#[tokio::test]
async fn test_check_in_is_stored_listed_and_served() {
    let server = create_test_server();
    let request = Form::default()
        .text("name", "Alice")
        .file("selfie", "me.png", "image/png", b"not really a png")
        .into_request("/api/v1/check-ins");

    let (status, body) = send(&server, request).await;

    assert_eq!(status, StatusCode::CREATED);
    let image_url = body["checkIn"]["image_url"].as_str().unwrap().to_string();
    assert!(image_url.starts_with("/uploads/"));
    assert!(image_url.ends_with(".png"));

    let (status, list) = send(&server, get("/check-ins")).await;
    assert_eq!(status, StatusCode::OK);
    let check_ins = list["checkIns"].as_array().unwrap();
    assert_eq!(check_ins.len(), 1);
    assert_eq!(check_ins[0]["name"], "Alice");

    let response = server.app.clone().oneshot(get(&image_url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"not really a png");
}

#[tokio::test]
async fn test_check_in_rejects_invalid_submissions() {
    let server = create_test_server();

    let not_image = Form::default()
        .text("name", "Alice")
        .file("selfie", "notes.txt", "text/plain", b"hello")
        .into_request("/check-in");
    let (status, _) = send(&server, not_image).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let no_selfie = Form::default()
        .text("name", "Alice")
        .into_request("/api/v1/check-ins");
    let (status, body) = send(&server, no_selfie).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Selfie is required");

    let blank_name = Form::default()
        .text("name", "  ")
        .file("selfie", "me.jpg", "image/jpeg", b"jpeg")
        .into_request("/api/v1/check-ins");
    let (status, _) = send(&server, blank_name).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = send(&server, get("/api/v1/check-ins")).await;
    assert!(list["checkIns"].as_array().unwrap().is_empty());
}

// ============================================================================
// Middleware Tests
// ============================================================================

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let server = create_test_server();

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me-123")
        .body(Body::empty())
        .unwrap();
    let response = server.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-me-123");

    let response = server.app.clone().oneshot(get("/health")).await.unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}

#[tokio::test]
async fn test_cors_allows_configured_origins_only() {
    let server = create_test_server();

    for origin in ["http://localhost:5173", "https://assassin-web.vercel.app"] {
        let request = Request::builder()
            .uri("/api/test")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();
        let response = server.app.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            origin
        );
    }

    let request = Request::builder()
        .uri("/api/test")
        .header(header::ORIGIN, "https://evil.example.com")
        .body(Body::empty())
        .unwrap();
    let response = server.app.clone().oneshot(request).await.unwrap();
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

// ============================================================================
// Metrics Tests
// ============================================================================

/// Run `f` on a single-threaded runtime with a Prometheus recorder installed
/// for this thread only, and return the rendered exposition.
fn render_metrics_of<F, Fut>(f: F) -> String
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    metrics::with_local_recorder(&recorder, || runtime.block_on(f()));
    handle.render()
}

fn series<'a>(rendered: &'a str, name: &str) -> Vec<&'a str> {
    rendered
        .lines()
        .filter(|line| line.starts_with(&format!("{name}{{")))
        .collect()
}

#[test]
fn test_http_metrics_use_route_templates() {
    let rendered = render_metrics_of(|| async {
        let server = create_test_server();
        for i in 0..50 {
            let response = server
                .app
                .clone()
                .oneshot(get(&format!("/scan/{i}")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
        for _ in 0..3 {
            send(&server, get("/health")).await;
        }
    });

    let requests = series(&rendered, "http_requests_total");
    assert_eq!(requests.len(), 2, "{rendered}");
    assert!(
        requests
            .iter()
            .any(|l| l.contains(r#"path="unmatched""#) && l.ends_with(" 50"))
    );
    assert!(
        requests
            .iter()
            .any(|l| l.contains(r#"path="/health""#) && l.ends_with(" 3"))
    );
}

#[test]
fn test_partial_batch_counts_sent_and_failed_mail() {
    let rendered = render_metrics_of(|| async {
        let server = create_test_server_with(RecordingMailer {
            fail_for: Some("bruno@example.com".to_string()),
            ..RecordingMailer::default()
        });
        let request = Form::default()
            .roster(ROSTER)
            .text("host_email", "host@example.com")
            .into_request("/generate");
        let (status, _) = send(&server, request).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    });

    let mails = series(&rendered, "target_emails_total");
    assert!(
        mails
            .iter()
            .any(|l| l.contains(r#"success="true""#) && l.ends_with(" 1")),
        "{rendered}"
    );
    assert!(
        mails
            .iter()
            .any(|l| l.contains(r#"success="false""#) && l.ends_with(" 1")),
        "{rendered}"
    );
}
