//! End-to-end tests: real WebSocket clients subscribed to `/ws/records/`
//! while intakes are submitted over HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use intake_core::RECORDS_TOPIC;
use intake_web::{AppState, ServerConfig};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

struct TestServer {
    addr: SocketAddr,
    state: AppState,
    _dir: tempfile::TempDir,
}

impl TestServer {
    async fn boot() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            port: 0,
            db_path: dir.path().join("intake.db"),
            media_dir: dir.path().join("media"),
            ..ServerConfig::default()
        };
        let state = intake_web::build_state(config).await.unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(intake_web::serve(listener, state.clone()));
        Self {
            addr,
            state,
            _dir: dir,
        }
    }

    async fn connect(&self) -> WsStream {
        let (ws, _) = connect_async(format!("ws://{}/ws/records/", self.addr))
            .await
            .unwrap();
        ws
    }

    async fn wait_for_subscribers(&self, expected: usize) {
        timeout(TIMEOUT, async {
            while self.state.registry.member_count(RECORDS_TOPIC).await != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("never reached {expected} subscribers"));
    }

    async fn submit(&self, form: Form) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("http://{}/records/create/", self.addr))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }

    async fn fetch(&self, url: &str) -> Vec<u8> {
        reqwest::get(format!("http://{}{}", self.addr, url))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap()
            .to_vec()
    }
}

async fn next_event(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn assert_silent(ws: &mut WsStream) {
    let res = timeout(Duration::from_millis(200), ws.next()).await;
    assert!(res.is_err(), "unexpected frame: {res:?}");
}

fn photo(name: &str, bytes: &'static [u8]) -> Part {
    Part::bytes(bytes).file_name(name.to_string())
}

#[tokio::test]
async fn intake_reaches_every_dashboard() {
    let server = TestServer::boot().await;
    let mut a = server.connect().await;
    let mut b = server.connect().await;
    server.wait_for_subscribers(2).await;

    let form = Form::new()
        .text("client_name", "Acme")
        .text("vci_serial", "VCI-001")
        .part("photos", photo("first.jpg", b"photo-one"))
        .part("photos", photo("second.jpg", b"photo-two"));
    let response = server.submit(form).await;
    assert_eq!(response.status(), 200);
    let created: Value = response.json().await.unwrap();

    for ws in [&mut a, &mut b] {
        let event = next_event(ws).await;
        assert_eq!(event["type"], "record.created");
        assert_eq!(event["data"]["client_name"], "Acme");
        assert_eq!(event["data"]["vci_serial"], "VCI-001");
        assert_eq!(event["data"], created);
        assert_silent(ws).await;
    }

    // Newest upload first.
    let photos = created["photos"].as_array().unwrap();
    assert_eq!(photos.len(), 2);
    assert_eq!(server.fetch(photos[0].as_str().unwrap()).await, b"photo-two");
    assert_eq!(server.fetch(photos[1].as_str().unwrap()).await, b"photo-one");
}

#[tokio::test]
async fn closed_dashboard_is_skipped() {
    let server = TestServer::boot().await;
    let mut a = server.connect().await;
    let mut c = server.connect().await;
    server.wait_for_subscribers(2).await;

    c.close(None).await.unwrap();
    server.wait_for_subscribers(1).await;

    let response = server.submit(Form::new().text("client_name", "Globex")).await;
    assert_eq!(response.status(), 200);

    let event = next_event(&mut a).await;
    assert_eq!(event["data"]["client_name"], "Globex");
    assert_eq!(server.state.registry.member_count(RECORDS_TOPIC).await, 1);
}

#[tokio::test]
async fn rejected_intake_is_not_broadcast() {
    let server = TestServer::boot().await;
    let mut a = server.connect().await;
    server.wait_for_subscribers(1).await;

    let response = server
        .submit(Form::new().text("client_name", "").text("vci_serial", "VCI-404"))
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["errors"]["client_name"].is_array());

    assert_silent(&mut a).await;
}

#[tokio::test]
async fn client_frames_do_not_publish() {
    let server = TestServer::boot().await;
    let mut a = server.connect().await;
    let mut b = server.connect().await;
    server.wait_for_subscribers(2).await;

    a.send(Message::Text(r#"{"type":"record.created","data":{}}"#.into()))
        .await
        .unwrap();
    assert_silent(&mut b).await;
    assert_eq!(server.state.registry.member_count(RECORDS_TOPIC).await, 2);
}

#[tokio::test]
async fn late_subscriber_only_sees_later_events() {
    let server = TestServer::boot().await;
    let mut early = server.connect().await;
    server.wait_for_subscribers(1).await;

    server.submit(Form::new().text("client_name", "First")).await;
    assert_eq!(next_event(&mut early).await["data"]["client_name"], "First");

    let mut late = server.connect().await;
    server.wait_for_subscribers(2).await;
    server.submit(Form::new().text("client_name", "Second")).await;

    assert_eq!(next_event(&mut early).await["data"]["client_name"], "Second");
    assert_eq!(next_event(&mut late).await["data"]["client_name"], "Second");
}
