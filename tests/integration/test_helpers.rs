//! Shared helpers for integration tests: a scripted fake API endpoint and
//! service settings pointing at it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use tokio::sync::mpsc;

use playerdb_relay::dispatch::builder::payload_field;
use playerdb_relay::dispatch::Transport;
use playerdb_relay::models::outcome::JobId;
use playerdb_relay::host::HostAction;
use playerdb_relay::models::session::{SessionRecord, SessionRef};
use playerdb_relay::service::ServiceSettings;

pub const PERMISSION: &str = "playerlookup";

/// Lines of each kind in a `flood` response; together they exceed the
/// outbound queue capacity.
pub const FLOOD_LINES: usize = 300;

pub fn flood_body() -> String {
    let mut body = String::new();
    for n in 0..FLOOD_LINES {
        body.push_str(&format!("ERROR: diag {n}\n"));
    }
    for n in 0..FLOOD_LINES {
        body.push_str(&format!("row {n}\n"));
    }
    body
}

/// What the fake endpoint has seen.
#[derive(Clone, Default)]
pub struct Endpoint {
    pub bodies: Arc<Mutex<Vec<String>>>,
    pub content_types: Arc<Mutex<Vec<String>>>,
    active: Arc<AtomicUsize>,
    pub max_active: Arc<AtomicUsize>,
}

impl Endpoint {
    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }

    /// `query`/`callsign` field of every request received, in order.
    pub fn subjects(&self) -> Vec<String> {
        self.bodies()
            .iter()
            .map(|b| {
                payload_field(b, "query")
                    .or_else(|| payload_field(b, "callsign"))
                    .unwrap_or_default()
            })
            .collect()
    }
}

/// Scripted responses keyed on the `query` (or `callsign`) field:
///
/// - `slow`   → sleeps 3 s before answering (trips client timeouts)
/// - `delay`  → sleeps 200 ms, then answers `Result for delay`
/// - `boom`   → HTTP 500
/// - `Bob`    → `ERROR: not found\nHello Bob\n`
/// - `flood`  → `FLOOD_LINES` diagnostics followed by `FLOOD_LINES` replies
/// - anything else → `Result for <subject>\n` after a 20 ms pause
async fn api(State(endpoint): State<Endpoint>, headers: HeaderMap, body: String) -> (StatusCode, String) {
    let now_active = endpoint.active.fetch_add(1, Ordering::SeqCst) + 1;
    endpoint.max_active.fetch_max(now_active, Ordering::SeqCst);
    endpoint.bodies.lock().unwrap().push(body.clone());
    if let Some(ct) = headers.get("content-type").and_then(|v| v.to_str().ok()) {
        endpoint.content_types.lock().unwrap().push(ct.to_owned());
    }

    let subject = payload_field(&body, "query")
        .or_else(|| payload_field(&body, "callsign"))
        .unwrap_or_default();

    let response = match subject.as_str() {
        "slow" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            (StatusCode::OK, "too late\n".to_owned())
        }
        "delay" => {
            tokio::time::sleep(Duration::from_millis(200)).await;
            (StatusCode::OK, "Result for delay\n".to_owned())
        }
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, "kaput".to_owned()),
        "Bob" => (StatusCode::OK, "ERROR: not found\nHello Bob\n".to_owned()),
        "flood" => (StatusCode::OK, flood_body()),
        other => {
            tokio::time::sleep(Duration::from_millis(20)).await;
            (StatusCode::OK, format!("Result for {other}\n"))
        }
    };

    endpoint.active.fetch_sub(1, Ordering::SeqCst);
    response
}

/// Start the fake endpoint on an ephemeral port; returns its URL.
pub async fn spawn_endpoint() -> (String, Endpoint) {
    let endpoint = Endpoint::default();
    let app = Router::new()
        .route("/api", post(api))
        .with_state(endpoint.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{addr}/api"), endpoint)
}

pub fn settings(url: &str, timeout: Duration) -> ServiceSettings {
    ServiceSettings {
        endpoint: Some(url.to_owned()),
        api_key: "K".to_owned(),
        timeout,
        lookup_permission: Some(PERMISSION.to_owned()),
    }
}

pub fn player(session: u32, callsign: &str, bzid: &str, permitted: bool) -> SessionRecord {
    SessionRecord {
        session: SessionRef(session),
        callsign: callsign.to_owned(),
        bzid: bzid.to_owned(),
        ipaddress: "10.0.0.7".to_owned(),
        build: "2.4.26".to_owned(),
        verified: true,
        permissions: if permitted {
            vec![PERMISSION.to_owned()]
        } else {
            Vec::new()
        },
    }
}

/// Receive the next outbound action or fail after 5 s.
pub async fn next_action(rx: &mut mpsc::Receiver<HostAction>) -> HostAction {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("action within timeout")
        .expect("outbound channel open")
}

/// Wait until the endpoint has received `count` requests.
pub async fn wait_for_requests(endpoint: &Endpoint, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while endpoint.bodies().len() < count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("endpoint received requests in time");
}

/// Transport that forwards every submitted job to the test, which answers
/// it by hand on the service's transport channel.
pub struct ChannelTransport {
    pub jobs: mpsc::UnboundedSender<(JobId, String)>,
}

impl Transport for ChannelTransport {
    fn submit(&mut self, job: JobId, payload: String) {
        let _ = self.jobs.send((job, payload));
    }
}
