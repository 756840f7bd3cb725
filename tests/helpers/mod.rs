#![allow(dead_code)] // Test helpers appear unused when compiled independently

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Request, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tower::ServiceExt;

use netsuite_lead_relay::RelayConfig;
use netsuite_lead_relay::config::{
    CONSUMER_KEY, CONSUMER_SECRET, NETSUITE_ACCOUNT, NETSUITE_RESTLET_BASE_URL,
    RESTLET_DEPLOY_ID, RESTLET_SCRIPT_ID, TOKEN_ID, TOKEN_SECRET,
};

pub const RESTLET_PATH: &str = "/app/site/hosting/restlet.nl";
pub const ACCOUNT: &str = "1234567_SB1";

/// What the mock RESTlet saw for one request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Clone)]
struct RestletState {
    status: StatusCode,
    body: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct MockRestlet {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl MockRestlet {
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.handle.await;
    }
}

/// Best-effort check for whether binding to loopback is permitted in the current sandbox.
pub async fn can_bind_loopback() -> bool {
    match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => {
            drop(listener);
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => false,
        Err(_) => true, // treat other errors as non-fatal for skipping
    }
}

/// A loopback URL nothing is listening on.
pub async fn closed_restlet_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}{}", addr, RESTLET_PATH)
}

/// Spawn a RESTlet stand-in that answers every POST with `status` and `body`.
pub async fn spawn_mock_restlet(status: StatusCode, body: &str) -> MockRestlet {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = RestletState {
        status,
        body: body.to_string(),
        requests: requests.clone(),
    };

    let app = Router::new()
        .route(RESTLET_PATH, post(restlet))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock restlet listener");
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });
        if let Err(err) = server.await {
            eprintln!("mock restlet server error: {}", err);
        }
    });

    MockRestlet {
        base_url: format!("http://{}{}", addr, RESTLET_PATH),
        requests,
        shutdown_tx,
        handle,
    }
}

async fn restlet(
    State(state): State<RestletState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };
    state.requests.lock().await.push(RecordedRequest {
        query: uri.query().map(|q| q.to_string()),
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body,
    });

    (state.status, state.body.clone()).into_response()
}

/// Relay configuration pointed at `restlet_base_url`.
pub fn relay_config(restlet_base_url: &str) -> RelayConfig {
    let vars = [
        (NETSUITE_ACCOUNT, ACCOUNT),
        (CONSUMER_KEY, "ck_test"),
        (CONSUMER_SECRET, "cs_test"),
        (TOKEN_ID, "tk_test"),
        (TOKEN_SECRET, "ts_test"),
        (RESTLET_SCRIPT_ID, "customscript_lead"),
        (RESTLET_DEPLOY_ID, "1"),
        (NETSUITE_RESTLET_BASE_URL, restlet_base_url),
    ];
    RelayConfig::from_lookup(|name| {
        vars.iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.to_string())
    })
    .expect("test configuration is complete")
}

/// Drive `app` with one request and collect the response.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body)
}

pub fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/submitlead")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
