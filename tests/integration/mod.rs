//! Integration tests for the HogQL runner.
//!
//! Each test starts its own stub query endpoint on an ephemeral port.

pub mod client_test;
pub mod executor_test;
pub mod explorer_test;
pub mod render_test;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use hogql_runner::credentials::CredentialSources;
use serde_json::Value;

/// A request as seen by the stub endpoint.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub project_id: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Stub of `POST /api/projects/{id}/query` answering with a fixed response.
pub struct StubServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    /// Starts a stub that answers every query with `status` and the raw `body`.
    pub async fn start(status: u16, body: impl Into<String>) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.into(),
            hits: Arc::clone(&hits),
            requests: Arc::clone(&requests),
        };

        let app = Router::new()
            .route("/api/projects/{project_id}/query", post(handle_query))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            hits,
            requests,
        }
    }

    /// Starts a stub answering 200 with the given JSON body.
    pub async fn json(body: Value) -> Self {
        Self::start(200, body.to_string()).await
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Credential sources pointing at this stub with override-tier values.
    pub fn sources(&self) -> CredentialSources {
        CredentialSources {
            override_api_key: Some("phx_test_key".to_string()),
            override_project_id: Some("4242".to_string()),
            api_url: Some(format!("{}/", self.base_url)),
            ..Default::default()
        }
    }
}

async fn handle_query(
    State(state): State<StubState>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    state.requests.lock().unwrap().push(RecordedRequest {
        project_id,
        authorization,
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });
    (state.status, state.body.clone())
}
