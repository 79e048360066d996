#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{extract::State, routing::post, Json, Router};
use rain_relay::{
    aggregator::{run_ingestion, StatusStore},
    http_server::{self, ApiState},
    oracle::HttpOracle,
    telemetry::{Channel, TelemetryMessage},
};
use reqwest::Client;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::mpsc, task};
use url::Url;

pub const TRIGGER: &str = "Raining";
pub const ORACLE_TIMEOUT: Duration = Duration::from_millis(300);

async fn bind_local() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get address");
    (listener, addr)
}

#[derive(Default)]
pub struct OracleState {
    pub slow: AtomicBool,
    pub requests: Mutex<Vec<Value>>,
    pub body: Mutex<Option<Value>>,
}

/// Stand-in prediction service; answers after a long delay while `slow` is set.
pub struct MockOracle {
    pub url: Url,
    pub state: Arc<OracleState>,
    handle: task::JoinHandle<()>,
}

async fn mock_predict(State(state): State<Arc<OracleState>>, Json(body): Json<Value>) -> Json<Value> {
    state.requests.lock().unwrap().push(body);
    if state.slow.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
    let body = state.body.lock().unwrap().clone();
    Json(body.unwrap_or_else(|| {
        json!({
            "predicted_remaining_minutes": 12.5,
            "confidence": "high",
        })
    }))
}

impl MockOracle {
    pub async fn start() -> Self {
        let (listener, addr) = bind_local().await;
        let state = Arc::new(OracleState::default());
        let app = Router::new()
            .route("/ai-predict", post(mock_predict))
            .with_state(state.clone());

        let handle = task::spawn(async move {
            axum::serve(listener, app).await.expect("Mock oracle failed");
        });

        let url = Url::parse(&format!("http://{}/ai-predict", addr)).unwrap();
        Self { url, state, handle }
    }

    pub fn set_slow(&self, slow: bool) {
        self.state.slow.store(slow, Ordering::SeqCst);
    }

    /// Answer every later request with `body` instead of the default prediction
    pub fn set_body(&self, body: Value) {
        *self.state.body.lock().unwrap() = Some(body);
    }

    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for MockOracle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Relay facade backed by a live ingestion task, without a broker.
pub struct TestRelay {
    pub address: SocketAddr,
    pub store: StatusStore,
    pub client: Client,
    tx: mpsc::Sender<TelemetryMessage>,
    server_handle: task::JoinHandle<()>,
    ingestion_handle: task::JoinHandle<()>,
}

impl TestRelay {
    pub async fn start(oracle_url: Url) -> Self {
        let store = StatusStore::new();
        let (tx, rx) = mpsc::channel(64);
        let ingestion_handle =
            task::spawn(run_ingestion(rx, store.clone(), TRIGGER.to_string()));

        let oracle = HttpOracle::new(oracle_url, ORACLE_TIMEOUT).expect("Failed to build oracle");
        let state = ApiState {
            store: store.clone(),
            oracle: Arc::new(oracle),
        };

        let (listener, address) = bind_local().await;
        let server_handle = task::spawn(async move {
            http_server::serve(listener, state).await.expect("Relay server failed");
        });

        Self {
            address,
            store,
            client: Client::new(),
            tx,
            server_handle,
            ingestion_handle,
        }
    }

    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.address)).unwrap()
    }

    /// Publish messages as the broker would, then let ingestion catch up
    pub async fn publish(&self, messages: &[(Channel, &str)]) {
        for (channel, payload) in messages {
            self.tx
                .send(TelemetryMessage::new(*channel, *payload))
                .await
                .expect("Ingestion task stopped");
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("http://{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to send GET request")
    }

    pub async fn post(&self, path: &str) -> reqwest::Response {
        self.client
            .post(format!("http://{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to send POST request")
    }

    pub async fn status_json(&self) -> Value {
        let resp = self.get("/status").await;
        assert_eq!(resp.status(), 200);
        resp.json().await.expect("Failed to parse JSON")
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.server_handle.abort();
        self.ingestion_handle.abort();
    }
}
