//! Throwaway HTTP server for exercising the reqwest-based clients.

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header::CONTENT_TYPE},
    response::IntoResponse,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

#[derive(Debug)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path and query, e.g. `/api/v2/write?org=o`.
    pub uri: String,
    pub headers: HeaderMap,
    pub body: String,
}

pub struct OneShotServer {
    pub base_url: String,
    request: oneshot::Receiver<RecordedRequest>,
}

impl OneShotServer {
    /// The first request the server answered.
    pub async fn request(self) -> RecordedRequest {
        self.request.await.unwrap()
    }
}

#[derive(Clone)]
struct Reply {
    status: StatusCode,
    body: String,
    recorder: Arc<Mutex<Option<oneshot::Sender<RecordedRequest>>>>,
}

async fn record(
    State(reply): State<Reply>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    if let Some(tx) = reply.recorder.lock().unwrap().take() {
        let _ = tx.send(RecordedRequest {
            method,
            uri: uri.to_string(),
            headers,
            body,
        });
    }

    (
        reply.status,
        [(CONTENT_TYPE, "application/json")],
        reply.body,
    )
}

/// Answers every request with `status` and `body`, recording the first one.
pub async fn serve_once(status: StatusCode, body: &str) -> OneShotServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    let app = Router::new().fallback(record).with_state(Reply {
        status,
        body: body.to_string(),
        recorder: Arc::new(Mutex::new(Some(tx))),
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    OneShotServer {
        base_url: format!("http://{addr}"),
        request: rx,
    }
}
