//! Local stand-in for the Google Books volumes endpoint
//!
//! Serves canned replies keyed by the `q` parameter and records every
//! request's query parameters. Unknown queries get an empty result set.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bookclub_catalog::BooksClient;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const VOLUMES_PATH: &str = "/books/v1/volumes";

/// Canned reply for one query
#[derive(Debug, Clone)]
pub enum StubReply {
    Json(Value),
    Status(u16),
    /// Body served as text/plain with status 200
    Raw(String),
    /// Wait before answering with an empty result set
    Slow(Duration),
}

type RequestLog = Arc<Mutex<Vec<HashMap<String, String>>>>;

#[derive(Clone)]
struct StubState {
    replies: Arc<HashMap<String, StubReply>>,
    requests: RequestLog,
}

pub struct StubBooksApi {
    pub base_url: String,
    requests: RequestLog,
}

impl StubBooksApi {
    /// Start the stub on an ephemeral port
    pub async fn start(replies: Vec<(&str, StubReply)>) -> Self {
        let requests: RequestLog = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            replies: Arc::new(
                replies
                    .into_iter()
                    .map(|(q, reply)| (q.to_string(), reply))
                    .collect(),
            ),
            requests: requests.clone(),
        };

        let app = Router::new()
            .route(VOLUMES_PATH, get(volumes))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}{}", addr, VOLUMES_PATH),
            requests,
        }
    }

    /// Client pointed at this stub
    pub fn client(&self, timeout: Duration, api_key: Option<&str>) -> BooksClient {
        BooksClient::with_base_url(&self.base_url, timeout, api_key.map(str::to_string)).unwrap()
    }

    /// Query parameters of every request received so far
    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.requests.lock().unwrap().clone()
    }
}

async fn volumes(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.requests.lock().unwrap().push(params.clone());

    let q = params.get("q").cloned().unwrap_or_default();

    match state.replies.get(&q) {
        Some(StubReply::Json(body)) => Json(body.clone()).into_response(),
        Some(StubReply::Status(code)) => StatusCode::from_u16(*code).unwrap().into_response(),
        Some(StubReply::Raw(body)) => body.clone().into_response(),
        Some(StubReply::Slow(delay)) => {
            tokio::time::sleep(*delay).await;
            Json(json!({ "kind": "books#volumes", "totalItems": 0 })).into_response()
        }
        None => Json(json!({ "kind": "books#volumes", "totalItems": 0 })).into_response(),
    }
}

/// Single-volume search result
pub fn volume(title: &str, authors: &[&str], identifiers: &[(&str, &str)]) -> Value {
    let identifiers: Vec<Value> = identifiers
        .iter()
        .map(|(kind, id)| json!({ "type": kind, "identifier": id }))
        .collect();

    json!({
        "kind": "books#volumes",
        "totalItems": 1,
        "items": [{
            "kind": "books#volume",
            "volumeInfo": {
                "title": title,
                "authors": authors,
                "industryIdentifiers": identifiers
            }
        }]
    })
}

pub fn east_of_eden() -> Value {
    volume(
        "East of Eden",
        &["John Steinbeck"],
        &[("ISBN_10", "0670033049"), ("ISBN_13", "9780670033041")],
    )
}
