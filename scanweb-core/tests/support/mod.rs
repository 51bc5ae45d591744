//! Local stand-ins for the scan target and the summarization endpoint.

#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    body::Body,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::Value;

pub async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

/// A page served at `/` (and any query string) with fixed headers and body.
#[derive(Debug, Clone)]
pub struct TargetSite {
    pub addr: SocketAddr,
    /// `user-agent` of every request received.
    pub user_agents: Arc<Mutex<Vec<String>>>,
}

impl TargetSite {
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }
}

pub async fn target_site(
    headers: &'static [(&'static str, &'static str)],
    body: &'static str,
    delay: Duration,
) -> TargetSite {
    let user_agents = Arc::new(Mutex::new(Vec::new()));
    let seen = user_agents.clone();
    let app = Router::new().route(
        "/",
        get(move |request_headers: HeaderMap| {
            let seen = seen.clone();
            async move {
                if let Some(agent) = request_headers
                    .get("user-agent")
                    .and_then(|v| v.to_str().ok())
                {
                    seen.lock().unwrap().push(agent.to_string());
                }
                tokio::time::sleep(delay).await;

                let mut response = Response::builder().status(StatusCode::OK);
                for (name, value) in headers {
                    response = response.header(*name, *value);
                }
                response.body(Body::from(body)).unwrap()
            }
        }),
    );

    TargetSite {
        addr: spawn(app).await,
        user_agents,
    }
}

/// Fake summarization endpoint answering every POST with `status` and
/// `reply`, after `delay`.
#[derive(Debug, Clone)]
pub struct FakeSummarizer {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeSummarizer {
    pub fn endpoint(&self) -> String {
        format!("http://{}/", self.addr)
    }
}

pub async fn summarizer(
    status: StatusCode,
    reply: &'static str,
    delay: Duration,
) -> FakeSummarizer {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();
    let app = Router::new().route(
        "/",
        post(move |Json(body): Json<Value>| {
            let seen = seen.clone();
            async move {
                seen.lock().unwrap().push(body);
                tokio::time::sleep(delay).await;
                (
                    status,
                    [("content-type", "application/json")],
                    reply,
                )
                    .into_response()
            }
        }),
    );

    FakeSummarizer {
        addr: spawn(app).await,
        requests,
    }
}
