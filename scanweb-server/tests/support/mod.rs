//! Test harness: an in-memory app plus local stand-ins for the scan target
//! and the summarization endpoint.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Result, anyhow};
use axum::{
    Json, Router,
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_test::TestServer;
use scanweb_config::{
    Config, ConfigMetadata, CorsConfig, DatabaseConfig, ScannerConfig,
    ServerConfig, SubmitMode, SummarizerConfig,
};
use scanweb_core::{
    database::{InMemoryPrincipalResolver, InMemoryScanRepository},
    model::OwnerId,
};
use scanweb_server::{
    AppState, create_app,
    infra::wiring::{StoreBackend, build_state},
};
use serde_json::Value;
use uuid::Uuid;

pub async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

/// Serve a page at `/` with fixed headers and body; returns its URL.
pub async fn target_site(
    headers: &'static [(&'static str, &'static str)],
    body: &'static str,
) -> String {
    let app = Router::new().route(
        "/",
        get(move || async move {
            let mut response = Response::builder().status(StatusCode::OK);
            for (name, value) in headers {
                response = response.header(*name, *value);
            }
            response.body(Body::from(body)).unwrap()
        }),
    );
    format!("http://{}/", spawn(app).await)
}

/// A URL nothing listens on.
pub async fn closed_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/")
}

/// Summarization endpoint answering every POST with `status` and `reply`.
pub async fn summarizer(status: StatusCode, reply: &'static str) -> String {
    let app = Router::new().route(
        "/",
        post(move |Json(_body): Json<Value>| async move {
            (status, [("content-type", "application/json")], reply).into_response()
        }),
    );
    format!("http://{}/", spawn(app).await)
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub owner: OwnerId,
    pub token: String,
    /// A second principal, for ownership checks.
    pub other_token: String,
}

impl TestApp {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn other_bearer(&self) -> String {
        format!("Bearer {}", self.other_token)
    }
}

pub fn test_config(submit_mode: SubmitMode, summarizer_endpoint: String) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig::default(),
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
        dev_mode: true,
        scanner: ScannerConfig {
            probe_timeout: Duration::from_secs(2),
            probe_deadline: Some(Duration::from_secs(3)),
            min_duration: None,
            submit_mode,
            ..ScannerConfig::default()
        },
        summarizer: SummarizerConfig {
            endpoint: summarizer_endpoint,
            timeout: Some(Duration::from_secs(2)),
        },
        metadata: ConfigMetadata::default(),
    }
}

pub async fn build_test_app(config: Config) -> Result<TestApp> {
    let principals = InMemoryPrincipalResolver::new();
    let owner = OwnerId(Uuid::new_v4());
    let token = principals.issue(owner).await;
    let other_token = principals.issue(OwnerId(Uuid::new_v4())).await;

    let backend = StoreBackend {
        scans: Arc::new(InMemoryScanRepository::new()),
        principals: Arc::new(principals),
        postgres: None,
    };
    let state = build_state(Arc::new(config), backend)?;
    let server = TestServer::new(create_app(state.clone()))
        .map_err(|err| anyhow!(err.to_string()))?;

    Ok(TestApp {
        server,
        state,
        owner,
        token,
        other_token,
    })
}
