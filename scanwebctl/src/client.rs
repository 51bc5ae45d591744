use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, header};
use scanweb_core::{
    api::routes::{utils::replace_param, v1},
    api_types::{
        ApiResponse, CreateScanRequest, ScanListResponse, SubmitScanRequest,
        SubmitScanResponse,
    },
    error::ScanError,
    poller::ScanSource,
};
use scanweb_model::{ScanId, ScanRecord, report_file_name};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server URL: {0}")]
    InvalidServer(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("server response is missing its payload")]
    MissingData,
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

/// A downloaded report and the file name the server suggested for it.
#[derive(Debug, Clone)]
pub struct ExportedReport {
    pub file_name: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    token: String,
}

impl ApiClient {
    pub fn new(server: &str, token: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(server, token, Duration::from_secs(30))
    }

    pub fn with_timeout(
        server: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let mut base = Url::parse(server)?;
        // Routes are joined relative to the base; a path prefix needs the
        // trailing slash to survive the join.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder()
            .user_agent(concat!("scanwebctl/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base,
            token: token.into(),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    pub async fn create_scan(&self, url: &str) -> Result<ScanRecord, ClientError> {
        let response = self
            .http
            .post(self.url(v1::scans::COLLECTION)?)
            .bearer_auth(&self.token)
            .json(&CreateScanRequest { url: url.to_string() })
            .send()
            .await?;
        unwrap_envelope(response).await
    }

    /// Start the pipeline. With a detached server this returns as soon as
    /// the run is spawned.
    pub async fn submit(
        &self,
        scan_id: ScanId,
        url: &str,
    ) -> Result<SubmitScanResponse, ClientError> {
        let response = self
            .http
            .post(self.url(v1::scans::SUBMIT)?)
            .bearer_auth(&self.token)
            .json(&SubmitScanRequest::new(scan_id, url))
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn get_scan(&self, scan_id: ScanId) -> Result<ScanRecord, ClientError> {
        let path = replace_param(v1::scans::ITEM, "{id}", scan_id.to_string());
        let response = self
            .http
            .get(self.url(&path)?)
            .bearer_auth(&self.token)
            .send()
            .await?;
        unwrap_envelope(response).await
    }

    pub async fn list_scans(&self) -> Result<ScanListResponse, ClientError> {
        let response = self
            .http
            .get(self.url(v1::scans::COLLECTION)?)
            .bearer_auth(&self.token)
            .send()
            .await?;
        unwrap_envelope(response).await
    }

    pub async fn export(&self, scan_id: ScanId) -> Result<ExportedReport, ClientError> {
        let path = replace_param(v1::scans::EXPORT, "{id}", scan_id.to_string());
        let response = self
            .http
            .get(self.url(&path)?)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = check_status(response).await?;

        let file_name = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(attachment_file_name)
            .unwrap_or_else(|| report_file_name(&scan_id));
        let body = response.text().await?;

        Ok(ExportedReport { file_name, body })
    }
}

#[async_trait]
impl ScanSource for ApiClient {
    async fn fetch_scan(&self, scan_id: ScanId) -> scanweb_core::Result<ScanRecord> {
        self.get_scan(scan_id).await.map_err(|err| {
            if err.is_not_found() {
                ScanError::NotFound(scan_id)
            } else {
                ScanError::Internal(err.to_string())
            }
        })
    }
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| {
            body.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or(text);
    debug!(%status, message = %message, "api error");
    Err(ClientError::Api { status, message })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    Ok(check_status(response).await?.json::<T>().await?)
}

async fn unwrap_envelope<T: DeserializeOwned>(
    response: Response,
) -> Result<T, ClientError> {
    read_json::<ApiResponse<T>>(response)
        .await?
        .data
        .ok_or(ClientError::MissingData)
}

/// `attachment; filename="x.json"` -> `x.json`
fn attachment_file_name(disposition: &str) -> Option<String> {
    disposition
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty() && !name.contains(['/', '\\']))
}
