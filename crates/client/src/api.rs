use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::controller::SubmissionRequest;
use crate::error::ApiError;
use crate::task::TaskSnapshot;

/// Storage paths advertised by `GET /api/config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub default_path: Option<String>,
    #[serde(default)]
    pub alt_path: Option<String>,
}

/// Success body of `POST /api/download`. The id may still be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DownloadAccepted {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// The backend job API as seen by the client.
#[async_trait]
pub trait JobApi: Send + Sync {
    async fn fetch_config(&self) -> Result<RemoteConfig, ApiError>;

    async fn create_download(
        &self,
        request: &SubmissionRequest,
    ) -> Result<DownloadAccepted, ApiError>;

    async fn fetch_status(&self, task_id: &str) -> Result<TaskSnapshot, ApiError>;
}

/// `JobApi` over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpJobApi {
    client: Client,
    base_url: Url,
}

impl HttpJobApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.server_url)
            .with_context(|| format!("Invalid server URL: {}", config.server_url))?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Turn a non-success response into `ApiError::Status`, keeping the
/// server's `error` message when the body carries one.
async fn status_error(response: Response) -> ApiError {
    let code = response.status().as_u16();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .filter(|m| !m.is_empty());
    ApiError::Status { code, message }
}

#[async_trait]
impl JobApi for HttpJobApi {
    async fn fetch_config(&self) -> Result<RemoteConfig, ApiError> {
        let url = self.endpoint(&["api", "config"])?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.json::<RemoteConfig>().await?)
    }

    async fn create_download(
        &self,
        request: &SubmissionRequest,
    ) -> Result<DownloadAccepted, ApiError> {
        let url = self.endpoint(&["api", "download"])?;
        tracing::debug!("POST {} ({} {})", url, request.format, request.quality);

        let response = self.client.post(url).json(request).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.json::<DownloadAccepted>().await?)
    }

    async fn fetch_status(&self, task_id: &str) -> Result<TaskSnapshot, ApiError> {
        let url = self.endpoint(&["api", "status", task_id])?;

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body = response.text().await?;
        TaskSnapshot::from_json(&body)
    }
}
