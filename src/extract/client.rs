use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::extract::types::{ExportFormat, ExtractionResult, HealthResponse, SelectedFile};
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use std::time::Duration;

const EXTRACT_ENDPOINT: &str = "/api/extract";
const HEALTH_ENDPOINT: &str = "/api/health";
const EXTRACT_FAILED: &str = "Failed to extract data from invoice";

/// HTTP boundary to the extraction backend.
///
/// A fresh `reqwest::Client` is built per call because every call runs
/// on its own short-lived runtime.
#[derive(Debug, Clone)]
pub struct ExtractionClient {
    base_url: String,
    timeout: Option<Duration>,
}

impl ExtractionClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.request_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn http_client(&self) -> ClientResult<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }

    pub async fn extract(&self, file: &SelectedFile) -> ClientResult<ExtractionResult> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)?;
        let form = Form::new().part("file", part);

        let url = self.build_url(EXTRACT_ENDPOINT);
        info!("Uploading '{}' ({} bytes) to {}", file.name, file.size(), url);

        let response = self
            .http_client()?
            .post(&url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Extraction failed with status {}: {}", status, body);
            return Err(ClientError::Request {
                status: status.as_u16(),
                message: EXTRACT_FAILED.to_string(),
            });
        }

        let result = response.json::<ExtractionResult>().await?;
        debug!("Extraction returned {:?}", result);
        Ok(result)
    }

    /// Asks the backend to render `result` and returns the file contents.
    pub async fn export(
        &self,
        result: &ExtractionResult,
        format: ExportFormat,
    ) -> ClientResult<Vec<u8>> {
        let url = self.build_url(format.endpoint());
        info!("Requesting {} export from {}", format.label(), url);

        let response = self
            .http_client()?
            .post(&url)
            .json(result)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} export failed with status {}", format.label(), status);
            return Err(ClientError::Request {
                status: status.as_u16(),
                message: format!("Failed to generate {}", format.label()),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        let url = self.build_url(HEALTH_ENDPOINT);
        let response = self.http_client()?.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Request {
                status: status.as_u16(),
                message: format!("Health check failed with status: {}", status),
            });
        }

        Ok(response.json::<HealthResponse>().await?)
    }
}
