//! HTTP client for the adna-server REST API.

use std::time::Duration;

use adna_core::{Certificate, RegistryStats, VerificationResult};
use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::exit_codes::{GENERAL_ERROR, INPUT_ERROR, NETWORK_ERROR};

/// Default server URL when neither `--server` nor `ADNA_SERVER` is set.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";

/// Non-success response from the server.
#[derive(Debug, thiserror::Error)]
#[error("server returned {status} {code}: {message}")]
pub struct ServerError {
    pub status: u16,
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Client errors are input problems; 5xx means the service is unavailable.
    pub fn exit_code(&self) -> i32 {
        match self.status {
            400..=499 => INPUT_ERROR,
            500..=599 => NETWORK_ERROR,
            _ => GENERAL_ERROR,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

/// Body of a successful revocation.
#[derive(Debug, Deserialize)]
pub struct RevokeResponse {
    pub success: bool,
    pub message: String,
    pub dna: String,
}

pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn file_form(data: Vec<u8>, file_name: &str, mime_type: &str) -> Result<Form> {
        let part = Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .context("Invalid MIME type")?;
        Ok(Form::new().part("file", part))
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        debug!(status = %status, url = %response.url(), "Server response");

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .context("Failed to decode server response");
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(err) => (err.code, err.error),
            Err(_) => ("UNKNOWN".to_string(), body),
        };

        Err(ServerError {
            status: status.as_u16(),
            code,
            message,
        }
        .into())
    }

    /// POST /generate-dna
    pub async fn issue(&self, data: Vec<u8>, file_name: &str, mime_type: &str) -> Result<Certificate> {
        let response = self
            .http
            .post(self.url("/generate-dna"))
            .multipart(Self::file_form(data, file_name, mime_type)?)
            .send()
            .await
            .with_context(|| format!("Failed to reach server at {}", self.base))?;
        Self::decode(response).await
    }

    /// POST /verify
    pub async fn verify(
        &self,
        data: Vec<u8>,
        file_name: &str,
        mime_type: &str,
    ) -> Result<VerificationResult> {
        let response = self
            .http
            .post(self.url("/verify"))
            .multipart(Self::file_form(data, file_name, mime_type)?)
            .send()
            .await
            .with_context(|| format!("Failed to reach server at {}", self.base))?;
        Self::decode(response).await
    }

    /// GET /verify-dna?dna=
    pub async fn verify_dna(&self, dna: &str) -> Result<VerificationResult> {
        let response = self
            .http
            .get(self.url("/verify-dna"))
            .query(&[("dna", dna)])
            .send()
            .await
            .with_context(|| format!("Failed to reach server at {}", self.base))?;
        Self::decode(response).await
    }

    /// DELETE /remove-dna/{dna}
    pub async fn revoke(&self, dna: &str) -> Result<RevokeResponse> {
        let response = self
            .http
            .delete(self.url(&format!("/remove-dna/{}", dna)))
            .send()
            .await
            .with_context(|| format!("Failed to reach server at {}", self.base))?;
        Self::decode(response).await
    }

    /// GET /stats
    pub async fn stats(&self) -> Result<RegistryStats> {
        let response = self
            .http
            .get(self.url("/stats"))
            .send()
            .await
            .with_context(|| format!("Failed to reach server at {}", self.base))?;
        Self::decode(response).await
    }
}
