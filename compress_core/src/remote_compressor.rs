//! Remote Compression Service Client
//!
//! The hybrid path delegates to an external service behind the
//! `RemoteCompressor` trait so the engine can be exercised with stubs.
//! `HttpCompressor` is the production implementation: one multipart POST
//! per call, bounded by the timeout fixed at construction.

use anyhow::{bail, Context, Result};
use reqwest::blocking::{multipart, Client};
use std::time::Duration;

pub trait RemoteCompressor: Send + Sync {
    /// Compress `bytes` at the given quality. Errors are recoverable by the
    /// caller; the engine falls back to local encoding.
    fn compress(&self, bytes: &[u8], quality: u8) -> Result<Vec<u8>>;
}

pub struct HttpCompressor {
    client: Client,
    endpoint: String,
}

impl HttpCompressor {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl RemoteCompressor for HttpCompressor {
    fn compress(&self, bytes: &[u8], quality: u8) -> Result<Vec<u8>> {
        let part = multipart::Part::bytes(bytes.to_vec())
            .file_name("image")
            .mime_str("application/octet-stream")
            .context("Failed to build multipart body")?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("quality", quality.to_string());

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .context("Remote compression request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Remote compressor returned {}", status);
        }

        let body = response
            .bytes()
            .context("Failed to read remote compressor response")?;
        if body.is_empty() {
            bail!("Remote compressor returned an empty body");
        }
        Ok(body.to_vec())
    }
}
