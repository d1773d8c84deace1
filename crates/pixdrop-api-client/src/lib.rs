//! HTTP client for the Pixdrop backend.
//!
//! Provides the two upload transports (multipart through the backend, and
//! credentials-then-direct-to-storage), the transport selector, progress
//! reporting for request bodies, and the gallery loader. The orchestrator and
//! the CLI use these types directly.

pub mod backend;
pub mod direct;
pub mod error;
pub mod error_body;
pub mod gallery;
pub mod progress;
pub mod transport;

use anyhow::{Context, Result};
use pixdrop_core::ClientConfig;
use reqwest::Client;
use std::time::Duration;

/// HTTP client bound to the backend's base URL.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(
            config.api_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Raw client, for requests to absolute URLs such as the storage endpoint.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

pub use backend::BackendTransport;
pub use direct::{DirectStorageTransport, UploadCredentials};
pub use error::{GalleryError, TransportError};
pub use gallery::GallerySource;
pub use progress::ProgressReporter;
pub use transport::{TransportChoice, TransportSelector, UploadTransport};
