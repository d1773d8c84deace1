//! Direct-storage transport.
//!
//! Three steps, each depending on the previous one:
//! 1. authorize: fetch short-lived upload credentials from the backend,
//! 2. upload: send the raw bytes to the storage provider with those credentials,
//! 3. complete: ask the backend to register the stored object and return its URL.
//!
//! Only step 2 is cancellable mid-flight; steps 1 and 3 are treated as atomic.

use async_trait::async_trait;
use bytes::Bytes;
use pixdrop_core::constants::{DIRECT_AUTH_PATH, DIRECT_COMPLETE_PATH, OBJECT_NAME_HEADER};
use pixdrop_core::models::{
    UploadAuthRequest, UploadAuthResponse, UploadCompleteRequest, UploadCompleteResponse,
};
use pixdrop_core::{CandidateFile, TransportKind, UploadedImage};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::error_body::{describe_error_body, json_error_message};
use crate::progress::{progress_body, ProgressReporter};
use crate::transport::UploadTransport;
use crate::ApiClient;

/// Credentials for one upload attempt. Fetched fresh every time, never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCredentials {
    pub upload_url: String,
    /// Provider-assigned object name.
    pub object_name: String,
    /// Headers the provider requires on the upload request.
    pub headers: BTreeMap<String, String>,
}

impl UploadCredentials {
    fn from_response(response: UploadAuthResponse) -> Result<Self, TransportError> {
        if !response.success {
            return Err(TransportError::Auth(
                response
                    .error
                    .unwrap_or_else(|| "Upload authorization was refused".to_string()),
            ));
        }

        let upload_url = response
            .upload_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| TransportError::Auth("Response did not include an upload URL".to_string()))?;
        let object_name = response
            .b2_filename
            .filter(|n| !n.is_empty())
            .ok_or_else(|| TransportError::Auth("Response did not include an object name".to_string()))?;

        Ok(Self {
            upload_url,
            object_name,
            headers: response.headers,
        })
    }

    /// Provider headers plus the object-name, content-type and content-length headers.
    ///
    /// The object-name header is filled in from `object_name` when the
    /// provider headers omit it.
    pub fn request_headers(
        &self,
        media_type: &str,
        content_length: u64,
    ) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                TransportError::DirectUpload(format!("Invalid header name {}: {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                TransportError::DirectUpload(format!("Invalid value for header {}: {}", name, e))
            })?;
            headers.insert(name, value);
        }

        let object_header = HeaderName::from_static(OBJECT_NAME_HEADER);
        if !headers.contains_key(&object_header) {
            let encoded = urlencoding::encode(&self.object_name);
            let value = HeaderValue::from_str(&encoded).map_err(|e| {
                TransportError::DirectUpload(format!("Invalid object name: {}", e))
            })?;
            headers.insert(object_header, value);
        }

        if !headers.contains_key(CONTENT_TYPE) {
            if let Ok(value) = HeaderValue::from_str(media_type) {
                headers.insert(CONTENT_TYPE, value);
            }
        }

        headers.insert(CONTENT_LENGTH, HeaderValue::from(content_length));
        Ok(headers)
    }
}

/// Sends bytes straight to the storage provider using backend-issued credentials.
#[derive(Debug, Clone)]
pub struct DirectStorageTransport {
    client: ApiClient,
}

impl DirectStorageTransport {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Step 1: request upload credentials for `filename`.
    pub async fn authorize(&self, filename: &str) -> Result<UploadCredentials, TransportError> {
        let url = self.client.build_url(DIRECT_AUTH_PATH);
        let request = UploadAuthRequest {
            filename: filename.to_string(),
        };

        let response = self
            .client
            .client()
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Auth(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Auth(format!("Failed to read response: {}", e)))?;

        if status != StatusCode::OK {
            return Err(TransportError::Auth(
                json_error_message(&body).unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            ));
        }

        let parsed: UploadAuthResponse = serde_json::from_str(&body)
            .map_err(|e| TransportError::Auth(format!("Invalid response: {}", e)))?;

        let credentials = UploadCredentials::from_response(parsed)?;
        tracing::debug!(object_name = %credentials.object_name, "Upload credentials obtained");
        Ok(credentials)
    }

    /// Step 2: send the raw bytes to the provider.
    pub async fn send_object(
        &self,
        credentials: &UploadCredentials,
        file: &CandidateFile,
        data: Bytes,
        progress: ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<(), TransportError> {
        let headers = credentials.request_headers(file.media_type(), data.len() as u64)?;

        let request = self
            .client
            .client()
            .post(&credentials.upload_url)
            .headers(headers)
            .body(progress_body(data, progress))
            .send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransportError::Cancelled),
            response = request => response.map_err(|e| {
                TransportError::DirectUpload(format!(
                    "Could not reach the storage endpoint (it may be blocking cross-origin requests): {}",
                    e
                ))
            })?,
        };

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "Could not read storage error body");
                String::new()
            }
        };
        tracing::warn!(status = status.as_u16(), "Storage provider rejected the upload");
        Err(TransportError::DirectUpload(describe_error_body(status, &body)))
    }

    /// Step 3: register the stored object and obtain its public URL.
    pub async fn complete(
        &self,
        object_name: &str,
        original_filename: &str,
    ) -> Result<String, TransportError> {
        let url = self.client.build_url(DIRECT_COMPLETE_PATH);
        let request = UploadCompleteRequest {
            b2_filename: object_name.to_string(),
            original_filename: original_filename.to_string(),
        };

        let response = self
            .client
            .client()
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Registration(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Registration(format!("Failed to read response: {}", e)))?;

        if status != StatusCode::OK {
            return Err(TransportError::Registration(
                json_error_message(&body).unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            ));
        }

        let parsed: UploadCompleteResponse = serde_json::from_str(&body)
            .map_err(|e| TransportError::Registration(format!("Invalid response: {}", e)))?;

        parsed.url.filter(|u| !u.is_empty()).ok_or_else(|| {
            TransportError::Registration(
                parsed
                    .error
                    .unwrap_or_else(|| "Response did not include a URL".to_string()),
            )
        })
    }
}

#[async_trait]
impl UploadTransport for DirectStorageTransport {
    async fn upload(
        &self,
        file: &CandidateFile,
        data: Bytes,
        progress: ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<UploadedImage, TransportError> {
        let credentials = self.authorize(file.name()).await?;

        // Cancelled while authorizing: stop before any byte leaves.
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        self.send_object(&credentials, file, data, progress, cancel)
            .await?;
        tracing::debug!(object_name = %credentials.object_name, "Object stored, registering");

        let url = self.complete(&credentials.object_name, file.name()).await?;

        Ok(UploadedImage {
            url,
            filename: file.name().to_string(),
            object_name: Some(credentials.object_name),
            transport: TransportKind::DirectStorage,
        })
    }
}
