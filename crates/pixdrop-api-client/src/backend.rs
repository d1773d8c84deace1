//! Backend transport: a single multipart POST to the same-origin upload endpoint.

use async_trait::async_trait;
use bytes::Bytes;
use pixdrop_core::constants::{UPLOAD_FORM_FIELD, UPLOAD_PATH};
use pixdrop_core::models::BackendUploadResponse;
use pixdrop_core::{CandidateFile, TransportKind, UploadedImage};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::progress::{progress_body, ProgressReporter};
use crate::transport::UploadTransport;
use crate::ApiClient;

/// Streams the file through the application's own server.
#[derive(Debug, Clone)]
pub struct BackendTransport {
    client: ApiClient,
}

impl BackendTransport {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UploadTransport for BackendTransport {
    async fn upload(
        &self,
        file: &CandidateFile,
        data: Bytes,
        progress: ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<UploadedImage, TransportError> {
        let length = data.len() as u64;
        let part = Part::stream_with_length(progress_body(data, progress), length)
            .file_name(file.name().to_string())
            .mime_str(file.media_type())
            .map_err(|e| {
                TransportError::Rejected(format!("Invalid media type {}: {}", file.media_type(), e))
            })?;
        let form = Form::new().part(UPLOAD_FORM_FIELD, part);

        let url = self.client.build_url(UPLOAD_PATH);
        tracing::debug!(url = %url, filename = %file.name(), size = length, "Sending multipart upload");

        let request = self.client.client().post(&url).multipart(form).send();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransportError::Cancelled),
            response = request => response.map_err(|e| TransportError::Network(e.to_string()))?,
        };

        let status = response.status();
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransportError::Cancelled),
            body = response.text() => body.map_err(|e| TransportError::Network(e.to_string()))?,
        };

        let url = interpret_backend_response(status, &body)?;
        Ok(UploadedImage {
            url,
            filename: file.name().to_string(),
            object_name: None,
            transport: TransportKind::Backend,
        })
    }
}

/// Map the backend's status and body to the public URL or a rejection.
pub fn interpret_backend_response(status: StatusCode, body: &str) -> Result<String, TransportError> {
    if status != StatusCode::OK {
        let message = serde_json::from_str::<BackendUploadResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .unwrap_or_else(|| {
                format!(
                    "Error {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown status")
                )
            });
        return Err(TransportError::Rejected(message));
    }

    let response: BackendUploadResponse = serde_json::from_str(body).map_err(|_| {
        TransportError::Rejected("Could not process the server response".to_string())
    })?;

    if !response.success {
        return Err(TransportError::Rejected(
            response
                .error
                .unwrap_or_else(|| "Error uploading the image".to_string()),
        ));
    }

    response.url.ok_or_else(|| {
        TransportError::Rejected("The server response did not include a URL".to_string())
    })
}
