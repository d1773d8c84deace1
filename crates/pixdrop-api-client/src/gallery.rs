//! Gallery loader: fetches the full list of uploaded images on demand.

use async_trait::async_trait;
use pixdrop_core::constants::UPLOADS_PATH;
use pixdrop_core::models::GalleryResponse;
use pixdrop_core::GalleryItem;

use crate::error::GalleryError;
use crate::ApiClient;

/// Source of gallery items. The full set is re-fetched on every call.
#[async_trait]
pub trait GallerySource: Send + Sync {
    async fn list_uploads(&self) -> Result<Vec<GalleryItem>, GalleryError>;
}

impl ApiClient {
    /// `GET /uploads`
    pub async fn fetch_uploads(&self) -> Result<Vec<GalleryItem>, GalleryError> {
        let url = self.build_url(UPLOADS_PATH);
        let response = self
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|e| GalleryError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GalleryError::Status(status.as_u16()));
        }

        let body: GalleryResponse = response
            .json()
            .await
            .map_err(|e| GalleryError::Parse(e.to_string()))?;

        tracing::debug!(count = body.images.len(), "Gallery loaded");
        Ok(body.images)
    }
}

#[async_trait]
impl GallerySource for ApiClient {
    async fn list_uploads(&self) -> Result<Vec<GalleryItem>, GalleryError> {
        self.fetch_uploads().await
    }
}
