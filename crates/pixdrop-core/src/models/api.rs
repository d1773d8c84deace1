//! JSON bodies exchanged with the backend.
//!
//! Field names match the server contract exactly; optional fields are
//! tolerated as missing because failure responses only carry `error`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response of `POST /upload`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendUploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Request of `POST /api/upload/auth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAuthRequest {
    pub filename: String,
}

/// Response of `POST /api/upload/auth`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadAuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub upload_url: Option<String>,
    /// Headers the storage provider requires on the upload request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Provider-assigned object name.
    #[serde(default)]
    pub b2_filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Request of `POST /api/upload/complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadCompleteRequest {
    pub b2_filename: String,
    pub original_filename: String,
}

/// Response of `POST /api/upload/complete`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadCompleteResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
