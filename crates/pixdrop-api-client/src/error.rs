use pixdrop_core::{ErrorMetadata, LogLevel};

/// Failures of an upload transport. Every variant ends the upload attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Direct-storage step 1: credentials refused or unusable.
    #[error("Authorization failed: {0}")]
    Auth(String),

    /// Direct-storage step 2: the storage provider rejected the bytes.
    #[error("Direct upload failed: {0}")]
    DirectUpload(String),

    /// Direct-storage step 3: the backend could not register the object.
    #[error("Registration failed: {0}")]
    Registration(String),

    /// Backend transport: non-200 status or a failure-flagged body.
    #[error("Upload rejected: {0}")]
    Rejected(String),

    /// Backend transport: the request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The user aborted the in-flight request.
    #[error("Upload cancelled")]
    Cancelled,
}

impl ErrorMetadata for TransportError {
    fn error_code(&self) -> &'static str {
        match self {
            TransportError::Auth(_) => "AUTH_ERROR",
            TransportError::DirectUpload(_) => "DIRECT_UPLOAD_ERROR",
            TransportError::Registration(_) => "REGISTRATION_ERROR",
            TransportError::Rejected(_) => "UPLOAD_REJECTED",
            TransportError::Network(_) => "NETWORK_ERROR",
            TransportError::Cancelled => "CANCELLED",
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            TransportError::Cancelled => LogLevel::Debug,
            _ => LogLevel::Error,
        }
    }

    fn is_recoverable(&self) -> bool {
        true
    }

    fn user_message(&self) -> String {
        match self {
            TransportError::Auth(msg) => format!("Could not authorize the upload: {}", msg),
            TransportError::DirectUpload(msg) => format!("Upload to storage failed: {}", msg),
            TransportError::Registration(msg) => {
                format!("The file was stored but could not be registered: {}", msg)
            }
            TransportError::Rejected(msg) => msg.clone(),
            TransportError::Network(_) => "Connection error with the server".to_string(),
            TransportError::Cancelled => "Upload cancelled".to_string(),
        }
    }
}

/// Failures loading the gallery. Never affects the upload session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GalleryError {
    #[error("Gallery request failed: {0}")]
    Request(String),

    #[error("Gallery request returned status {0}")]
    Status(u16),

    #[error("Invalid gallery response: {0}")]
    Parse(String),
}

impl ErrorMetadata for GalleryError {
    fn error_code(&self) -> &'static str {
        match self {
            GalleryError::Request(_) => "GALLERY_REQUEST_ERROR",
            GalleryError::Status(_) => "GALLERY_STATUS_ERROR",
            GalleryError::Parse(_) => "GALLERY_PARSE_ERROR",
        }
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Warn
    }

    fn is_recoverable(&self) -> bool {
        true
    }

    fn user_message(&self) -> String {
        format!("Error loading the images: {}", self)
    }
}
