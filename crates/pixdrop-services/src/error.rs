use pixdrop_api_client::TransportError;
use pixdrop_core::{ErrorMetadata, LogLevel};
use pixdrop_processing::ValidationError;

/// Why an upload session ended without a public URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No file selected")]
    NoFileSelected,

    /// An upload is already running for this session; the call did nothing.
    #[error("An upload is already in progress")]
    AlreadyInProgress,

    /// The candidate's bytes could not be obtained.
    #[error("Could not read the file: {0}")]
    Read(String),

    #[error("Authorization failed: {0}")]
    Auth(String),

    #[error("Direct upload failed: {0}")]
    DirectUpload(String),

    #[error("Registration failed: {0}")]
    Registration(String),

    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upload cancelled")]
    Cancelled,
}

impl UploadError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, UploadError::Cancelled)
    }
}

impl From<TransportError> for UploadError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Auth(msg) => UploadError::Auth(msg),
            TransportError::DirectUpload(msg) => UploadError::DirectUpload(msg),
            TransportError::Registration(msg) => UploadError::Registration(msg),
            TransportError::Rejected(msg) => UploadError::Rejected(msg),
            TransportError::Network(msg) => UploadError::Network(msg),
            TransportError::Cancelled => UploadError::Cancelled,
        }
    }
}

impl ErrorMetadata for UploadError {
    fn error_code(&self) -> &'static str {
        match self {
            UploadError::Validation(e) => e.error_code(),
            UploadError::NoFileSelected => "NO_FILE_SELECTED",
            UploadError::AlreadyInProgress => "UPLOAD_IN_PROGRESS",
            UploadError::Read(_) => "READ_ERROR",
            UploadError::Auth(_) => "AUTH_ERROR",
            UploadError::DirectUpload(_) => "DIRECT_UPLOAD_ERROR",
            UploadError::Registration(_) => "REGISTRATION_ERROR",
            UploadError::Rejected(_) => "UPLOAD_REJECTED",
            UploadError::Network(_) => "NETWORK_ERROR",
            UploadError::Cancelled => "CANCELLED",
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            UploadError::Validation(_)
            | UploadError::NoFileSelected
            | UploadError::AlreadyInProgress
            | UploadError::Cancelled => LogLevel::Debug,
            _ => LogLevel::Error,
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, UploadError::Validation(_))
    }

    fn user_message(&self) -> String {
        match self {
            UploadError::Validation(e) => e.user_message(),
            UploadError::NoFileSelected => "Please select a file first.".to_string(),
            UploadError::AlreadyInProgress => "An upload is already in progress.".to_string(),
            UploadError::Read(msg) => format!("Could not read the file: {}", msg),
            UploadError::Auth(msg) => format!("Could not authorize the upload: {}", msg),
            UploadError::DirectUpload(msg) => format!("Upload to storage failed: {}", msg),
            UploadError::Registration(msg) => {
                format!("The file was stored but could not be registered: {}", msg)
            }
            UploadError::Rejected(msg) => msg.clone(),
            UploadError::Network(_) => "Connection error with the server".to_string(),
            UploadError::Cancelled => "Upload cancelled".to_string(),
        }
    }
}
