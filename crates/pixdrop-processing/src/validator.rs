use pixdrop_core::{CandidateFile, ErrorMetadata, LogLevel, UploadPolicy};

/// Reasons a candidate file is refused before any network activity
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid media type: {media_type} (allowed: {allowed:?})")]
    InvalidMediaType {
        media_type: String,
        allowed: Vec<String>,
    },

    #[error("Empty file")]
    EmptyFile,
}

impl ErrorMetadata for ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            ValidationError::InvalidMediaType { .. } => "INVALID_MEDIA_TYPE",
            ValidationError::EmptyFile => "EMPTY_FILE",
        }
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Debug
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn user_message(&self) -> String {
        match self {
            ValidationError::FileTooLarge { max, .. } => format!(
                "The file is too large. The maximum size is {}.",
                pixdrop_core::format_file_size(*max)
            ),
            ValidationError::InvalidMediaType { .. } => {
                "File type not allowed. Only images are accepted (webp, jpg, png, gif).".to_string()
            }
            ValidationError::EmptyFile => "The file is empty.".to_string(),
        }
    }
}

/// Candidate file validator
///
/// Pure check of the declared media type and byte length against policy.
/// Content is never sniffed; the caller surfaces the rejection reason.
#[derive(Debug, Clone)]
pub struct FileValidator {
    max_file_size: u64,
    accepted_media_types: Vec<String>,
}

impl FileValidator {
    pub fn new(max_file_size: u64, accepted_media_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            accepted_media_types: accepted_media_types
                .into_iter()
                .map(|t| t.to_lowercase())
                .collect(),
        }
    }

    /// Validator enforcing the policy's effective ceiling (legacy or regular).
    pub fn from_policy(policy: &UploadPolicy) -> Self {
        Self::new(
            policy.effective_max_file_size(),
            policy.accepted_media_types.clone(),
        )
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Validate declared media type
    pub fn validate_media_type(&self, media_type: &str) -> Result<(), ValidationError> {
        let normalized = media_type.trim().to_lowercase();

        if !self.accepted_media_types.iter().any(|t| t == &normalized) {
            return Err(ValidationError::InvalidMediaType {
                media_type: media_type.to_string(),
                allowed: self.accepted_media_types.clone(),
            });
        }

        Ok(())
    }

    /// Validate byte length; the ceiling itself is accepted
    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate a candidate file. The media type is checked first.
    pub fn validate(&self, file: &CandidateFile) -> Result<(), ValidationError> {
        self.validate_media_type(file.media_type())?;
        self.validate_file_size(file.size())?;
        Ok(())
    }
}
