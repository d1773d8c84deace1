//! Client-side re-encoding to the compact format (WebP).
//!
//! Decoding and encoding are CPU-bound, so they run on the blocking pool and
//! the caller only awaits the single finished artifact.

use bytes::Bytes;
use std::path::Path;

use pixdrop_core::constants::{COMPACT_EXTENSION, COMPACT_MEDIA_TYPE};
use pixdrop_core::{CandidateFile, ErrorMetadata, LogLevel};

/// Re-encode failures. Never fatal to an upload: callers fall back to the original file.
#[derive(Debug, thiserror::Error)]
pub enum ReencodeError {
    #[error("Failed to read image bytes: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),
}

impl ErrorMetadata for ReencodeError {
    fn error_code(&self) -> &'static str {
        match self {
            ReencodeError::Read(_) => "READ_ERROR",
            ReencodeError::Decode(_) => "DECODE_ERROR",
            ReencodeError::Encode(_) => "ENCODE_ERROR",
        }
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Warn
    }

    fn is_recoverable(&self) -> bool {
        true
    }

    fn user_message(&self) -> String {
        format!(
            "Could not convert the image to WebP ({}); uploading the original file.",
            self
        )
    }
}

/// Quality rejected because it is outside 1..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Quality must be between 1 and 100, got {0}")]
pub struct InvalidQuality(pub u8);

/// Encoder quality as an integer percentage. Higher means larger output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Result<Self, InvalidQuality> {
        if (1..=100).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidQuality(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Quality {
    type Error = InvalidQuality;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Outcome of a re-encode.
#[derive(Debug, Clone)]
pub struct ReencodedFile {
    /// The file to upload: the new artifact, or the input when it was already compact.
    pub file: CandidateFile,
    pub original_size: u64,
    pub new_size: u64,
    /// False when the input was returned unchanged.
    pub converted: bool,
}

impl ReencodedFile {
    fn unchanged(file: CandidateFile) -> Self {
        let size = file.size();
        Self {
            file,
            original_size: size,
            new_size: size,
            converted: false,
        }
    }

    /// `(original - new) / original * 100`. Negative when the output grew.
    pub fn reduction_percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (self.original_size as f64 - self.new_size as f64) / self.original_size as f64 * 100.0
    }
}

/// Re-encodes raster images to WebP at a fixed quality.
#[derive(Debug, Clone, Copy)]
pub struct ImageReencoder {
    quality: Quality,
}

impl ImageReencoder {
    pub fn new(quality: Quality) -> Self {
        Self { quality }
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Re-encode `file` to WebP.
    ///
    /// Files already declared as WebP are returned as-is without reading them.
    pub async fn reencode(&self, file: CandidateFile) -> Result<ReencodedFile, ReencodeError> {
        if file.is_compact() {
            tracing::debug!(filename = %file.name(), "Already in compact format, skipping conversion");
            return Ok(ReencodedFile::unchanged(file));
        }

        let data = file.read_bytes().await.map_err(ReencodeError::Read)?;
        let quality = self.quality;

        let encoded = tokio::task::spawn_blocking(move || encode_webp(&data, quality))
            .await
            .map_err(|e| ReencodeError::Encode(format!("encoder task failed: {}", e)))??;

        let original_size = file.size();
        let new_size = encoded.len() as u64;
        let name = compact_file_name(file.name());

        tracing::debug!(
            filename = %name,
            original_size = original_size,
            new_size = new_size,
            quality = quality.get(),
            "Image re-encoded"
        );

        Ok(ReencodedFile {
            file: CandidateFile::from_bytes(name, COMPACT_MEDIA_TYPE, encoded),
            original_size,
            new_size,
            converted: true,
        })
    }
}

/// Decode `data` and encode it as lossy WebP.
pub fn encode_webp(data: &[u8], quality: Quality) -> Result<Bytes, ReencodeError> {
    let img = image::load_from_memory(data).map_err(|e| ReencodeError::Decode(e.to_string()))?;

    // Convert to RGBA for WebP encoding
    let rgba_img = img.to_rgba8();
    let (width, height) = rgba_img.dimensions();

    let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
    let webp_data = encoder
        .encode_simple(false, quality.get() as f32)
        .map_err(|e| ReencodeError::Encode(format!("{:?}", e)))?;

    if webp_data.is_empty() {
        return Err(ReencodeError::Encode("encoder produced no output".to_string()));
    }

    Ok(Bytes::copy_from_slice(&webp_data))
}

/// `holiday.photo.png` → `holiday.photo.webp`.
pub fn compact_file_name(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    format!("{}.{}", stem, COMPACT_EXTENSION)
}
