use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::constants::{COMPACT_MEDIA_TYPE, FALLBACK_MEDIA_TYPE};

/// Where the bytes of a candidate live.
#[derive(Debug, Clone)]
enum FileSource {
    Memory(Bytes),
    Disk(PathBuf),
}

/// A file picked or dropped by the user.
///
/// Immutable once selected: re-encoding produces a new `CandidateFile`
/// instead of mutating this one. Disk-backed candidates are read lazily, so
/// the payload may turn out to be unreadable when it is finally needed.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    name: String,
    media_type: String,
    size: u64,
    source: FileSource,
}

impl CandidateFile {
    /// Candidate whose payload is already in memory.
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: data.len() as u64,
            source: FileSource::Memory(data),
        }
    }

    /// Candidate backed by a file on disk. Only metadata is read here.
    ///
    /// When `media_type` is `None` it is derived from the file extension;
    /// content is never sniffed.
    pub async fn from_path(
        path: impl AsRef<Path>,
        media_type: Option<&str>,
    ) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let media_type = media_type
            .map(|m| m.to_string())
            .or_else(|| media_type_for_filename(&name).map(str::to_string))
            .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string());

        Ok(Self {
            name,
            media_type,
            size: metadata.len(),
            source: FileSource::Disk(path.to_path_buf()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type, as given at selection time.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Byte length.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn has_media_type(&self, media_type: &str) -> bool {
        self.media_type.eq_ignore_ascii_case(media_type)
    }

    /// Whether the file is already in the re-encode target format.
    pub fn is_compact(&self) -> bool {
        self.has_media_type(COMPACT_MEDIA_TYPE)
    }

    /// In-memory payload, if the candidate is not disk-backed.
    pub fn in_memory_bytes(&self) -> Option<&Bytes> {
        match &self.source {
            FileSource::Memory(data) => Some(data),
            FileSource::Disk(_) => None,
        }
    }

    /// Obtain the raw bytes. Cheap for in-memory candidates.
    pub async fn read_bytes(&self) -> std::io::Result<Bytes> {
        match &self.source {
            FileSource::Memory(data) => Ok(data.clone()),
            FileSource::Disk(path) => tokio::fs::read(path).await.map(Bytes::from),
        }
    }
}

/// Map a filename extension to the declared media type used for validation.
pub fn media_type_for_filename(filename: &str) -> Option<&'static str> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())?;

    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "avif" => Some("image/avif"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        "txt" => Some("text/plain"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}
