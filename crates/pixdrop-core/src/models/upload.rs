use serde::{Deserialize, Serialize};
use std::fmt;

/// Upload session state.
///
/// `Idle → FileSelected → (Converting) → Uploading → {Succeeded, Failed, Cancelled} → Idle`.
/// Terminal states are reported to observers and then immediately collapse back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    Idle,
    FileSelected,
    Converting,
    Uploading,
    Succeeded,
    Failed,
    Cancelled,
}

impl UploadState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            UploadState::Succeeded | UploadState::Failed | UploadState::Cancelled
        )
    }

    /// True while a conversion or network operation belongs to the session.
    pub fn is_in_progress(self) -> bool {
        matches!(self, UploadState::Converting | UploadState::Uploading)
    }
}

/// Which upload path carries the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Multipart POST through the application's own server.
    Backend,
    /// Credentials from the backend, bytes straight to object storage.
    DirectStorage,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Backend => "backend",
            TransportKind::DirectStorage => "direct_storage",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    /// Public URL assigned by the server.
    pub url: String,
    /// Name the file was uploaded under.
    pub filename: String,
    /// Provider-assigned object name (direct-storage path only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,
    pub transport: TransportKind,
}

/// Byte-level progress of a single transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub bytes_sent: u64,
    pub total_bytes: u64,
}

impl TransferProgress {
    pub fn new(bytes_sent: u64, total_bytes: u64) -> Self {
        Self {
            bytes_sent,
            total_bytes,
        }
    }

    /// Rounded integer percentage; an empty body counts as complete.
    pub fn percent(&self) -> u8 {
        if self.total_bytes == 0 {
            return 100;
        }
        let sent = self.bytes_sent.min(self.total_bytes) as f64;
        ((sent / self.total_bytes as f64) * 100.0).round() as u8
    }
}

/// Intermediate points surfaced in addition to the running percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProgressMilestone {
    /// At least 50% sent.
    Half,
    /// At least 90% sent.
    NearComplete,
}

impl ProgressMilestone {
    pub fn threshold_percent(self) -> u8 {
        match self {
            ProgressMilestone::Half => 50,
            ProgressMilestone::NearComplete => 90,
        }
    }

    pub const ALL: [ProgressMilestone; 2] =
        [ProgressMilestone::Half, ProgressMilestone::NearComplete];
}
