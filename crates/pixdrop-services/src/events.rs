//! Events the orchestrator emits towards the UI binding layer.
//!
//! The orchestrator never renders anything itself: every state transition,
//! progress update and user-facing message goes through an [`UploadObserver`].

use pixdrop_api_client::TransportChoice;
use pixdrop_core::{GalleryItem, ProgressMilestone, TransferProgress, TransportKind, UploadState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A message meant for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    StateChanged(UploadState),
    FileSelected {
        name: String,
        media_type: String,
        size: u64,
    },
    Converted {
        name: String,
        original_size: u64,
        new_size: u64,
        reduction_percent: f64,
    },
    TransportSelected {
        kind: TransportKind,
        warning: Option<String>,
    },
    /// Emitted only when the integer percentage changes.
    Progress {
        percent: u8,
        bytes_sent: u64,
        total_bytes: u64,
    },
    Milestone(ProgressMilestone),
    Notice(Notice),
    /// Controls are back at their baseline. Sent on every exit from an upload.
    Reset,
    /// Visible gallery items after a refresh or a search.
    GalleryUpdated {
        items: Vec<GalleryItem>,
        total: usize,
    },
    GalleryFailed(String),
}

impl From<&TransportChoice> for UploadEvent {
    fn from(choice: &TransportChoice) -> Self {
        UploadEvent::TransportSelected {
            kind: choice.kind,
            warning: choice.warning.clone(),
        }
    }
}

/// Receives orchestrator events. Called synchronously from the orchestrator's task.
pub trait UploadObserver: Send + Sync {
    fn on_event(&self, event: &UploadEvent);
}

impl<F> UploadObserver for F
where
    F: Fn(&UploadEvent) + Send + Sync,
{
    fn on_event(&self, event: &UploadEvent) {
        self(event)
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl UploadObserver for NoopObserver {
    fn on_event(&self, _event: &UploadEvent) {}
}

/// Turns raw byte counts into percentage and milestone events.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    last_percent: Option<u8>,
    reached: Vec<ProgressMilestone>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, progress: TransferProgress) -> Vec<UploadEvent> {
        let percent = progress.percent();
        let mut events = Vec::new();

        if self.last_percent != Some(percent) {
            self.last_percent = Some(percent);
            events.push(UploadEvent::Progress {
                percent,
                bytes_sent: progress.bytes_sent,
                total_bytes: progress.total_bytes,
            });
        }

        for milestone in ProgressMilestone::ALL {
            if percent >= milestone.threshold_percent() && !self.reached.contains(&milestone) {
                self.reached.push(milestone);
                events.push(UploadEvent::Milestone(milestone));
            }
        }

        events
    }
}
