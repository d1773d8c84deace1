use pixdrop_core::{CandidateFile, TransportKind, UploadState};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Transient state of the single active upload.
///
/// Owned by the orchestrator. The cancel handle exists only while the state
/// is in progress; `clear` drops everything and returns to `Idle`.
#[derive(Debug)]
pub struct UploadSession {
    id: Uuid,
    state: UploadState,
    file: Option<CandidateFile>,
    cancel: Option<CancellationToken>,
    transport: Option<TransportKind>,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: UploadState::Idle,
            file: None,
            cancel: None,
            transport: None,
        }
    }
}

impl UploadSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn file(&self) -> Option<&CandidateFile> {
        self.file.as_ref()
    }

    pub fn transport(&self) -> Option<TransportKind> {
        self.transport
    }

    pub fn is_in_progress(&self) -> bool {
        self.state.is_in_progress()
    }

    /// In progress, or holding a terminal state that has not been reset yet.
    pub fn is_busy(&self) -> bool {
        self.state.is_in_progress() || self.state.is_terminal()
    }

    /// Start a fresh session around `file`.
    pub fn select(&mut self, file: CandidateFile) {
        *self = Self {
            file: Some(file),
            state: UploadState::FileSelected,
            ..Self::default()
        };
    }

    /// Enter the in-progress phase, returning the file to send and the cancel token.
    ///
    /// Returns `None` when there is nothing to upload or the previous upload
    /// has not been reset yet.
    pub fn begin(&mut self, state: UploadState) -> Option<(CandidateFile, CancellationToken)> {
        if self.is_busy() {
            return None;
        }
        let file = self.file.clone()?;
        let token = CancellationToken::new();
        self.cancel = Some(token.clone());
        self.state = state;
        Some((file, token))
    }

    pub fn set_state(&mut self, state: UploadState) {
        self.state = state;
        if !state.is_in_progress() {
            self.cancel = None;
        }
    }

    /// Swap in a re-encoded artifact.
    pub fn replace_file(&mut self, file: CandidateFile) {
        self.file = Some(file);
    }

    pub fn set_transport(&mut self, kind: TransportKind) {
        self.transport = Some(kind);
    }

    /// Fire the cancel handle. Returns false when nothing is in flight.
    pub fn cancel(&self) -> bool {
        match (&self.cancel, self.is_in_progress()) {
            (Some(token), true) => {
                token.cancel();
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
