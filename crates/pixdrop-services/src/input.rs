//! Named input events, so any UI binding can drive the orchestrator
//! without knowing its method surface.

use pixdrop_core::{CandidateFile, UploadState};

use crate::error::UploadError;
use crate::orchestrator::{UploadOptions, UploadOrchestrator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    SelectFile(CandidateFile),
    SetOptions(UploadOptions),
    Upload,
    Cancel,
    Refresh,
    Search(String),
    KeyPressed(Key),
}

impl UploadOrchestrator {
    /// Apply one input event.
    ///
    /// Errors from `SelectFile` and `Upload` are returned as well as reported
    /// through notices. Gallery failures are reported through events only.
    pub async fn handle(&self, input: InputEvent) -> Result<(), UploadError> {
        match input {
            InputEvent::SelectFile(file) => self.select_file(file),
            InputEvent::SetOptions(options) => {
                self.set_options(options);
                Ok(())
            }
            InputEvent::Upload => self.upload().await.map(|_| ()),
            InputEvent::Cancel => {
                self.cancel();
                Ok(())
            }
            InputEvent::Refresh => {
                let _ = self.refresh_gallery().await;
                Ok(())
            }
            InputEvent::Search(term) => {
                self.search(&term);
                Ok(())
            }
            InputEvent::KeyPressed(key) => self.handle_key(key).await,
        }
    }

    async fn handle_key(&self, key: Key) -> Result<(), UploadError> {
        let state = self.state();
        match key {
            // Enter only starts an upload from a fresh selection.
            Key::Enter if state == UploadState::FileSelected => self.upload().await.map(|_| ()),
            Key::Escape if state == UploadState::FileSelected || state.is_in_progress() => {
                self.cancel();
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
