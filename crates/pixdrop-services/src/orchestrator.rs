//! Upload orchestrator.
//!
//! Composes validation, optional re-encoding, transport selection and the
//! transfer itself into one user-facing operation:
//!
//! ```text
//! Idle → FileSelected → (Converting) → Uploading → {Succeeded, Failed, Cancelled} → Idle
//! ```
//!
//! Exactly one upload runs at a time. The orchestrator is shared behind an
//! `Arc` so that `cancel` can be called while `upload` is being awaited.
//! Every exit from the in-progress phase resets the session and emits
//! [`UploadEvent::Reset`], including when the `upload` future is dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pixdrop_api_client::{
    ApiClient, BackendTransport, DirectStorageTransport, GalleryError, GallerySource,
    ProgressReporter, TransportSelector, UploadTransport,
};
use pixdrop_core::error::log_error;
use pixdrop_core::{
    format_file_size, CandidateFile, ClientConfig, ErrorMetadata, GalleryItem, TransportKind,
    UploadPolicy, UploadState, UploadedImage,
};
use pixdrop_processing::{FileValidator, ImageReencoder, Quality};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::UploadError;
use crate::events::{Notice, ProgressTracker, UploadEvent, UploadObserver};
use crate::gallery::GalleryView;
use crate::session::UploadSession;

/// User choices that apply to the next upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Re-encode to WebP at this quality before uploading.
    pub convert: Option<Quality>,
    /// Overrides the configured deployment mode.
    pub constrained: Option<bool>,
}

pub struct UploadOrchestrator {
    policy: UploadPolicy,
    validator: FileValidator,
    selector: TransportSelector,
    constrained_deployment: bool,
    backend: Arc<dyn UploadTransport>,
    direct: Arc<dyn UploadTransport>,
    gallery_source: Arc<dyn GallerySource>,
    observer: Arc<dyn UploadObserver>,
    session: Mutex<UploadSession>,
    options: Mutex<UploadOptions>,
    gallery: Mutex<GalleryView>,
}

impl UploadOrchestrator {
    pub fn new(
        config: &ClientConfig,
        backend: Arc<dyn UploadTransport>,
        direct: Arc<dyn UploadTransport>,
        gallery_source: Arc<dyn GallerySource>,
        observer: Arc<dyn UploadObserver>,
    ) -> Self {
        Self {
            policy: config.policy.clone(),
            validator: FileValidator::from_policy(&config.policy),
            selector: TransportSelector::from_policy(&config.policy),
            constrained_deployment: config.constrained_deployment,
            backend,
            direct,
            gallery_source,
            observer,
            session: Mutex::new(UploadSession::default()),
            options: Mutex::new(UploadOptions::default()),
            gallery: Mutex::new(GalleryView::new()),
        }
    }

    /// Orchestrator wired to the HTTP transports and gallery endpoint of `config.api_url`.
    pub fn from_config(
        config: &ClientConfig,
        observer: Arc<dyn UploadObserver>,
    ) -> anyhow::Result<Self> {
        let client = ApiClient::from_config(config)?;
        Ok(Self::new(
            config,
            Arc::new(BackendTransport::new(client.clone())),
            Arc::new(DirectStorageTransport::new(client.clone())),
            Arc::new(client),
            observer,
        ))
    }

    fn session(&self) -> MutexGuard<'_, UploadSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn gallery(&self) -> MutexGuard<'_, GalleryView> {
        self.gallery.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: UploadEvent) {
        self.observer.on_event(&event);
    }

    fn notice(&self, notice: Notice) {
        self.emit(UploadEvent::Notice(notice));
    }

    pub fn state(&self) -> UploadState {
        self.session().state()
    }

    pub fn session_id(&self) -> Uuid {
        self.session().id()
    }

    pub fn selected_file(&self) -> Option<CandidateFile> {
        self.session().file().cloned()
    }

    pub fn current_transport(&self) -> Option<TransportKind> {
        self.session().transport()
    }

    pub fn options(&self) -> UploadOptions {
        *self.options.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_options(&self, options: UploadOptions) {
        *self.options.lock().unwrap_or_else(PoisonError::into_inner) = options;
    }

    /// Validate `file` and make it the current selection.
    ///
    /// A rejected file leaves the session untouched. Refused until a running
    /// upload has finished and reset, terminal notices included.
    pub fn select_file(&self, file: CandidateFile) -> Result<(), UploadError> {
        let selected = {
            let mut session = self.session();
            if session.is_busy() {
                return Err(UploadError::AlreadyInProgress);
            }
            match self.validator.validate(&file) {
                Ok(()) => {
                    session.select(file.clone());
                    Ok(session.id())
                }
                Err(e) => Err(e),
            }
        };

        let session_id = match selected {
            Ok(id) => id,
            Err(e) => {
                log_error(&e, "File rejected");
                self.notice(Notice::error(e.user_message()));
                return Err(e.into());
            }
        };

        tracing::info!(
            session_id = %session_id,
            filename = %file.name(),
            media_type = %file.media_type(),
            file_size = file.size(),
            "File selected"
        );
        self.emit(UploadEvent::FileSelected {
            name: file.name().to_string(),
            media_type: file.media_type().to_string(),
            size: file.size(),
        });
        self.emit(UploadEvent::StateChanged(UploadState::FileSelected));
        Ok(())
    }

    /// Upload the selected file with the current options.
    ///
    /// Returns [`UploadError::AlreadyInProgress`] without side effects when an
    /// upload is running, and [`UploadError::Cancelled`] when the user aborted.
    pub async fn upload(&self) -> Result<UploadedImage, UploadError> {
        let options = self.options();

        let (file, cancel, session_id, initial_state) = {
            let mut session = self.session();
            if session.is_busy() {
                tracing::debug!(session_id = %session.id(), "Upload already in progress, ignoring");
                return Err(UploadError::AlreadyInProgress);
            }
            let initial_state = match (options.convert, session.file()) {
                (Some(_), Some(file)) if !file.is_compact() => UploadState::Converting,
                _ => UploadState::Uploading,
            };
            let session_id = session.id();
            let Some((file, cancel)) = session.begin(initial_state) else {
                return Err(UploadError::NoFileSelected);
            };
            (file, cancel, session_id, initial_state)
        };

        let reset = ResetGuard { orchestrator: self };
        self.emit(UploadEvent::StateChanged(initial_state));

        let span = tracing::info_span!("upload", session_id = %session_id);
        let result = self.run(file, options, &cancel).instrument(span).await;

        match &result {
            Ok(image) => {
                tracing::info!(
                    session_id = %session_id,
                    transport = %image.transport,
                    url = %image.url,
                    "Upload succeeded"
                );
                self.set_state(UploadState::Succeeded);
                self.notice(Notice::success(format!(
                    "Image uploaded successfully: {}",
                    image.url
                )));
            }
            Err(e) if e.is_cancelled() => {
                tracing::info!(session_id = %session_id, "Upload cancelled");
                self.set_state(UploadState::Cancelled);
                self.notice(Notice::info("Upload cancelled"));
            }
            Err(e) => {
                log_error(e, "Upload failed");
                self.set_state(UploadState::Failed);
                self.notice(Notice::error(e.user_message()));
            }
        }
        drop(reset);

        if result.is_ok() {
            // Gallery failures are reported through events and never change the upload result.
            let _ = self.refresh_gallery().await;
        }
        result
    }

    async fn run(
        &self,
        file: CandidateFile,
        options: UploadOptions,
        cancel: &CancellationToken,
    ) -> Result<UploadedImage, UploadError> {
        let file = match options.convert {
            Some(quality) => self.convert(file, quality, cancel).await?,
            None => file,
        };

        let data = file
            .read_bytes()
            .await
            .map_err(|e| UploadError::Read(e.to_string()))?;
        let file_size = data.len() as u64;

        // Deployment mode is read once, here, for this upload.
        let constrained = options.constrained.unwrap_or(self.constrained_deployment);
        let choice = self
            .selector
            .select(file_size, constrained, file.is_compact());

        tracing::info!(
            transport = %choice.kind,
            file_size,
            constrained,
            "Transport selected"
        );

        self.session().set_transport(choice.kind);
        self.set_state(UploadState::Uploading);
        self.emit(UploadEvent::from(&choice));
        if let Some(warning) = &choice.warning {
            tracing::warn!(file_size, "{}", warning);
            self.notice(Notice::warning(warning.clone()));
        }

        let transport = match choice.kind {
            TransportKind::Backend => &self.backend,
            TransportKind::DirectStorage => &self.direct,
        };

        let image = transport
            .upload(&file, data, self.progress_reporter(), cancel)
            .await?;
        Ok(image)
    }

    /// Conversion step. Failures fall back to `file`; only cancellation aborts.
    async fn convert(
        &self,
        file: CandidateFile,
        quality: Quality,
        cancel: &CancellationToken,
    ) -> Result<CandidateFile, UploadError> {
        if file.is_compact() {
            tracing::debug!(filename = %file.name(), "Already WebP, skipping conversion");
            return Ok(file);
        }

        let max = self.policy.max_conversion_size_bytes;
        if file.size() > max {
            tracing::warn!(
                file_size = file.size(),
                max_conversion_size = max,
                "File too large to convert, uploading original"
            );
            self.notice(Notice::warning(format!(
                "The file is larger than {} and will be uploaded without conversion.",
                format_file_size(max)
            )));
            return Ok(file);
        }

        let reencoder = ImageReencoder::new(quality);
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(UploadError::Cancelled),
            result = reencoder.reencode(file.clone()) => result,
        };

        match result {
            Ok(reencoded) => {
                let reduction_percent = reencoded.reduction_percent();
                tracing::info!(
                    original_size = reencoded.original_size,
                    new_size = reencoded.new_size,
                    reduction_percent,
                    "Image converted to WebP"
                );
                self.session().replace_file(reencoded.file.clone());
                self.emit(UploadEvent::Converted {
                    name: reencoded.file.name().to_string(),
                    original_size: reencoded.original_size,
                    new_size: reencoded.new_size,
                    reduction_percent,
                });
                Ok(reencoded.file)
            }
            Err(e) => {
                log_error(&e, "Conversion failed, uploading original file");
                self.notice(Notice::warning(e.user_message()));
                Ok(file)
            }
        }
    }

    fn progress_reporter(&self) -> ProgressReporter {
        let observer = self.observer.clone();
        let tracker = Mutex::new(ProgressTracker::new());
        ProgressReporter::new(move |progress| {
            let events = tracker
                .lock()
                .map(|mut t| t.update(progress))
                .unwrap_or_default();
            for event in &events {
                observer.on_event(event);
            }
        })
    }

    fn set_state(&self, state: UploadState) {
        let changed = {
            let mut session = self.session();
            let previous = session.state();
            session.set_state(state);
            previous != state
        };
        if changed {
            self.emit(UploadEvent::StateChanged(state));
        }
    }

    fn reset_session(&self) {
        self.session().clear();
        self.emit(UploadEvent::StateChanged(UploadState::Idle));
        self.emit(UploadEvent::Reset);
    }

    /// Abort the running upload, or drop the selected file.
    ///
    /// Returns false when there was nothing to cancel. An in-flight upload
    /// resolves to [`UploadError::Cancelled`] once its transport notices.
    pub fn cancel(&self) -> bool {
        let cleared = {
            let mut session = self.session();
            if session.is_in_progress() {
                tracing::info!(session_id = %session.id(), "Cancelling upload");
                return session.cancel();
            }
            if session.state() == UploadState::FileSelected {
                session.clear();
                true
            } else {
                false
            }
        };

        if cleared {
            self.emit(UploadEvent::StateChanged(UploadState::Idle));
            self.emit(UploadEvent::Reset);
        }
        cleared
    }

    /// Return to `Idle`, cancelling whatever is in flight.
    pub fn reset(&self) {
        if self.session().cancel() {
            // The running upload resets the session on its way out.
            return;
        }
        self.reset_session();
    }

    /// Re-fetch the full gallery and publish the visible items.
    pub async fn refresh_gallery(&self) -> Result<usize, GalleryError> {
        match self.gallery_source.list_uploads().await {
            Ok(items) => {
                let (visible, total) = {
                    let mut gallery = self.gallery();
                    gallery.replace(items);
                    (gallery.visible(), gallery.total())
                };
                tracing::debug!(total, visible = visible.len(), "Gallery refreshed");
                self.emit(UploadEvent::GalleryUpdated {
                    items: visible,
                    total,
                });
                Ok(total)
            }
            Err(e) => {
                log_error(&e, "Failed to load gallery");
                self.emit(UploadEvent::GalleryFailed(e.user_message()));
                Err(e)
            }
        }
    }

    /// Filter the gallery by `term` (case-insensitive, over file name and URL).
    pub fn search(&self, term: &str) -> Vec<GalleryItem> {
        let (visible, total) = {
            let mut gallery = self.gallery();
            gallery.set_search(term);
            (gallery.visible(), gallery.total())
        };
        self.emit(UploadEvent::GalleryUpdated {
            items: visible.clone(),
            total,
        });
        visible
    }

    pub fn gallery_items(&self) -> Vec<GalleryItem> {
        self.gallery().visible()
    }
}

/// Resets the session when the in-progress phase ends, however it ends.
struct ResetGuard<'a> {
    orchestrator: &'a UploadOrchestrator,
}

impl Drop for ResetGuard<'_> {
    fn drop(&mut self) {
        self.orchestrator.reset_session();
    }
}
