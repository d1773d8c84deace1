use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use async_trait::async_trait;
use bytes::Bytes;
use pixdrop_api_client::{
    GalleryError, GallerySource, ProgressReporter, TransportError, UploadTransport,
};
use pixdrop_core::{
    CandidateFile, ClientConfig, GalleryItem, TransferProgress, TransportKind, UploadState,
    UploadedImage,
};
use pixdrop_services::{
    InputEvent, Key, NoticeLevel, Quality, UploadError, UploadEvent, UploadObserver,
    UploadOptions, UploadOrchestrator,
};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

const MIB: usize = 1024 * 1024;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

enum Behavior {
    Succeed,
    Fail(TransportError),
    /// Signal `started`, then block until the cancel token fires.
    WaitForCancel,
    /// Signal `started`, then block until `release` is notified.
    WaitForRelease,
}

struct FakeTransport {
    kind: TransportKind,
    behavior: Behavior,
    calls: AtomicUsize,
    received: Mutex<Vec<(String, String, usize)>>,
    started: Notify,
    release: Notify,
}

impl FakeTransport {
    fn new(kind: TransportKind, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            kind,
            behavior,
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
            started: Notify::new(),
            release: Notify::new(),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_received(&self) -> (String, String, usize) {
        self.received.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl UploadTransport for FakeTransport {
    async fn upload(
        &self,
        file: &CandidateFile,
        data: Bytes,
        progress: ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<UploadedImage, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push((
            file.name().to_string(),
            file.media_type().to_string(),
            data.len(),
        ));

        let total = data.len() as u64;
        progress.report(TransferProgress::new(total / 2, total));

        match &self.behavior {
            Behavior::Succeed => {}
            Behavior::Fail(e) => return Err(e.clone()),
            Behavior::WaitForCancel => {
                self.started.notify_one();
                cancel.cancelled().await;
                return Err(TransportError::Cancelled);
            }
            Behavior::WaitForRelease => {
                self.started.notify_one();
                self.release.notified().await;
            }
        }

        progress.report(TransferProgress::new(total, total));
        Ok(UploadedImage {
            url: format!("https://cdn.example/{}", file.name()),
            filename: file.name().to_string(),
            object_name: None,
            transport: self.kind,
        })
    }
}

struct FakeGallery {
    calls: AtomicUsize,
    fail: bool,
    items: Vec<GalleryItem>,
}

impl FakeGallery {
    fn new(items: Vec<GalleryItem>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: false,
            items,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: true,
            items: Vec::new(),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GallerySource for FakeGallery {
    async fn list_uploads(&self) -> Result<Vec<GalleryItem>, GalleryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GalleryError::Status(500));
        }
        Ok(self.items.clone())
    }
}

type Events = Arc<Mutex<Vec<UploadEvent>>>;

fn recorder() -> (Arc<dyn UploadObserver>, Events) {
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let observer: Arc<dyn UploadObserver> =
        Arc::new(move |e: &UploadEvent| sink.lock().unwrap().push(e.clone()));
    (observer, events)
}

fn notices(events: &Events, level: NoticeLevel) -> Vec<String> {
    events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            UploadEvent::Notice(n) if n.level == level => Some(n.text.clone()),
            _ => None,
        })
        .collect()
}

fn states(events: &Events) -> Vec<UploadState> {
    events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            UploadEvent::StateChanged(s) => Some(*s),
            _ => None,
        })
        .collect()
}

fn has_event(events: &Events, predicate: impl Fn(&UploadEvent) -> bool) -> bool {
    events.lock().unwrap().iter().any(predicate)
}

struct Harness {
    orchestrator: Arc<UploadOrchestrator>,
    backend: Arc<FakeTransport>,
    direct: Arc<FakeTransport>,
    gallery: Arc<FakeGallery>,
    events: Events,
}

fn harness_with(config: ClientConfig, backend: Behavior, gallery: Arc<FakeGallery>) -> Harness {
    let backend = FakeTransport::new(TransportKind::Backend, backend);
    let direct = FakeTransport::new(TransportKind::DirectStorage, Behavior::Succeed);
    let (observer, events) = recorder();
    let orchestrator = Arc::new(UploadOrchestrator::new(
        &config,
        backend.clone(),
        direct.clone(),
        gallery.clone(),
        observer,
    ));
    Harness {
        orchestrator,
        backend,
        direct,
        gallery,
        events,
    }
}

fn harness(backend: Behavior) -> Harness {
    harness_with(ClientConfig::default(), backend, FakeGallery::new(Vec::new()))
}

/// Harness whose observer can call back into the orchestrator from `hook`.
fn reentrant_harness(
    backend: Behavior,
    hook: impl Fn(&UploadOrchestrator, &UploadEvent) + Send + Sync + 'static,
) -> Harness {
    let backend = FakeTransport::new(TransportKind::Backend, backend);
    let direct = FakeTransport::new(TransportKind::DirectStorage, Behavior::Succeed);
    let gallery = FakeGallery::new(Vec::new());
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let slot: Arc<OnceLock<Weak<UploadOrchestrator>>> = Arc::new(OnceLock::new());

    let observer: Arc<dyn UploadObserver> = Arc::new({
        let sink = events.clone();
        let slot = slot.clone();
        move |e: &UploadEvent| {
            sink.lock().unwrap().push(e.clone());
            if let Some(orchestrator) = slot.get().and_then(Weak::upgrade) {
                hook(&orchestrator, e);
            }
        }
    });
    let orchestrator = Arc::new(UploadOrchestrator::new(
        &ClientConfig::default(),
        backend.clone(),
        direct.clone(),
        gallery.clone(),
        observer,
    ));
    slot.set(Arc::downgrade(&orchestrator)).unwrap();

    Harness {
        orchestrator,
        backend,
        direct,
        gallery,
        events,
    }
}

fn jpeg(size: usize) -> CandidateFile {
    CandidateFile::from_bytes("photo.jpg", "image/jpeg", vec![0u8; size])
}

fn png_image() -> Vec<u8> {
    let img = image::RgbImage::from_fn(48, 32, |x, y| image::Rgb([(x * 5) as u8, (y * 7) as u8, 90]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

// ---------------------------------------------------------------------------
// End-to-end over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn two_megabyte_jpeg_unconstrained_uses_backend_and_refreshes_gallery() {
    let mut server = mockito::Server::new_async().await;
    let upload = server
        .mock("POST", "/upload")
        .with_status(200)
        .with_body(r#"{"success": true, "url": "https://cdn.example/products/photo.jpg", "filename": "photo.jpg"}"#)
        .expect(1)
        .create_async()
        .await;
    let auth = server
        .mock("POST", "/api/upload/auth")
        .expect(0)
        .create_async()
        .await;
    let uploads = server
        .mock("GET", "/uploads")
        .with_status(200)
        .with_body(r#"{"images": [{"filename": "photo.jpg", "url": "https://cdn.example/products/photo.jpg", "timestamp": "2024-05-01T10:00:00"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let config = ClientConfig {
        api_url: server.url(),
        constrained_deployment: false,
        ..ClientConfig::default()
    };
    let (observer, events) = recorder();
    let orchestrator = UploadOrchestrator::from_config(&config, observer).unwrap();

    orchestrator.select_file(jpeg(2 * MIB)).unwrap();
    let image = orchestrator.upload().await.unwrap();

    upload.assert_async().await;
    auth.assert_async().await;
    uploads.assert_async().await;

    assert_eq!(image.transport, TransportKind::Backend);
    assert_eq!(image.url, "https://cdn.example/products/photo.jpg");
    assert_eq!(orchestrator.state(), UploadState::Idle);
    assert!(orchestrator.selected_file().is_none());
    assert_eq!(orchestrator.gallery_items().len(), 1);
    assert_eq!(notices(&events, NoticeLevel::Success).len(), 1);
    assert!(has_event(&events, |e| matches!(e, UploadEvent::Progress { percent: 100, .. })));
    assert!(has_event(&events, |e| matches!(e, UploadEvent::GalleryUpdated { total: 1, .. })));
}

#[tokio::test]
async fn six_megabyte_png_constrained_goes_direct_to_storage() {
    let mut server = mockito::Server::new_async().await;
    let storage_url = format!("{}/storage/upload", server.url());
    let backend = server
        .mock("POST", "/upload")
        .expect(0)
        .create_async()
        .await;
    let auth = server
        .mock("POST", "/api/upload/auth")
        .with_status(200)
        .with_body(
            serde_json::json!({
                "success": true,
                "upload_url": storage_url,
                "headers": {"Authorization": "upload-token"},
                "b2_filename": "products/big-9f.png"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let storage = server
        .mock("POST", "/storage/upload")
        .match_header("x-bz-file-name", "products%2Fbig-9f.png")
        .match_header("content-length", (6 * MIB).to_string().as_str())
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let complete = server
        .mock("POST", "/api/upload/complete")
        .with_status(200)
        .with_body(r#"{"url": "https://cdn.example/products/big-9f.png"}"#)
        .expect(1)
        .create_async()
        .await;
    let uploads = server
        .mock("GET", "/uploads")
        .with_status(200)
        .with_body(r#"{"images": []}"#)
        .expect(1)
        .create_async()
        .await;

    let config = ClientConfig {
        api_url: server.url(),
        constrained_deployment: true,
        ..ClientConfig::default()
    };
    let (observer, events) = recorder();
    let orchestrator = UploadOrchestrator::from_config(&config, observer).unwrap();

    orchestrator
        .select_file(CandidateFile::from_bytes("big.png", "image/png", vec![7u8; 6 * MIB]))
        .unwrap();
    let image = orchestrator.upload().await.unwrap();

    backend.assert_async().await;
    auth.assert_async().await;
    storage.assert_async().await;
    complete.assert_async().await;
    uploads.assert_async().await;

    assert_eq!(image.transport, TransportKind::DirectStorage);
    assert_eq!(image.object_name.as_deref(), Some("products/big-9f.png"));
    assert!(has_event(&events, |e| matches!(
        e,
        UploadEvent::TransportSelected { kind: TransportKind::DirectStorage, warning: Some(_) }
    )));
    assert_eq!(notices(&events, NoticeLevel::Warning).len(), 1);
    assert!(has_event(&events, |e| matches!(e, UploadEvent::GalleryUpdated { total: 0, .. })));
}

#[tokio::test]
async fn auth_refusal_sends_no_bytes_and_resets() {
    let mut server = mockito::Server::new_async().await;
    let _auth = server
        .mock("POST", "/api/upload/auth")
        .with_status(200)
        .with_body(r#"{"success": false, "error": "Storage not configured"}"#)
        .create_async()
        .await;
    let storage = server
        .mock("POST", mockito::Matcher::Regex("^/storage".to_string()))
        .expect(0)
        .create_async()
        .await;
    let uploads = server
        .mock("GET", "/uploads")
        .expect(0)
        .create_async()
        .await;

    let config = ClientConfig {
        api_url: server.url(),
        constrained_deployment: true,
        ..ClientConfig::default()
    };
    let (observer, events) = recorder();
    let orchestrator = UploadOrchestrator::from_config(&config, observer).unwrap();

    orchestrator
        .select_file(CandidateFile::from_bytes("big.png", "image/png", vec![7u8; 6 * MIB]))
        .unwrap();
    let err = orchestrator.upload().await.unwrap_err();

    storage.assert_async().await;
    uploads.assert_async().await;

    assert_eq!(err, UploadError::Auth("Storage not configured".to_string()));
    assert_eq!(orchestrator.state(), UploadState::Idle);
    assert_eq!(notices(&events, NoticeLevel::Error).len(), 1);
    assert!(notices(&events, NoticeLevel::Success).is_empty());
    let seen = states(&events);
    assert_eq!(
        &seen[seen.len() - 2..],
        &[UploadState::Failed, UploadState::Idle]
    );
    assert!(has_event(&events, |e| matches!(e, UploadEvent::Reset)));
}

// ---------------------------------------------------------------------------
// Session behaviour with in-process transports
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancellation_mid_upload_resets_without_gallery_refresh() {
    let h = harness(Behavior::WaitForCancel);
    h.orchestrator.select_file(jpeg(1024)).unwrap();

    let task = tokio::spawn({
        let orchestrator = h.orchestrator.clone();
        async move { orchestrator.upload().await }
    });

    h.backend.started.notified().await;
    assert_eq!(h.orchestrator.state(), UploadState::Uploading);
    assert_eq!(h.orchestrator.current_transport(), Some(TransportKind::Backend));
    assert!(h.orchestrator.cancel());

    let result = task.await.unwrap();
    assert_eq!(result, Err(UploadError::Cancelled));
    assert_eq!(h.orchestrator.state(), UploadState::Idle);
    assert_eq!(h.gallery.calls(), 0);
    assert!(notices(&h.events, NoticeLevel::Success).is_empty());
    assert_eq!(notices(&h.events, NoticeLevel::Info), vec!["Upload cancelled"]);
    assert!(states(&h.events).contains(&UploadState::Cancelled));
}

#[tokio::test]
async fn cancel_during_conversion_skips_transport() {
    let h = reentrant_harness(Behavior::Succeed, |orchestrator, event| {
        if matches!(event, UploadEvent::StateChanged(UploadState::Converting)) {
            assert!(orchestrator.cancel());
        }
    });
    h.orchestrator.set_options(UploadOptions {
        convert: Some(Quality::new(80).unwrap()),
        constrained: None,
    });
    h.orchestrator
        .select_file(CandidateFile::from_bytes("tiny.png", "image/png", png_image()))
        .unwrap();

    assert_eq!(h.orchestrator.upload().await, Err(UploadError::Cancelled));
    assert_eq!(h.orchestrator.state(), UploadState::Idle);
    assert_eq!(h.backend.calls(), 0);
    assert_eq!(h.direct.calls(), 0);
    assert_eq!(h.gallery.calls(), 0);
    assert!(!has_event(&h.events, |e| matches!(e, UploadEvent::Converted { .. })));

    let seen = states(&h.events);
    assert!(seen.contains(&UploadState::Converting));
    assert_eq!(&seen[seen.len() - 2..], &[UploadState::Cancelled, UploadState::Idle]);
}

#[tokio::test]
async fn selection_is_refused_until_terminal_state_resets() {
    let attempt: Arc<Mutex<Option<Result<(), UploadError>>>> = Arc::new(Mutex::new(None));
    let h = reentrant_harness(Behavior::Succeed, {
        let attempt = attempt.clone();
        move |orchestrator, event| {
            if matches!(event, UploadEvent::StateChanged(UploadState::Succeeded)) {
                let next = CandidateFile::from_bytes("next.png", "image/png", vec![1u8; 64]);
                *attempt.lock().unwrap() = Some(orchestrator.select_file(next));
            }
        }
    });
    h.orchestrator.select_file(jpeg(1024)).unwrap();

    assert!(h.orchestrator.upload().await.is_ok());
    assert_eq!(
        attempt.lock().unwrap().clone(),
        Some(Err(UploadError::AlreadyInProgress))
    );
    assert_eq!(h.orchestrator.state(), UploadState::Idle);
    assert!(h.orchestrator.selected_file().is_none());

    h.orchestrator
        .select_file(CandidateFile::from_bytes("next.png", "image/png", vec![1u8; 64]))
        .unwrap();
    assert_eq!(h.orchestrator.state(), UploadState::FileSelected);
}

#[tokio::test]
async fn second_upload_while_in_flight_is_a_no_op() {
    let h = harness(Behavior::WaitForRelease);
    h.orchestrator.select_file(jpeg(1024)).unwrap();

    let task = tokio::spawn({
        let orchestrator = h.orchestrator.clone();
        async move { orchestrator.upload().await }
    });
    h.backend.started.notified().await;

    assert_eq!(h.orchestrator.upload().await, Err(UploadError::AlreadyInProgress));
    h.orchestrator
        .handle(InputEvent::KeyPressed(Key::Enter))
        .await
        .unwrap();
    assert_eq!(h.orchestrator.state(), UploadState::Uploading);

    h.backend.release.notify_one();
    assert!(task.await.unwrap().is_ok());
    assert_eq!(h.backend.calls(), 1);
    assert_eq!(h.gallery.calls(), 1);
}

#[tokio::test]
async fn transport_failure_leaves_gallery_untouched() {
    let h = harness(Behavior::Fail(TransportError::Rejected("quota exceeded".to_string())));
    h.orchestrator.select_file(jpeg(1024)).unwrap();

    let err = h.orchestrator.upload().await.unwrap_err();
    assert_eq!(err, UploadError::Rejected("quota exceeded".to_string()));
    assert_eq!(notices(&h.events, NoticeLevel::Error), vec!["quota exceeded"]);
    assert_eq!(h.gallery.calls(), 0);
    assert_eq!(h.orchestrator.state(), UploadState::Idle);
}

#[tokio::test]
async fn upload_without_selection() {
    let h = harness(Behavior::Succeed);
    assert_eq!(h.orchestrator.upload().await, Err(UploadError::NoFileSelected));
    assert_eq!(h.backend.calls(), 0);
}

#[tokio::test]
async fn invalid_media_type_is_rejected_locally() {
    let h = harness(Behavior::Succeed);
    let err = h
        .orchestrator
        .select_file(CandidateFile::from_bytes("notes.txt", "text/plain", vec![1u8; 10]))
        .unwrap_err();

    assert!(matches!(err, UploadError::Validation(_)));
    assert_eq!(h.orchestrator.state(), UploadState::Idle);
    assert_eq!(notices(&h.events, NoticeLevel::Error).len(), 1);
}

#[tokio::test]
async fn conversion_replaces_file_with_webp() {
    let h = harness(Behavior::Succeed);
    h.orchestrator.set_options(UploadOptions {
        convert: Some(Quality::new(80).unwrap()),
        constrained: None,
    });
    h.orchestrator
        .select_file(CandidateFile::from_bytes("tiny.png", "image/png", png_image()))
        .unwrap();

    h.orchestrator.upload().await.unwrap();

    let (name, media_type, _) = h.backend.last_received();
    assert_eq!(name, "tiny.webp");
    assert_eq!(media_type, "image/webp");
    assert!(has_event(&h.events, |e| matches!(e, UploadEvent::Converted { .. })));
    assert!(states(&h.events).contains(&UploadState::Converting));
}

#[tokio::test]
async fn conversion_failure_uploads_original() {
    let h = harness(Behavior::Succeed);
    h.orchestrator.set_options(UploadOptions {
        convert: Some(Quality::new(80).unwrap()),
        constrained: None,
    });
    h.orchestrator
        .select_file(CandidateFile::from_bytes("broken.png", "image/png", &b"definitely not a png"[..]))
        .unwrap();

    let image = h.orchestrator.upload().await.unwrap();

    assert_eq!(image.filename, "broken.png");
    assert_eq!(
        h.backend.last_received(),
        ("broken.png".to_string(), "image/png".to_string(), 20)
    );
    assert_eq!(notices(&h.events, NoticeLevel::Warning).len(), 1);
    assert!(!has_event(&h.events, |e| matches!(e, UploadEvent::Converted { .. })));
}

#[tokio::test]
async fn files_above_conversion_ceiling_skip_conversion() {
    let mut config = ClientConfig::default();
    config.policy.max_conversion_size_bytes = 8;
    let h = harness_with(config, Behavior::Succeed, FakeGallery::new(Vec::new()));
    h.orchestrator.set_options(UploadOptions {
        convert: Some(Quality::new(50).unwrap()),
        constrained: None,
    });
    h.orchestrator
        .select_file(CandidateFile::from_bytes("large.png", "image/png", vec![1u8; 64]))
        .unwrap();

    h.orchestrator.upload().await.unwrap();

    assert_eq!(h.backend.last_received().0, "large.png");
    let warnings = notices(&h.events, NoticeLevel::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("without conversion"));
}

#[tokio::test]
async fn constrained_override_selects_direct_transport() {
    let mut config = ClientConfig::default();
    config.policy.backend_limit_bytes = 100;
    let h = harness_with(config, Behavior::Succeed, FakeGallery::new(Vec::new()));
    h.orchestrator.set_options(UploadOptions {
        convert: None,
        constrained: Some(true),
    });
    h.orchestrator.select_file(jpeg(101)).unwrap();

    let image = h.orchestrator.upload().await.unwrap();
    assert_eq!(image.transport, TransportKind::DirectStorage);
    assert_eq!(h.direct.calls(), 1);
    assert_eq!(h.backend.calls(), 0);
}

#[tokio::test]
async fn gallery_failure_does_not_fail_upload() {
    let h = harness_with(ClientConfig::default(), Behavior::Succeed, FakeGallery::failing());
    h.orchestrator.select_file(jpeg(1024)).unwrap();

    assert!(h.orchestrator.upload().await.is_ok());
    assert!(has_event(&h.events, |e| matches!(e, UploadEvent::GalleryFailed(_))));
    assert_eq!(h.orchestrator.state(), UploadState::Idle);
}

#[tokio::test]
async fn milestones_are_reported_once() {
    let h = harness(Behavior::Succeed);
    h.orchestrator.select_file(jpeg(1000)).unwrap();
    h.orchestrator.upload().await.unwrap();

    let milestones: Vec<_> = h
        .events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            UploadEvent::Milestone(m) => Some(*m),
            _ => None,
        })
        .collect();
    assert_eq!(
        milestones,
        vec![
            pixdrop_core::ProgressMilestone::Half,
            pixdrop_core::ProgressMilestone::NearComplete
        ]
    );
}

// ---------------------------------------------------------------------------
// Input dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn escape_drops_selected_file() {
    let h = harness(Behavior::Succeed);
    h.orchestrator
        .handle(InputEvent::SelectFile(jpeg(10)))
        .await
        .unwrap();
    assert_eq!(h.orchestrator.state(), UploadState::FileSelected);

    h.orchestrator
        .handle(InputEvent::KeyPressed(Key::Escape))
        .await
        .unwrap();
    assert_eq!(h.orchestrator.state(), UploadState::Idle);
    assert!(h.orchestrator.selected_file().is_none());
    assert!(has_event(&h.events, |e| matches!(e, UploadEvent::Reset)));
}

#[tokio::test]
async fn enter_uploads_only_with_a_selection() {
    let h = harness(Behavior::Succeed);
    h.orchestrator
        .handle(InputEvent::KeyPressed(Key::Enter))
        .await
        .unwrap();
    assert_eq!(h.backend.calls(), 0);

    h.orchestrator
        .handle(InputEvent::SelectFile(jpeg(10)))
        .await
        .unwrap();
    h.orchestrator
        .handle(InputEvent::KeyPressed(Key::Enter))
        .await
        .unwrap();
    assert_eq!(h.backend.calls(), 1);
}

#[tokio::test]
async fn refresh_and_search_filter_the_gallery() {
    let items = vec![
        GalleryItem {
            filename: "Cat.png".to_string(),
            url: "https://cdn.example/products/cat.png".to_string(),
            timestamp: None,
        },
        GalleryItem {
            filename: "dog.webp".to_string(),
            url: "https://cdn.example/products/dog.webp".to_string(),
            timestamp: None,
        },
    ];
    let h = harness_with(ClientConfig::default(), Behavior::Succeed, FakeGallery::new(items));

    h.orchestrator.handle(InputEvent::Refresh).await.unwrap();
    assert_eq!(h.orchestrator.gallery_items().len(), 2);

    h.orchestrator
        .handle(InputEvent::Search("CAT".to_string()))
        .await
        .unwrap();
    let visible = h.orchestrator.gallery_items();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].filename, "Cat.png");
    assert!(has_event(&h.events, |e| matches!(
        e,
        UploadEvent::GalleryUpdated { items, total: 2 } if items.len() == 1
    )));
}
