//! Pixdrop service layer
//!
//! Hosts the upload orchestrator: the single-session state machine that ties
//! the validator and re-encoder (pixdrop-processing) to the transports and
//! gallery loader (pixdrop-api-client). UI bindings drive it through
//! [`InputEvent`]s or direct method calls and render the [`UploadEvent`]s it
//! emits; no presentation logic lives here.

pub mod error;
pub mod events;
pub mod gallery;
pub mod input;
pub mod orchestrator;
pub mod session;

pub use error::UploadError;
pub use events::{Notice, NoticeLevel, NoopObserver, ProgressTracker, UploadEvent, UploadObserver};
pub use gallery::GalleryView;
pub use input::{InputEvent, Key};
pub use orchestrator::{UploadOptions, UploadOrchestrator};
pub use session::UploadSession;

pub use pixdrop_processing::Quality;
