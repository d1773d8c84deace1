//! Pixdrop Core Library
//!
//! This crate provides the domain models, wire types, error metadata and
//! configuration shared by the validator, the transports, the upload
//! orchestrator and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod models;

// Re-export commonly used types
pub use config::{ClientConfig, UploadPolicy};
pub use error::{ErrorMetadata, LogLevel};
pub use format::{format_file_size, time_ago, truncate_string};
pub use models::{
    CandidateFile, GalleryItem, ProgressMilestone, TransferProgress, TransportKind,
    UploadState, UploadedImage,
};
