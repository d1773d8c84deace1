//! Data models for the upload widget
//!
//! Candidate files, upload session vocabulary, gallery items and the JSON
//! bodies exchanged with the backend endpoints.

mod api;
mod file;
mod gallery;
mod upload;

pub use api::*;
pub use file::*;
pub use gallery::*;
pub use upload::*;
