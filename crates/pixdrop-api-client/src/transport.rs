//! Upload transport abstraction and selection.

use async_trait::async_trait;
use bytes::Bytes;
use pixdrop_core::{format_file_size, CandidateFile, TransportKind, UploadPolicy, UploadedImage};
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::progress::ProgressReporter;

/// One way of getting a file's bytes to the server.
///
/// Implementations abort their in-flight body transfer when `cancel` fires
/// and resolve to [`TransportError::Cancelled`].
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Upload `data` (the payload of `file`) and return the public URL.
    async fn upload(
        &self,
        file: &CandidateFile,
        data: Bytes,
        progress: ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<UploadedImage, TransportError>;
}

/// Outcome of transport selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportChoice {
    pub kind: TransportKind,
    /// Set when the choice carries a risk the user should hear about.
    pub warning: Option<String>,
}

/// Picks the transport from the file size and deployment mode.
///
/// | size vs limit | constrained | transport |
/// |---|---|---|
/// | ≤ limit | any | Backend |
/// | > limit | false | Backend |
/// | > limit | true | DirectStorage (with warning) |
#[derive(Debug, Clone, Copy)]
pub struct TransportSelector {
    backend_limit_bytes: u64,
}

impl TransportSelector {
    pub fn new(backend_limit_bytes: u64) -> Self {
        Self {
            backend_limit_bytes,
        }
    }

    pub fn from_policy(policy: &UploadPolicy) -> Self {
        Self::new(policy.backend_limit_bytes)
    }

    pub fn backend_limit_bytes(&self) -> u64 {
        self.backend_limit_bytes
    }

    /// `already_compact` only affects the wording of the warning.
    pub fn select(
        &self,
        file_size: u64,
        deployment_is_constrained: bool,
        already_compact: bool,
    ) -> TransportChoice {
        if file_size <= self.backend_limit_bytes || !deployment_is_constrained {
            return TransportChoice {
                kind: TransportKind::Backend,
                warning: None,
            };
        }

        let mut warning = format!(
            "The file ({}) exceeds the {} server limit and will be uploaded directly to storage; \
             this may fail if the storage endpoint blocks cross-origin requests.",
            format_file_size(file_size),
            format_file_size(self.backend_limit_bytes)
        );
        if !already_compact {
            warning.push_str(" Converting the image to WebP may bring it under the limit.");
        }

        TransportChoice {
            kind: TransportKind::DirectStorage,
            warning: Some(warning),
        }
    }
}
