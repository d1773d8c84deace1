//! Byte-level progress for request bodies.

use bytes::Bytes;
use futures::Stream;
use pixdrop_core::TransferProgress;
use std::fmt;
use std::sync::Arc;

/// Size of the chunks a body is handed to the HTTP client in.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Cloneable sink for [`TransferProgress`] updates.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Arc<dyn Fn(TransferProgress) + Send + Sync>,
}

impl ProgressReporter {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(TransferProgress) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// A reporter that discards every update.
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    pub fn report(&self, progress: TransferProgress) {
        (self.callback)(progress)
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter").finish_non_exhaustive()
    }
}

/// Split `data` into chunks, reporting cumulative bytes as each chunk is handed over.
pub fn progress_stream(
    data: Bytes,
    reporter: ProgressReporter,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    let total = data.len() as u64;
    futures::stream::unfold((data, 0u64), move |(mut remaining, sent)| {
        let reporter = reporter.clone();
        async move {
            if remaining.is_empty() {
                return None;
            }
            let take = remaining.len().min(CHUNK_SIZE);
            let chunk = remaining.split_to(take);
            let sent = sent + take as u64;
            reporter.report(TransferProgress::new(sent, total));
            Some((Ok::<Bytes, std::io::Error>(chunk), (remaining, sent)))
        }
    })
}

/// Streaming request body with progress reporting.
pub fn progress_body(data: Bytes, reporter: ProgressReporter) -> reqwest::Body {
    reqwest::Body::wrap_stream(progress_stream(data, reporter))
}
