use chrono::{DateTime, Utc};
use pixdrop_core::{format_file_size, time_ago, truncate_string, GalleryItem, UploadState};
use pixdrop_services::{NoticeLevel, UploadEvent, UploadObserver};
use serde::Serialize;
use std::io::Write;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| anyhow::anyhow!("Serialize response: {}", e))?;
    println!("{}", out);
    Ok(())
}

/// Render gallery items as a fixed-width table.
pub fn format_gallery_table(items: &[GalleryItem], total: usize, now: DateTime<Utc>) -> String {
    let mut out = String::from("\n=== Gallery ===\n\n");

    if total == 0 {
        out.push_str("No images uploaded yet.\n");
        return out;
    }
    out.push_str(&format!("Showing {} of {} images\n", items.len(), total));
    if items.is_empty() {
        out.push_str("\nNo images match the search.\n");
        return out;
    }

    out.push_str(&format!("\n{:<32} {:<16} {}\n", "Filename", "Uploaded", "URL"));
    out.push_str(&format!("{}\n", "-".repeat(110)));
    for item in items {
        let uploaded = item
            .timestamp
            .map(|ts| time_ago(ts, now))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<32} {:<16} {}\n",
            truncate_string(&item.filename, 32),
            uploaded,
            item.url
        ));
    }
    out
}

/// Writes orchestrator events to stderr so stdout stays machine-readable.
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl UploadObserver for ConsoleObserver {
    fn on_event(&self, event: &UploadEvent) {
        let mut err = std::io::stderr().lock();
        // Console output is best effort.
        let _ = match event {
            UploadEvent::FileSelected {
                name,
                media_type,
                size,
            } => writeln!(err, "Selected {} ({}, {})", name, media_type, format_file_size(*size)),
            UploadEvent::StateChanged(UploadState::Converting) => {
                writeln!(err, "Converting to WebP...")
            }
            UploadEvent::Converted {
                original_size,
                new_size,
                reduction_percent,
                ..
            } => writeln!(
                err,
                "Converted: {} -> {} ({:.1}% smaller)",
                format_file_size(*original_size),
                format_file_size(*new_size),
                reduction_percent
            ),
            UploadEvent::TransportSelected { kind, .. } => {
                writeln!(err, "Uploading via {}", kind)
            }
            UploadEvent::Progress { percent, .. } => {
                write!(err, "\rUploading... {:>3}%", percent).and_then(|_| {
                    if *percent == 100 {
                        writeln!(err)
                    } else {
                        err.flush()
                    }
                })
            }
            UploadEvent::Notice(notice) => {
                let label = match notice.level {
                    NoticeLevel::Info => "info",
                    NoticeLevel::Success => "ok",
                    NoticeLevel::Warning => "warning",
                    NoticeLevel::Error => "error",
                };
                writeln!(err, "[{}] {}", label, notice.text)
            }
            UploadEvent::GalleryFailed(message) => writeln!(err, "[warning] {}", message),
            _ => Ok(()),
        };
    }
}
