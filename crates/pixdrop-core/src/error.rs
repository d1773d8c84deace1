//! Error reporting metadata
//!
//! Every error type in the workspace (validation, re-encoding, transports,
//! gallery, orchestration) describes how it should be reported through
//! [`ErrorMetadata`]. The concrete error enums live next to the code that
//! raises them; this module only fixes the reporting contract.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected outcomes like validation failures or user cancellation
    Debug,
    /// Warning level - for recoverable issues like a failed conversion
    Warn,
    /// Error level - for failed uploads
    Error,
}

/// Metadata for error reporting - defines how an error should be presented
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "AUTH_ERROR")
    fn error_code(&self) -> &'static str;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;

    /// Whether the user can simply re-initiate the same operation
    fn is_recoverable(&self) -> bool;

    /// Message shown to the user (may differ from the `Display` output)
    fn user_message(&self) -> String;
}

/// Emit a tracing event for `err` at the level it asks for.
pub fn log_error<E>(err: &E, context: &str)
where
    E: ErrorMetadata + std::fmt::Display,
{
    match err.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error_code = err.error_code(), error = %err, "{}", context)
        }
        LogLevel::Warn => {
            tracing::warn!(error_code = err.error_code(), error = %err, "{}", context)
        }
        LogLevel::Error => {
            tracing::error!(error_code = err.error_code(), error = %err, "{}", context)
        }
    }
}
