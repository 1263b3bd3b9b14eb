//! Error classification shared by every layer.
//!
//! Each typed error carries a grepable code and a retryable flag so route
//! handlers can decide whether to surface, log, or ignore a failure.

/// Grepable error code and retryable flag for structured logging.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
