//! Error types for the doc2json library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Doc2JsonError`] — **Raised**: the caller misused the API (empty file
//!   list, nonexistent path, bad configuration). Returned as
//!   `Err(Doc2JsonError)` from the top-level operations.
//!
//! * [`ServiceFailure`] — **Normalised**: the environment or the remote
//!   service failed (timeout, connection refused, non-200 status, malformed
//!   body, conversion command failure). These are logged and collapse into
//!   an absence value (`Ok(None)`) so batch-oriented callers can keep
//!   processing other items without error-handling boilerplate.
//!
//! The asymmetry is deliberate: structural misuse of the API signals loudly;
//! environmental failures degrade gracefully.

use std::path::PathBuf;
use thiserror::Error;

/// All caller-visible errors raised by the doc2json library.
///
/// Environmental/service failures use [`ServiceFailure`] and are logged
/// rather than propagated here.
#[derive(Debug, Error)]
pub enum Doc2JsonError {
    /// The path collection handed to `parse` was empty.
    #[error("no input files given: the file list must not be empty")]
    InvalidInput,

    /// An input file was not found at the given path.
    #[error("file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// An input path exists but is not a regular file (directory, socket, …).
    #[error("not a regular file: '{path}'")]
    NotAFile { path: PathBuf },

    /// Builder validation or HTTP client construction failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not create or write the output JSON file.
    #[error("failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A failure of the environment or the remote service.
///
/// Never returned to callers: the client logs one line identifying the
/// failure and yields `None` instead. Response bodies embedded in the
/// diagnostics are truncated before logging so a misbehaving service
/// cannot flood the logs.
#[derive(Debug, Error)]
pub enum ServiceFailure {
    /// The parse request exceeded the configured timeout.
    #[error("request timed out after {secs}s")]
    NetworkTimeout { secs: u64 },

    /// Could not reach the service at all (connection refused, DNS, …).
    #[error("connection to '{url}' failed: {reason}\nCheck the service is running.")]
    NetworkUnreachable { url: String, reason: String },

    /// The service answered with a non-200 status.
    #[error("service returned HTTP {status}: {body}")]
    BadResponseStatus { status: u16, body: String },

    /// The service answered 200 but the body was not valid JSON.
    #[error("response body is not valid JSON ({detail}): {body}")]
    MalformedResponseBody { detail: String, body: String },

    /// The external conversion command failed or produced no output file.
    #[error("conversion of '{path}' failed: {detail}")]
    ConversionFailed { path: PathBuf, detail: String },

    /// Anything else that went wrong while building or sending the request.
    #[error("request failed: {detail}")]
    RequestFailed { detail: String },
}
