//! # doc2json
//!
//! Two small utilities for getting documents into a structured-parsing
//! pipeline:
//!
//! * [`ParseClient`] — upload local files to a file-parsing service as a
//!   single multipart POST and get the decoded JSON result back (text,
//!   tables, formulas, images: whatever the service extracted).
//! * [`Converter`] — shell out to LibreOffice to convert legacy binary
//!   documents (`.doc`) into the modern XML format (`.docx`) so they can
//!   be uploaded in the first place.
//!
//! The two are independent: the client never invokes the converter.
//!
//! ## Data Flow
//!
//! ```text
//! report.doc ──▶ Converter (soffice --headless) ──▶ report.docx
//!
//! report.pdf ─┐
//! report.docx ├──▶ ParseClient (multipart POST) ──▶ JSON result
//! notes.md   ─┘        http://localhost:8008/file_parse
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2json::{ClientConfig, ParseClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ParseClient::new(ClientConfig::default())?;
//!
//!     if !client.test_connection().await {
//!         eprintln!("parsing service is not reachable");
//!         return Ok(());
//!     }
//!
//!     match client.parse(&["report.pdf", "notes.md"]).await? {
//!         Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
//!         None => eprintln!("service failed — see logs"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Semantics
//!
//! Structural misuse (empty file list, missing file, path that is not a
//! regular file) raises [`Doc2JsonError`]. Environmental failures (timeout,
//! refused connection, non-200 status, malformed body, failed conversion
//! command) never raise from `parse`, `parse_single`, `convert`, or
//! `test_connection`; they are logged and collapse to an absence value so
//! batch callers can keep going. See [`error`] for the rationale.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2json` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! doc2json = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod mime;
pub mod upload;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::ParseClient;
pub use config::{
    ClientConfig, ClientConfigBuilder, ConvertConfig, ParseParams, DEFAULT_BASE_URL,
    DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
};
pub use convert::{ConvertRunner, Converter, SofficeRunner};
pub use error::{Doc2JsonError, ServiceFailure};
pub use mime::infer_mime;
pub use upload::{UploadEntry, FILE_FIELD};
