//! The parsing client: one multipart POST per call, decoded JSON back.
//!
//! ## Failure model
//!
//! `parse` distinguishes two kinds of failure (see [`crate::error`]):
//! structural misuse raises [`Doc2JsonError`] before any network traffic;
//! everything environmental (timeout, refused connection, non-200 status,
//! a body that isn't JSON) is logged once and collapsed to `Ok(None)`.
//! Callers iterating a batch of documents can therefore write
//! `if let Some(result) = client.parse(&files).await? { … }` and move on,
//! while an empty list or a typo'd path still fails loudly.
//!
//! ## Resource model
//!
//! File handles are opened during validation and owned by the request
//! being built; they are closed by drop on every exit path. The underlying
//! [`reqwest::Client`] is constructed once with the configured timeout and
//! may be shared across tasks.

use crate::config::ClientConfig;
use crate::error::{Doc2JsonError, ServiceFailure};
use crate::upload::{self, UploadEntry, FILE_FIELD};
use reqwest::multipart::Form;
use reqwest::StatusCode;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info};

/// Response bodies quoted in diagnostics are cut to this many bytes.
const BODY_SNIPPET_LEN: usize = 500;

/// Sub-path stripped off `base_url` for the reachability probe.
const PARSE_SUBPATH: &str = "/file_parse";

/// Client for the file-parsing service.
///
/// # Example
/// ```rust,no_run
/// use doc2json::{ClientConfig, ParseClient};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ParseClient::new(ClientConfig::default())?;
/// if let Some(result) = client.parse_single("report.pdf").await? {
///     println!("{result}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ParseClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl ParseClient {
    /// Build a client from the given configuration.
    ///
    /// The HTTP transport is constructed here, once, with the configured
    /// request timeout; construction failure is a configuration error.
    pub fn new(config: ClientConfig) -> Result<Self, Doc2JsonError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Doc2JsonError::InvalidConfig(format!("building HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Upload `paths` to the parsing service and return the decoded response.
    ///
    /// # Returns
    /// * `Ok(Some(value))` — HTTP 200 with a JSON body, returned unchanged.
    /// * `Ok(None)` — the service or the network failed; one log line names
    ///   the failure.
    ///
    /// # Errors
    /// Raises only for structural misuse: empty `paths`, a nonexistent
    /// path, or a path that is not a regular file. No network call is made
    /// in any of those cases.
    pub async fn parse<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Result<Option<Value>, Doc2JsonError> {
        let entries = upload::prepare_entries(paths).await?;
        info!(
            "parsing {} file(s) via {}",
            entries.len(),
            self.config.base_url
        );

        let form = match self.build_form(entries).await {
            Ok(form) => form,
            Err(failure) => return Ok(give_up(failure)),
        };

        let response = match self
            .http
            .post(&self.config.base_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return Ok(give_up(self.classify_send_error(e))),
        };

        let status = response.status();
        debug!("service answered HTTP {status}");

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                return Ok(give_up(ServiceFailure::RequestFailed {
                    detail: format!("reading response body: {e}"),
                }))
            }
        };

        if status != StatusCode::OK {
            return Ok(give_up(ServiceFailure::BadResponseStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            }));
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(value) => {
                info!("parse succeeded");
                Ok(Some(value))
            }
            Err(e) => Ok(give_up(ServiceFailure::MalformedResponseBody {
                detail: e.to_string(),
                body: truncate_body(&body),
            })),
        }
    }

    /// Convenience: parse a single file. Equivalent to `parse(&[path])`.
    pub async fn parse_single(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Option<Value>, Doc2JsonError> {
        self.parse(std::slice::from_ref(&path)).await
    }

    /// Synchronous wrapper around [`ParseClient::parse`].
    ///
    /// Creates a temporary tokio runtime internally; do not call from
    /// within an async context.
    pub fn parse_sync<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Result<Option<Value>, Doc2JsonError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| Doc2JsonError::Internal(format!("failed to create tokio runtime: {e}")))?
            .block_on(self.parse(paths))
    }

    /// Parse and write the pretty-printed JSON result to `output_path`.
    ///
    /// Uses atomic write (temp file + rename) to prevent partial files.
    /// Returns `Ok(true)` when a result was written, `Ok(false)` when the
    /// service yielded nothing (already logged by [`ParseClient::parse`]).
    pub async fn parse_to_file<P: AsRef<Path>>(
        &self,
        paths: &[P],
        output_path: impl AsRef<Path>,
    ) -> Result<bool, Doc2JsonError> {
        let Some(value) = self.parse(paths).await? else {
            return Ok(false);
        };

        let path = output_path.as_ref();
        let rendered = serde_json::to_string_pretty(&value)
            .map_err(|e| Doc2JsonError::Internal(format!("serialising result: {e}")))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Doc2JsonError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &rendered).await.map_err(|e| {
            Doc2JsonError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
            Doc2JsonError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            }
        })?;

        info!("wrote parse result to {}", path.display());
        Ok(true)
    }

    /// Probe whether the service is reachable.
    ///
    /// Issues a GET against the endpoint base (with the `/file_parse`
    /// sub-path stripped) bounded by the probe timeout. `true` iff the
    /// service answers HTTP 200; every failure is `false` and logged at
    /// debug level. This method never raises.
    pub async fn test_connection(&self) -> bool {
        let url = self.health_url();
        let result = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(self.config.probe_timeout_secs))
            .send()
            .await;

        match result {
            Ok(r) => r.status() == StatusCode::OK,
            Err(e) => {
                debug!("connection probe to '{url}' failed: {e}");
                false
            }
        }
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    /// Assemble the multipart body: fixed form fields, then one `files`
    /// part per entry in input order.
    async fn build_form(&self, entries: Vec<UploadEntry>) -> Result<Form, ServiceFailure> {
        let mut form = Form::new();
        for (name, value) in self.config.params.form_fields() {
            form = form.text(name, value);
        }
        for entry in entries {
            form = form.part(FILE_FIELD, entry.into_part().await?);
        }
        Ok(form)
    }

    fn classify_send_error(&self, e: reqwest::Error) -> ServiceFailure {
        if e.is_timeout() {
            ServiceFailure::NetworkTimeout {
                secs: self.config.timeout_secs,
            }
        } else if e.is_connect() {
            ServiceFailure::NetworkUnreachable {
                url: self.config.base_url.clone(),
                reason: e.to_string(),
            }
        } else {
            ServiceFailure::RequestFailed {
                detail: e.to_string(),
            }
        }
    }

    /// URL for the reachability probe: `base_url` minus the parse sub-path.
    fn health_url(&self) -> String {
        self.config
            .base_url
            .strip_suffix(PARSE_SUBPATH)
            .filter(|base| !base.is_empty())
            .unwrap_or(&self.config.base_url)
            .to_string()
    }
}

/// Log a normalised failure and yield the absence value.
fn give_up(failure: ServiceFailure) -> Option<Value> {
    error!("{failure}");
    None
}

/// Cut `body` to [`BODY_SNIPPET_LEN`] bytes on a char boundary.
fn truncate_body(body: &str) -> String {
    if body.len() <= BODY_SNIPPET_LEN {
        return body.to_string();
    }
    let mut end = BODY_SNIPPET_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}
