//! Configuration types for the parsing client and the converter helper.
//!
//! All client behaviour is controlled through [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. Keeping every knob in one immutable struct makes
//! it trivial to share a client across tasks and to diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: typed parameters over an opaque map
//! The parsing service takes a bag of string form fields. They are modelled
//! here as the typed [`ParseParams`] struct so defaults live in one place and
//! a typo in a field name is a compile error, not a silently ignored toggle.
//! The wire rendering (`"true"`, `"99999"`, …) happens in
//! [`ParseParams::form_fields`].

use crate::error::Doc2JsonError;
use serde::{Deserialize, Serialize};

/// Default endpoint of the file-parsing service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8008/file_parse";

/// Default per-request timeout for `parse` calls, in seconds.
///
/// Parsing a large scanned document server-side can take minutes; six
/// minutes matches the service's own worst-case budget.
pub const DEFAULT_TIMEOUT_SECS: u64 = 360;

/// Default timeout for the lightweight reachability probe, in seconds.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Configuration for a [`crate::ParseClient`].
///
/// Built via [`ClientConfig::builder()`] or [`ClientConfig::default()`].
/// Immutable once constructed.
///
/// # Example
/// ```rust
/// use doc2json::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("http://parse.internal:8008/file_parse")
///     .timeout_secs(120)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint the multipart parse request is POSTed to.
    pub base_url: String,

    /// Per-parse-request timeout in seconds. Default: 360.
    pub timeout_secs: u64,

    /// Timeout for [`crate::ParseClient::test_connection`] in seconds. Default: 5.
    pub probe_timeout_secs: u64,

    /// Form fields sent with every parse request.
    pub params: ParseParams,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            params: ParseParams::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs.max(1);
        self
    }

    pub fn probe_timeout_secs(mut self, secs: u64) -> Self {
        self.config.probe_timeout_secs = secs.max(1);
        self
    }

    pub fn params(mut self, params: ParseParams) -> Self {
        self.config.params = params;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, Doc2JsonError> {
        let c = &self.config;
        if c.base_url.trim().is_empty() {
            return Err(Doc2JsonError::InvalidConfig(
                "base_url must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

/// The fixed form-field set the parsing service expects with every request.
///
/// Field names match the service's wire names one-to-one; defaults match
/// the service's documented defaults. Booleans and numbers are rendered as
/// strings because the service consumes text form fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseParams {
    pub return_middle_json: bool,
    pub return_model_output: bool,
    pub return_md: bool,
    pub return_images: bool,
    pub end_page_id: u32,
    pub parse_method: String,
    pub start_page_id: u32,
    pub lang_list: String,
    pub output_dir: String,
    pub server_url: String,
    pub return_content_list: bool,
    pub backend: String,
    pub table_enable: bool,
    pub response_format_zip: bool,
    pub formula_enable: bool,
}

impl Default for ParseParams {
    fn default() -> Self {
        Self {
            return_middle_json: false,
            return_model_output: false,
            return_md: true,
            return_images: true,
            end_page_id: 99_999,
            parse_method: "auto".to_string(),
            start_page_id: 0,
            lang_list: "en".to_string(),
            output_dir: "./output".to_string(),
            server_url: "string".to_string(),
            return_content_list: false,
            backend: "pipeline".to_string(),
            table_enable: true,
            response_format_zip: false,
            formula_enable: true,
        }
    }
}

impl ParseParams {
    /// Render the parameter set as `(wire name, wire value)` pairs.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("return_middle_json", self.return_middle_json.to_string()),
            ("return_model_output", self.return_model_output.to_string()),
            ("return_md", self.return_md.to_string()),
            ("return_images", self.return_images.to_string()),
            ("end_page_id", self.end_page_id.to_string()),
            ("parse_method", self.parse_method.clone()),
            ("start_page_id", self.start_page_id.to_string()),
            ("lang_list", self.lang_list.clone()),
            ("output_dir", self.output_dir.clone()),
            ("server_url", self.server_url.clone()),
            ("return_content_list", self.return_content_list.to_string()),
            ("backend", self.backend.clone()),
            ("table_enable", self.table_enable.to_string()),
            ("response_format_zip", self.response_format_zip.to_string()),
            ("formula_enable", self.formula_enable.to_string()),
        ]
    }
}

/// Configuration for the [`crate::Converter`] helper.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Conversion command to invoke. Default: `soffice`.
    pub soffice_bin: String,

    /// Target format handed to `--convert-to`. Default: `docx`.
    pub target_format: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            soffice_bin: "soffice".to_string(),
            target_format: "docx".to_string(),
        }
    }
}
