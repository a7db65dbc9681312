//! Converter invocation helper: legacy `.doc` → `.docx` via LibreOffice.
//!
//! A thin wrapper over one external command:
//!
//! ```text
//! soffice --headless --convert-to docx <input> --outdir <input's directory>
//! ```
//!
//! The command runs synchronously with no timeout; LibreOffice is trusted
//! to terminate. A zero exit status alone is never treated as success: the
//! helper also verifies the expected output file exists, because `soffice`
//! has been observed to exit 0 while silently producing nothing (missing
//! import filter, profile lock).
//!
//! ## Injectable runner
//!
//! The subprocess is behind the [`ConvertRunner`] trait so tests can
//! substitute a fake that fabricates exit statuses and output files without
//! a LibreOffice installation.

use crate::config::ConvertConfig;
use crate::error::{Doc2JsonError, ServiceFailure};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Executes the external conversion command.
///
/// Implementations must be `Send + Sync`; the production implementation is
/// [`SofficeRunner`].
pub trait ConvertRunner: Send + Sync {
    /// Run the conversion of `input` into `target` format, writing into
    /// `outdir`. Returns the child's captured output once it has exited.
    fn run(&self, input: &Path, outdir: &Path, target: &str) -> std::io::Result<Output>;
}

/// Production runner: spawns `soffice --headless`.
pub struct SofficeRunner {
    bin: String,
}

impl SofficeRunner {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl ConvertRunner for SofficeRunner {
    fn run(&self, input: &Path, outdir: &Path, target: &str) -> std::io::Result<Output> {
        debug!(
            "{} --headless --convert-to {} {} --outdir {}",
            self.bin,
            target,
            input.display(),
            outdir.display()
        );
        Command::new(&self.bin)
            .arg("--headless")
            .arg("--convert-to")
            .arg(target)
            .arg(input)
            .arg("--outdir")
            .arg(outdir)
            .output()
    }
}

/// The converter invocation helper.
///
/// # Example
/// ```rust,no_run
/// use doc2json::{ConvertConfig, Converter};
///
/// let converter = Converter::new(ConvertConfig::default());
/// match converter.convert("report.doc")? {
///     Some(path) => println!("converted to {}", path.display()),
///     None => eprintln!("conversion failed — see logs"),
/// }
/// # Ok::<(), doc2json::Doc2JsonError>(())
/// ```
pub struct Converter {
    config: ConvertConfig,
    runner: Arc<dyn ConvertRunner>,
}

impl Converter {
    /// Build a converter that spawns the configured `soffice` binary.
    pub fn new(config: ConvertConfig) -> Self {
        let runner = Arc::new(SofficeRunner::new(config.soffice_bin.clone()));
        Self { config, runner }
    }

    /// Build a converter with a caller-supplied runner (tests, sandboxes).
    pub fn with_runner(config: ConvertConfig, runner: Arc<dyn ConvertRunner>) -> Self {
        Self { config, runner }
    }

    /// Convert `input` to the configured target format, in place.
    ///
    /// The output lands next to the input: extension replaced by the target
    /// format. Synchronous; no retries, no timeout.
    ///
    /// # Returns
    /// * `Ok(Some(path))` — the command exited 0 and the output file exists.
    /// * `Ok(None)` — non-zero exit, missing output file, or spawn failure;
    ///   one log line names the failure.
    ///
    /// # Errors
    /// Raises [`Doc2JsonError::FileNotFound`] / [`Doc2JsonError::NotAFile`]
    /// when the input path itself is unusable: structural misuse, the same
    /// contract as the parsing client.
    pub fn convert(&self, input: impl AsRef<Path>) -> Result<Option<PathBuf>, Doc2JsonError> {
        let input = input.as_ref();

        let meta = std::fs::metadata(input).map_err(|_| Doc2JsonError::FileNotFound {
            path: input.to_path_buf(),
        })?;
        if !meta.is_file() {
            return Err(Doc2JsonError::NotAFile {
                path: input.to_path_buf(),
            });
        }

        let outdir = match input.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let expected = input.with_extension(&self.config.target_format);

        let output = match self.runner.run(input, &outdir, &self.config.target_format) {
            Ok(output) => output,
            Err(e) => {
                return Ok(give_up(ServiceFailure::ConversionFailed {
                    path: input.to_path_buf(),
                    detail: format!("spawning '{}': {e}", self.config.soffice_bin),
                }))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Ok(give_up(ServiceFailure::ConversionFailed {
                path: input.to_path_buf(),
                detail: format!("{}: {}", output.status, stderr.trim()),
            }));
        }

        // Exit 0 alone is not success; the output file must actually be there.
        if !expected.exists() {
            return Ok(give_up(ServiceFailure::ConversionFailed {
                path: input.to_path_buf(),
                detail: format!(
                    "command exited 0 but '{}' was not produced",
                    expected.display()
                ),
            }));
        }

        info!("converted {} -> {}", input.display(), expected.display());
        Ok(Some(expected))
    }
}

fn give_up(failure: ServiceFailure) -> Option<PathBuf> {
    error!("{failure}");
    None
}
