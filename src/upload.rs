//! Validate-and-open: turn caller paths into owned upload entries.
//!
//! ## Why own the file handles?
//!
//! Each [`UploadEntry`] exclusively owns its opened [`tokio::fs::File`].
//! Ownership is what guarantees the release-exactly-once contract: whether a
//! `parse` call succeeds, fails validation halfway through a collection, or
//! aborts mid-request, dropping the entries closes every handle on that exit
//! path with no bookkeeping.
//!
//! Validation happens strictly before any handle is opened for a given path
//! and strictly before any network traffic, so structural errors
//! ([`Doc2JsonError::InvalidInput`], [`Doc2JsonError::FileNotFound`],
//! [`Doc2JsonError::NotAFile`]) never cost a wasted upload.

use crate::error::{Doc2JsonError, ServiceFailure};
use crate::mime::infer_mime;
use reqwest::multipart::Part;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Multipart field name the parsing service expects for every file part.
pub const FILE_FIELD: &str = "files";

/// One file prepared for upload: field name is fixed ([`FILE_FIELD`]),
/// the handle is open for binary read, the MIME type comes from the
/// extension table in [`crate::mime`].
#[derive(Debug)]
pub struct UploadEntry {
    /// File name reported to the service (no directory components).
    pub file_name: String,
    /// MIME type inferred from the extension.
    pub mime: &'static str,
    file: File,
}

impl UploadEntry {
    /// Consume the entry into a multipart [`Part`].
    ///
    /// The file handle is read to the end and dropped here, closing it
    /// exactly once whether the read succeeds or not.
    pub(crate) async fn into_part(self) -> Result<Part, ServiceFailure> {
        let UploadEntry {
            file_name,
            mime,
            mut file,
        } = self;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .await
            .map_err(|e| ServiceFailure::RequestFailed {
                detail: format!("reading '{file_name}': {e}"),
            })?;
        drop(file);

        Part::bytes(buf)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| ServiceFailure::RequestFailed {
                detail: format!("building multipart part: {e}"),
            })
    }
}

/// Validate every path and open it for binary read, in input order.
///
/// # Errors
/// * [`Doc2JsonError::InvalidInput`] — `paths` is empty (checked first,
///   before touching the filesystem).
/// * [`Doc2JsonError::FileNotFound`] — a path does not exist.
/// * [`Doc2JsonError::NotAFile`] — a path exists but is not a regular file.
pub async fn prepare_entries<P: AsRef<Path>>(
    paths: &[P],
) -> Result<Vec<UploadEntry>, Doc2JsonError> {
    if paths.is_empty() {
        return Err(Doc2JsonError::InvalidInput);
    }

    let mut entries = Vec::with_capacity(paths.len());
    for p in paths {
        let path = p.as_ref();
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|_| Doc2JsonError::FileNotFound {
                path: path.to_path_buf(),
            })?;
        if !meta.is_file() {
            return Err(Doc2JsonError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)
            .await
            .map_err(|_| Doc2JsonError::FileNotFound {
                path: path.to_path_buf(),
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());

        entries.push(UploadEntry {
            file_name,
            mime: infer_mime(path),
            file,
        });
    }

    Ok(entries)
}
