//! Extension → MIME lookup for upload parts.

use std::ffi::OsStr;
use std::path::Path;

/// MIME type reported when the extension is unknown or missing.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Infer a MIME type from the file extension, case-insensitively.
///
/// Pure and total: every input maps to some type, unrecognised extensions
/// fall back to [`OCTET_STREAM`]. The table covers exactly the document
/// formats the parsing service accepts.
pub fn infer_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("ppt") => "application/vnd.ms-powerpoint",
        Some("pptx") => {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        }
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("html") | Some("htm") => "text/html",
        _ => OCTET_STREAM,
    }
}
