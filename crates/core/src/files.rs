//! Archived files and upload limits.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};

/// Largest accepted upload (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Content types accepted for customer and library media.
pub const ACCEPTED_MEDIA_PREFIXES: &[&str] = &["image/", "video/"];

/// Content type of generated reports.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Path tag prefix under which generated reports are archived.
pub const REPORTS_PATH: &str = "reports";

/// Metadata of a stored file. The bytes are fetched separately by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: EntityId,
    pub name: String,
    /// Slash-separated grouping tag, e.g. `reports/tasks`.
    pub path: String,
    pub content_type: String,
    pub size: u64,
    pub sha256: String,
    pub created_at: Timestamp,
}

/// Reject empty, oversized, or non-media uploads.
pub fn validate_upload(size: u64, content_type: &str) -> Result<(), CoreError> {
    if size == 0 {
        return Err(CoreError::File("File is empty or unreadable".to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(CoreError::FileTooLarge(format!(
            "File is {size} bytes; the limit is {MAX_UPLOAD_BYTES} bytes"
        )));
    }
    if !ACCEPTED_MEDIA_PREFIXES
        .iter()
        .any(|p| content_type.starts_with(p))
    {
        return Err(CoreError::File(format!(
            "Unsupported content type '{content_type}'"
        )));
    }
    Ok(())
}

/// Longest accepted file name, in characters.
pub const MAX_FILE_NAME_LENGTH: usize = 255;

/// Validate an uploaded file name, returning it trimmed.
///
/// Control characters are rejected since the name is echoed back in the
/// `Content-Disposition` header on download.
pub fn validate_file_name(name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("File name cannot be empty".to_string()));
    }
    if name.chars().any(char::is_control) {
        return Err(CoreError::Validation(
            "File name cannot contain control characters".to_string(),
        ));
    }
    if name.chars().count() > MAX_FILE_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "File name exceeds maximum length of {MAX_FILE_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}

/// Validate the path tag of a user upload, returning it normalized.
///
/// The `reports` tree holds generated reports only.
pub fn validate_upload_path(path: &str) -> Result<String, CoreError> {
    let path = normalize_path(path);
    if path_matches(&path, REPORTS_PATH) {
        return Err(CoreError::Validation(format!(
            "Uploads cannot be stored under '{REPORTS_PATH}'"
        )));
    }
    Ok(path)
}

/// Normalize a path tag: trim slashes and whitespace, collapse empty segments.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether `path` is `prefix` or nested below it.
pub fn path_matches(path: &str, prefix: &str) -> bool {
    let prefix = normalize_path(prefix);
    prefix.is_empty()
        || path == prefix
        || path
            .strip_prefix(&prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}
