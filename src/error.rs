use std::path::PathBuf;

use thiserror::Error;

use crate::path::PathError;
use crate::validate::PathValidationIssue;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid SVG: {0}")]
    InvalidSvg(String),

    #[error("Invalid path data: {0}")]
    InvalidPath(#[from] PathError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error(
        "Path data in {} is {} bytes, over the {} byte limit ({})",
        file.display(),
        issue.byte_length,
        crate::validate::CRITICAL_BYTE_THRESHOLD,
        issue.path_id
    )]
    PathTooLong {
        file: PathBuf,
        issue: PathValidationIssue,
    },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
