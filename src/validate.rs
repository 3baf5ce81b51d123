//! Path data length checks against the Android resource compiler limits.
//!
//! Lint tooling flags path strings longer than [`LINT_CHAR_THRESHOLD`]
//! characters. AAPT stores strings with a 15-bit length, so anything over
//! [`CRITICAL_BYTE_THRESHOLD`] bytes fails the build outright.

use crate::document::{SvgDocument, SvgElement};

/// Paths longer than this many characters trigger the `VectorPath` lint.
pub const LINT_CHAR_THRESHOLD: usize = 800;

/// Paths longer than this many UTF-8 bytes cannot be compiled.
pub const CRITICAL_BYTE_THRESHOLD: usize = 32_767;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathValidationIssue {
    pub path_id: String,
    pub char_length: usize,
    pub byte_length: usize,
    pub exceeds_lint: bool,
    pub exceeds_critical: bool,
}

/// Check one path string. Returns `None` when it is within both limits.
pub fn validate_path_data(path_id: &str, data: &str) -> Option<PathValidationIssue> {
    let char_length = data.chars().count();
    let byte_length = data.len();
    let exceeds_lint = char_length > LINT_CHAR_THRESHOLD;
    let exceeds_critical = byte_length > CRITICAL_BYTE_THRESHOLD;

    (exceeds_lint || exceeds_critical).then(|| PathValidationIssue {
        path_id: path_id.to_string(),
        char_length,
        byte_length,
        exceeds_lint,
        exceeds_critical,
    })
}

/// Check every path and every group clip path in the document.
///
/// Elements without an id are reported as `path[n]` or `clip-path[n]`, where
/// `n` counts paths (or clipped groups) in document order.
pub fn validate_document(doc: &SvgDocument) -> Vec<PathValidationIssue> {
    let mut walker = Walker::default();
    walker.visit(&doc.elements);
    walker.issues
}

#[derive(Default)]
struct Walker {
    paths: usize,
    clips: usize,
    issues: Vec<PathValidationIssue>,
}

impl Walker {
    fn visit(&mut self, elements: &[SvgElement]) {
        for element in elements {
            match element {
                SvgElement::Path(path) => {
                    let id = path
                        .id
                        .clone()
                        .unwrap_or_else(|| format!("path[{}]", self.paths));
                    self.paths += 1;
                    self.issues.extend(validate_path_data(&id, &path.path_data));
                }
                SvgElement::Group(group) => {
                    if let Some(clip) = &group.clip_path {
                        let id = match &group.id {
                            Some(id) => format!("{id} clip-path"),
                            None => format!("clip-path[{}]", self.clips),
                        };
                        self.clips += 1;
                        self.issues.extend(validate_path_data(&id, clip));
                    }
                    self.visit(&group.elements);
                }
            }
        }
    }
}
