//! Directory conversion on a bounded worker pool.
//!
//! Each file is read, parsed, optionally validated, generated and written as
//! `<stem>.xml` next to the source, which is then removed. A failing file is
//! logged and counted without stopping its siblings.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use ignore::WalkBuilder;
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::error::ConvertError;
use crate::parse::parse_svg_bytes;
use crate::validate::{PathValidationIssue, validate_document};
use crate::vector_drawable::generate;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Number of worker threads.
    pub concurrency: usize,
    /// Check path lengths before generating.
    pub validate: bool,
    /// Fail the batch, after every file has been attempted, if any path is
    /// over the critical length.
    pub strict: bool,
    /// Mark every output as auto-mirrored.
    pub mirror_all: bool,
}

impl BatchOptions {
    /// Whether `path` should be generated with `autoMirrored` set, either
    /// because everything is mirrored or because its stem or file name is
    /// in `rtl_names`.
    pub fn auto_mirrored(&self, path: &Path, rtl_names: &HashSet<String>) -> bool {
        self.mirror_all || is_rtl(path, rtl_names)
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            validate: true,
            strict: false,
            mirror_all: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub converted: usize,
    pub failed: usize,
    /// Critical validation issues, by source file.
    pub issues: Vec<(PathBuf, PathValidationIssue)>,
}

/// The result of converting one file.
#[derive(Debug)]
pub struct ConvertedFile {
    pub output: PathBuf,
    /// Every issue found, lint and critical.
    pub issues: Vec<PathValidationIssue>,
}

pub struct BatchConverter {
    options: BatchOptions,
}

impl BatchConverter {
    pub fn new(options: BatchOptions) -> Self {
        Self { options }
    }

    /// Convert every SVG under `dir`.
    ///
    /// Files whose stem (or full name) is in `rtl_names` are generated with
    /// `autoMirrored` set.
    pub fn convert(
        &self,
        dir: &Path,
        rtl_names: &HashSet<String>,
    ) -> Result<BatchSummary, ConvertError> {
        if !dir.is_dir() {
            return Err(ConvertError::DirectoryNotFound(dir.to_path_buf()));
        }

        let files = discover(dir);
        info!(
            dir = %dir.display(),
            files = files.len(),
            concurrency = self.options.concurrency,
            "converting"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.concurrency.max(1))
            .build()?;

        let converted = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);
        let critical: Mutex<Vec<(PathBuf, PathValidationIssue)>> = Mutex::new(Vec::new());

        pool.install(|| {
            files.par_iter().for_each(|file| {
                let mirrored = self.options.auto_mirrored(file, rtl_names);
                match convert_file(file, mirrored, &self.options) {
                    Ok(result) => {
                        converted.fetch_add(1, Ordering::Relaxed);
                        let mut critical = critical.lock().unwrap_or_else(|e| e.into_inner());
                        critical.extend(
                            result
                                .issues
                                .into_iter()
                                .filter(|i| i.exceeds_critical)
                                .map(|i| (file.clone(), i)),
                        );
                    }
                    Err(e) => {
                        failed.fetch_add(1, Ordering::Relaxed);
                        error!(file = %file.display(), "conversion failed: {e}");
                    }
                }
            });
        });

        let mut issues = critical.into_inner().unwrap_or_else(|e| e.into_inner());
        // Workers finish in any order
        issues.sort_by(|a, b| a.0.cmp(&b.0));

        let summary = BatchSummary {
            converted: converted.into_inner(),
            failed: failed.into_inner(),
            issues,
        };
        info!(
            converted = summary.converted,
            failed = summary.failed,
            critical = summary.issues.len(),
            "batch finished"
        );

        if self.options.strict
            && let Some((file, issue)) = summary.issues.first()
        {
            return Err(ConvertError::PathTooLong {
                file: file.clone(),
                issue: issue.clone(),
            });
        }

        Ok(summary)
    }
}

/// Convert a single SVG file in place.
pub fn convert_file(
    path: &Path,
    auto_mirrored: bool,
    options: &BatchOptions,
) -> Result<ConvertedFile, ConvertError> {
    let bytes = fs::read(path)?;
    let doc = parse_svg_bytes(&bytes)?;

    let issues = if options.validate {
        validate_document(&doc)
    } else {
        Vec::new()
    };
    for issue in &issues {
        if issue.exceeds_critical {
            error!(
                file = %path.display(),
                path = issue.path_id.as_str(),
                bytes = issue.byte_length,
                "path data too long for aapt"
            );
        } else {
            warn!(
                file = %path.display(),
                path = issue.path_id.as_str(),
                chars = issue.char_length,
                "long path data"
            );
        }
    }

    let xml = generate(&doc, auto_mirrored);
    let output = path.with_extension("xml");
    fs::write(&output, xml)?;
    fs::remove_file(path)?;

    debug!(from = %path.display(), to = %output.display(), auto_mirrored, "converted");
    Ok(ConvertedFile { output, issues })
}

/// All `.svg` files under `dir`, sorted.
pub fn discover(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkBuilder::new(dir)
        .standard_filters(false)
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
        })
        .collect();
    files.sort();
    files
}

fn is_rtl(path: &Path, rtl_names: &HashSet<String>) -> bool {
    let matches = |name: Option<&std::ffi::OsStr>| {
        name.and_then(|n| n.to_str())
            .is_some_and(|n| rtl_names.contains(n))
    };
    matches(path.file_stem()) || matches(path.file_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = BatchOptions::default();
        assert_eq!(options.concurrency, 4);
        assert!(options.validate);
        assert!(!options.strict);
        assert!(!options.mirror_all);
    }

    #[test]
    fn test_is_rtl() {
        let names: HashSet<String> = ["arrow_back".to_string(), "undo.svg".to_string()].into();
        assert!(is_rtl(Path::new("a/arrow_back.svg"), &names));
        assert!(is_rtl(Path::new("undo.svg"), &names));
        assert!(!is_rtl(Path::new("arrow_forward.svg"), &names));
    }

    #[test]
    fn test_auto_mirrored() {
        let names: HashSet<String> = ["undo.svg".to_string()].into();
        let options = BatchOptions::default();
        assert!(options.auto_mirrored(Path::new("icons/undo.svg"), &names));
        assert!(!options.auto_mirrored(Path::new("icons/redo.svg"), &names));

        let options = BatchOptions {
            mirror_all: true,
            ..Default::default()
        };
        assert!(options.auto_mirrored(Path::new("icons/redo.svg"), &HashSet::new()));
    }

    #[test]
    fn test_discover_is_sorted_and_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.svg"), "<svg/>").unwrap();
        fs::write(dir.path().join("a.SVG"), "<svg/>").unwrap();
        fs::write(dir.path().join("nested/c.svg"), "<svg/>").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let names: Vec<String> = discover(dir.path())
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["a.SVG", "b.svg", "nested/c.svg"]);
    }

    #[test]
    fn test_convert_file_replaces_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("icon.svg");
        fs::write(&source, r#"<svg width="24" height="24"><path d="M0 0h24v24z"/></svg>"#)
            .unwrap();

        let result = convert_file(&source, true, &BatchOptions::default()).unwrap();
        assert_eq!(result.output, dir.path().join("icon.xml"));
        assert!(result.issues.is_empty());
        assert!(!source.exists());

        let xml = fs::read_to_string(&result.output).unwrap();
        assert!(xml.contains("android:autoMirrored=\"true\""));
    }

    #[test]
    fn test_convert_file_keeps_source_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("broken.svg");
        fs::write(&source, "<svg><path d=\"M0 0 L\"/></svg>").unwrap();

        assert!(convert_file(&source, false, &BatchOptions::default()).is_err());
        assert!(source.exists());
        assert!(!dir.path().join("broken.xml").exists());
    }
}
