//! Turning archives into fixture directories.
//!
//! [`extract_archive`] is pure: it maps one archive's text to the files it
//! would produce. [`materialize`] is the I/O driver that mirrors a whole
//! spec tree into a destination root and unpacks every archive in it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::Archive;
use crate::diagnostics::{HarnessError, Result};
use crate::discovery;

/// A file produced by extraction, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile {
    pub path: PathBuf,
    pub body: String,
}

/// Parses `text` (the contents of `archive_path`) and returns its files.
///
/// Each destination is `dir(archive) / stem(archive) / entry path`, so
/// `spec/foo.hrx` containing `a/b.txt` yields `spec/foo/a/b.txt`.
pub fn extract_archive(archive_path: &Path, text: &str) -> Result<Vec<ExtractedFile>> {
    let archive = Archive::parse(&archive_path.display().to_string(), text)?;
    let root = archive_path.with_extension("");
    Ok(archive
        .files()
        .into_iter()
        .map(|file| ExtractedFile {
            path: file.path.split('/').fold(root.clone(), |dir, part| dir.join(part)),
            body: file.body,
        })
        .collect())
}

/// Rewrites every path from under `source_root` to the same place under
/// `dest_root`.
pub fn relocate(
    files: Vec<ExtractedFile>,
    source_root: &Path,
    dest_root: &Path,
) -> Result<Vec<ExtractedFile>> {
    files
        .into_iter()
        .map(|file| {
            let relative =
                file.path
                    .strip_prefix(source_root)
                    .map_err(|_| HarnessError::OutsideRoot {
                        kind: "extracted",
                        path: file.path.clone(),
                        root: source_root.to_path_buf(),
                    })?;
            Ok(ExtractedFile {
                path: dest_root.join(relative),
                body: file.body,
            })
        })
        .collect()
}

/// Writes files, creating parent directories as needed.
pub fn write_files(files: &[ExtractedFile]) -> Result<()> {
    for file in files {
        if let Some(parent) = file.path.parent() {
            fs::create_dir_all(parent).map_err(|e| HarnessError::io("create", parent, e))?;
        }
        fs::write(&file.path, &file.body).map_err(|e| HarnessError::io("write", &file.path, e))?;
    }
    Ok(())
}

/// Outcome of [`materialize`].
#[derive(Debug, Default)]
pub struct MaterializeReport {
    /// Plain files copied from the source tree.
    pub copied: usize,
    /// Archives that extracted cleanly.
    pub archives: usize,
    /// Files written out of those archives.
    pub written: usize,
    /// One error per archive that failed to parse.
    pub failures: Vec<HarnessError>,
}

impl MaterializeReport {
    /// Fails if any archive was rejected.
    pub fn into_result(self) -> Result<Self> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(HarnessError::Extraction {
                failures: self.failures,
            })
        }
    }
}

/// Copies `source_root` to `dest_root`, then extracts every archive found
/// under `source_root` into the matching place under `dest_root`.
///
/// A broken archive is recorded in the report and skipped as a whole; the
/// other archives are still written. I/O failures abort immediately.
pub fn materialize(source_root: &Path, dest_root: &Path) -> Result<MaterializeReport> {
    let mut report = MaterializeReport {
        copied: copy_tree(source_root, dest_root)?,
        ..MaterializeReport::default()
    };

    // Archives copied into a nested destination are not sources.
    let archives = discovery::discover_archives(source_root)?
        .into_iter()
        .filter(|path| !path.starts_with(dest_root));
    for archive_path in archives {
        let text = fs::read_to_string(&archive_path)
            .map_err(|e| HarnessError::io("read", &archive_path, e))?;
        let files = match extract_archive(&archive_path, &text) {
            Ok(files) => files,
            Err(err) => {
                warn!(archive = %archive_path.display(), "skipping broken archive");
                report.failures.push(err);
                continue;
            }
        };
        let files = relocate(files, source_root, dest_root)?;
        write_files(&files)?;
        debug!(archive = %archive_path.display(), files = files.len(), "extracted archive");
        report.archives += 1;
        report.written += files.len();
    }

    info!(
        copied = report.copied,
        archives = report.archives,
        written = report.written,
        failed = report.failures.len(),
        "materialized fixtures"
    );
    Ok(report)
}

fn copy_tree(source_root: &Path, dest_root: &Path) -> Result<usize> {
    fs::create_dir_all(dest_root).map_err(|e| HarnessError::io("create", dest_root, e))?;
    let mut copied = 0;
    // The destination may live inside the source tree; never copy it into itself.
    let walker = WalkDir::new(source_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.path() != dest_root);
    for entry in walker {
        let entry = entry.map_err(|source| HarnessError::Walk {
            root: source_root.to_path_buf(),
            source,
        })?;
        let relative = entry
            .path()
            .strip_prefix(source_root)
            .map_err(|_| HarnessError::OutsideRoot {
                kind: "walked",
                path: entry.path().to_path_buf(),
                root: source_root.to_path_buf(),
            })?;
        let target = dest_root.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| HarnessError::io("create", &target, e))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target).map_err(|e| HarnessError::io("copy", entry.path(), e))?;
            copied += 1;
        }
    }
    Ok(copied)
}
