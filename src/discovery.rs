use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::archive::ARCHIVE_EXTENSION;
use crate::diagnostics::{HarnessError, Result};

/// File names that mark a directory as a fixture.
pub const INPUT_FILE_NAMES: [&str; 2] = ["input.scss", "input.sass"];

/// Returns true if the given path names a fixture input file.
pub fn is_input_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| INPUT_FILE_NAMES.contains(&name))
}

/// Returns true if the given path has the archive extension.
pub fn is_archive(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == ARCHIVE_EXTENSION)
}

/// Recursively scans `root` for fixture input files.
///
/// The returned list is sorted, which is what the suite builder expects.
pub fn discover_inputs<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>> {
    collect_files(root.as_ref(), is_input_file)
}

/// Recursively scans `root` for `.hrx` archives, sorted.
pub fn discover_archives<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>> {
    collect_files(root.as_ref(), is_archive)
}

fn collect_files(root: &Path, keep: fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| HarnessError::Walk {
            root: root.to_path_buf(),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !keep(path) {
            continue;
        }

        files.push(path.to_path_buf());
    }
    files.sort();
    Ok(files)
}
