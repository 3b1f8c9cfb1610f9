//! # HRX Archives
//!
//! sass-spec packs many small fixture directories into single human-readable
//! archive files (`*.hrx`). This module holds the in-memory model of one
//! archive; [`parser`] builds it from text and [`extract`] turns it into
//! files on disk.
//!
//! The model is a tree: every archive has exactly one root [`Directory`],
//! whose children are kept in declaration order.

pub mod extract;
pub mod parser;

use crate::diagnostics::Result;

/// Reserved extension of nested archives.
pub const ARCHIVE_EXTENSION: &str = "hrx";

/// A single named node of an archive tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveEntry {
    Directory(Directory),
    File(String),
}

/// An ordered collection of uniquely named children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    entries: Vec<(String, ArchiveEntry)>,
}

impl Directory {
    pub fn get(&self, name: &str) -> Option<&ArchiveEntry> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, entry)| entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArchiveEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds a child. Returns `false` (and leaves the directory untouched) if
    /// the name is already taken.
    pub fn insert(&mut self, name: &str, entry: ArchiveEntry) -> bool {
        if self.get(name).is_some() {
            return false;
        }
        self.entries.push((name.to_string(), entry));
        true
    }

    /// Returns the child directory `name`, creating it if absent.
    /// Returns `None` when `name` is already a file.
    pub(crate) fn child_dir_mut(&mut self, name: &str) -> Option<&mut Directory> {
        let index = match self.entries.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.entries
                    .push((name.to_string(), ArchiveEntry::Directory(Directory::default())));
                self.entries.len() - 1
            }
        };
        match &mut self.entries[index].1 {
            ArchiveEntry::Directory(dir) => Some(dir),
            ArchiveEntry::File(_) => None,
        }
    }
}

/// A file leaf of an archive with its root-relative path (`/`-separated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    pub path: String,
    pub body: String,
}

/// A parsed archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    pub root: Directory,
}

impl Archive {
    /// Parses archive text. `name` only labels diagnostics.
    pub fn parse(name: &str, text: &str) -> Result<Archive> {
        parser::parse(name, text)
    }

    /// Flattens the tree into its file leaves, in declaration order.
    /// Directories are structural and never appear in the output.
    pub fn files(&self) -> Vec<ArchiveFile> {
        let mut files = Vec::new();
        collect_files(&self.root, "", &mut files);
        files
    }
}

fn collect_files(dir: &Directory, prefix: &str, out: &mut Vec<ArchiveFile>) {
    for (name, entry) in dir.iter() {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        };
        match entry {
            ArchiveEntry::Directory(child) => collect_files(child, &path, out),
            ArchiveEntry::File(body) => out.push(ArchiveFile {
                path,
                body: body.clone(),
            }),
        }
    }
}
