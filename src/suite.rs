//! # Suite Tree
//!
//! Discovery hands over a flat, sorted list of input files. The builder
//! turns it back into the directory hierarchy: at each level, inputs whose
//! fixture directory sits directly in the suite folder become that suite's
//! cases, and the rest are grouped by their next path segment into child
//! suites. Groups keep the order in which their segment first appears, so
//! the tree mirrors the input order exactly.
//!
//! Working from paths rather than walking directories lets a tree come from
//! any source of fixture paths, extracted archives included.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::{self, Configuration};
use crate::diagnostics::{HarnessError, Result};
use crate::fixture::FixtureCase;
use crate::overrides::OverrideResolver;

// =====================
// Suite Model
// =====================

/// A named group of cases and nested suites.
#[derive(Debug, Clone)]
pub struct Suite {
    pub name: String,
    pub folder: PathBuf,
    /// Cases whose fixture directory is a direct child of `folder`.
    pub cases: Vec<FixtureCase>,
    pub suites: Vec<Suite>,
    /// Options received from the parent, before this folder's own document.
    pub inherited: Configuration,
    /// `inherited` with this folder's document merged in; what children get.
    pub options: Configuration,
}

impl Suite {
    /// Number of cases in this suite and all of its descendants.
    pub fn case_count(&self) -> usize {
        self.cases.len() + self.suites.iter().map(Suite::case_count).sum::<usize>()
    }

    /// Finds a direct child suite by name.
    pub fn suite(&self, name: &str) -> Option<&Suite> {
        self.suites.iter().find(|suite| suite.name == name)
    }
}

// =====================
// Tree Reconstruction
// =====================

/// Rebuilds a [`Suite`] tree from flat input paths.
#[derive(Debug, Clone)]
pub struct SuiteBuilder {
    root: PathBuf,
    resolver: OverrideResolver,
}

impl SuiteBuilder {
    /// `root` is the spec root; every input must live under it.
    pub fn new(root: impl Into<PathBuf>, resolver: OverrideResolver) -> Self {
        Self {
            root: root.into(),
            resolver,
        }
    }

    /// Builds the tree rooted at the spec root. The root suite starts from
    /// an empty configuration.
    pub fn build(&self, inputs: &[PathBuf]) -> Result<Suite> {
        let name = self
            .root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string());
        let inputs: Vec<&Path> = inputs.iter().map(PathBuf::as_path).collect();
        let suite = self.build_suite(name, self.root.clone(), Configuration::new(), &inputs)?;
        debug!(root = %self.root.display(), cases = suite.case_count(), "built suite tree");
        Ok(suite)
    }

    fn build_suite(
        &self,
        name: String,
        folder: PathBuf,
        inherited: Configuration,
        inputs: &[&Path],
    ) -> Result<Suite> {
        let options = config::cascade(&inherited, &folder)?;

        let mut direct = Vec::new();
        let mut groups: Vec<(OsString, Vec<&Path>)> = Vec::new();
        for &input in inputs {
            let relative = input
                .strip_prefix(&folder)
                .map_err(|_| HarnessError::OutsideRoot {
                    kind: "input",
                    path: input.to_path_buf(),
                    root: folder.clone(),
                })?;
            let mut components = relative.components();
            let (Some(first), depth) = (components.next(), relative.components().count()) else {
                continue;
            };
            match depth {
                1 => warn!(path = %input.display(), "input file outside any fixture directory"),
                2 => direct.push(input),
                _ => {
                    let segment = first.as_os_str();
                    match groups.iter_mut().find(|(name, _)| name == segment) {
                        Some((_, members)) => members.push(input),
                        None => groups.push((segment.to_os_string(), vec![input])),
                    }
                }
            }
        }

        let cases = direct
            .into_iter()
            .map(|input| FixtureCase::derive(input, &options, &self.resolver, &self.root))
            .collect::<Result<Vec<_>>>()?;

        let suites = groups
            .into_iter()
            .map(|(segment, members)| {
                self.build_suite(
                    segment.to_string_lossy().into_owned(),
                    folder.join(&segment),
                    options.clone(),
                    &members,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Suite {
            name,
            folder,
            cases,
            suites,
            inherited,
            options,
        })
    }
}

// =====================
// Tests
// =====================
