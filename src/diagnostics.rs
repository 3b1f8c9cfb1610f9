//! Unified, `miette`-based error type for the harness.
//!
//! Structural problems (a broken archive, a broken `options.yml`, an
//! unreadable fixture tree) are `HarnessError`s and halt construction of the
//! suite tree. A case whose output does not match is *not* an error: it is
//! reported as a [`crate::dispatch::CaseOutcome`].

use std::path::{Path, PathBuf};

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Error, Diagnostic, Debug)]
pub enum HarnessError {
    #[error("archive {archive}: {reason}")]
    #[diagnostic(code(harness::archive::malformed))]
    ArchiveMalformed {
        archive: String,
        reason: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
    },

    #[error("archive {archive}: duplicate entry '{path}'")]
    #[diagnostic(
        code(harness::archive::duplicate),
        help("every path inside an archive must be declared once")
    )]
    ArchiveDuplicate {
        archive: String,
        path: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("declared again here")]
        span: SourceSpan,
    },

    #[error("could not parse options document {}", path.display())]
    #[diagnostic(code(harness::config::parse))]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
        #[source_code]
        src: NamedSource<String>,
        #[label("not valid here")]
        span: Option<SourceSpan>,
    },

    #[error("options document {}: key '{key}' {message}", path.display())]
    #[diagnostic(code(harness::config::value))]
    ConfigValue {
        path: PathBuf,
        key: String,
        message: String,
    },

    #[error("failed to {action} {}", path.display())]
    #[diagnostic(code(harness::io))]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk fixture tree under {}", root.display())]
    #[diagnostic(code(harness::discovery::walk))]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("{} path {} is not under {}", kind, path.display(), root.display())]
    #[diagnostic(code(harness::path::outside_root))]
    OutsideRoot {
        kind: &'static str,
        path: PathBuf,
        root: PathBuf,
    },

    #[error("{} archive(s) failed to extract", failures.len())]
    #[diagnostic(
        code(harness::archive::extraction_failed),
        help("the remaining archives were written; fix the archives listed below")
    )]
    Extraction {
        #[related]
        failures: Vec<HarnessError>,
    },
}

impl HarnessError {
    /// Wraps an I/O failure with the path it concerns.
    pub fn io(action: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        HarnessError::Io {
            action,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Builds a malformed-archive error pointing at `span` within `text`.
    pub fn archive(
        archive: &str,
        text: &str,
        span: (usize, usize),
        reason: impl Into<String>,
        help: Option<&str>,
    ) -> Self {
        HarnessError::ArchiveMalformed {
            archive: archive.to_string(),
            reason: reason.into(),
            src: NamedSource::new(archive, text.to_string()),
            span: span.into(),
            help: help.map(str::to_string),
        }
    }

    pub fn config_parse(path: &Path, text: &str, source: serde_yaml::Error) -> Self {
        let span = source
            .location()
            .map(|loc| SourceSpan::from((loc.index().min(text.len()), 0)));
        HarnessError::ConfigParse {
            path: path.to_path_buf(),
            source,
            src: NamedSource::new(path.display().to_string(), text.to_string()),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use miette::Report;

    use super::*;

    #[test]
    fn archive_error_renders_label_and_help() {
        let err = HarnessError::archive(
            "spec/foo.hrx",
            "<===> a\nbody\n",
            (0, 7),
            "bad entry",
            Some("try harder"),
        );
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("bad entry"));
        assert!(output.contains("try harder"));
        assert!(output.contains("spec/foo.hrx"));
    }

    #[test]
    fn extraction_error_counts_failures() {
        let inner = HarnessError::archive("a.hrx", "x", (0, 1), "no boundary", None);
        let err = HarnessError::Extraction {
            failures: vec![inner],
        };
        assert_eq!(err.to_string(), "1 archive(s) failed to extract");
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("no boundary"));
    }

    #[test]
    fn config_parse_error_keeps_yaml_cause() {
        let text = ":todo:\n- a\n:todo:\n- b\n";
        let source = serde_yaml::from_str::<serde_yaml::Value>(text).unwrap_err();
        let err = HarnessError::config_parse(Path::new("x/options.yml"), text, source);
        assert!(err.to_string().contains("x/options.yml"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
