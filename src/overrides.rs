//! Implementation-specific expectation files.
//!
//! sass-spec lets an implementation ship its own expectation next to the
//! canonical one: `output-libsass.css` beside `output.css`, `error-libsass`
//! beside `error`. The variant wins when it exists.

use std::path::{Path, PathBuf};

/// Picks the implementation variant of an expectation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideResolver {
    tag: String,
}

impl OverrideResolver {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// The implementation tag, e.g. `libsass`.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// `output.css` -> `output-libsass.css`, `warning` -> `warning-libsass`.
    pub fn variant_name(&self, canonical: &str) -> String {
        match canonical.split_once('.') {
            Some((stem, rest)) => format!("{stem}-{}.{rest}", self.tag),
            None => format!("{canonical}-{}", self.tag),
        }
    }

    /// Returns `dir/<variant>` if that file exists, else `dir/<canonical>`.
    /// The canonical path is returned whether or not it exists.
    pub fn resolve(&self, canonical: &str, dir: &Path) -> PathBuf {
        let variant = dir.join(self.variant_name(canonical));
        if variant.exists() {
            variant
        } else {
            dir.join(canonical)
        }
    }

    /// True when a list entry such as `sass/libsass#2345` names this
    /// implementation.
    pub fn is_mentioned_by(&self, entry: &str) -> bool {
        entry.contains(self.tag.as_str())
    }
}

impl Default for OverrideResolver {
    fn default() -> Self {
        Self::new(crate::settings::DEFAULT_IMPLEMENTATION)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn variant_names() {
        let resolver = OverrideResolver::new("libsass");
        assert_eq!(resolver.variant_name("output.css"), "output-libsass.css");
        assert_eq!(resolver.variant_name("warning"), "warning-libsass");
        assert_eq!(resolver.variant_name("error"), "error-libsass");
    }

    #[test]
    fn prefers_the_variant_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = OverrideResolver::default();

        assert_eq!(
            resolver.resolve("output.css", dir.path()),
            dir.path().join("output.css")
        );
        assert_eq!(resolver.resolve("warning", dir.path()), dir.path().join("warning"));

        fs::write(dir.path().join("output-libsass.css"), "a{}").unwrap();
        fs::write(dir.path().join("warning-libsass"), "careful").unwrap();
        assert_eq!(
            resolver.resolve("output.css", dir.path()),
            dir.path().join("output-libsass.css")
        );
        assert_eq!(
            resolver.resolve("warning", dir.path()),
            dir.path().join("warning-libsass")
        );
    }

    #[test]
    fn mentions_match_anywhere_in_the_entry() {
        let resolver = OverrideResolver::new("libsass");
        assert!(resolver.is_mentioned_by("libsass"));
        assert!(resolver.is_mentioned_by("sass/libsass#2345"));
        assert!(!resolver.is_mentioned_by("dart-sass"));
    }
}
