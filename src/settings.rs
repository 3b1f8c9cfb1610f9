//! Harness-wide run settings.

use std::path::PathBuf;

use termcolor::ColorChoice;

use crate::overrides::OverrideResolver;

/// Implementation tag used for overrides and skip lists.
pub const DEFAULT_IMPLEMENTATION: &str = "libsass";
/// Language version the implementation under test claims to support.
pub const DEFAULT_VERSION: f64 = 3.6;
/// Where the spec tree lives unless told otherwise.
pub const DEFAULT_SPEC_ROOT: &str = "test/fixtures/sass-spec/spec";

/// Configuration for suite construction, dispatch and reporting.
#[derive(Debug, Clone)]
pub struct HarnessSettings {
    pub spec_root: PathBuf,
    pub implementation: String,
    pub version: f64,
    /// Case-insensitive substring a case path must contain to run.
    pub filter: Option<String>,
    pub use_colors: bool,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            spec_root: PathBuf::from(DEFAULT_SPEC_ROOT),
            implementation: DEFAULT_IMPLEMENTATION.to_string(),
            version: DEFAULT_VERSION,
            filter: None,
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl HarnessSettings {
    pub fn resolver(&self) -> OverrideResolver {
        OverrideResolver::new(self.implementation.clone())
    }

    pub fn color_choice(&self) -> ColorChoice {
        if self.use_colors {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        }
    }
}
