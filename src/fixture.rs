//! # Fixture Cases
//!
//! A fixture is a directory holding one test: an input file plus its
//! expectations. [`FixtureCase::derive`] resolves everything a run needs
//! from the filesystem once, so dispatch never has to probe it again.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::{self, keys, Configuration};
use crate::diagnostics::{HarnessError, Result};
use crate::overrides::OverrideResolver;

pub const EXPECTED_OUTPUT: &str = "output.css";
pub const EXPECTED_ERROR: &str = "error";
pub const EXPECTED_WARNING: &str = "warning";
/// Extra include directory a fixture may carry.
pub const SUB_DIR: &str = "sub";

pub const DEFAULT_PRECISION: u32 = 10;
pub const DEFAULT_START_VERSION: f64 = 0.0;
pub const DEFAULT_END_VERSION: f64 = 99.0;

/// CSS output style requested from the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    #[default]
    Nested,
    Expanded,
    Compact,
    Compressed,
}

impl OutputStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputStyle::Nested => "nested",
            OutputStyle::Expanded => "expanded",
            OutputStyle::Compact => "compact",
            OutputStyle::Compressed => "compressed",
        }
    }
}

impl fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputStyle {
    type Err = String;

    /// Accepts the option spelling with or without its leading `:`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().trim_start_matches(':') {
            "nested" => Ok(OutputStyle::Nested),
            "expanded" => Ok(OutputStyle::Expanded),
            "compact" => Ok(OutputStyle::Compact),
            "compressed" => Ok(OutputStyle::Compressed),
            other => Err(format!("names unknown output style '{other}'")),
        }
    }
}

/// One test, fully resolved. Read-only after construction.
#[derive(Debug, Clone)]
pub struct FixtureCase {
    pub name: String,
    pub folder: PathBuf,
    pub input_path: PathBuf,
    pub expected_path: PathBuf,
    /// Only set when the case is expected to fail.
    pub error_path: Option<PathBuf>,
    pub warning_path: PathBuf,
    pub include_paths: Vec<PathBuf>,
    /// Effective options after the whole cascade.
    pub options: Configuration,
    pub precision: u32,
    pub output_style: OutputStyle,
    pub start_version: f64,
    pub end_version: f64,
    pub todo: bool,
    pub warning_todo: bool,
    pub only: Option<Vec<String>>,
    pub ignore_for: Option<Vec<String>>,
    pub should_fail: bool,
    pub verify_warning: bool,
}

impl FixtureCase {
    /// Builds the case for `input_path`.
    ///
    /// `inherited` is the configuration of the enclosing suite; the case
    /// directory's own `options.yml` (if any) is merged on top of it.
    pub fn derive(
        input_path: &Path,
        inherited: &Configuration,
        resolver: &OverrideResolver,
        spec_root: &Path,
    ) -> Result<FixtureCase> {
        let folder = input_path
            .parent()
            .ok_or_else(|| HarnessError::OutsideRoot {
                kind: "input",
                path: input_path.to_path_buf(),
                root: spec_root.to_path_buf(),
            })?
            .to_path_buf();
        let name = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let options = config::cascade(inherited, &folder)?;

        let expected_path = resolver.resolve(EXPECTED_OUTPUT, &folder);
        let should_fail = !expected_path.exists();
        let error_path = should_fail.then(|| resolver.resolve(EXPECTED_ERROR, &folder));
        let warning_path = resolver.resolve(EXPECTED_WARNING, &folder);
        let verify_warning = warning_path.exists() && !warning_path.is_dir();

        let output_style = match options.string(keys::OUTPUT_STYLE) {
            Some(style) => style.parse().map_err(|message| HarnessError::ConfigValue {
                path: folder.join(config::OPTIONS_FILE_NAME),
                key: keys::OUTPUT_STYLE.to_string(),
                message,
            })?,
            None => OutputStyle::default(),
        };
        // Zero counts as unset for every numeric option.
        let number = |key: &str| options.number(key).filter(|n| *n != 0.0);
        let precision = number(keys::PRECISION)
            .filter(|p| *p > 0.0)
            .map_or(DEFAULT_PRECISION, |p| p as u32);
        let mentions = |key: &str| {
            options
                .list(key)
                .is_some_and(|entries| entries.iter().any(|e| resolver.is_mentioned_by(e)))
        };

        Ok(FixtureCase {
            name,
            include_paths: vec![folder.clone(), folder.join(SUB_DIR), spec_root.to_path_buf()],
            input_path: input_path.to_path_buf(),
            expected_path,
            error_path,
            warning_path,
            precision,
            output_style,
            start_version: number(keys::START_VERSION).unwrap_or(DEFAULT_START_VERSION),
            end_version: number(keys::END_VERSION).unwrap_or(DEFAULT_END_VERSION),
            todo: mentions(keys::TODO),
            warning_todo: mentions(keys::WARNING_TODO),
            only: options.list(keys::ONLY_ON),
            ignore_for: options.list(keys::IGNORE_FOR),
            should_fail,
            verify_warning,
            options,
            folder,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::OptionValue;

    fn fixture(files: &[(&str, &str)]) -> (tempfile::TempDir, PathBuf) {
        let root = tempfile::tempdir().unwrap();
        let folder = root.path().join("case");
        fs::create_dir_all(&folder).unwrap();
        for (name, body) in files {
            let path = folder.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }
        let input = folder.join("input.scss");
        (root, input)
    }

    fn derive(input: &Path, inherited: &Configuration) -> FixtureCase {
        let root = input.parent().unwrap().parent().unwrap();
        FixtureCase::derive(input, inherited, &OverrideResolver::default(), root).unwrap()
    }

    #[test]
    fn defaults_for_a_plain_passing_case() {
        let (_root, input) = fixture(&[("input.scss", "a {b: c}"), ("output.css", "a{b:c}")]);
        let case = derive(&input, &Configuration::new());
        assert_eq!(case.name, "case");
        assert!(!case.should_fail);
        assert_eq!(case.error_path, None);
        assert!(!case.verify_warning);
        assert_eq!(case.precision, DEFAULT_PRECISION);
        assert_eq!(case.output_style, OutputStyle::Nested);
        assert_eq!(case.start_version, 0.0);
        assert_eq!(case.end_version, 99.0);
        assert!(!case.todo && !case.warning_todo);
        assert_eq!(case.only, None);
        assert_eq!(case.ignore_for, None);
    }

    #[test]
    fn missing_output_means_the_case_should_fail() {
        let (_root, input) = fixture(&[("input.scss", "a {"), ("error-libsass", "Error: x")]);
        let case = derive(&input, &Configuration::new());
        assert!(case.should_fail);
        assert_eq!(case.error_path, Some(case.folder.join("error-libsass")));
    }

    #[test]
    fn override_output_counts_as_expected_output() {
        let (_root, input) = fixture(&[("input.scss", ""), ("output-libsass.css", "")]);
        let case = derive(&input, &Configuration::new());
        assert!(!case.should_fail);
        assert_eq!(case.expected_path, case.folder.join("output-libsass.css"));
    }

    #[test]
    fn warning_directory_is_not_verified() {
        let (_root, input) = fixture(&[("input.scss", ""), ("warning/keep", "")]);
        assert!(!derive(&input, &Configuration::new()).verify_warning);
        let (_root, input) = fixture(&[("input.scss", ""), ("warning", "WARNING: x")]);
        assert!(derive(&input, &Configuration::new()).verify_warning);
    }

    #[test]
    fn own_options_merge_onto_inherited_ones() {
        let (_root, input) = fixture(&[
            ("input.scss", ""),
            ("output.css", ""),
            (
                "options.yml",
                ":todo:\n- sass/libsass#1\n:precision: 5\n:output_style: :compressed\n:end_version: 3.5\n",
            ),
        ]);
        let inherited: Configuration = [("todo", OptionValue::from(vec!["dart-sass"]))]
            .into_iter()
            .collect();
        let case = derive(&input, &inherited);
        assert!(case.todo);
        assert_eq!(
            case.options.list("todo"),
            Some(vec!["dart-sass".to_string(), "sass/libsass#1".to_string()])
        );
        assert_eq!(case.precision, 5);
        assert_eq!(case.output_style, OutputStyle::Compressed);
        assert_eq!(case.end_version, 3.5);
    }

    #[test]
    fn zero_numbers_fall_back_to_defaults() {
        let (_root, input) = fixture(&[
            ("input.scss", ""),
            ("output.css", ""),
            (
                "options.yml",
                ":precision: 0\n:start_version: 0\n:end_version: 0\n",
            ),
        ]);
        let case = derive(&input, &Configuration::new());
        assert_eq!(case.precision, DEFAULT_PRECISION);
        assert_eq!(case.start_version, DEFAULT_START_VERSION);
        assert_eq!(case.end_version, DEFAULT_END_VERSION);
    }

    #[test]
    fn negative_precision_falls_back_to_default() {
        let (_root, input) = fixture(&[("input.scss", ""), ("options.yml", ":precision: -2\n")]);
        assert_eq!(derive(&input, &Configuration::new()).precision, DEFAULT_PRECISION);
    }

    #[test]
    fn todo_for_another_implementation_is_not_ours() {
        let (_root, input) = fixture(&[("input.scss", ""), ("options.yml", ":todo:\n- dart-sass\n")]);
        assert!(!derive(&input, &Configuration::new()).todo);
    }

    #[test]
    fn include_paths_are_folder_sub_and_root() {
        let (root, input) = fixture(&[("input.scss", "")]);
        let case = derive(&input, &Configuration::new());
        assert_eq!(
            case.include_paths,
            vec![case.folder.clone(), case.folder.join("sub"), root.path().to_path_buf()]
        );
    }

    #[test]
    fn unknown_output_style_is_a_config_error() {
        let (root, input) = fixture(&[("input.scss", ""), ("options.yml", ":output_style: :fancy\n")]);
        let err = FixtureCase::derive(
            &input,
            &Configuration::new(),
            &OverrideResolver::default(),
            root.path(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown output style 'fancy'"));
    }

    #[test]
    fn output_style_parses_with_or_without_marker() {
        assert_eq!(":expanded".parse::<OutputStyle>(), Ok(OutputStyle::Expanded));
        assert_eq!("compact".parse::<OutputStyle>(), Ok(OutputStyle::Compact));
    }
}
