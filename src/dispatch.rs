//! # Case Dispatch
//!
//! Walks a [`Suite`] tree, decides for each case whether it runs at all,
//! hands runnable cases to the [`Compiler`] and judges the result.
//!
//! Skip checks happen in a fixed order and the first match wins:
//! 1. the case is marked todo (or warning-todo) for this implementation
//! 2. `only_on` names other implementations only
//! 3. `ignore_for` names this implementation
//! 4. the harness version is older than the case's start version
//! 5. the harness version is newer than the case's end version

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::compare::{errors_match, first_line, outputs_match, strip_deprecation_banner};
use crate::compiler::{CompileError, Compiler, RenderRequest};
use crate::fixture::FixtureCase;
use crate::overrides::OverrideResolver;
use crate::settings::HarnessSettings;
use crate::suite::Suite;

// =====================
// Outcomes
// =====================

/// Why a case failed, with enough context to diagnose it.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    /// The case's effective options as JSON.
    pub options: String,
}

/// What happened to one case.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseOutcome {
    Pass,
    Fail(Failure),
    Skipped { reason: String },
}

/// The outcome of one case, tagged with where it lives.
#[derive(Debug, Clone)]
pub struct CaseResult {
    /// Slash-joined suite names from the root, e.g. `spec/core/map`.
    pub suite: String,
    pub name: String,
    pub input: PathBuf,
    pub outcome: CaseOutcome,
}

impl CaseResult {
    /// Full slash-joined path of the case, e.g. `spec/core/map/get`.
    pub fn path(&self) -> String {
        format!("{}/{}", self.suite, self.name)
    }
}

// =====================
// Skip Predicates
// =====================

/// Returns the reason `case` must not run, if any.
pub fn skip_reason(case: &FixtureCase, resolver: &OverrideResolver, version: f64) -> Option<String> {
    let mentioned = |entries: &[String]| entries.iter().any(|e| resolver.is_mentioned_by(e));

    if case.todo || case.warning_todo {
        return Some("Test marked with TODO".to_string());
    }
    if let Some(only) = case.only.as_deref().filter(|only| !only.is_empty()) {
        if !mentioned(only) {
            return Some(format!("Tests marked for only: {}", only.join(", ")));
        }
    }
    if let Some(ignored) = case.ignore_for.as_deref().filter(|ignored| !ignored.is_empty()) {
        if mentioned(ignored) {
            return Some(format!("Tests ignored for: {}", ignored.join(", ")));
        }
    }
    if version < case.start_version {
        return Some("Tests marked for newer Sass versions only".to_string());
    }
    if version > case.end_version {
        return Some("Tests marked for older Sass versions only".to_string());
    }
    None
}

// =====================
// Dispatcher
// =====================

/// Runs cases against one compiler.
pub struct Dispatcher<'a, C: Compiler + ?Sized> {
    compiler: &'a C,
    resolver: OverrideResolver,
    version: f64,
    filter: Option<String>,
}

impl<'a, C: Compiler + ?Sized> Dispatcher<'a, C> {
    /// Takes the implementation tag, version and filter from `settings`.
    pub fn new(compiler: &'a C, settings: &HarnessSettings) -> Self {
        Self {
            compiler,
            resolver: settings.resolver(),
            version: settings.version,
            filter: settings.filter.as_ref().map(|f| f.to_lowercase()),
        }
    }

    /// Runs every case of `suite` and its descendants: a suite's own cases
    /// first, then its child suites in order.
    pub fn run_suite(&self, suite: &Suite) -> Vec<CaseResult> {
        let mut results = Vec::with_capacity(suite.case_count());
        self.run_suite_into(suite, &suite.name, &mut results);
        results
    }

    fn run_suite_into(&self, suite: &Suite, path: &str, results: &mut Vec<CaseResult>) {
        for case in &suite.cases {
            results.push(self.run_case(case, path));
        }
        for child in &suite.suites {
            self.run_suite_into(child, &format!("{path}/{}", child.name), results);
        }
    }

    /// Runs a single case that lives in suite `suite_path`.
    pub fn run_case(&self, case: &FixtureCase, suite_path: &str) -> CaseResult {
        let outcome = match self.skip(case, suite_path) {
            Some(reason) => CaseOutcome::Skipped { reason },
            None => {
                let request = RenderRequest {
                    file: &case.input_path,
                    include_paths: &case.include_paths,
                    precision: case.precision,
                    output_style: case.output_style,
                };
                judge(case, self.compiler.render(&request))
            }
        };
        debug!(suite = suite_path, case = %case.name, ?outcome, "case finished");
        CaseResult {
            suite: suite_path.to_string(),
            name: case.name.clone(),
            input: case.input_path.clone(),
            outcome,
        }
    }

    fn skip(&self, case: &FixtureCase, suite_path: &str) -> Option<String> {
        if let Some(filter) = &self.filter {
            let path = format!("{suite_path}/{}", case.name).to_lowercase();
            if !path.contains(filter.as_str()) {
                return Some(format!("Filtered out by substring: {filter}"));
            }
        }
        skip_reason(case, &self.resolver, self.version)
    }
}

// =====================
// Judging
// =====================

/// Compares what the compiler produced against the case's expectations.
pub fn judge(case: &FixtureCase, rendered: Result<String, CompileError>) -> CaseOutcome {
    let fail = |message: String, expected: Option<String>, actual: Option<String>| {
        CaseOutcome::Fail(Failure {
            message,
            expected,
            actual,
            options: serde_json::to_string(&case.options)
                .unwrap_or_else(|e| format!("<unserializable options: {e}>")),
        })
    };

    if case.should_fail {
        let error_path = case
            .error_path
            .clone()
            .unwrap_or_else(|| case.folder.join(crate::fixture::EXPECTED_ERROR));
        return match rendered {
            Ok(css) => fail(
                "Should error, but compilation succeeded".to_string(),
                None,
                Some(css),
            ),
            Err(err) => match fs::read_to_string(&error_path) {
                Ok(expected) if errors_match(&err.formatted, &expected) => CaseOutcome::Pass,
                Ok(expected) => fail(
                    "Should error".to_string(),
                    Some(first_line(&strip_deprecation_banner(&expected)).to_string()),
                    Some(first_line(&strip_deprecation_banner(&err.formatted)).to_string()),
                ),
                Err(e) => fail(
                    format!("could not read {}: {e}", error_path.display()),
                    None,
                    Some(err.formatted),
                ),
            },
        };
    }

    let css = match rendered {
        Ok(css) => css,
        Err(err) => {
            return fail(
                "Compilation failed unexpectedly".to_string(),
                None,
                Some(err.formatted),
            )
        }
    };
    if !case.expected_path.exists() {
        return CaseOutcome::Pass;
    }
    match fs::read_to_string(&case.expected_path) {
        Ok(expected) if outputs_match(&css, &expected) => CaseOutcome::Pass,
        Ok(expected) => fail(
            "Output did not match expected".to_string(),
            Some(expected),
            Some(css),
        ),
        Err(e) => fail(
            format!("could not read {}: {e}", case.expected_path.display()),
            None,
            Some(css),
        ),
    }
}

// =====================
// Tests
// =====================
