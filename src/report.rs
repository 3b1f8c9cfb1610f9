//! User-facing run report: one colored line per case, failure details with
//! a line diff, and a closing summary.

use std::io::{self, Write};

use difference::{Changeset, Difference};
use termcolor::{Color, ColorSpec, WriteColor};

use crate::dispatch::{CaseOutcome, CaseResult, Failure};

/// Counts per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn from_results(results: &[CaseResult]) -> Self {
        results
            .iter()
            .fold(Summary::default(), |mut summary, result| {
                match result.outcome {
                    CaseOutcome::Pass => summary.passed += 1,
                    CaseOutcome::Fail(_) => summary.failed += 1,
                    CaseOutcome::Skipped { .. } => summary.skipped += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }
}

fn tag<W: WriteColor>(out: &mut W, label: &str, color: Color) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{label}")?;
    out.reset()
}

/// Writes the full report and returns the summary.
pub fn write_report<W: WriteColor>(out: &mut W, results: &[CaseResult]) -> io::Result<Summary> {
    for result in results {
        match &result.outcome {
            CaseOutcome::Pass => {
                tag(out, "PASS", Color::Green)?;
                writeln!(out, ": {}", result.path())?;
            }
            CaseOutcome::Skipped { reason } => {
                tag(out, "SKIP", Color::Yellow)?;
                writeln!(out, ": {} ({reason})", result.path())?;
            }
            CaseOutcome::Fail(failure) => write_failure(out, result, failure)?,
        }
    }

    let summary = Summary::from_results(results);
    writeln!(out)?;
    write!(out, "Test summary: total {}, ", summary.total())?;
    tag(out, "passed", Color::Green)?;
    write!(out, " {}, ", summary.passed)?;
    tag(out, "failed", Color::Red)?;
    write!(out, " {}, ", summary.failed)?;
    tag(out, "skipped", Color::Yellow)?;
    writeln!(out, " {}", summary.skipped)?;

    if summary.failed > 0 {
        writeln!(out, "\nFailed tests:")?;
        for result in results {
            if let CaseOutcome::Fail(_) = result.outcome {
                writeln!(out, "  - {}", result.path())?;
            }
        }
    }
    Ok(summary)
}

fn write_failure<W: WriteColor>(out: &mut W, result: &CaseResult, failure: &Failure) -> io::Result<()> {
    tag(out, "FAIL", Color::Red)?;
    writeln!(out, ": {}", result.path())?;
    writeln!(out, "  Error: {}", failure.message)?;
    writeln!(out, "  Input: {}", result.input.display())?;
    writeln!(out, "  Options: {}", failure.options)?;
    match (&failure.expected, &failure.actual) {
        (Some(expected), Some(actual)) => {
            writeln!(out, "  Diff:")?;
            write_diff(out, expected, actual)?;
        }
        (None, Some(actual)) => writeln!(out, "  Actual: {}", actual.trim_end())?,
        _ => {}
    }
    Ok(())
}

/// Line diff of expected (`-`) vs actual (`+`).
pub fn write_diff<W: WriteColor>(out: &mut W, expected: &str, actual: &str) -> io::Result<()> {
    let changeset = Changeset::new(expected.trim_end(), actual.trim_end(), "\n");
    for diff in &changeset.diffs {
        let (prefix, color, text) = match diff {
            Difference::Same(text) => (' ', None, text),
            Difference::Rem(text) => ('-', Some(Color::Red), text),
            Difference::Add(text) => ('+', Some(Color::Green), text),
        };
        out.set_color(ColorSpec::new().set_fg(color))?;
        for line in text.split('\n') {
            writeln!(out, "  {prefix}{line}")?;
        }
        out.reset()?;
    }
    Ok(())
}
