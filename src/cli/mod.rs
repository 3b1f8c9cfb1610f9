//! The `sass-spec` command-line interface.
//!
//! Parses arguments, installs the log subscriber and dispatches to the
//! subcommand handlers. Errors surface as miette reports.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use termcolor::StandardStream;
use tracing::{info, Level};

use crate::archive::extract;
use crate::cli::args::{Command, HarnessArgs};
use crate::compiler::CommandCompiler;
use crate::discovery;
use crate::dispatch::Dispatcher;
use crate::report;
use crate::settings::HarnessSettings;
use crate::suite::SuiteBuilder;

pub mod args;

/// Entry point for the binary.
pub fn run() -> miette::Result<ExitCode> {
    let args = HarnessArgs::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Extract { source, dest } => handle_extract(&source, &dest),
        Command::Run {
            compiler,
            compiler_args,
            spec_root,
            implementation,
            sass_version,
            filter,
            no_color,
        } => {
            let mut settings = HarnessSettings {
                spec_root,
                implementation,
                version: sass_version,
                filter,
                ..HarnessSettings::default()
            };
            if no_color {
                settings.use_colors = false;
            }
            handle_run(&settings, compiler, compiler_args)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // A second install (e.g. from tests) is harmless; keep the first one.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Handles the `extract` subcommand.
fn handle_extract(source: &Path, dest: &Path) -> miette::Result<ExitCode> {
    let report = extract::materialize(source, dest)?.into_result()?;
    println!(
        "Copied {} files and extracted {} archives ({} files) into {}",
        report.copied,
        report.archives,
        report.written,
        dest.display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Handles the `run` subcommand.
fn handle_run(
    settings: &HarnessSettings,
    program: PathBuf,
    args: Vec<String>,
) -> miette::Result<ExitCode> {
    let inputs = discovery::discover_inputs(&settings.spec_root)?;
    let suite = SuiteBuilder::new(&settings.spec_root, settings.resolver()).build(&inputs)?;
    info!(cases = suite.case_count(), "suite tree ready");

    let compiler = CommandCompiler::new(program, args);
    let results = Dispatcher::new(&compiler, settings).run_suite(&suite);

    let mut stdout = StandardStream::stdout(settings.color_choice());
    let summary = report::write_report(&mut stdout, &results).into_diagnostic()?;
    Ok(if summary.failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
