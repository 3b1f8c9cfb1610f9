use std::process::ExitCode;

fn main() -> miette::Result<ExitCode> {
    sass_spec_harness::cli::run()
}
