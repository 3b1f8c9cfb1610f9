//! Command-line arguments and subcommands for the `sass-spec` binary.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::settings::{DEFAULT_IMPLEMENTATION, DEFAULT_SPEC_ROOT, DEFAULT_VERSION};

#[derive(Debug, Parser)]
#[command(
    name = "sass-spec",
    version,
    about = "Run the sass-spec conformance suite against a Sass compiler."
)]
pub struct HarnessArgs {
    /// Log more to stderr (-v for debug, -vv for trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Copy a spec tree and unpack every HRX archive in it.
    Extract {
        /// Spec tree containing plain fixtures and `.hrx` archives.
        source: PathBuf,
        /// Where the unpacked tree is written.
        dest: PathBuf,
    },
    /// Run every fixture under the spec root through a compiler executable.
    Run {
        /// The compiler executable to test.
        compiler: PathBuf,

        /// Extra arguments placed before the generated ones.
        #[arg(last = true)]
        compiler_args: Vec<String>,

        /// Root of the (already extracted) spec tree.
        #[arg(long, default_value = DEFAULT_SPEC_ROOT)]
        spec_root: PathBuf,

        /// Implementation tag used for overrides and skip lists.
        #[arg(long, default_value = DEFAULT_IMPLEMENTATION)]
        implementation: String,

        /// Sass language version the compiler supports.
        #[arg(long = "sass-version", default_value_t = DEFAULT_VERSION)]
        sass_version: f64,

        /// Only run cases whose path contains this (case-insensitive).
        #[arg(long)]
        filter: Option<String>,

        /// Disable colored output.
        #[arg(long)]
        no_color: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults() {
        let args = HarnessArgs::parse_from(["sass-spec", "run", "sassc"]);
        let Command::Run {
            compiler,
            compiler_args,
            spec_root,
            implementation,
            sass_version,
            filter,
            no_color,
        } = args.command
        else {
            panic!("expected run");
        };
        assert_eq!(compiler, PathBuf::from("sassc"));
        assert!(compiler_args.is_empty());
        assert_eq!(spec_root, PathBuf::from(DEFAULT_SPEC_ROOT));
        assert_eq!(implementation, "libsass");
        assert_eq!(sass_version, 3.6);
        assert_eq!(filter, None);
        assert!(!no_color);
    }

    #[test]
    fn trailing_arguments_go_to_the_compiler() {
        let args = HarnessArgs::parse_from([
            "sass-spec", "-vv", "run", "node", "--filter", "map", "--", "sass.js", "--no-source-map",
        ]);
        assert_eq!(args.verbose, 2);
        let Command::Run {
            compiler_args,
            filter,
            ..
        } = args.command
        else {
            panic!("expected run");
        };
        assert_eq!(compiler_args, vec!["sass.js", "--no-source-map"]);
        assert_eq!(filter.as_deref(), Some("map"));
    }
}
