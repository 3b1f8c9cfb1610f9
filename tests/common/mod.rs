//! Shared fixture-tree helpers for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Writes `files` (relative path, body) under `root`, creating directories.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (name, body) in files {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
    }
}

/// An HRX archive with one fixture directory per case.
pub const CORE_ARCHIVE: &str = "\
<===> basic/input.scss
a { b: c; }
<===> basic/output.css
a {
  b: c;
}

<===> err/input.scss
ERR
<===> err/error
Error: Undefined variable.
  on line 1 of input.scss

<===> old/options.yml
:start_version: 3.0
:end_version: 3.5
<===> old/input.scss
a { b: c; }
<===> old/output.css
a { b: c; }

<===> wide/options.yml
:start_version: 3.0
<===> wide/input.scss
x { y: z; }
<===> wide/output.css
x { y: z; }

<===> mismatch/input.scss
a { b: c; }
<===> mismatch/output.css
a { b: d; }
";

/// Plain fixture directories sitting next to the archive.
pub const PLAIN_FIXTURES: &[(&str, &str)] = &[
    ("plain/override/input.scss", "x{y:z}"),
    ("plain/override/output.css", "nope"),
    ("plain/override/output-libsass.css", "x { y: z }\n"),
    ("plain/todo/options.yml", ":todo:\n- libsass\n"),
    ("plain/todo/input.scss", "a{}"),
    ("plain/todo/output.css", "a{}"),
];

/// Builds a source spec tree containing `core.hrx` plus the plain fixtures.
pub fn source_tree(root: &Path) -> PathBuf {
    let source = root.join("source");
    write_tree(&source, PLAIN_FIXTURES);
    write_tree(&source, &[("core.hrx", CORE_ARCHIVE)]);
    source
}
