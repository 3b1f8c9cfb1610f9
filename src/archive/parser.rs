//! Line-oriented HRX parser.
//!
//! ```text
//! <===> input.scss
//! a {b: c}
//!
//! <===> output.css
//! a {
//!   b: c;
//! }
//!
//! <===> sub/
//! ```
//!
//! The first line fixes the boundary (`<` + one or more `=` + `>`); every
//! line that starts with that exact boundary is an entry header. A header is
//! a comment (`<===>`), a file (`<===> path`) or a directory (`<===> path/`).
//! A file body is everything up to the newline that precedes the next
//! header; that newline separates entries and is not part of the file. The
//! last entry's body runs to the end of the text unchanged.

use std::borrow::Cow;
use std::collections::HashSet;

use super::{Archive, ArchiveEntry, Directory};
use crate::diagnostics::{HarnessError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderKind<'a> {
    Comment,
    File(&'a str),
    Directory(&'a str),
}

#[derive(Debug)]
struct Header<'a> {
    /// Offset of the header line.
    start: usize,
    /// End of the header line, newline excluded.
    end: usize,
    /// Offset of the first body byte.
    body_start: usize,
    kind: HeaderKind<'a>,
}

impl Header<'_> {
    fn span(&self) -> (usize, usize) {
        (self.start, self.end - self.start)
    }
}

/// Folds `\r\n` and lone `\r` into `\n`. Mixed line endings would otherwise
/// hide boundaries at the start of a line.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Parses the text of one archive. `name` labels diagnostics.
pub fn parse(name: &str, text: &str) -> Result<Archive> {
    let text = normalize_newlines(text);
    let text = text.as_ref();

    let mut archive = Archive::default();
    if text.is_empty() {
        return Ok(archive);
    }

    let boundary = read_boundary(name, text)?;
    let headers = scan_headers(name, text, boundary)?;
    let mut declared = HashSet::new();

    for (index, header) in headers.iter().enumerate() {
        let body_end = match headers.get(index + 1) {
            Some(next) if next.start > header.body_start => next.start - 1,
            Some(next) => next.start,
            None => text.len(),
        };
        let body = &text[header.body_start..body_end];

        let (path, entry) = match header.kind {
            HeaderKind::Comment => continue,
            HeaderKind::File(path) => (path, ArchiveEntry::File(body.to_string())),
            HeaderKind::Directory(path) => {
                if !body.chars().all(|c| c == '\n') {
                    return Err(HarnessError::archive(
                        name,
                        text,
                        header.span(),
                        format!("directory '{path}/' cannot have contents"),
                        Some("only blank lines may follow a directory entry"),
                    ));
                }
                (path, ArchiveEntry::Directory(Directory::default()))
            }
        };

        if !declared.insert(path) || !insert_entry(&mut archive.root, path, entry) {
            return Err(HarnessError::ArchiveDuplicate {
                archive: name.to_string(),
                path: path.to_string(),
                src: miette::NamedSource::new(name, text.to_string()),
                span: header.span().into(),
            });
        }
    }

    Ok(archive)
}

fn read_boundary<'a>(name: &str, text: &'a str) -> Result<&'a str> {
    let first_line = text.split('\n').next().unwrap_or_default();
    let equals = first_line
        .strip_prefix('<')
        .map(|rest| rest.bytes().take_while(|b| *b == b'=').count())
        .unwrap_or(0);
    if equals == 0 || first_line.as_bytes().get(equals + 1) != Some(&b'>') {
        return Err(HarnessError::archive(
            name,
            text,
            (0, first_line.len()),
            "archive must begin with a boundary",
            Some("start the archive with a line like `<===> path`"),
        ));
    }
    Ok(&first_line[..equals + 2])
}

fn scan_headers<'a>(name: &str, text: &'a str, boundary: &str) -> Result<Vec<Header<'a>>> {
    let mut headers = Vec::new();
    let mut offset = 0;

    for raw in text.split_inclusive('\n') {
        let start = offset;
        offset += raw.len();
        let line = raw.strip_suffix('\n').unwrap_or(raw);
        let Some(rest) = line.strip_prefix(boundary) else {
            continue;
        };
        let end = start + line.len();
        let span = (start, line.len());

        let kind = if rest.is_empty() {
            HeaderKind::Comment
        } else if let Some(path) = rest.strip_prefix(' ') {
            let (path, is_dir) = match path.strip_suffix('/') {
                Some(dir) => (dir, true),
                None => (path, false),
            };
            if let Err(reason) = validate_path(path) {
                return Err(HarnessError::archive(name, text, span, reason, None));
            }
            if is_dir {
                HeaderKind::Directory(path)
            } else {
                HeaderKind::File(path)
            }
        } else {
            return Err(HarnessError::archive(
                name,
                text,
                span,
                "unterminated entry header",
                Some("a boundary must be followed by a space and a path, or end the line"),
            ));
        };

        headers.push(Header {
            start,
            end,
            body_start: offset,
            kind,
        });
    }

    Ok(headers)
}

fn validate_path(path: &str) -> std::result::Result<(), String> {
    if path.is_empty() {
        return Err("entry path is empty".to_string());
    }
    for component in path.split('/') {
        if component.is_empty() {
            return Err(format!("path '{path}' skips a directory level"));
        }
        if component == "." || component == ".." {
            return Err(format!("path '{path}' may not contain '{component}'"));
        }
        if let Some(c) = component
            .chars()
            .find(|c| *c == '\\' || *c == ':' || c.is_control())
        {
            return Err(format!("path '{path}' contains invalid character {c:?}"));
        }
    }
    Ok(())
}

/// Places `entry` at `path`, opening parent directories on demand.
/// Returns `false` when the leaf name, or one of its parents, is taken by a
/// file.
fn insert_entry(root: &mut Directory, path: &str, entry: ArchiveEntry) -> bool {
    let mut components: Vec<&str> = path.split('/').collect();
    let Some(leaf) = components.pop() else {
        return false;
    };

    let mut current = root;
    for name in components {
        current = match current.child_dir_mut(name) {
            Some(dir) => dir,
            None => return false,
        };
    }

    match entry {
        // Reopening a directory that a deeper path already created is fine.
        ArchiveEntry::Directory(_) => current.child_dir_mut(leaf).is_some(),
        file => current.insert(leaf, file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveFile;

    fn files(text: &str) -> Vec<(String, String)> {
        parse("test.hrx", text)
            .unwrap()
            .files()
            .into_iter()
            .map(|ArchiveFile { path, body }| (path, body))
            .collect()
    }

    fn error(text: &str) -> String {
        parse("test.hrx", text).unwrap_err().to_string()
    }

    #[test]
    fn single_nested_file_without_trailing_newline() {
        assert_eq!(
            files("<===> a/b.txt\nhello"),
            vec![("a/b.txt".to_string(), "hello".to_string())]
        );
    }

    #[test]
    fn bodies_run_to_the_next_boundary() {
        let text = "<===> input.scss\na {b: c}\n\n<===> output.css\na {\n  b: c;\n}\n";
        assert_eq!(
            files(text),
            vec![
                ("input.scss".to_string(), "a {b: c}\n".to_string()),
                ("output.css".to_string(), "a {\n  b: c;\n}\n".to_string()),
            ]
        );
    }

    #[test]
    fn newline_before_a_boundary_separates_entries() {
        let text = "<===> input.scss\na {b: c}\n\n<===> output.css\nx\n";
        assert_eq!(
            files(text),
            vec![
                ("input.scss".to_string(), "a {b: c}\n".to_string()),
                ("output.css".to_string(), "x\n".to_string()),
            ]
        );
        assert_eq!(
            files("<===> a\n<===> b\n\n<===> c\n"),
            vec![
                ("a".to_string(), String::new()),
                ("b".to_string(), String::new()),
                ("c".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn crlf_archives_parse_like_lf_archives() {
        let lf = "<===> a/input.scss\nx\n<===> a/output.css\ny\n";
        let crlf = lf.replace('\n', "\r\n");
        assert_eq!(files(&crlf), files(lf));
    }

    #[test]
    fn comments_and_directories_are_not_files() {
        let text = "<===>\nsome comment\n<===> dir/\n\n<===> dir/file\nbody\n";
        assert_eq!(
            files(text),
            vec![("dir/file".to_string(), "body\n".to_string())]
        );
    }

    #[test]
    fn empty_directory_is_kept_in_the_model() {
        let archive = parse("test.hrx", "<===> empty/\n").unwrap();
        assert!(matches!(
            archive.root.get("empty"),
            Some(ArchiveEntry::Directory(dir)) if dir.is_empty()
        ));
        assert!(archive.files().is_empty());
    }

    #[test]
    fn longer_boundary_leaves_shorter_lines_in_the_body() {
        let text = "<=====> inner.hrx\n<===> a\nb\n<=====> other\nc";
        assert_eq!(
            files(text),
            vec![
                ("inner.hrx".to_string(), "<===> a\nb".to_string()),
                ("other".to_string(), "c".to_string()),
            ]
        );
    }

    #[test]
    fn empty_text_is_an_empty_archive() {
        assert!(parse("test.hrx", "").unwrap().root.is_empty());
    }

    #[test]
    fn missing_boundary_is_rejected() {
        assert!(error("hello\n<===> a\n").contains("must begin with a boundary"));
        assert!(error("<> a\n").contains("must begin with a boundary"));
    }

    #[test]
    fn duplicate_entries_are_rejected() {
        assert!(error("<===> a\n1\n<===> a\n2\n").contains("duplicate entry 'a'"));
        assert!(error("<===> a/b\n1\n<===> a\n2\n").contains("duplicate entry 'a'"));
        assert!(error("<===> a\n1\n<===> a/b\n2\n").contains("duplicate entry 'a/b'"));
        assert!(error("<===> d/\n<===> d/\n").contains("duplicate entry 'd'"));
    }

    #[test]
    fn implicit_directory_may_be_declared_once() {
        let text = "<===> d/x\n1\n<===> d/\n";
        assert_eq!(files(text), vec![("d/x".to_string(), "1".to_string())]);
    }

    #[test]
    fn malformed_paths_are_rejected() {
        assert!(error("<===> a//b\n").contains("skips a directory level"));
        assert!(error("<===> /a\n").contains("skips a directory level"));
        assert!(error("<===> a/../b\n").contains("may not contain '..'"));
        assert!(error("<===> a\\b\n").contains("invalid character"));
        assert!(error("<===> \n").contains("entry path is empty"));
    }

    #[test]
    fn header_without_space_is_unterminated() {
        assert!(error("<===>a\n").contains("unterminated entry header"));
    }

    #[test]
    fn directory_with_contents_is_rejected() {
        assert!(error("<===> d/\ncontent\n").contains("cannot have contents"));
    }
}
