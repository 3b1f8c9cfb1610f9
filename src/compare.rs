//! Output and error comparison.
//!
//! Both comparisons are deliberately loose. CSS is compared with every
//! whitespace character removed, so `a { color: red; }` equals
//! `a{color:red;}`; this also hides real differences such as a missing
//! space in `a b` vs `ab`, and expected files in the corpus rely on it.
//! Errors are compared on their first line only.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static DEPRECATION_BANNER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"DEPRECATION WARNING:[\s\w().\-"]+\n\n"#).expect("valid regex")
});

/// Removes every whitespace character.
pub fn normalize_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Drops the first `DEPRECATION WARNING: ...` paragraph, if any.
pub fn strip_deprecation_banner(text: &str) -> Cow<'_, str> {
    DEPRECATION_BANNER.replace(text, "")
}

pub fn first_line(text: &str) -> &str {
    let line = text.split('\n').next().unwrap_or_default();
    line.strip_suffix('\r').unwrap_or(line)
}

pub fn outputs_match(actual: &str, expected: &str) -> bool {
    normalize_whitespace(actual) == normalize_whitespace(expected)
}

/// Compares the first lines of two error texts, ignoring a leading
/// deprecation banner on either side.
pub fn errors_match(actual: &str, expected: &str) -> bool {
    first_line(&strip_deprecation_banner(actual)) == first_line(&strip_deprecation_banner(expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_is_ignored_entirely() {
        assert!(outputs_match("a{color:red;}", "a { color: red; }\n"));
        assert!(outputs_match("a {\n  b: c;\n}\n", "a{b:c}\r\n"));
        assert!(!outputs_match("a{b:2}", "a{b:1}"));
    }

    #[test]
    fn whitespace_looseness_hides_descendant_selectors() {
        assert!(outputs_match("ab{c:d}", "a b { c: d; }"));
    }

    #[test]
    fn errors_compare_on_the_first_line() {
        assert!(errors_match(
            "Error: Undefined variable.\n  on line 1 of input.scss",
            "Error: Undefined variable.\n        ,\n1 | a {b: $x}\n"
        ));
        assert!(!errors_match("Error: x\n", "Error: y\n"));
    }

    #[test]
    fn deprecation_banner_is_skipped() {
        let expected = "DEPRECATION WARNING: Passing a string to call() is deprecated.\n\nError: boom\n";
        assert_eq!(first_line(&strip_deprecation_banner(expected)), "Error: boom");
        assert!(errors_match("Error: boom\n", expected));
    }

    #[test]
    fn first_line_of_empty_text_is_empty() {
        assert_eq!(first_line(""), "");
        assert_eq!(first_line("x\r\ny"), "x");
    }
}
