//! # Configuration Cascade
//!
//! Every directory of the spec tree may carry an `options.yml`. Options flow
//! top-down: a directory's document is merged on top of whatever its parent
//! resolved, and the result is what its children inherit. A [`Configuration`]
//! is never mutated once built; [`Configuration::merge`] returns a new one.
//!
//! Documents write keys with a leading marker (`:todo:`); the marker is
//! dropped on load so `:todo` and `todo` name the same option.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_yaml::Value as Yaml;
use tracing::warn;

use crate::diagnostics::{HarnessError, Result};

// =====================
// Option Values
// =====================

/// Name of the per-directory configuration document.
pub const OPTIONS_FILE_NAME: &str = "options.yml";

/// Option keys the harness understands.
pub mod keys {
    pub const PRECISION: &str = "precision";
    pub const OUTPUT_STYLE: &str = "output_style";
    pub const TODO: &str = "todo";
    pub const ONLY_ON: &str = "only_on";
    pub const IGNORE_FOR: &str = "ignore_for";
    pub const WARNING_TODO: &str = "warning_todo";
    pub const START_VERSION: &str = "start_version";
    pub const END_VERSION: &str = "end_version";
}

/// A single option value: a scalar or a flat list of scalars.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<OptionValue>),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Null => write!(f, "null"),
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Number(n) => write!(f, "{n}"),
            OptionValue::String(s) => write!(f, "{s}"),
            OptionValue::List(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

impl<T: Into<OptionValue>> From<Vec<T>> for OptionValue {
    fn from(items: Vec<T>) -> Self {
        OptionValue::List(items.into_iter().map(Into::into).collect())
    }
}

// =====================
// Configuration
// =====================

/// Resolved options for one directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Configuration {
    values: BTreeMap<String, OptionValue>,
}

impl<K: Into<String>> FromIterator<(K, OptionValue)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (K, OptionValue)>>(iter: I) -> Self {
        Configuration {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Configuration {
    /// An empty configuration, the starting point of the root suite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value for `key`, with the leading marker already stripped.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Layers `child` on top of `self`.
    ///
    /// When the parent holds a list, the child's items are appended
    /// (parent first, duplicates kept); a child scalar is appended as one
    /// item and a child `null` leaves the list alone. Any other key is
    /// replaced by the child's value.
    pub fn merge(&self, child: &Configuration) -> Configuration {
        let mut values = self.values.clone();
        for (key, value) in &child.values {
            let merged = match (values.get(key), value) {
                (Some(OptionValue::List(parent)), OptionValue::List(items)) => {
                    OptionValue::List(parent.iter().chain(items).cloned().collect())
                }
                (Some(OptionValue::List(parent)), OptionValue::Null) => {
                    OptionValue::List(parent.clone())
                }
                (Some(OptionValue::List(parent)), scalar) => {
                    let mut items = parent.clone();
                    items.push(scalar.clone());
                    OptionValue::List(items)
                }
                _ => value.clone(),
            };
            values.insert(key.clone(), merged);
        }
        Configuration { values }
    }

    /// Reads a numeric option. Numeric strings count; anything else is
    /// treated as unset.
    pub fn number(&self, key: &str) -> Option<f64> {
        let n = match self.get(key)? {
            OptionValue::Number(n) => *n,
            OptionValue::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }

    /// Reads a string option. Non-string values read as unset.
    pub fn string(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Reads a list option as strings. `null` and missing keys are `None`;
    /// a lone scalar reads as a one-item list.
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        match self.get(key)? {
            OptionValue::Null => None,
            OptionValue::List(items) => Some(
                items
                    .iter()
                    .filter(|item| **item != OptionValue::Null)
                    .map(ToString::to_string)
                    .collect(),
            ),
            scalar => Some(vec![scalar.to_string()]),
        }
    }

    /// Parses an options document. `path` only labels errors.
    pub fn from_yaml(path: &Path, text: &str) -> Result<Configuration> {
        let document: Yaml =
            serde_yaml::from_str(text).map_err(|e| HarnessError::config_parse(path, text, e))?;
        let mapping = match document {
            Yaml::Null => return Ok(Configuration::new()),
            Yaml::Mapping(mapping) => mapping,
            _ => {
                return Err(HarnessError::ConfigValue {
                    path: path.to_path_buf(),
                    key: "(document)".to_string(),
                    message: "must be a mapping of options".to_string(),
                })
            }
        };

        let mut values = BTreeMap::new();
        for (key, value) in mapping {
            let Yaml::String(key) = key else {
                return Err(HarnessError::ConfigValue {
                    path: path.to_path_buf(),
                    key: format!("{key:?}"),
                    message: "is not a string".to_string(),
                });
            };
            let key = key.strip_prefix(':').unwrap_or(&key).to_string();
            let value = convert_value(value, true).map_err(|message| HarnessError::ConfigValue {
                path: path.to_path_buf(),
                key: key.clone(),
                message,
            })?;
            values.insert(key, value);
        }
        Ok(Configuration { values })
    }
}

// =====================
// YAML Conversion
// =====================

fn convert_value(value: Yaml, allow_list: bool) -> std::result::Result<OptionValue, String> {
    match value {
        Yaml::Null => Ok(OptionValue::Null),
        Yaml::Bool(b) => Ok(OptionValue::Bool(b)),
        Yaml::Number(n) => n
            .as_f64()
            .map(OptionValue::Number)
            .ok_or_else(|| format!("has an unrepresentable number {n}")),
        Yaml::String(s) => Ok(OptionValue::String(s)),
        Yaml::Sequence(items) if allow_list => items
            .into_iter()
            .map(|item| convert_value(item, false))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(OptionValue::List),
        Yaml::Sequence(_) => Err("contains a nested list".to_string()),
        Yaml::Mapping(_) => Err("holds a mapping; only scalars and lists are supported".to_string()),
        Yaml::Tagged(tagged) => Err(format!("uses an unsupported tag {}", tagged.tag)),
    }
}

// =====================
// Loading and Cascade
// =====================

/// Matches the one known-broken document shape in sass-spec: a `:todo:`
/// key declared twice, the second list ending in `libsass`.
static DUPLICATE_TODO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":todo:\n(- [\w-]+\n)*?- libsass").expect("valid regex"));

/// Options substituted when [`DUPLICATE_TODO`] matches an unparsable document.
pub fn duplicate_todo_fallback() -> Configuration {
    [(keys::TODO, OptionValue::from(vec!["libsass"]))]
        .into_iter()
        .collect()
}

/// Loads `dir/options.yml`, if present.
///
/// A document that fails to parse is fatal, except for the duplicated
/// `:todo:` key shape, which loads as [`duplicate_todo_fallback`].
pub fn load_document(dir: &Path) -> Result<Option<Configuration>> {
    let path = dir.join(OPTIONS_FILE_NAME);
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path).map_err(|e| HarnessError::io("read", &path, e))?;
    match Configuration::from_yaml(&path, &text) {
        Ok(config) => Ok(Some(config)),
        Err(HarnessError::ConfigParse { .. }) if DUPLICATE_TODO.is_match(&text) => {
            warn!(path = %path.display(), "duplicate :todo: key, using fallback options");
            Ok(Some(duplicate_todo_fallback()))
        }
        Err(err) => Err(err),
    }
}

/// Resolves the options for `dir` given what its parent resolved.
pub fn cascade(inherited: &Configuration, dir: &Path) -> Result<Configuration> {
    Ok(match load_document(dir)? {
        Some(document) => inherited.merge(&document),
        None => inherited.clone(),
    })
}

// =====================
// Tests
// =====================
