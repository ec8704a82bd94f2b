//! YAML view files.
//!
//! A view file stores a query, a sort, and formatters built from a fixed
//! set of builtins:
//!
//! ```yaml
//! query: "age > 30 and fullName == /cole/"
//! sort:
//!   - path: age
//!     direction: desc
//! column_formatters:
//!   person.lastName: lowercase
//!   fullName:
//!     join: [person.firstName, person.lastName]
//!     separator: " "
//! query_value_formatters:
//!   person.lastName: lowercase
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use indexmap::IndexMap;
use rowseek::{to_text, ColumnFormatters, FormatFn, SortKey};
use serde::Deserialize;
use serde_json::Value;

/// The contents of a view file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    pub query: Option<String>,
    pub sort: Vec<SortKey>,
    pub column_formatters: IndexMap<String, Builtin>,
    pub query_value_formatters: IndexMap<String, Builtin>,
}

impl ViewConfig {
    /// Reads and parses a view file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading view file {}", path.display()))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("parsing view file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded view file");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(ViewConfig::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn column_formatters(&self) -> ColumnFormatters {
        build(&self.column_formatters)
    }

    pub fn query_value_formatters(&self) -> ColumnFormatters {
        build(&self.query_value_formatters)
    }
}

fn build(entries: &IndexMap<String, Builtin>) -> ColumnFormatters {
    let mut formatters = ColumnFormatters::new();
    for (column, builtin) in entries {
        formatters.insert(column.clone(), builtin.to_format_fn());
    }
    formatters
}

/// A builtin formatter as written in a view file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Builtin {
    /// `lowercase`, `uppercase`, `reverse`, `trim`, `length`, `number`, `text`
    Named(Named),
    /// `{pick: sub.path}`: the value at a dotted path below the input.
    Pick { pick: String },
    /// `{join: [paths], separator: " "}`: the texts at several paths, joined.
    Join {
        join: Vec<String>,
        #[serde(default = "default_separator")]
        separator: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Named {
    Lowercase,
    Uppercase,
    Reverse,
    Trim,
    Length,
    Number,
    Text,
}

fn default_separator() -> String {
    " ".to_string()
}

impl Builtin {
    pub fn to_format_fn(&self) -> FormatFn {
        match self.clone() {
            Builtin::Named(named) => Arc::new(move |value: &Value| named.apply(value)),
            Builtin::Pick { pick } => Arc::new(move |value: &Value| pick_path(value, &pick)),
            Builtin::Join { join, separator } => Arc::new(move |value: &Value| {
                let parts: Vec<String> = join
                    .iter()
                    .map(|path| to_text(Some(&pick_path(value, path))).into_owned())
                    .collect();
                Value::String(parts.join(&separator))
            }),
        }
    }
}

impl Named {
    pub fn apply(self, value: &Value) -> Value {
        let text = to_text(Some(value));
        match self {
            Named::Lowercase => Value::String(text.to_lowercase()),
            Named::Uppercase => Value::String(text.to_uppercase()),
            Named::Reverse => Value::String(text.chars().rev().collect()),
            Named::Trim => Value::String(text.trim().to_string()),
            Named::Length => match value {
                Value::Array(items) => Value::from(items.len()),
                _ => Value::from(text.chars().count()),
            },
            Named::Number => match value {
                Value::Number(_) => value.clone(),
                _ => text
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
            },
            Named::Text => Value::String(text.into_owned()),
        }
    }
}

/// Looks up a dotted path below `value`. Missing paths give null.
fn pick_path(value: &Value, path: &str) -> Value {
    let pointer = format!("/{}", path.replace('.', "/"));
    value.pointer(&pointer).cloned().unwrap_or(Value::Null)
}
