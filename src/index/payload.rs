//! Reading and writing the JavaScript-wrapped payload.
//!
//! The generator writes a single assignment:
//!
//! ```text
//! var documenterSearchIndex = {"docs":
//! [{"location":"...","page":"...","title":"...","text":"...","category":"..."}, ...]
//! }
//! ```
//!
//! Bare JSON (the object or just the array) is accepted too.

use crate::error::LoadError;
use crate::record::Entry;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Key under which the record array lives in the wrapped form.
const DOCS_KEY: &str = "docs";

/// `var name =`, `const name =`, `window.name =` and similar.
static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:var|let|const)\s+)?([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)\s*=\s*")
        .expect("assignment pattern is valid")
});

/// The JavaScript assignment the payload was bound with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Name of the bound variable, e.g. `documenterSearchIndex`.
    pub name: String,
    /// Source text up to and including `=` and the following whitespace.
    prefix: String,
}

impl Binding {
    /// The binding the generator uses.
    pub fn documenter() -> Self {
        Self {
            name: "documenterSearchIndex".to_string(),
            prefix: "var documenterSearchIndex = ".to_string(),
        }
    }
}

/// How the record array was laid out at the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `{"docs": [...]}`
    Wrapped,
    /// `[...]`
    Bare,
}

/// A parsed payload: its framing plus every array element in order.
#[derive(Debug, Clone)]
pub struct Payload {
    pub binding: Option<Binding>,
    pub layout: Layout,
    pub entries: Vec<Entry>,
}

/// Parse a payload from its source text.
///
/// Only framing problems are errors. Elements that are not valid records are
/// kept as [`Entry::Malformed`].
pub fn parse(source: &str) -> Result<Payload, LoadError> {
    let source = source.trim_start_matches('\u{feff}').trim();

    let (binding, body) = match ASSIGNMENT.captures(source) {
        Some(captures) => {
            let whole = captures.get(0).map_or("", |m| m.as_str());
            let name = captures.get(1).map_or("", |m| m.as_str());
            (
                Some(Binding {
                    name: name.to_string(),
                    prefix: whole.to_string(),
                }),
                &source[whole.len()..],
            )
        }
        None => (None, source),
    };

    let body = body.trim_end().trim_end_matches(';').trim_end();
    let value: Value = serde_json::from_str(body).map_err(|e| LoadError::from_json(&e))?;

    let (layout, items) = match value {
        Value::Array(items) => (Layout::Bare, items),
        Value::Object(mut object) => {
            let docs = object
                .remove(DOCS_KEY)
                .ok_or_else(|| LoadError::Shape(format!("object has no '{}' key", DOCS_KEY)))?;
            if !object.is_empty() {
                tracing::warn!(
                    "Ignoring {} unexpected top-level key(s) next to '{}'",
                    object.len(),
                    DOCS_KEY
                );
            }
            match docs {
                Value::Array(items) => (Layout::Wrapped, items),
                other => {
                    return Err(LoadError::Shape(format!(
                        "'{}' is {} rather than an array",
                        DOCS_KEY,
                        json_kind(&other)
                    )));
                }
            }
        }
        other => {
            return Err(LoadError::Shape(format!(
                "top level is {} rather than an array or object",
                json_kind(&other)
            )));
        }
    };

    let entries: Vec<Entry> = items.into_iter().map(Entry::from_value).collect();

    Ok(Payload {
        binding,
        layout,
        entries,
    })
}

/// Serialize entries back into payload text.
///
/// Every element is written from the value it was read as, keys in their
/// original order, so an unmodified payload re-emits byte for byte.
pub fn emit(binding: Option<&Binding>, layout: Layout, entries: &[Entry]) -> String {
    let mut out = String::new();

    if let Some(binding) = binding {
        out.push_str(&binding.prefix);
    }
    if layout == Layout::Wrapped {
        out.push_str("{\"docs\":\n");
    }

    out.push('[');
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        // Values read from JSON always serialize.
        out.push_str(&serde_json::to_string(entry.raw()).unwrap_or_default());
    }
    out.push(']');

    if layout == Layout::Wrapped {
        out.push_str("\n}");
    }
    out.push('\n');
    out
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
