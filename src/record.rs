//! Documentation records as they appear in a generated search index.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Position of an entry in the original payload array.
///
/// This is the "original array order" used to break ties in search results and
/// to associate body records with the section heading that precedes them.
pub type RecordId = usize;

/// Structural role of a record.
///
/// The generator emits `section` for headings and `page` for body paragraphs;
/// API reference pages additionally use the docstring categories. Unknown tags
/// are kept verbatim so they re-emit unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Section,
    Page,
    Module,
    Function,
    Method,
    Type,
    Macro,
    Constant,
    Other(String),
}

impl Category {
    /// The exact tag used on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Section => "section",
            Self::Page => "page",
            Self::Module => "module",
            Self::Function => "function",
            Self::Method => "method",
            Self::Type => "type",
            Self::Macro => "macro",
            Self::Constant => "constant",
            Self::Other(tag) => tag,
        }
    }

    /// Whether this record starts a new section in the page outline.
    pub const fn is_heading(&self) -> bool {
        matches!(self, Self::Section)
    }
}

impl From<String> for Category {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "section" => Self::Section,
            "page" => Self::Page,
            "module" => Self::Module,
            "function" => Self::Function,
            "method" => Self::Method,
            "type" => Self::Type,
            "macro" => Self::Macro,
            "constant" => Self::Constant,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for Category {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the search index: a page, section or heading and its prose.
///
/// Field order matches the generator's output so that serializing a record
/// reproduces the original bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocRecord {
    /// Anchor or path fragment used for deep links. Empty for page-level prose.
    pub location: String,
    /// Display title of the containing page.
    pub page: String,
    /// Section heading text, possibly empty.
    pub title: String,
    /// Prose associated with the location, possibly empty.
    pub text: String,
    pub category: Category,
}

/// Why an entry could not be read as a [`DocRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Malformed {
    NotAnObject,
    MissingField(&'static str),
    NotAString(&'static str),
    Nested(String),
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "entry is not an object"),
            Self::MissingField(field) => write!(f, "missing required field '{}'", field),
            Self::NotAString(field) => write!(f, "field '{}' is not a string", field),
            Self::Nested(field) => write!(f, "field '{}' holds a nested value", field),
        }
    }
}

impl DocRecord {
    /// Read a record from one element of the payload array.
    ///
    /// `location`, `page` and `category` must be strings. `title` and `text`
    /// read as empty when absent or null. Any object or array value makes the
    /// entry malformed, since records never contain other records.
    pub fn from_value(value: &Value) -> Result<Self, Malformed> {
        let object = value.as_object().ok_or(Malformed::NotAnObject)?;

        if let Some((key, _)) = object
            .iter()
            .find(|(_, v)| v.is_object() || v.is_array())
        {
            return Err(Malformed::Nested(key.clone()));
        }

        let required = |field: &'static str| match object.get(field) {
            None | Some(Value::Null) => Err(Malformed::MissingField(field)),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(Malformed::NotAString(field)),
        };
        let optional = |field: &'static str| match object.get(field) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(Malformed::NotAString(field)),
        };

        Ok(Self {
            location: required("location")?,
            page: required("page")?,
            title: optional("title")?,
            text: optional("text")?,
            category: Category::from(required("category")?),
        })
    }

    /// Whether this record addresses the page itself rather than an anchor.
    pub const fn is_page_level(&self) -> bool {
        self.location.is_empty()
    }

    /// Text to show for this record in listings: the title, or the start of the body.
    pub fn headline(&self) -> &str {
        if self.title.is_empty() {
            self.text.lines().next().unwrap_or("")
        } else {
            &self.title
        }
    }
}

/// An element of the payload array, kept in its original position.
///
/// Both variants keep the element as it was read, so keys the record type
/// does not know about and the generator's key order survive re-emission.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Record { record: DocRecord, raw: Value },
    Malformed { raw: Value, reason: Malformed },
}

impl Entry {
    pub fn from_value(value: Value) -> Self {
        match DocRecord::from_value(&value) {
            Ok(record) => Self::Record { record, raw: value },
            Err(reason) => Self::Malformed { raw: value, reason },
        }
    }

    pub const fn record(&self) -> Option<&DocRecord> {
        match self {
            Self::Record { record, .. } => Some(record),
            Self::Malformed { .. } => None,
        }
    }

    /// The element exactly as it appeared in the payload.
    pub const fn raw(&self) -> &Value {
        match self {
            Self::Record { raw, .. } | Self::Malformed { raw, .. } => raw,
        }
    }
}
