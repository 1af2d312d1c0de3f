//! Input validation for gamestore
//!
//! Two concerns live here:
//!
//! - **Identifiers**: document IDs arrive in URLs and form bodies and become
//!   file names, so they are checked before touching the filesystem.
//! - **Form fields**: submitted forms are normalized into [`FormData`], then
//!   run through a declarative list of [`Rule`]s that trim, check and escape
//!   each field. A non-empty error list means nothing may be written.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

// =============================================================================
// Identifiers
// =============================================================================

/// Identifier validation errors
#[derive(Debug, Error)]
pub enum IdentifierError {
    #[error("Identifier cannot be empty")]
    Empty,

    #[error("Identifier '{0}' is too long")]
    TooLong(String),

    #[error("Identifier '{0}' contains invalid characters")]
    InvalidCharacters(String),
}

/// Maximum length for document identifiers
pub const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Validate a document ID
///
/// Generated IDs are 32 hex characters, but hand-written documents may use
/// any name made of ASCII letters, digits, `-` and `_` that does not start
/// with a separator. Anything else could escape the collection directory.
pub fn validate_document_id(id: &str) -> Result<(), IdentifierError> {
    if id.is_empty() {
        return Err(IdentifierError::Empty);
    }

    if id.len() > MAX_IDENTIFIER_LENGTH {
        return Err(IdentifierError::TooLong(id.to_string()));
    }

    let valid_chars = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    let valid_start = !id.starts_with(['-', '_']);

    if !valid_chars || !valid_start {
        return Err(IdentifierError::InvalidCharacters(id.to_string()));
    }

    Ok(())
}

// =============================================================================
// Form data
// =============================================================================

/// A submitted url-encoded form, with every field normalized to a list
///
/// Checkbox groups send zero, one or many values under the same key. Keeping
/// every field as a list means callers never branch on which case they got.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    values: BTreeMap<String, Vec<String>>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded key/value pairs, preserving repeated keys
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut form = Self::new();
        for (key, value) in pairs {
            form.values.entry(key.into()).or_default().push(value.into());
        }
        form
    }

    /// Builder-style setter used by the seed data and tests
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.entry(key.into()).or_default().push(value.into());
        self
    }

    /// First value of a field, or `""` when absent
    pub fn one(&self, field: &str) -> &str {
        self.values
            .get(field)
            .and_then(|v| v.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// All non-empty values of a field as a set
    pub fn many(&self, field: &str) -> BTreeSet<String> {
        self.values
            .get(field)
            .map(|values| {
                values
                    .iter()
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

// =============================================================================
// Field rules
// =============================================================================

/// What a rule checks on the trimmed value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Check {
    /// No check; the field is only trimmed and escaped
    Escape,
    /// At least this many characters
    MinLength(usize),
    /// A finite, non-negative decimal number
    Number,
    /// A non-negative integer
    WholeNumber,
}

/// A single field rule: which field, what to check, what to say on failure
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub field: &'static str,
    pub check: Check,
    pub message: &'static str,
}

impl Rule {
    pub const fn escape(field: &'static str) -> Self {
        Self {
            field,
            check: Check::Escape,
            message: "",
        }
    }

    pub const fn min_length(field: &'static str, min: usize, message: &'static str) -> Self {
        Self {
            field,
            check: Check::MinLength(min),
            message,
        }
    }

    pub const fn number(field: &'static str, message: &'static str) -> Self {
        Self {
            field,
            check: Check::Number,
            message,
        }
    }

    pub const fn whole_number(field: &'static str, message: &'static str) -> Self {
        Self {
            field,
            check: Check::WholeNumber,
            message,
        }
    }

    fn passes(&self, value: &str) -> bool {
        match self.check {
            Check::Escape => true,
            Check::MinLength(min) => value.chars().count() >= min,
            Check::Number => value
                .parse::<f64>()
                .map(|n| n.is_finite() && n >= 0.0)
                .unwrap_or(false),
            Check::WholeNumber => value.parse::<u32>().is_ok(),
        }
    }
}

/// A field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Sanitized form values together with any rule failures
#[derive(Debug, Clone, Default)]
pub struct Validated {
    values: BTreeMap<&'static str, String>,
    pub errors: Vec<FieldError>,
}

impl Validated {
    /// The trimmed and escaped value of a ruled field
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// Like [`get`](Self::get), but `None` for an empty value
    pub fn get_opt(&self, field: &str) -> Option<String> {
        Some(self.get(field)).filter(|v| !v.is_empty()).map(str::to_string)
    }

    /// Record a failure found outside the declarative rules
    pub fn reject(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run rules in order against a form
///
/// Each field reports at most one error: the first rule it fails.
pub fn validate(form: &FormData, rules: &[Rule]) -> Validated {
    let mut validated = Validated::default();
    let mut failed: BTreeSet<&str> = BTreeSet::new();

    for rule in rules {
        let value = form.one(rule.field).trim();

        if !failed.contains(rule.field) && !rule.passes(value) {
            failed.insert(rule.field);
            validated.reject(rule.field, rule.message);
        }

        validated
            .values
            .entry(rule.field)
            .or_insert_with(|| escape(value));
    }

    validated
}

/// Replace characters that are unsafe in HTML with entities
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            c => out.push(c),
        }
    }
    out
}
