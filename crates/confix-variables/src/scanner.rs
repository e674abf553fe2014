//! Reference scanning.

use indexmap::IndexSet;
use serde_json::Value;

use crate::VariablePath;

/// One reference found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableOccurrence {
    /// The parsed reference.
    pub path: VariablePath,
    /// JSON pointer (RFC 6901) to the string holding the reference.
    pub pointer: String,
}

/// Result of [`scan`].
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    occurrences: Vec<VariableOccurrence>,
    distinct: IndexSet<VariablePath>,
}

impl ScanResult {
    /// Every occurrence in depth-first document order.
    #[must_use]
    pub fn occurrences(&self) -> &[VariableOccurrence] {
        &self.occurrences
    }

    /// Unique references in order of first occurrence.
    #[must_use]
    pub const fn distinct(&self) -> &IndexSet<VariablePath> {
        &self.distinct
    }

    /// Returns `true` if the document has no references.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

/// Collects every string leaf of `value` that is a variable reference.
///
/// Object members are visited in document order. Numbers, booleans, nulls
/// and object keys are never considered.
///
/// # Example
///
/// ```
/// use confix_variables::scan;
/// use serde_json::json;
///
/// let doc = json!({"a": "${var:x}", "b": ["${var:x}", 5]});
/// let result = scan(&doc);
///
/// assert_eq!(result.occurrences().len(), 2);
/// assert_eq!(result.distinct().len(), 1);
/// assert_eq!(result.occurrences()[1].pointer, "/b/0");
/// ```
#[must_use]
pub fn scan(value: &Value) -> ScanResult {
    let mut result = ScanResult::default();
    let mut pointer = String::new();
    walk(value, &mut pointer, &mut result);
    result
}

fn walk(value: &Value, pointer: &mut String, result: &mut ScanResult) {
    match value {
        Value::String(s) => {
            if let Some(path) = VariablePath::parse(s) {
                result.distinct.insert(path.clone());
                result.occurrences.push(VariableOccurrence {
                    path,
                    pointer: pointer.clone(),
                });
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&index.to_string());
                walk(item, pointer, result);
                pointer.truncate(len);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                let len = pointer.len();
                pointer.push('/');
                push_escaped(pointer, key);
                walk(item, pointer, result);
                pointer.truncate(len);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn push_escaped(pointer: &mut String, token: &str) {
    for c in token.chars() {
        match c {
            '~' => pointer.push_str("~0"),
            '/' => pointer.push_str("~1"),
            c => pointer.push(c),
        }
    }
}
