//! Tree rewriting.

use serde_json::Value;

use crate::{ResolutionMap, ScanResult, VariableError, VariablePath, VariableResult};

/// Returns a copy of `value` with every occurrence in `scanned` replaced by
/// its resolved value.
///
/// `scanned` must come from [`scan`](crate::scan) of the same `value`. The
/// input is not modified. A resolved value may have a different shape than
/// the string it replaces, so `"${shared:db}"` can become an object.
///
/// # Errors
///
/// Returns `VariableError::MissingResolution` for the first occurrence in
/// document order that has no entry in `resolved`, and
/// `VariableError::StaleOccurrence` if an occurrence does not point at its
/// reference in `value`.
///
/// # Example
///
/// ```
/// use confix_variables::{rewrite, scan, ResolutionMap, VariablePath};
/// use serde_json::json;
///
/// let mut resolved = ResolutionMap::new();
/// resolved.insert(VariablePath::parse("${var:x}").unwrap(), json!("VALUE"));
///
/// let doc = json!({"a": "${var:x}", "b": 5});
/// let out = rewrite(&doc, &scan(&doc), &resolved).unwrap();
/// assert_eq!(out, json!({"a": "VALUE", "b": 5}));
/// ```
pub fn rewrite(
    value: &Value,
    scanned: &ScanResult,
    resolved: &ResolutionMap,
) -> VariableResult<Value> {
    let mut out = value.clone();

    for occurrence in scanned.occurrences() {
        let replacement = resolved.get(&occurrence.path).ok_or_else(|| {
            VariableError::MissingResolution {
                path: occurrence.path.clone(),
            }
        })?;

        match out.pointer_mut(&occurrence.pointer) {
            Some(slot) if holds(slot, &occurrence.path) => *slot = replacement.clone(),
            _ => {
                return Err(VariableError::StaleOccurrence {
                    pointer: occurrence.pointer.clone(),
                })
            }
        }
    }

    Ok(out)
}

fn holds(slot: &Value, path: &VariablePath) -> bool {
    slot.as_str().and_then(VariablePath::parse).as_ref() == Some(path)
}
