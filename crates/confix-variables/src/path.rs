//! Variable reference grammar.
//!
//! A string value is a variable reference when the whole string has the form
//!
//! ```text
//! reference := "${" provider ":" path "}"
//! provider  := ident
//! path      := ident ("." ident)*
//! ident     := [A-Za-z0-9_-]+
//! ```
//!
//! There is no interpolation: `"prefix ${shared:key}"` and `" ${shared:key}"`
//! are plain literals. Formatting a parsed reference yields the input string
//! unchanged.

use std::fmt;
use std::str::FromStr;

use crate::{VariableError, VariableResult};

/// Version of the reference grammar understood by [`VariablePath::parse`].
pub const SYNTAX_VERSION: u32 = 1;

const OPEN: &str = "${";
const CLOSE: char = '}';
const PROVIDER_SEPARATOR: char = ':';
const SEGMENT_SEPARATOR: char = '.';

/// A parsed variable reference.
///
/// # Example
///
/// ```
/// use confix_variables::VariablePath;
///
/// let path = VariablePath::parse("${shared:db.password}").unwrap();
/// assert_eq!(path.provider(), "shared");
/// assert_eq!(path.path(), "db.password");
/// assert_eq!(path.to_string(), "${shared:db.password}");
///
/// assert!(VariablePath::parse("db.password").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariablePath {
    provider: String,
    path: String,
}

impl VariablePath {
    /// Creates a reference from its parts.
    ///
    /// # Errors
    ///
    /// Returns `VariableError::InvalidPath` if either part does not follow
    /// the grammar.
    pub fn new(provider: impl Into<String>, path: impl Into<String>) -> VariableResult<Self> {
        let provider = provider.into();
        let path = path.into();

        if !is_ident(&provider) {
            return Err(VariableError::invalid_path(
                format!("{OPEN}{provider}{PROVIDER_SEPARATOR}{path}{CLOSE}"),
                "provider must be non-empty and only contain letters, digits, '_' or '-'",
            ));
        }
        if !is_dotted_path(&path) {
            return Err(VariableError::invalid_path(
                format!("{OPEN}{provider}{PROVIDER_SEPARATOR}{path}{CLOSE}"),
                "path must be one or more identifiers separated by '.'",
            ));
        }

        Ok(Self { provider, path })
    }

    /// Parses a string value. Returns `None` for anything that is not
    /// exactly one reference.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let body = input.strip_prefix(OPEN)?.strip_suffix(CLOSE)?;
        let (provider, path) = body.split_once(PROVIDER_SEPARATOR)?;

        if !is_ident(provider) || !is_dotted_path(path) {
            return None;
        }

        Some(Self {
            provider: provider.to_string(),
            path: path.to_string(),
        })
    }

    /// The provider name.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// The dotted path inside the provider.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Iterates over the segments of [`path`](Self::path).
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split(SEGMENT_SEPARATOR)
    }
}

impl fmt::Display for VariablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{OPEN}{}{PROVIDER_SEPARATOR}{}{CLOSE}",
            self.provider, self.path
        )
    }
}

impl FromStr for VariablePath {
    type Err = VariableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            VariableError::invalid_path(s, "expected ${provider:path} with no surrounding text")
        })
    }
}

pub(crate) fn is_ident(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn is_dotted_path(value: &str) -> bool {
    value.split(SEGMENT_SEPARATOR).all(is_ident)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_simple() {
        let path = VariablePath::parse("${var:x}").unwrap();
        assert_eq!(path.provider(), "var");
        assert_eq!(path.path(), "x");
    }

    #[test]
    fn test_parse_nested_path() {
        let path = VariablePath::parse("${shared:db.primary.password}").unwrap();
        let segments: Vec<&str> = path.segments().collect();
        assert_eq!(segments, vec!["db", "primary", "password"]);
    }

    #[test]
    fn test_parse_allows_dash_and_underscore() {
        assert!(VariablePath::parse("${my-vault:api_key.v2}").is_some());
    }

    #[test]
    fn test_parse_rejects_literals() {
        for input in [
            "",
            "plain",
            "${}",
            "${var}",
            "${:x}",
            "${var:}",
            "${var:a..b}",
            "${var:.a}",
            "${var:a.}",
            "${var:x} ",
            " ${var:x}",
            "prefix ${var:x}",
            "${var:x}${var:y}",
            "${var:x}}",
            "${var:a:b}",
            "${var:has space}",
            "{var:x}",
            "$var:x",
        ] {
            assert!(VariablePath::parse(input).is_none(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_from_str_error() {
        let err = "not a reference".parse::<VariablePath>().unwrap_err();
        assert!(matches!(err, VariableError::InvalidPath { .. }));
    }

    #[test]
    fn test_new_validates() {
        assert!(VariablePath::new("shared", "a.b").is_ok());
        assert!(VariablePath::new("", "a").is_err());
        assert!(VariablePath::new("shared", "a..b").is_err());
    }

    #[test]
    fn test_ordering_and_equality_are_structural() {
        let a = VariablePath::parse("${a:x}").unwrap();
        let b = VariablePath::new("a", "x").unwrap();
        assert_eq!(a, b);
        assert!(a < VariablePath::parse("${b:x}").unwrap());
    }

    fn ident() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_-]{1,8}"
    }

    fn dotted() -> impl Strategy<Value = String> {
        prop::collection::vec(ident(), 1..4).prop_map(|segments| segments.join("."))
    }

    proptest! {
        #[test]
        fn prop_format_then_parse(provider in ident(), path in dotted()) {
            let original = VariablePath::new(provider, path).unwrap();
            let reparsed = VariablePath::parse(&original.to_string());
            prop_assert_eq!(reparsed, Some(original));
        }

        #[test]
        fn prop_parse_then_format_is_exact(input in any::<String>()) {
            if let Some(path) = VariablePath::parse(&input) {
                prop_assert_eq!(path.to_string(), input);
            }
        }

        #[test]
        fn prop_wellformed_strings_round_trip(provider in ident(), path in dotted()) {
            let input = format!("${{{provider}:{path}}}");
            let parsed = VariablePath::parse(&input);
            prop_assert!(parsed.is_some());
            prop_assert_eq!(parsed.map(|p| p.to_string()), Some(input));
        }
    }
}
