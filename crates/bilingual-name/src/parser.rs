//! Splitting raw names into primary and alternate parts

use crate::{NameError, Result};
use std::fmt;

/// A display name split at its parenthesized alternate part
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedName {
    /// Text before the parenthesis, in the default script
    pub primary: String,
    /// Text inside the parenthesis; `None` when absent or empty
    pub alternate: Option<String>,
}

impl ParsedName {
    /// Name with no alternate part
    pub fn primary_only(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            alternate: None,
        }
    }

    /// Name with both parts
    pub fn with_alternate(primary: impl Into<String>, alternate: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            alternate: Some(alternate.into()),
        }
    }

    /// Whether an alternate part is present
    pub fn has_alternate(&self) -> bool {
        self.alternate.is_some()
    }
}

impl fmt::Display for ParsedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alternate {
            Some(alt) => write!(f, "{} ({})", self.primary, alt),
            None => f.write_str(&self.primary),
        }
    }
}

/// Split a raw name into its primary and alternate parts
///
/// Without a `(` the whole string is the primary part. Otherwise the
/// alternate part runs from the first `(` to the first `)` after it, and the
/// primary part is everything before the `(` minus one trailing space. Text
/// after the closing `)` is ignored, so an alternate containing its own `)`
/// is cut short at that point.
///
/// Empty parentheses count as no alternate part at all: `"Jane ()"` parses
/// to the primary `"Jane"` and prints without the parentheses.
///
/// # Errors
/// [`NameError::Malformed`] when a `(` has no `)` after it.
pub fn parse(raw: &str) -> Result<ParsedName> {
    let Some(open) = raw.find('(') else {
        return Ok(ParsedName::primary_only(raw));
    };

    let after_open = &raw[open + 1..];
    let close = after_open
        .find(')')
        .ok_or_else(|| NameError::Malformed(raw.to_string()))?;

    let before = &raw[..open];
    let primary = before.strip_suffix(' ').unwrap_or(before);
    let alternate = &after_open[..close];

    if alternate.is_empty() {
        log::debug!("Empty alternate part in {raw:?}");
        return Ok(ParsedName::primary_only(primary));
    }

    Ok(ParsedName::with_alternate(primary, alternate))
}

/// Strip the alternate part from `raw` when `ascii_only` is set
///
/// Returns the primary part only if the flag is set and `raw` actually has
/// an alternate part. Names without one, and malformed names, come back
/// unchanged so that parsing reports them later.
pub fn should_omit_alternate(raw: &str, ascii_only: bool) -> String {
    if !ascii_only {
        return raw.to_string();
    }

    match parse(raw) {
        Ok(name) if name.has_alternate() => name.primary,
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_plain_name() {
        assert_eq!(
            parse("Alice Smith").unwrap(),
            ParsedName::primary_only("Alice Smith")
        );
    }

    #[test]
    fn test_parse_bilingual_name() {
        assert_eq!(
            parse("Li Wei (李伟)").unwrap(),
            ParsedName::with_alternate("Li Wei", "李伟")
        );
    }

    #[test]
    fn test_parse_strips_only_one_space() {
        assert_eq!(
            parse("Li Wei  (李伟)").unwrap(),
            ParsedName::with_alternate("Li Wei ", "李伟")
        );
        assert_eq!(
            parse("Li Wei(李伟)").unwrap(),
            ParsedName::with_alternate("Li Wei", "李伟")
        );
    }

    #[test]
    fn test_parse_empty_primary() {
        assert_eq!(parse("(x)").unwrap(), ParsedName::with_alternate("", "x"));
    }

    #[test]
    fn test_parse_unmatched_open() {
        assert_eq!(
            parse("Bad (Name"),
            Err(NameError::Malformed("Bad (Name".to_string()))
        );
        assert!(parse("(").is_err());
    }

    #[test]
    fn test_parse_close_before_open_is_unmatched() {
        assert!(parse("Odd ) (Name").is_err());
    }

    #[test]
    fn test_parse_first_close_wins() {
        assert_eq!(
            parse("Jane (J) Doe)").unwrap(),
            ParsedName::with_alternate("Jane", "J")
        );
    }

    #[test]
    fn test_parse_empty_parens() {
        let name = parse("Jane ()").unwrap();
        assert_eq!(name, ParsedName::primary_only("Jane"));
        assert!(!name.has_alternate());
        assert_eq!(name.to_string(), "Jane");
    }

    #[test]
    fn test_parse_nested_open() {
        // The first ')' after the first '(' closes the group
        assert_eq!(
            parse("A (b (c) d)").unwrap(),
            ParsedName::with_alternate("A", "b (c")
        );
    }

    #[test]
    fn test_display_round_trip() {
        for raw in ["Alice Smith", "Li Wei (李伟)", " (x)"] {
            let name = parse(raw).unwrap();
            assert_eq!(name.to_string(), raw);
        }
    }

    #[test]
    fn test_should_omit_alternate() {
        assert_eq!(should_omit_alternate("Li Wei (李伟)", true), "Li Wei");
        assert_eq!(should_omit_alternate("Li Wei (李伟)", false), "Li Wei (李伟)");
        assert_eq!(should_omit_alternate("Alice Smith", true), "Alice Smith");
    }

    #[test]
    fn test_should_omit_alternate_keeps_malformed() {
        assert_eq!(should_omit_alternate("Bad (Name", true), "Bad (Name");
    }
}
