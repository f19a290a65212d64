use crate::error::{MailAdmError, Result};
use std::fmt;

/// Widest id range a single argument may expand to.
pub const MAX_RANGE_SPAN: u64 = 10_000;

/// How a command-line argument refers to a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Id(u64),
    /// Domain name, mailbox email, user email or broadcast name.
    Key(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(id) => write!(f, "#{}", id),
            Selector::Key(key) => write!(f, "'{}'", key),
        }
    }
}

impl Selector {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.parse::<u64>() {
            Ok(id) => Selector::Id(id),
            Err(_) => Selector::Key(s.to_string()),
        }
    }
}

/// Parses one argument into selectors, expanding id ranges like `3-5`.
///
/// A dash only forms a range when both sides are ids, so `suspended-co.com`
/// stays a single key.
pub fn parse_selector_or_range(s: &str) -> Result<Vec<Selector>> {
    let s = s.trim();
    if s.is_empty() {
        return Err(MailAdmError::Validation("Empty selector".to_string()));
    }

    if let Some((start, end)) = s.split_once('-') {
        if let (Ok(start), Ok(end)) = (start.parse::<u64>(), end.parse::<u64>()) {
            if start > end {
                return Err(MailAdmError::Validation(format!(
                    "Invalid range: start ({}) must be <= end ({})",
                    start, end
                )));
            }
            if end - start >= MAX_RANGE_SPAN {
                return Err(MailAdmError::Validation(format!(
                    "Range {}-{} is too wide (at most {} ids)",
                    start, end, MAX_RANGE_SPAN
                )));
            }
            return Ok((start..=end).map(Selector::Id).collect());
        }
    }

    Ok(vec![Selector::parse(s)])
}

pub fn parse_selectors<I: AsRef<str>>(inputs: &[I]) -> Result<Vec<Selector>> {
    let mut selectors = Vec::new();
    for input in inputs {
        selectors.extend(parse_selector_or_range(input.as_ref())?);
    }
    Ok(selectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_select_by_id() {
        assert_eq!(Selector::parse("3"), Selector::Id(3));
        assert_eq!(Selector::parse(" 12 "), Selector::Id(12));
    }

    #[test]
    fn anything_else_is_a_key() {
        assert_eq!(
            Selector::parse("hello@kerjamail.co"),
            Selector::Key("hello@kerjamail.co".into())
        );
    }

    #[test]
    fn ranges_expand() {
        assert_eq!(
            parse_selector_or_range("2-4").unwrap(),
            vec![Selector::Id(2), Selector::Id(3), Selector::Id(4)]
        );
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = parse_selector_or_range("5-3").unwrap_err();
        assert!(err.to_string().contains("start (5) must be <= end (3)"));
    }

    #[test]
    fn oversized_range_is_rejected() {
        let err = parse_selector_or_range("1-18446744073709551615").unwrap_err();
        assert!(matches!(err, MailAdmError::Validation(_)));
        assert!(parse_selector_or_range("1-20000000").is_err());
        assert_eq!(parse_selector_or_range("1-10000").unwrap().len(), 10_000);
        assert!(parse_selector_or_range("1-10001").is_err());
    }

    #[test]
    fn dashed_names_are_not_ranges() {
        assert_eq!(
            parse_selector_or_range("suspended-co.com").unwrap(),
            vec![Selector::Key("suspended-co.com".into())]
        );
        assert_eq!(
            parse_selector_or_range("1-b").unwrap(),
            vec![Selector::Key("1-b".into())]
        );
    }

    #[test]
    fn empty_selector_is_rejected() {
        assert!(parse_selector_or_range("  ").is_err());
    }

    #[test]
    fn many_inputs_flatten() {
        let selectors = parse_selectors(&["1", "3-4", "example.com"]).unwrap();
        assert_eq!(selectors.len(), 4);
        assert_eq!(selectors[3], Selector::Key("example.com".into()));
    }
}
