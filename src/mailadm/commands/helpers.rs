use crate::error::{MailAdmError, Result};
use crate::model::Record;
use crate::selector::Selector;
use crate::table::Row;

/// Position of the record a selector refers to.
pub fn find_index<T: Record>(records: &[T], selector: &Selector) -> Result<usize> {
    records
        .iter()
        .position(|r| match selector {
            Selector::Id(id) => r.id() == *id,
            Selector::Key(key) => r.natural_key().eq_ignore_ascii_case(key),
        })
        .ok_or_else(|| MailAdmError::NotFound(format!("{} {}", T::KIND, selector)))
}

/// Positions for every selector, in selector order, without duplicates.
pub fn find_indexes<T: Record>(records: &[T], selectors: &[Selector]) -> Result<Vec<usize>> {
    let mut found = Vec::with_capacity(selectors.len());
    for selector in selectors {
        let idx = find_index(records, selector)?;
        if !found.contains(&idx) {
            found.push(idx);
        }
    }
    Ok(found)
}

pub fn next_id<T: Row>(records: &[T]) -> u64 {
    records.iter().map(Row::id).max().unwrap_or(0) + 1
}

pub fn required(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MailAdmError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

pub fn valid_email(value: &str) -> Result<String> {
    let value = required(value, "Email")?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(value)
        }
        _ => Err(MailAdmError::Validation(format!(
            "'{}' is not a valid email address",
            value
        ))),
    }
}

/// A bare domain name: no scheme, no spaces, at least one dot.
pub fn valid_domain(value: &str) -> Result<String> {
    let value = required(value, "Domain name")?.to_lowercase();
    let well_formed = value.contains('.')
        && !value.starts_with('.')
        && !value.ends_with('.')
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if !well_formed {
        return Err(MailAdmError::Validation(format!(
            "'{}' is not a valid domain name",
            value
        )));
    }
    Ok(value)
}
