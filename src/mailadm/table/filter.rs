//! Column filters.
//!
//! A column filter is a set of accepted values for one column. A row passes
//! when its value for the column contains at least one accepted value,
//! ignoring case. Filters on different columns combine with AND logic. A
//! column whose accepted set is empty does not restrict anything.

use super::{CellValue, Row};
use serde::Serialize;
use std::collections::BTreeMap;

/// Active filters, keyed by column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFilters {
    active: BTreeMap<String, Vec<String>>,
}

impl ColumnFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (`checked`) or removes one accepted value for a column.
    ///
    /// Adding a value twice is a no-op. Removing the last value drops the column.
    pub fn toggle(&mut self, column: &str, value: &str, checked: bool) {
        if checked {
            let values = self.active.entry(column.to_string()).or_default();
            if !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
        } else if let Some(values) = self.active.get_mut(column) {
            values.retain(|v| v != value);
            if values.is_empty() {
                self.active.remove(column);
            }
        }
    }

    pub fn clear(&mut self, column: &str) {
        self.active.remove(column);
    }

    pub fn clear_all(&mut self) {
        self.active.clear();
    }

    /// Total number of accepted values across all columns.
    pub fn active_count(&self) -> usize {
        self.active.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    pub fn values(&self, column: &str) -> &[String] {
        self.active.get(column).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.active
            .iter()
            .map(|(column, values)| (column.as_str(), values.as_slice()))
    }

    pub fn matches<T: Row>(&self, row: &T) -> bool {
        self.active
            .iter()
            .all(|(column, accepted)| accepts(row.value(column).as_ref(), accepted))
    }
}

fn accepts(value: Option<&CellValue>, accepted: &[String]) -> bool {
    if accepted.is_empty() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    let value = value.to_string().to_lowercase();
    accepted
        .iter()
        .any(|candidate| value.contains(&candidate.to_lowercase()))
}

/// One choice offered for a column filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl FilterOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            count: None,
        }
    }

    /// An option whose label is its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(value.clone(), value)
    }
}

/// The filter choices offered per column, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterConfig {
    columns: Vec<(String, Vec<FilterOption>)>,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, key: &str, options: Vec<FilterOption>) -> Self {
        self.columns.push((key.to_string(), options));
        self
    }

    pub fn options(&self, key: &str) -> Option<&[FilterOption]> {
        self.columns
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, options)| options.as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[FilterOption])> {
        self.columns
            .iter()
            .map(|(key, options)| (key.as_str(), options.as_slice()))
    }

    /// Fills every option's count with the number of rows it would select on its own.
    pub fn with_counts<T: Row>(mut self, rows: &[T]) -> Self {
        for (key, options) in &mut self.columns {
            for option in options.iter_mut() {
                let accepted = [option.value.clone()];
                let count = rows
                    .iter()
                    .filter(|row| accepts(row.value(key).as_ref(), &accepted))
                    .count();
                option.count = Some(count);
            }
        }
        self
    }
}
