//! Single-column stable sorting.
//!
//! Ordering between cell values:
//! - numbers compare numerically
//! - text compares case-insensitively
//! - numbers sort before text, so `unlimited` quotas land after finite ones
//! - rows without a value sort last in both directions
//!
//! Equal keys keep their input order.

use super::{CellValue, Row};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Parses `key` or `-key` (descending).
impl FromStr for SortSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (key, direction) = match s.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (s, SortDirection::Asc),
        };
        if key.is_empty() {
            return Err("Sort key cannot be empty".to_string());
        }
        Ok(Self {
            key: key.to_string(),
            direction,
        })
    }
}

pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Number(x), CellValue::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (CellValue::Text(x), CellValue::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        (CellValue::Number(_), CellValue::Text(_)) => Ordering::Less,
        (CellValue::Text(_), CellValue::Number(_)) => Ordering::Greater,
    }
}

fn compare_keys(a: Option<&CellValue>, b: Option<&CellValue>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match direction {
            SortDirection::Asc => compare_cells(a, b),
            SortDirection::Desc => compare_cells(a, b).reverse(),
        },
    }
}

pub fn sort_rows<T: Row>(rows: Vec<T>, spec: &SortSpec) -> Vec<T> {
    let mut keyed: Vec<(Option<CellValue>, T)> = rows
        .into_iter()
        .map(|row| (row.value(&spec.key), row))
        .collect();

    // `sort_by` is stable, which gives the tie-breaking by input order.
    keyed.sort_by(|(a, _), (b, _)| compare_keys(a.as_ref(), b.as_ref(), spec.direction));

    keyed.into_iter().map(|(_, row)| row).collect()
}
