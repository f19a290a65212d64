//! # Table Pipeline
//!
//! Every collection in mailadm (domains, mailboxes, users, broadcasts, report
//! rows) is listed through the same pure pipeline:
//!
//! ```text
//! rows ──► search ──► column filters ──► sort ──► paginate ──► cells
//! ```
//!
//! 1. **Search**: a row passes if ANY searchable column's display string contains
//!    the query, ignoring case. A blank query passes everything.
//! 2. **Filter**: a row passes if, for EVERY active column filter, its value for
//!    that column contains at least one accepted value (see [`filter`]).
//! 3. **Sort**: a single column and direction, stable (see [`sort`]).
//! 4. **Paginate**: a fixed-size window; out-of-range pages clamp to the last
//!    page (see [`page`]).
//! 5. **Render**: the window is mapped to display cells through the column
//!    definitions, optionally via per-column renderers.
//!
//! The pipeline never fails. A row without a value for some column simply does
//! not match a search or filter on that column.
//!
//! Rows are exposed to the pipeline through the [`Row`] trait, which keeps the
//! pipeline independent of the concrete record types in [`crate::model`].

use serde::Serialize;
use std::fmt;

pub mod filter;
pub mod page;
pub mod sort;

pub use filter::{ColumnFilters, FilterConfig, FilterOption};
pub use page::{PageInfo, PageRequest};
pub use sort::{SortDirection, SortSpec};

/// A single cell value as seen by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<u64> for CellValue {
    fn from(n: u64) -> Self {
        CellValue::Number(n as f64)
    }
}

/// A record that can flow through the table pipeline.
pub trait Row {
    fn id(&self) -> u64;

    /// Value for a column key, or `None` when the row has no such field.
    fn value(&self, key: &str) -> Option<CellValue>;
}

/// Display definition for one column.
pub struct ColumnDef<T> {
    pub key: &'static str,
    pub header: &'static str,
    pub searchable: bool,
    pub filterable: bool,
    pub cell: Option<fn(&T) -> String>,
}

impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            header: self.header,
            searchable: self.searchable,
            filterable: self.filterable,
            cell: self.cell,
        }
    }
}

impl<T> fmt::Debug for ColumnDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("searchable", &self.searchable)
            .field("filterable", &self.filterable)
            .field("custom_cell", &self.cell.is_some())
            .finish()
    }
}

impl<T: Row> ColumnDef<T> {
    pub fn new(key: &'static str, header: &'static str) -> Self {
        Self {
            key,
            header,
            searchable: true,
            filterable: true,
            cell: None,
        }
    }

    pub fn not_searchable(mut self) -> Self {
        self.searchable = false;
        self
    }

    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    pub fn with_cell(mut self, cell: fn(&T) -> String) -> Self {
        self.cell = Some(cell);
        self
    }

    /// Renders this column for a row, falling back to the raw value.
    pub fn render(&self, row: &T) -> String {
        match self.cell {
            Some(cell) => cell(row),
            None => row
                .value(self.key)
                .map(|v| v.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Everything that shapes a table listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableQuery {
    pub search: String,
    /// Overrides the searchable columns derived from the column definitions.
    pub searchable: Option<Vec<String>>,
    pub filters: ColumnFilters,
    pub sort: Option<SortSpec>,
    pub page: Option<PageRequest>,
}

impl TableQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn searchable_in(mut self, keys: &[&str]) -> Self {
        self.searchable = Some(keys.iter().map(|k| k.to_string()).collect());
        self
    }

    pub fn filter(mut self, column: &str, value: &str) -> Self {
        self.filters.toggle(column, value, true);
        self
    }

    pub fn sort(mut self, spec: SortSpec) -> Self {
        self.sort = Some(spec);
        self
    }

    pub fn page(mut self, index: usize, size: usize) -> Self {
        self.page = Some(PageRequest { index, size });
        self
    }
}

/// The visible window of a table plus the counts needed to describe it.
#[derive(Debug, Clone)]
pub struct TableView<T> {
    pub rows: Vec<T>,
    pub total: usize,
    pub filtered: usize,
    pub page: PageInfo,
}

impl<T: Row> TableView<T> {
    pub fn headers(columns: &[ColumnDef<T>]) -> Vec<String> {
        columns.iter().map(|c| c.header.to_string()).collect()
    }

    /// Render stage: maps the row window to display cells.
    pub fn cells(&self, columns: &[ColumnDef<T>]) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| columns.iter().map(|c| c.render(row)).collect())
            .collect()
    }
}

/// Returns true when any of `keys` holds a value containing `needle`.
///
/// `needle` must already be lowercased.
pub fn matches_search<T: Row>(row: &T, keys: &[&str], needle: &str) -> bool {
    keys.iter().any(|key| {
        row.value(key)
            .map(|v| v.to_string().to_lowercase().contains(needle))
            .unwrap_or(false)
    })
}

/// Search and filter stages only, preserving input order.
///
/// Filters on a column marked `not_filterable` are ignored.
pub fn filter_rows<T: Row>(rows: Vec<T>, columns: &[ColumnDef<T>], query: &TableQuery) -> Vec<T> {
    let mut filters = query.filters.clone();
    for column in columns.iter().filter(|c| !c.filterable) {
        if !filters.values(column.key).is_empty() {
            tracing::debug!(column = column.key, "ignoring filter on non-filterable column");
            filters.clear(column.key);
        }
    }

    let keys: Vec<&str> = match &query.searchable {
        Some(keys) => keys.iter().map(String::as_str).collect(),
        None => columns
            .iter()
            .filter(|c| c.searchable)
            .map(|c| c.key)
            .collect(),
    };

    let needle = if query.search.trim().is_empty() {
        None
    } else {
        Some(query.search.to_lowercase())
    };

    rows.into_iter()
        .filter(|row| match &needle {
            Some(needle) => matches_search(row, &keys, needle),
            None => true,
        })
        .filter(|row| filters.matches(row))
        .collect()
}

/// Runs the full pipeline over `rows`.
pub fn apply<T: Row>(rows: Vec<T>, columns: &[ColumnDef<T>], query: &TableQuery) -> TableView<T> {
    let total = rows.len();
    let mut visible = filter_rows(rows, columns, query);
    let filtered = visible.len();

    if let Some(spec) = &query.sort {
        visible = sort::sort_rows(visible, spec);
    }

    let (rows, page) = match query.page {
        Some(request) => page::paginate(visible, request),
        None => {
            let info = PageInfo::single(visible.len());
            (visible, info)
        }
    };

    TableView {
        rows,
        total,
        filtered,
        page,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub struct Item {
        pub id: u64,
        pub name: &'static str,
        pub status: &'static str,
        pub size: Option<f64>,
    }

    impl Row for Item {
        fn id(&self) -> u64 {
            self.id
        }

        fn value(&self, key: &str) -> Option<CellValue> {
            match key {
                "id" => Some(self.id.into()),
                "name" => Some(self.name.into()),
                "status" => Some(self.status.into()),
                "size" => self.size.map(CellValue::Number),
                _ => None,
            }
        }
    }

    pub fn item(id: u64, name: &'static str, status: &'static str, size: Option<f64>) -> Item {
        Item {
            id,
            name,
            status,
            size,
        }
    }

    pub fn columns() -> Vec<ColumnDef<Item>> {
        vec![
            ColumnDef::new("name", "Name"),
            ColumnDef::new("status", "Status"),
            ColumnDef::new("size", "Size").not_searchable(),
        ]
    }

    fn sample() -> Vec<Item> {
        vec![
            item(1, "alpha", "Active", Some(3.0)),
            item(2, "Bravo", "Suspended", Some(1.0)),
            item(3, "charlie", "Active", None),
            item(4, "delta", "Pending DNS", Some(3.0)),
            item(5, "echo", "Suspended", Some(2.5)),
        ]
    }

    fn ids(rows: &[Item]) -> Vec<u64> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn empty_query_is_identity() {
        let view = apply(sample(), &columns(), &TableQuery::new());
        assert_eq!(view.rows, sample());
        assert_eq!(view.total, 5);
        assert_eq!(view.filtered, 5);
        assert_eq!(view.page.count, 1);
    }

    #[test]
    fn blank_query_passes_everything() {
        let view = apply(sample(), &columns(), &TableQuery::new().search("   "));
        assert_eq!(view.filtered, 5);
    }

    #[test]
    fn search_is_case_insensitive() {
        let view = apply(sample(), &columns(), &TableQuery::new().search("BRAVO"));
        assert_eq!(ids(&view.rows), vec![2]);
    }

    #[test]
    fn every_search_hit_contains_the_query() {
        for q in ["a", "ACT", "pend", "o", "zzz"] {
            let view = apply(sample(), &columns(), &TableQuery::new().search(q));
            let needle = q.to_lowercase();
            for row in &view.rows {
                assert!(
                    row.name.to_lowercase().contains(&needle)
                        || row.status.to_lowercase().contains(&needle),
                    "row {} does not contain {}",
                    row.id,
                    q
                );
            }
        }
    }

    #[test]
    fn search_skips_non_searchable_columns() {
        let view = apply(sample(), &columns(), &TableQuery::new().search("2.5"));
        assert!(view.rows.is_empty());
    }

    #[test]
    fn search_uses_explicit_searchable_override() {
        let query = TableQuery::new().search("2.5").searchable_in(&["size"]);
        let view = apply(sample(), &columns(), &query);
        assert_eq!(ids(&view.rows), vec![5]);
    }

    #[test]
    fn missing_field_never_matches_search() {
        let query = TableQuery::new().search("3").searchable_in(&["size"]);
        let view = apply(sample(), &columns(), &query);
        assert_eq!(ids(&view.rows), vec![1, 4]);
    }

    #[test]
    fn status_filter_example() {
        let rows = vec![item(1, "a", "Active", None), item(2, "b", "Suspended", None)];
        let view = apply(rows, &columns(), &TableQuery::new().filter("status", "Active"));
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].name, "a");
    }

    #[test]
    fn non_filterable_columns_ignore_filters() {
        let columns = vec![
            ColumnDef::new("name", "Name"),
            ColumnDef::new("status", "Status").not_filterable(),
        ];
        let view = apply(sample_pair(), &columns, &TableQuery::new().filter("status", "Active"));
        assert_eq!(view.filtered, 2);

        let query = TableQuery::new()
            .filter("status", "Active")
            .filter("name", "b");
        let view = apply(sample_pair(), &columns, &query);
        assert_eq!(ids(&view.rows), vec![2]);
    }

    fn sample_pair() -> Vec<Item> {
        vec![item(1, "a", "Active", None), item(2, "b", "Suspended", None)]
    }

    #[test]
    fn filters_combine_as_conjunction() {
        let query = TableQuery::new()
            .filter("status", "suspended")
            .filter("name", "echo");
        let view = apply(sample(), &columns(), &query);
        assert_eq!(ids(&view.rows), vec![5]);
        for row in &view.rows {
            assert!(query.filters.matches(row));
        }
    }

    #[test]
    fn search_then_filter_then_sort_then_page() {
        let query = TableQuery::new()
            .search("a")
            .filter("status", "Active")
            .filter("status", "Pending")
            .sort(SortSpec::desc("name"))
            .page(0, 2);
        let view = apply(sample(), &columns(), &query);
        assert_eq!(view.total, 5);
        assert_eq!(view.filtered, 3);
        assert_eq!(ids(&view.rows), vec![4, 3]);
        assert_eq!(view.page.count, 2);
    }

    #[test]
    fn cells_use_custom_renderer() {
        let columns = vec![
            ColumnDef::new("name", "Name"),
            ColumnDef::new("size", "Size").with_cell(|i: &Item| match i.size {
                Some(s) => format!("{} GB", s),
                None => "-".to_string(),
            }),
        ];
        let view = apply(sample(), &columns, &TableQuery::new().page(0, 3));
        let cells = view.cells(&columns);
        assert_eq!(cells[0], vec!["alpha".to_string(), "3 GB".to_string()]);
        assert_eq!(cells[2], vec!["charlie".to_string(), "-".to_string()]);
        assert_eq!(TableView::headers(&columns), vec!["Name", "Size"]);
    }

    #[test]
    fn missing_value_renders_empty() {
        let columns = columns();
        assert_eq!(columns[2].render(&item(9, "x", "y", None)), "");
    }

    #[test]
    fn number_display_drops_trailing_zero() {
        assert_eq!(CellValue::Number(5.0).to_string(), "5");
        assert_eq!(CellValue::Number(2.1).to_string(), "2.1");
    }
}
