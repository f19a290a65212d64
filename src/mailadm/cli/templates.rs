//! # CLI Templates
//!
//! Terminal output is rendered from minijinja templates kept as stand-alone
//! files and included here as string constants.
//!
//! Layout (column widths, padding, truncation, page footers) is computed in
//! Rust before a template sees the data. Templates only decide what gets
//! printed and which semantic style applies, via `{{ text | style("name") }}`.
//!
//! Line breaks are explicit: block tags use `-%}` to swallow the newline that
//! follows them, so every newline in the output comes from a line that prints
//! something.

pub const TABLE_TEMPLATE: &str = include_str!("templates/table.tmp");
pub const SUMMARY_TEMPLATE: &str = include_str!("templates/summary.tmp");
pub const MESSAGES_TEMPLATE: &str = include_str!("templates/messages.tmp");
pub const FILTERS_TEMPLATE: &str = include_str!("templates/filters.tmp");
