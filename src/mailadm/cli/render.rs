//! # Rendering
//!
//! Turns a [`CmdResult`] into styled terminal text.
//!
//! Layout calculations (column widths, truncation, padding, page footers) stay
//! in Rust because they need Unicode-aware width handling. The templates in
//! `templates/` handle presentation: which lines are printed and which
//! semantic style each piece gets.
//!
//! Color is auto-detected from the terminal unless forced. The `_internal`
//! variants take an explicit `use_color` so tests can render plain text.

use super::styles::{names, status_style, MAILADM_THEME};
use super::templates::{FILTERS_TEMPLATE, MESSAGES_TEMPLATE, SUMMARY_TEMPLATE, TABLE_TEMPLATE};
use console::Term;
use mailadm::api::{CmdMessage, Listing, MessageLevel, Summary};
use mailadm::commands::CmdResult;
use mailadm::table::FilterConfig;
use minijinja::{Environment, Value};
use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const MAX_CELL_WIDTH: usize = 40;
pub const COLUMN_GAP: &str = "  ";
const INDENT: &str = "  ";

#[derive(Serialize)]
struct CellData {
    text: String,
    style: &'static str,
}

#[derive(Serialize)]
struct TableData {
    title: String,
    empty: bool,
    empty_message: String,
    header: String,
    rows: Vec<Vec<CellData>>,
    footer: String,
}

#[derive(Serialize)]
struct EntryData {
    label: String,
    value: String,
}

#[derive(Serialize)]
struct SummaryData {
    title: String,
    entries: Vec<EntryData>,
}

#[derive(Serialize)]
struct FilterColumnData {
    label: String,
    options: Vec<CellData>,
}

#[derive(Serialize)]
struct FiltersData {
    columns: Vec<FilterColumnData>,
}

#[derive(Serialize)]
struct MessageData {
    content: String,
    style: &'static str,
}

#[derive(Serialize)]
struct MessagesData {
    messages: Vec<MessageData>,
}

fn resolve_color(use_color: Option<bool>) -> bool {
    use_color
        .unwrap_or_else(|| console::colors_enabled() && Term::stdout().features().colors_supported())
}

fn render_template<T: Serialize>(
    template: &str,
    data: &T,
    use_color: bool,
) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_filter("style", move |value: Value, name: String| -> String {
        MAILADM_THEME.apply(&name, &value.to_string(), use_color)
    });
    env.add_template("_inline", template)?;
    env.get_template("_inline")?.render(data)
}

/// Everything in a result: summaries, then listings, then messages.
pub fn render_result(result: &CmdResult) -> String {
    render_result_internal(result, None)
}

fn render_result_internal(result: &CmdResult, use_color: Option<bool>) -> String {
    let mut sections = Vec::new();
    for summary in &result.summaries {
        sections.push(render_summary_internal(summary, use_color));
    }
    for listing in &result.listings {
        sections.push(render_listing_internal(listing, use_color));
    }
    if let Some(filters) = &result.filter_options {
        sections.push(render_filters_internal(filters, use_color));
    }
    sections.push(render_messages_internal(&result.messages, use_color));

    sections
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn pad_to(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

fn layout_table(listing: &Listing) -> TableData {
    let cells: Vec<Vec<String>> = listing
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| truncate_to_width(cell, MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = listing.headers.iter().map(|h| h.width()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.width());
            }
        }
    }
    let last = widths.len().saturating_sub(1);

    let header = listing
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| if i == last { h.clone() } else { pad_to(h, widths[i]) })
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);

    let rows = cells
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, cell)| {
                    let is_status = listing.keys.get(i).map(String::as_str) == Some("status");
                    let text = if i >= last {
                        cell.clone()
                    } else {
                        format!("{}{}", pad_to(cell, widths[i]), COLUMN_GAP)
                    };
                    CellData {
                        text,
                        style: if is_status { status_style(cell) } else { names::CELL },
                    }
                })
                .collect()
        })
        .collect();

    TableData {
        title: listing.title.clone(),
        empty: listing.rows.is_empty(),
        empty_message: format!("{}{}", INDENT, listing.empty_message),
        header,
        rows,
        footer: footer(listing),
    }
}

/// `Showing 11-20 of 42 (filtered from 50) · page 2 of 5`
fn footer(listing: &Listing) -> String {
    if listing.rows.is_empty() {
        return String::new();
    }
    let start = listing.page.index * listing.page.size + 1;
    let end = start + listing.rows.len() - 1;

    let mut text = format!("Showing {}-{} of {}", start, end, listing.filtered);
    if listing.filtered < listing.total {
        text.push_str(&format!(" (filtered from {})", listing.total));
    }
    if listing.page.count > 1 {
        text.push_str(&format!(
            " · page {} of {}",
            listing.page.index + 1,
            listing.page.count
        ));
    }
    text
}

fn render_listing_internal(listing: &Listing, use_color: Option<bool>) -> String {
    let data = layout_table(listing);
    render_template(TABLE_TEMPLATE, &data, resolve_color(use_color))
        .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

fn render_summary_internal(summary: &Summary, use_color: Option<bool>) -> String {
    let width = summary
        .entries
        .iter()
        .map(|e| e.label.width())
        .max()
        .unwrap_or(0);
    let data = SummaryData {
        title: summary.title.clone(),
        entries: summary
            .entries
            .iter()
            .map(|e| EntryData {
                label: format!("{}{}{}", INDENT, pad_to(&e.label, width), COLUMN_GAP),
                value: e.value.clone(),
            })
            .collect(),
    };
    render_template(SUMMARY_TEMPLATE, &data, resolve_color(use_color))
        .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

fn render_filters_internal(filters: &FilterConfig, use_color: Option<bool>) -> String {
    let columns: Vec<FilterColumnData> = filters
        .columns()
        .map(|(key, options)| FilterColumnData {
            label: format!("{}{}: ", INDENT, key),
            options: options
                .iter()
                .map(|o| CellData {
                    text: match o.count {
                        Some(n) => format!("{} ({})", o.label, n),
                        None => o.label.clone(),
                    },
                    style: if key == "status" { status_style(&o.value) } else { names::CELL },
                })
                .collect(),
        })
        .collect();
    if columns.is_empty() {
        return String::new();
    }

    render_template(FILTERS_TEMPLATE, &FiltersData { columns }, resolve_color(use_color))
        .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

/// Renders command messages with a style per level.
pub fn render_messages(messages: &[CmdMessage]) -> String {
    render_messages_internal(messages, None)
}

fn render_messages_internal(messages: &[CmdMessage], use_color: Option<bool>) -> String {
    if messages.is_empty() {
        return String::new();
    }

    let data = MessagesData {
        messages: messages
            .iter()
            .map(|msg| MessageData {
                content: msg.content.clone(),
                style: match msg.level {
                    MessageLevel::Info => names::INFO,
                    MessageLevel::Success => names::SUCCESS,
                    MessageLevel::Warning => names::WARNING,
                    MessageLevel::Error => names::ERROR,
                },
            })
            .collect(),
    };

    render_template(MESSAGES_TEMPLATE, &data, resolve_color(use_color)).unwrap_or_else(|_| {
        messages
            .iter()
            .map(|m| format!("{}\n", m.content))
            .collect()
    })
}

pub fn print_messages(messages: &[CmdMessage]) {
    let output = render_messages(messages);
    if !output.is_empty() {
        print!("{}", output);
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailadm::table::{FilterOption, PageInfo};

    fn listing(rows: Vec<Vec<&str>>, filtered: usize, total: usize, page: PageInfo) -> Listing {
        Listing {
            title: "Domains".into(),
            keys: vec!["name".into(), "status".into()],
            headers: vec!["Domain Name".into(), "Status".into()],
            ids: (1..=rows.len() as u64).collect(),
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
            total,
            filtered,
            page,
            empty_message: "No domains found.".into(),
        }
    }

    #[test]
    fn table_columns_are_aligned() {
        let l = listing(
            vec![vec!["kerjamail.co", "Active"], vec!["example.com", "Pending DNS"]],
            2,
            3,
            PageInfo { index: 0, size: 10, count: 1 },
        );
        let output = render_listing_internal(&l, Some(false));
        assert_eq!(
            output,
            "Domains\n\
             Domain Name   Status\n\
             kerjamail.co  Active\n\
             example.com   Pending DNS\n\
             Showing 1-2 of 2 (filtered from 3)\n"
        );
    }

    #[test]
    fn empty_table_shows_message() {
        let l = listing(vec![], 0, 3, PageInfo::single(0));
        let output = render_listing_internal(&l, Some(false));
        assert_eq!(output, "Domains\n  No domains found.\n");
    }

    #[test]
    fn footer_reports_page_position() {
        let l = listing(
            vec![vec!["a.io", "Active"], vec!["b.io", "Active"]],
            5,
            5,
            PageInfo { index: 1, size: 2, count: 3 },
        );
        assert_eq!(footer(&l), "Showing 3-4 of 5 · page 2 of 3");
    }

    #[test]
    fn long_cells_are_truncated() {
        let long = "x".repeat(60);
        let truncated = truncate_to_width(&long, MAX_CELL_WIDTH);
        assert_eq!(truncated.width(), MAX_CELL_WIDTH);
        assert!(truncated.ends_with('…'));
        assert_eq!(truncate_to_width("short", MAX_CELL_WIDTH), "short");
    }

    #[test]
    fn status_cells_are_colored() {
        let l = listing(
            vec![vec!["kerjamail.co", "Active"]],
            1,
            1,
            PageInfo::single(1),
        );
        let output = render_listing_internal(&l, Some(true));
        assert!(output.contains("\x1b["));
        assert!(output.contains("Active"));
    }

    #[test]
    fn summary_labels_are_aligned() {
        let summary = Summary::new("Usage Report")
            .entry("Total Domains", 3)
            .entry("Storage Used", "237 GB");
        let output = render_summary_internal(&summary, Some(false));
        assert_eq!(
            output,
            "Usage Report\n  Total Domains  3\n  Storage Used   237 GB\n"
        );
    }

    #[test]
    fn filter_options_show_counts() {
        let filters = FilterConfig::new().column(
            "status",
            vec![FilterOption {
                label: "Active".into(),
                value: "Active".into(),
                count: Some(2),
            }],
        );
        let output = render_filters_internal(&filters, Some(false));
        assert_eq!(output, "  status: Active (2)\n");
    }

    #[test]
    fn messages_render_one_per_line() {
        let messages = vec![
            CmdMessage::success("Created domain example.org"),
            CmdMessage::warning("Nothing to update."),
        ];
        let output = render_messages_internal(&messages, Some(false));
        assert_eq!(output, "Created domain example.org\nNothing to update.\n");
        assert!(render_messages_internal(&[], Some(false)).is_empty());
    }

    #[test]
    fn result_sections_are_separated() {
        let mut result = CmdResult::default().with_summary(Summary::new("Users").entry("Admins", 1));
        result.add_message(CmdMessage::info("done"));
        let output = render_result_internal(&result, Some(false));
        assert_eq!(output, "Users\n  Admins  1\n\ndone\n");
    }
}
