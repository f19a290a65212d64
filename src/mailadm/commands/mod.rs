//! # Command Layer
//!
//! One module per collection. Every command takes a [`DataStore`](crate::store::DataStore),
//! works on the whole [`Dataset`](crate::model::Dataset) and returns a [`CmdResult`]:
//! plain data (listings, summaries, filter options) plus user-facing messages.
//! Nothing here prints.
//!
//! Mutations follow one shape: load the dataset, build the changed collection,
//! save the dataset back.

use crate::config::MailAdmConfig;
use crate::table::{ColumnDef, FilterConfig, PageInfo, Row, TableView};
use serde::Serialize;

pub mod broadcasts;
pub mod config;
pub mod dashboard;
pub mod domains;
pub mod helpers;
pub mod init;
pub mod mailboxes;
pub mod reports;
pub mod users;

/// Asked before a destructive change with the labels of the affected records.
/// Returning false cancels the change.
pub type Confirm<'a> = &'a mut dyn FnMut(&[String]) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// One rendered page of a table.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub title: String,
    pub keys: Vec<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub ids: Vec<u64>,
    pub total: usize,
    pub filtered: usize,
    pub page: PageInfo,
    pub empty_message: String,
}

impl Listing {
    pub fn from_view<T: Row>(
        title: impl Into<String>,
        view: &TableView<T>,
        columns: &[ColumnDef<T>],
        empty_message: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            keys: columns.iter().map(|c| c.key.to_string()).collect(),
            headers: TableView::headers(columns),
            rows: view.cells(columns),
            ids: view.rows.iter().map(Row::id).collect(),
            total: view.total,
            filtered: view.filtered,
            page: view.page,
            empty_message: empty_message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub label: String,
    pub value: String,
}

/// A titled block of label/value pairs: stat cards, chart series.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub title: String,
    pub entries: Vec<SummaryEntry>,
}

impl Summary {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
        }
    }

    pub fn entry(mut self, label: impl Into<String>, value: impl ToString) -> Self {
        self.entries.push(SummaryEntry {
            label: label.into(),
            value: value.to_string(),
        });
        self
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.value.as_str())
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CmdResult {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub listings: Vec<Listing>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub summaries: Vec<Summary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_options: Option<FilterConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affected_ids: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<MailAdmConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_listing(mut self, listing: Listing) -> Self {
        self.listings.push(listing);
        self
    }

    pub fn with_summary(mut self, summary: Summary) -> Self {
        self.summaries.push(summary);
        self
    }

    pub fn with_filter_options(mut self, options: FilterConfig) -> Self {
        self.filter_options = Some(options);
        self
    }

    pub fn with_affected_ids(mut self, ids: Vec<u64>) -> Self {
        self.affected_ids = ids;
        self
    }

    pub fn with_export(mut self, export: serde_json::Value) -> Self {
        self.export = Some(export);
        self
    }

    pub fn with_config(mut self, config: MailAdmConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn cancelled() -> Self {
        let mut result = Self::default();
        result.add_message(CmdMessage::info("Operation cancelled."));
        result
    }
}
