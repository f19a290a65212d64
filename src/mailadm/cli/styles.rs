//! Styles for the mailadm terminal client.
//!
//! Templates never carry colors. They name a semantic style (`title`, `muted`,
//! `success`, ...) through the `style` filter and the theme below maps that
//! name to a `console::Style`. Changing the look means changing this file only.
//!
//! Status cells are styled by meaning rather than by column: anything healthy
//! (Active, verified, Sent) is `success`, anything waiting (Pending DNS, Draft,
//! Scheduled, unverified) is `warning`, and Suspended is `error`.
//!
//! A style name missing from the theme renders with a `(!?)` prefix so typos
//! in templates show up in output and tests.

use console::Style;
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const MISSING_STYLE_INDICATOR: &str = "(!?)";

/// Style identifiers shared between templates and renderers.
pub mod names {
    pub const TITLE: &str = "title";
    pub const HEADER: &str = "header";
    pub const CELL: &str = "cell";
    pub const MUTED: &str = "muted";
    pub const LABEL: &str = "label";
    pub const VALUE: &str = "value";
    pub const SUCCESS: &str = "success";
    pub const WARNING: &str = "warning";
    pub const ERROR: &str = "error";
    pub const INFO: &str = "info";
}

pub struct Theme {
    styles: HashMap<&'static str, Style>,
}

impl Theme {
    fn new() -> Self {
        Self {
            styles: HashMap::new(),
        }
    }

    fn add(mut self, name: &'static str, style: Style) -> Self {
        self.styles.insert(name, style);
        self
    }

    /// Applies a named style. Plain text when `use_color` is off.
    pub fn apply(&self, name: &str, text: &str, use_color: bool) -> String {
        match self.styles.get(name) {
            Some(style) if use_color => style.clone().force_styling(true).apply_to(text).to_string(),
            Some(_) => text.to_string(),
            None => format!("{} {}", MISSING_STYLE_INDICATOR, text),
        }
    }
}

pub static MAILADM_THEME: Lazy<Theme> = Lazy::new(|| {
    let muted = Style::new().color256(245);
    Theme::new()
        .add(names::TITLE, Style::new().bold().cyan())
        .add(names::HEADER, Style::new().bold().underlined())
        .add(names::CELL, Style::new())
        .add(names::MUTED, muted.clone())
        .add(names::LABEL, muted.clone())
        .add(names::VALUE, Style::new().bold())
        .add(names::SUCCESS, Style::new().green())
        .add(names::WARNING, Style::new().yellow())
        .add(names::ERROR, Style::new().red().bold())
        .add(names::INFO, muted)
});

/// Style for a cell in a `status` column.
pub fn status_style(value: &str) -> &'static str {
    match value.to_lowercase().as_str() {
        "active" | "verified" | "sent" => names::SUCCESS,
        "pending dns" | "unverified" | "draft" | "scheduled" => names::WARNING,
        "suspended" => names::ERROR,
        _ => names::CELL,
    }
}
