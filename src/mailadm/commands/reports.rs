use crate::commands::{CmdResult, Listing, Summary};
use crate::error::{MailAdmError, Result};
use crate::model::{ActivityAction, ActivityLog, Choice, Dataset, DomainUsage, TopUser, TIMESTAMP_FORMAT};
use crate::store::DataStore;
use crate::table::{self, ColumnDef, FilterConfig, FilterOption, TableQuery};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_domains: usize,
    /// Rounded to a whole GB.
    pub total_storage_gb: u64,
    pub total_mailboxes: u64,
    pub log_events: usize,
}

pub fn summary_of(data: &Dataset) -> ReportSummary {
    let storage: f64 = data.domain_usage.iter().map(|d| d.storage_used_gb).sum();
    ReportSummary {
        total_domains: data.domain_usage.len(),
        total_storage_gb: storage.round().max(0.0) as u64,
        total_mailboxes: data.domain_usage.iter().map(|d| d.mailbox_count).sum(),
        log_events: data.activity.len(),
    }
}

pub fn summary<S: DataStore>(store: &S) -> Result<CmdResult> {
    let data = store.load()?;
    let s = summary_of(&data);
    Ok(CmdResult::default().with_summary(
        Summary::new("Usage Report")
            .entry("Total Domains", s.total_domains)
            .entry("Storage Used", format!("{} GB", s.total_storage_gb))
            .entry("Total Mailboxes", s.total_mailboxes)
            .entry("Log Events", s.log_events),
    ))
}

pub fn usage_columns() -> Vec<ColumnDef<DomainUsage>> {
    vec![
        ColumnDef::new("domain", "Domain Name"),
        ColumnDef::new("mailboxes", "Mailboxes").not_searchable(),
        ColumnDef::new("used", "Storage Usage")
            .not_searchable()
            .with_cell(|d: &DomainUsage| {
                format!("{} / {} GB", d.storage_used_gb, d.storage_quota_gb)
            }),
        ColumnDef::new("usage", "Usage")
            .not_searchable()
            .with_cell(|d: &DomainUsage| format!("{:.1}%", d.usage_percent())),
    ]
}

pub fn usage<S: DataStore>(store: &S, query: &TableQuery) -> Result<CmdResult> {
    let data = store.load()?;
    let columns = usage_columns();
    let view = table::apply(data.domain_usage, &columns, query);
    Ok(CmdResult::default().with_listing(Listing::from_view(
        "Storage by Domain",
        &view,
        &columns,
        "No usage data.",
    )))
}

pub fn top_columns() -> Vec<ColumnDef<TopUser>> {
    vec![
        ColumnDef::new("name", "User"),
        ColumnDef::new("email", "Email"),
        ColumnDef::new("used", "Storage Used")
            .not_searchable()
            .with_cell(|u: &TopUser| format!("{} GB", u.storage_used_gb)),
    ]
}

pub fn top<S: DataStore>(store: &S, query: &TableQuery) -> Result<CmdResult> {
    let data = store.load()?;
    let columns = top_columns();
    let view = table::apply(data.top_users, &columns, query);
    Ok(CmdResult::default().with_listing(Listing::from_view(
        "Top Storage Users",
        &view,
        &columns,
        "No users found.",
    )))
}

pub fn activity_columns() -> Vec<ColumnDef<ActivityLog>> {
    vec![
        ColumnDef::new("timestamp", "Timestamp").not_searchable(),
        ColumnDef::new("actor", "Actor"),
        ColumnDef::new("action", "Action"),
        ColumnDef::new("details", "Details"),
    ]
}

pub fn activity_filter_config() -> FilterConfig {
    FilterConfig::new().column(
        "action",
        ActivityAction::ALL
            .iter()
            .map(|a| FilterOption::new(a.label(), a.code()))
            .collect(),
    )
}

pub fn activity<S: DataStore>(store: &S, query: &TableQuery) -> Result<CmdResult> {
    let data = store.load()?;
    tracing::debug!(
        search = %query.search,
        filters = query.filters.active_count(),
        "listing activity"
    );
    let options = activity_filter_config().with_counts(&data.activity);
    let columns = activity_columns();
    let view = table::apply(data.activity, &columns, query);
    Ok(CmdResult::default()
        .with_listing(Listing::from_view(
            "Activity Log",
            &view,
            &columns,
            "No activity recorded.",
        ))
        .with_filter_options(options))
}

#[derive(Serialize)]
struct UsageExport<'a> {
    #[serde(flatten)]
    usage: &'a DomainUsage,
    usage_percent: f64,
}

#[derive(Serialize)]
struct ReportExport<'a> {
    generated_at: String,
    summary: ReportSummary,
    domain_usage: Vec<UsageExport<'a>>,
    top_users: &'a [TopUser],
    activity: &'a [ActivityLog],
}

/// The whole report as one JSON document.
pub fn export<S: DataStore>(store: &S) -> Result<CmdResult> {
    let data = store.load()?;
    let report = ReportExport {
        generated_at: Utc::now().format(TIMESTAMP_FORMAT).to_string(),
        summary: summary_of(&data),
        domain_usage: data
            .domain_usage
            .iter()
            .map(|usage| UsageExport {
                usage,
                usage_percent: usage.usage_percent(),
            })
            .collect(),
        top_users: &data.top_users,
        activity: &data.activity,
    };
    let value = serde_json::to_value(&report).map_err(MailAdmError::Serialization)?;
    tracing::debug!("report exported");
    Ok(CmdResult::default().with_export(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::table::SortSpec;

    #[test]
    fn summary_totals() {
        let store = StoreFixture::seeded().store;
        let data = store.load().unwrap();
        assert_eq!(
            summary_of(&data),
            ReportSummary {
                total_domains: 3,
                total_storage_gb: 237,
                total_mailboxes: 42,
                log_events: 4,
            }
        );
    }

    #[test]
    fn usage_percent_cell() {
        let store = StoreFixture::seeded().store;
        let query = TableQuery::new().sort(SortSpec::desc("usage"));
        let result = usage(&store, &query).unwrap();
        let listing = &result.listings[0];
        assert_eq!(listing.ids, vec![3, 1, 2]);
        assert_eq!(listing.rows[0][2], "150 / 250 GB");
        assert_eq!(listing.rows[0][3], "60.0%");
    }

    #[test]
    fn top_users_by_storage() {
        let store = StoreFixture::seeded().store;
        let query = TableQuery::new().sort(SortSpec::asc("used")).page(0, 2);
        let result = top(&store, &query).unwrap();
        assert_eq!(result.listings[0].ids, vec![4, 3]);
        assert_eq!(result.listings[0].page.count, 2);
    }

    #[test]
    fn activity_filters_by_action_code() {
        let store = StoreFixture::seeded().store;
        let query = TableQuery::new()
            .filter("action", "CREATE_MAILBOX")
            .filter("action", "DELETE_MAILBOX");
        let result = activity(&store, &query).unwrap();
        assert_eq!(result.listings[0].ids, vec![3, 4]);

        let options = result.filter_options.unwrap();
        let actions = options.options("action").unwrap();
        assert_eq!(actions[1].label, "Password Reset");
        assert_eq!(actions[1].value, "PASSWORD_RESET");
        assert_eq!(actions[1].count, Some(1));
    }

    #[test]
    fn export_contains_every_section() {
        let store = StoreFixture::seeded().store;
        let result = export(&store).unwrap();
        let json = result.export.unwrap();
        assert_eq!(json["summary"]["total_storage_gb"], 237);
        assert_eq!(json["domain_usage"][0]["domain"], "kerjamail.co");
        assert_eq!(json["domain_usage"][0]["usage_percent"], 37.5);
        assert_eq!(json["top_users"].as_array().unwrap().len(), 4);
        assert_eq!(json["activity"][0]["action"], "LOGIN");
    }
}
