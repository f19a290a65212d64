use crate::commands::helpers::{find_index, find_indexes, next_id, required, valid_domain};
use crate::commands::{CmdMessage, CmdResult, Confirm, Listing, Summary};
use crate::error::{MailAdmError, Result};
use crate::model::{AccountStatus, ActivityAction, ActivityLog, Choice, Dataset, Mailbox, Quota};
use crate::selector::Selector;
use crate::store::DataStore;
use crate::table::{self, ColumnDef, FilterConfig, FilterOption, TableQuery};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Actor recorded in the activity log for console-driven changes.
pub const SYSTEM_ACTOR: &str = "admin@system";

pub fn columns() -> Vec<ColumnDef<Mailbox>> {
    vec![
        ColumnDef::new("email", "Email Address"),
        ColumnDef::new("domain", "Domain"),
        ColumnDef::new("quota", "Quota")
            .not_searchable()
            .with_cell(|m: &Mailbox| m.quota.to_string()),
        ColumnDef::new("used", "Storage Used")
            .not_searchable()
            .with_cell(storage_cell),
        ColumnDef::new("status", "Status"),
        ColumnDef::new("owner", "Owner"),
        ColumnDef::new("last_login", "Last Login")
            .not_searchable()
            .with_cell(|m: &Mailbox| last_login_ago(m.last_login, Utc::now())),
    ]
}

fn storage_cell(mailbox: &Mailbox) -> String {
    match mailbox.quota {
        Quota::Limited(gb) if gb > 0.0 => format!(
            "{:.1} GB ({:.0}%)",
            mailbox.storage_used_gb,
            mailbox.storage_used_gb / gb * 100.0
        ),
        _ => format!("{:.1} GB", mailbox.storage_used_gb),
    }
}

pub fn last_login_ago(last_login: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match last_login {
        None => "Never".to_string(),
        Some(at) => {
            let elapsed = now.signed_duration_since(at).to_std().unwrap_or_default();
            timeago::Formatter::new().convert(elapsed)
        }
    }
}

/// Distinct mailbox domains in order of first appearance.
pub fn available_domains(mailboxes: &[Mailbox]) -> Vec<String> {
    let mut domains: Vec<String> = Vec::new();
    for mailbox in mailboxes {
        if !domains.contains(&mailbox.domain) {
            domains.push(mailbox.domain.clone());
        }
    }
    domains
}

pub fn filter_config(mailboxes: &[Mailbox]) -> FilterConfig {
    FilterConfig::new()
        .column(
            "domain",
            available_domains(mailboxes)
                .into_iter()
                .map(FilterOption::plain)
                .collect(),
        )
        .column(
            "status",
            AccountStatus::ALL
                .iter()
                .map(|s| FilterOption::plain(s.label()))
                .collect(),
        )
}

pub fn list<S: DataStore>(store: &S, query: &TableQuery) -> Result<CmdResult> {
    let data = store.load()?;
    tracing::debug!(
        search = %query.search,
        filters = query.filters.active_count(),
        "listing mailboxes"
    );

    let options = filter_config(&data.mailboxes).with_counts(&data.mailboxes);
    let columns = columns();
    let view = table::apply(data.mailboxes, &columns, query);
    let listing = Listing::from_view("Mailboxes", &view, &columns, "No mailboxes found.");

    Ok(CmdResult::default()
        .with_listing(listing)
        .with_filter_options(options))
}

fn log_activity(data: &mut Dataset, action: ActivityAction, email: &str) {
    let entry = ActivityLog {
        id: next_id(&data.activity),
        timestamp: Utc::now(),
        actor: SYSTEM_ACTOR.to_string(),
        action,
        details: format!("user: {}", email),
    };
    data.activity.insert(0, entry);
}

pub fn create<S: DataStore>(
    store: &mut S,
    username: &str,
    domain: &str,
    quota: Quota,
) -> Result<CmdResult> {
    let username = required(username, "Username")?.to_lowercase();
    if username.contains('@') || username.contains(char::is_whitespace) {
        return Err(MailAdmError::Validation(format!(
            "'{}' is not a valid username",
            username
        )));
    }
    let domain = valid_domain(domain)?;
    let email = format!("{}@{}", username, domain);

    let mut data = store.load()?;
    let known = data.domains.iter().any(|d| d.name.eq_ignore_ascii_case(&domain))
        || available_domains(&data.mailboxes)
            .iter()
            .any(|d| d.eq_ignore_ascii_case(&domain));
    if !known {
        return Err(MailAdmError::Validation(format!(
            "Unknown domain '{}'; add it with `mailadm domains add` first",
            domain
        )));
    }
    if data.mailboxes.iter().any(|m| m.email.eq_ignore_ascii_case(&email)) {
        return Err(MailAdmError::Validation(format!(
            "Mailbox '{}' already exists",
            email
        )));
    }

    let mailbox = Mailbox {
        id: next_id(&data.mailboxes),
        email: email.clone(),
        domain,
        quota,
        storage_used_gb: 0.0,
        status: AccountStatus::Active,
        last_login: None,
        owner: None,
    };
    let id = mailbox.id;
    data.mailboxes.push(mailbox);
    log_activity(&mut data, ActivityAction::CreateMailbox, &email);
    store.save(&data)?;
    tracing::info!(id, email = %email, "mailbox created");

    let mut result = CmdResult::default().with_affected_ids(vec![id]);
    result.add_message(CmdMessage::success(format!(
        "Created mailbox {} ({})",
        email, quota
    )));
    Ok(result)
}

pub fn update_quota<S: DataStore>(
    store: &mut S,
    selector: &Selector,
    quota: Quota,
) -> Result<CmdResult> {
    let mut data = store.load()?;
    let idx = find_index(&data.mailboxes, selector)?;
    let mailbox = &mut data.mailboxes[idx];
    mailbox.quota = quota;

    let mut result = CmdResult::default().with_affected_ids(vec![mailbox.id]);
    result.add_message(CmdMessage::success(format!(
        "Quota for {} set to {}",
        mailbox.email, quota
    )));
    if let Quota::Limited(gb) = quota {
        if mailbox.storage_used_gb > gb {
            result.add_message(CmdMessage::warning(format!(
                "{} already uses {:.1} GB, above the new quota",
                mailbox.email, mailbox.storage_used_gb
            )));
        }
    }

    store.save(&data)?;
    tracing::info!(selector = %selector, "mailbox quota updated");
    Ok(result)
}

pub fn delete<S: DataStore>(
    store: &mut S,
    selectors: &[Selector],
    confirm: Confirm<'_>,
) -> Result<CmdResult> {
    let mut data = store.load()?;
    let indexes = find_indexes(&data.mailboxes, selectors)?;
    let labels: Vec<String> = indexes
        .iter()
        .map(|&i| data.mailboxes[i].email.clone())
        .collect();

    if !confirm(&labels) {
        return Ok(CmdResult::cancelled());
    }

    let ids: Vec<u64> = indexes.iter().map(|&i| data.mailboxes[i].id).collect();
    data.mailboxes.retain(|m| !ids.contains(&m.id));
    for email in &labels {
        log_activity(&mut data, ActivityAction::DeleteMailbox, email);
    }
    store.save(&data)?;
    tracing::info!(count = ids.len(), "mailboxes deleted");

    let mut result = CmdResult::default().with_affected_ids(ids);
    for label in labels {
        result.add_message(CmdMessage::success(format!("Deleted mailbox {}", label)));
    }
    Ok(result)
}

pub fn toggle<S: DataStore>(store: &mut S, selectors: &[Selector]) -> Result<CmdResult> {
    let mut data = store.load()?;
    let indexes = find_indexes(&data.mailboxes, selectors)?;

    let mut result = CmdResult::default();
    for &i in &indexes {
        let mailbox = &mut data.mailboxes[i];
        mailbox.status = mailbox.status.toggled();
        result.add_message(CmdMessage::success(format!(
            "{} is now {}",
            mailbox.email, mailbox.status
        )));
        result.affected_ids.push(mailbox.id);
    }

    store.save(&data)?;
    tracing::info!(count = indexes.len(), "mailbox status toggled");
    Ok(result)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MailboxStats {
    pub active: usize,
    pub suspended: usize,
    pub total_storage_gb: f64,
    pub total: usize,
    pub unique_domains: usize,
}

pub fn stats_of(mailboxes: &[Mailbox]) -> MailboxStats {
    let mut stats = MailboxStats {
        total: mailboxes.len(),
        unique_domains: available_domains(mailboxes).len(),
        ..Default::default()
    };
    for mailbox in mailboxes {
        match mailbox.status {
            AccountStatus::Active => stats.active += 1,
            AccountStatus::Suspended => stats.suspended += 1,
        }
        stats.total_storage_gb += mailbox.storage_used_gb;
    }
    stats
}

pub fn stats<S: DataStore>(store: &S) -> Result<CmdResult> {
    let data = store.load()?;
    let stats = stats_of(&data.mailboxes);
    Ok(CmdResult::default().with_summary(
        Summary::new("Mailboxes")
            .entry("Total Mailboxes", stats.total)
            .entry("Active", stats.active)
            .entry("Suspended", stats.suspended)
            .entry("Storage Used", format!("{:.1} GB", stats.total_storage_gb))
            .entry("Domains", stats.unique_domains),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::table::SortSpec;
    use chrono::Duration;

    #[test]
    fn domain_options_follow_the_data() {
        let store = StoreFixture::seeded().store;
        let result = list(&store, &TableQuery::new()).unwrap();
        let options = result.filter_options.unwrap();
        let domains: Vec<&str> = options
            .options("domain")
            .unwrap()
            .iter()
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(domains, vec!["kerjamail.co", "example.com", "new-project.io"]);
        assert_eq!(options.options("domain").unwrap()[1].count, Some(2));
    }

    #[test]
    fn list_combines_domain_and_status_filters() {
        let store = StoreFixture::seeded().store;
        let query = TableQuery::new()
            .filter("domain", "example.com")
            .filter("status", "Active");
        let result = list(&store, &query).unwrap();
        assert_eq!(result.listings[0].ids, vec![2]);
    }

    #[test]
    fn unlimited_quota_sorts_after_finite() {
        let store = StoreFixture::seeded().store;
        let result = list(&store, &TableQuery::new().sort(SortSpec::asc("quota"))).unwrap();
        assert_eq!(result.listings[0].ids, vec![2, 1, 3, 4]);
        assert_eq!(result.listings[0].rows[3][2], "Unlimited");
    }

    #[test]
    fn search_ignores_quota_column() {
        let store = StoreFixture::seeded().store;
        let result = list(&store, &TableQuery::new().search("jane")).unwrap();
        assert_eq!(result.listings[0].ids, vec![2, 3]);
    }

    #[test]
    fn create_builds_email_and_logs_activity() {
        let mut store = StoreFixture::seeded().store;
        create(&mut store, "Sales", "kerjamail.co", Quota::Limited(5.0)).unwrap();

        let data = store.load().unwrap();
        let mailbox = data.mailboxes.last().unwrap();
        assert_eq!(mailbox.id, 5);
        assert_eq!(mailbox.email, "sales@kerjamail.co");
        assert_eq!(mailbox.storage_used_gb, 0.0);
        assert_eq!(mailbox.status, AccountStatus::Active);
        assert!(mailbox.last_login.is_none());

        assert_eq!(data.activity[0].action, ActivityAction::CreateMailbox);
        assert_eq!(data.activity[0].actor, SYSTEM_ACTOR);
        assert_eq!(data.activity[0].details, "user: sales@kerjamail.co");
    }

    #[test]
    fn create_rejects_bad_input() {
        let mut store = StoreFixture::seeded().store;
        assert!(create(&mut store, "", "kerjamail.co", Quota::Unlimited).is_err());
        assert!(create(&mut store, "a@b", "kerjamail.co", Quota::Unlimited).is_err());
        assert!(create(&mut store, "hello", "kerjamail.co", Quota::Unlimited).is_err());
        let err = create(&mut store, "ghost", "nowhere-registered.io", Quota::Limited(1.0))
            .unwrap_err();
        assert!(err.to_string().contains("Unknown domain 'nowhere-registered.io'"));
        assert_eq!(store.load().unwrap().mailboxes.len(), 4);
    }

    #[test]
    fn quota_update_warns_when_over() {
        let mut store = StoreFixture::seeded().store;
        let result = update_quota(
            &mut store,
            &Selector::Key("support@example.com".into()),
            Quota::Limited(5.0),
        )
        .unwrap();
        assert_eq!(result.messages.len(), 2);
        assert_eq!(store.load().unwrap().mailboxes[2].quota, Quota::Limited(5.0));
    }

    #[test]
    fn delete_logs_each_mailbox() {
        let mut store = StoreFixture::seeded().store;
        let mut yes = |_: &[String]| true;
        delete(&mut store, &[Selector::Id(1), Selector::Id(4)], &mut yes).unwrap();

        let data = store.load().unwrap();
        assert_eq!(data.mailboxes.len(), 2);
        let deletes = data
            .activity
            .iter()
            .filter(|a| a.action == ActivityAction::DeleteMailbox)
            .count();
        assert_eq!(deletes, 3);
    }

    #[test]
    fn toggle_flips_status() {
        let mut store = StoreFixture::seeded().store;
        toggle(&mut store, &[Selector::Id(3)]).unwrap();
        assert_eq!(store.load().unwrap().mailboxes[2].status, AccountStatus::Active);
    }

    #[test]
    fn stats_sum_storage() {
        let store = StoreFixture::seeded().store;
        let stats = stats_of(&store.load().unwrap().mailboxes);
        assert_eq!(stats.active, 3);
        assert_eq!(stats.suspended, 1);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.unique_domains, 3);
        assert!((stats.total_storage_gb - 28.7).abs() < 1e-9);
    }

    #[test]
    fn last_login_formats() {
        let now = Utc::now();
        assert_eq!(last_login_ago(None, now), "Never");
        assert_eq!(last_login_ago(Some(now - Duration::days(1)), now), "1 day ago");
    }

    #[test]
    fn storage_cell_shows_share_of_quota() {
        let store = StoreFixture::seeded().store;
        let data = store.load().unwrap();
        assert_eq!(storage_cell(&data.mailboxes[0]), "2.1 GB (42%)");
        assert_eq!(storage_cell(&data.mailboxes[3]), "15.3 GB");
    }
}
