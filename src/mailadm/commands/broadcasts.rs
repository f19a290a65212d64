use crate::commands::helpers::{find_index, find_indexes, next_id, required};
use crate::commands::{CmdMessage, CmdResult, Confirm, Listing};
use crate::error::{MailAdmError, Result};
use crate::model::{Broadcast, BroadcastStatus, Choice};
use crate::selector::Selector;
use crate::store::DataStore;
use crate::table::{self, ColumnDef, FilterConfig, FilterOption, TableQuery};
use chrono::Utc;

pub fn columns() -> Vec<ColumnDef<Broadcast>> {
    vec![
        ColumnDef::new("name", "Campaign Name"),
        ColumnDef::new("status", "Status"),
        ColumnDef::new("recipients", "Recipients")
            .not_searchable()
            .with_cell(|b: &Broadcast| group_thousands(b.recipients)),
        ColumnDef::new("sent", "Date")
            .not_searchable()
            .with_cell(|b: &Broadcast| match b.sent_date {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => "-".to_string(),
            }),
    ]
}

/// `1450` -> `1,450`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn filter_config() -> FilterConfig {
    FilterConfig::new().column(
        "status",
        BroadcastStatus::ALL
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
        "listing broadcasts"
    );

    let options = filter_config().with_counts(&data.broadcasts);
    let columns = columns();
    let view = table::apply(data.broadcasts, &columns, query);
    let listing = Listing::from_view("Broadcasts", &view, &columns, "No broadcasts found.");

    Ok(CmdResult::default()
        .with_listing(listing)
        .with_filter_options(options))
}

/// Creates a campaign with no recipients yet. Only a Sent campaign gets a date.
pub fn create<S: DataStore>(
    store: &mut S,
    name: &str,
    status: BroadcastStatus,
) -> Result<CmdResult> {
    let name = required(name, "Campaign name")?;
    let mut data = store.load()?;
    if data.broadcasts.iter().any(|b| b.name.eq_ignore_ascii_case(&name)) {
        return Err(MailAdmError::Validation(format!(
            "Broadcast '{}' already exists",
            name
        )));
    }

    let broadcast = Broadcast {
        id: next_id(&data.broadcasts),
        name,
        status,
        recipients: 0,
        sent_date: (status == BroadcastStatus::Sent).then(|| Utc::now().date_naive()),
    };
    let id = broadcast.id;
    let message = format!("Created {} broadcast '{}'", broadcast.status, broadcast.name);
    data.broadcasts.push(broadcast);
    store.save(&data)?;
    tracing::info!(id, "broadcast created");

    let mut result = CmdResult::default().with_affected_ids(vec![id]);
    result.add_message(CmdMessage::success(message));
    Ok(result)
}

/// Renames a campaign and/or changes its status. Recipients and date are kept.
pub fn update<S: DataStore>(
    store: &mut S,
    selector: &Selector,
    name: Option<&str>,
    status: Option<BroadcastStatus>,
) -> Result<CmdResult> {
    let mut data = store.load()?;
    let idx = find_index(&data.broadcasts, selector)?;
    let name = name.map(|n| required(n, "Campaign name")).transpose()?;

    let mut result = CmdResult::default();
    if name.is_none() && status.is_none() {
        result.add_message(CmdMessage::warning("Nothing to update."));
        return Ok(result);
    }

    let broadcast = &mut data.broadcasts[idx];
    if let Some(name) = name {
        broadcast.name = name;
    }
    if let Some(status) = status {
        broadcast.status = status;
    }
    result.add_message(CmdMessage::success(format!(
        "Updated broadcast '{}' ({})",
        broadcast.name, broadcast.status
    )));
    result.affected_ids.push(broadcast.id);

    store.save(&data)?;
    tracing::info!(selector = %selector, "broadcast updated");
    Ok(result)
}

pub fn delete<S: DataStore>(
    store: &mut S,
    selectors: &[Selector],
    confirm: Confirm<'_>,
) -> Result<CmdResult> {
    let mut data = store.load()?;
    let indexes = find_indexes(&data.broadcasts, selectors)?;
    let labels: Vec<String> = indexes
        .iter()
        .map(|&i| data.broadcasts[i].name.clone())
        .collect();

    if !confirm(&labels) {
        return Ok(CmdResult::cancelled());
    }

    let ids: Vec<u64> = indexes.iter().map(|&i| data.broadcasts[i].id).collect();
    data.broadcasts.retain(|b| !ids.contains(&b.id));
    store.save(&data)?;
    tracing::info!(count = ids.len(), "broadcasts deleted");

    let mut result = CmdResult::default().with_affected_ids(ids);
    for label in labels {
        result.add_message(CmdMessage::success(format!("Deleted broadcast '{}'", label)));
    }
    Ok(result)
}
