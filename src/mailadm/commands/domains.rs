use crate::commands::helpers::{find_index, find_indexes, next_id, valid_domain};
use crate::commands::{CmdMessage, CmdResult, Confirm, Listing, Summary};
use crate::error::{MailAdmError, Result};
use crate::model::{Choice, DnsRecord, DnsStatus, Domain, DomainStatus};
use crate::selector::Selector;
use crate::store::DataStore;
use crate::table::{self, CellValue, ColumnDef, FilterConfig, FilterOption, Row, TableQuery};
use chrono::{Duration, Utc};
use serde::Serialize;
use std::thread;

pub fn columns() -> Vec<ColumnDef<Domain>> {
    vec![
        ColumnDef::new("name", "Domain Name"),
        ColumnDef::new("status", "Status"),
        ColumnDef::new("mailboxes", "Mailboxes").not_searchable(),
        ColumnDef::new("dns", "DNS")
            .not_searchable()
            .not_filterable()
            .with_cell(dns_progress),
        ColumnDef::new("expiry", "Expiry Date").not_searchable(),
        ColumnDef::new("created", "Date Added").not_searchable(),
    ]
}

fn dns_progress(domain: &Domain) -> String {
    let verified = domain
        .dns_records
        .iter()
        .filter(|r| r.status == DnsStatus::Verified)
        .count();
    format!("{}/{}", verified, domain.dns_records.len())
}

pub fn filter_config() -> FilterConfig {
    FilterConfig::new().column(
        "status",
        DomainStatus::ALL
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
        "listing domains"
    );

    let options = filter_config().with_counts(&data.domains);
    let columns = columns();
    let view = table::apply(data.domains, &columns, query);
    let listing = Listing::from_view("Domains", &view, &columns, "No domains found.");

    Ok(CmdResult::default()
        .with_listing(listing)
        .with_filter_options(options))
}

pub fn create<S: DataStore>(store: &mut S, name: &str) -> Result<CmdResult> {
    let name = valid_domain(name)?;
    let mut data = store.load()?;

    if data.domains.iter().any(|d| d.name.eq_ignore_ascii_case(&name)) {
        return Err(MailAdmError::Validation(format!(
            "Domain '{}' already exists",
            name
        )));
    }

    let today = Utc::now().date_naive();
    let domain = Domain {
        id: next_id(&data.domains),
        name,
        status: DomainStatus::PendingDns,
        expiry_date: today + Duration::days(365),
        active_mailboxes: 0,
        created_at: today,
        dns_records: DnsRecord::template(),
    };
    tracing::info!(id = domain.id, name = %domain.name, "domain created");

    let listing = dns_listing(&domain);
    let id = domain.id;
    let name = domain.name.clone();
    data.domains.push(domain);
    store.save(&data)?;

    let mut result = CmdResult::default()
        .with_affected_ids(vec![id])
        .with_listing(listing);
    result.add_message(CmdMessage::success(format!("Added domain {}", name)));
    result.add_message(CmdMessage::info(
        "Publish the DNS records above, then run `mailadm domains verify` to activate it.",
    ));
    Ok(result)
}

pub fn delete<S: DataStore>(
    store: &mut S,
    selectors: &[Selector],
    confirm: Confirm<'_>,
) -> Result<CmdResult> {
    let mut data = store.load()?;
    let indexes = find_indexes(&data.domains, selectors)?;
    let labels: Vec<String> = indexes
        .iter()
        .map(|&i| data.domains[i].name.clone())
        .collect();

    if !confirm(&labels) {
        return Ok(CmdResult::cancelled());
    }

    let ids: Vec<u64> = indexes.iter().map(|&i| data.domains[i].id).collect();
    data.domains.retain(|d| !ids.contains(&d.id));
    store.save(&data)?;
    tracing::info!(count = ids.len(), "domains deleted");

    let mut result = CmdResult::default().with_affected_ids(ids);
    for label in labels {
        result.add_message(CmdMessage::success(format!("Deleted domain {}", label)));
    }
    Ok(result)
}

/// Suspends active domains and activates everything else, pending ones included.
pub fn toggle<S: DataStore>(store: &mut S, selectors: &[Selector]) -> Result<CmdResult> {
    let mut data = store.load()?;
    let indexes = find_indexes(&data.domains, selectors)?;

    let mut result = CmdResult::default();
    for &i in &indexes {
        let domain = &mut data.domains[i];
        domain.status = match domain.status {
            DomainStatus::Active => DomainStatus::Suspended,
            DomainStatus::PendingDns | DomainStatus::Suspended => DomainStatus::Active,
        };
        result.add_message(CmdMessage::success(format!(
            "{} is now {}",
            domain.name, domain.status
        )));
        result.affected_ids.push(domain.id);
    }

    store.save(&data)?;
    tracing::info!(count = indexes.len(), "domain status toggled");
    Ok(result)
}

/// Marks a domain Active with every DNS record verified, once `delay` has passed.
pub fn verify<S: DataStore>(
    store: &mut S,
    selector: &Selector,
    delay: std::time::Duration,
) -> Result<CmdResult> {
    let data = store.load()?;
    let idx = find_index(&data.domains, selector)?;
    let domain = &data.domains[idx];

    let all_verified = domain
        .dns_records
        .iter()
        .all(|r| r.status == DnsStatus::Verified);
    if domain.status == DomainStatus::Active && all_verified {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::info(format!(
            "{} is already verified",
            domain.name
        )));
        return Ok(result);
    }

    let id = domain.id;
    tracing::debug!(id, delay_ms = delay.as_millis() as u64, "verification scheduled");
    thread::sleep(delay);

    let mut data = store.load()?;
    let idx = find_index(&data.domains, &Selector::Id(id))?;
    let domain = &mut data.domains[idx];
    domain.status = DomainStatus::Active;
    for record in &mut domain.dns_records {
        record.status = DnsStatus::Verified;
    }
    let name = domain.name.clone();
    store.save(&data)?;
    tracing::info!(id, "domain verified");

    let mut result = CmdResult::default().with_affected_ids(vec![id]);
    result.add_message(CmdMessage::success(format!(
        "DNS records for {} verified, domain is Active",
        name
    )));
    Ok(result)
}

pub fn dns<S: DataStore>(store: &S, selector: &Selector) -> Result<CmdResult> {
    let data = store.load()?;
    let idx = find_index(&data.domains, selector)?;
    Ok(CmdResult::default()
        .with_affected_ids(vec![data.domains[idx].id])
        .with_listing(dns_listing(&data.domains[idx])))
}

/// A DNS record numbered by its position within the domain.
struct DnsRow {
    position: u64,
    record: DnsRecord,
}

impl Row for DnsRow {
    fn id(&self) -> u64 {
        self.position
    }

    fn value(&self, key: &str) -> Option<CellValue> {
        let text = |s: &str| Some(CellValue::Text(s.to_string()));
        match key {
            "type" => text(self.record.record_type.label()),
            "host" => text(self.record.host.as_str()),
            "value" => text(self.record.value.as_str()),
            "status" => text(self.record.status.label()),
            _ => None,
        }
    }
}

fn dns_listing(domain: &Domain) -> Listing {
    let rows: Vec<DnsRow> = domain
        .dns_records
        .iter()
        .enumerate()
        .map(|(i, record)| DnsRow {
            position: i as u64 + 1,
            record: record.clone(),
        })
        .collect();
    let columns = vec![
        ColumnDef::new("type", "Type"),
        ColumnDef::new("host", "Host"),
        ColumnDef::new("value", "Value"),
        ColumnDef::new("status", "Status"),
    ];
    let view = table::apply(rows, &columns, &TableQuery::new());
    Listing::from_view(
        format!("DNS records for {}", domain.name),
        &view,
        &columns,
        "No DNS records.",
    )
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomainStats {
    pub total: usize,
    pub active: usize,
    pub pending: usize,
    pub suspended: usize,
}

pub fn stats_of(domains: &[Domain]) -> DomainStats {
    domains.iter().fold(
        DomainStats {
            total: domains.len(),
            ..Default::default()
        },
        |mut acc, d| {
            match d.status {
                DomainStatus::Active => acc.active += 1,
                DomainStatus::PendingDns => acc.pending += 1,
                DomainStatus::Suspended => acc.suspended += 1,
            }
            acc
        },
    )
}

pub fn stats<S: DataStore>(store: &S) -> Result<CmdResult> {
    let data = store.load()?;
    let stats = stats_of(&data.domains);
    Ok(CmdResult::default().with_summary(
        Summary::new("Domains")
            .entry("Total Domains", stats.total)
            .entry("Active", stats.active)
            .entry("Pending DNS", stats.pending)
            .entry("Suspended", stats.suspended),
    ))
}
