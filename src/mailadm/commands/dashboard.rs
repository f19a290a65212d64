use crate::commands::{domains, mailboxes, users, CmdResult, Listing, Summary};
use crate::error::Result;
use crate::model::{AccountStatus, BroadcastStatus, Dataset, DomainStatus, Mailbox};
use crate::store::DataStore;
use crate::table::{self, ColumnDef, SortSpec, TableQuery};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub total_domains: usize,
    pub active_mailboxes: usize,
    pub recipients_sent: u64,
    pub pending_verifications: usize,
}

pub fn overview_of(data: &Dataset) -> Overview {
    Overview {
        total_domains: data.domains.len(),
        active_mailboxes: data
            .mailboxes
            .iter()
            .filter(|m| m.status == AccountStatus::Active)
            .count(),
        recipients_sent: data
            .broadcasts
            .iter()
            .filter(|b| b.status == BroadcastStatus::Sent)
            .map(|b| b.recipients)
            .sum(),
        pending_verifications: data
            .domains
            .iter()
            .filter(|d| d.status == DomainStatus::PendingDns)
            .count(),
    }
}

fn storage_columns() -> Vec<ColumnDef<Mailbox>> {
    vec![
        ColumnDef::new("email", "Mailbox"),
        ColumnDef::new("used", "Storage Used")
            .with_cell(|m: &Mailbox| format!("{:.1} GB", m.storage_used_gb)),
        ColumnDef::new("quota", "Quota").with_cell(|m: &Mailbox| m.quota.to_string()),
    ]
}

pub fn run<S: DataStore>(store: &S, top_n: usize) -> Result<CmdResult> {
    let data = store.load()?;
    let overview = overview_of(&data);
    let roles = users::stats_of(&data.users);
    let domain_stats = domains::stats_of(&data.domains);
    let mailbox_stats = mailboxes::stats_of(&data.mailboxes);
    tracing::debug!(top_n, "building dashboard");

    let columns = storage_columns();
    let query = TableQuery::new()
        .sort(SortSpec::desc("used"))
        .page(0, top_n.max(1));
    let view = table::apply(data.mailboxes, &columns, &query);
    let mut top = Listing::from_view("Top Storage", &view, &columns, "No mailboxes yet.");
    if top_n == 0 {
        top.rows.clear();
        top.ids.clear();
    }

    Ok(CmdResult::default()
        .with_summary(
            Summary::new("Overview")
                .entry("Total Domains", overview.total_domains)
                .entry("Active Mailboxes", overview.active_mailboxes)
                .entry("Broadcasts Sent", overview.recipients_sent)
                .entry("Pending Verification", overview.pending_verifications),
        )
        .with_summary(
            Summary::new("Domain Status")
                .entry("Active", domain_stats.active)
                .entry("Pending DNS", domain_stats.pending)
                .entry("Suspended", domain_stats.suspended),
        )
        .with_summary(
            Summary::new("Team Roles")
                .entry("Admins", roles.admins)
                .entry("Members", roles.members),
        )
        .with_summary(
            Summary::new("Storage")
                .entry("Used", format!("{:.1} GB", mailbox_stats.total_storage_gb))
                .entry("Mailboxes", mailbox_stats.total),
        )
        .with_listing(top))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn overview_from_seed() {
        let store = StoreFixture::seeded().store;
        assert_eq!(
            overview_of(&store.load().unwrap()),
            Overview {
                total_domains: 3,
                active_mailboxes: 3,
                recipients_sent: 2280,
                pending_verifications: 1,
            }
        );
    }

    #[test]
    fn top_mailboxes_by_storage() {
        let store = StoreFixture::seeded().store;
        let result = run(&store, 3).unwrap();
        assert_eq!(result.listings[0].ids, vec![4, 3, 1]);
        assert_eq!(result.listings[0].rows[0][1], "15.3 GB");
        assert_eq!(result.summaries[2].get("Admins"), Some("1"));
        assert_eq!(result.summaries[2].get("Members"), Some("2"));
    }

    #[test]
    fn zero_top_entries_shows_none() {
        let store = StoreFixture::seeded().store;
        let result = run(&store, 0).unwrap();
        assert!(result.listings[0].rows.is_empty());
    }

    #[test]
    fn empty_dataset() {
        let store = StoreFixture::default().store;
        let result = run(&store, 3).unwrap();
        assert_eq!(result.summaries[0].get("Total Domains"), Some("0"));
        assert!(result.listings[0].rows.is_empty());
    }
}
