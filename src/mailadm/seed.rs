//! Sample records a fresh data directory starts from.
//!
//! Relative timestamps (last logins, activity) are computed from the moment the
//! dataset is seeded so a new install always looks recently used.

use crate::model::{
    AccountStatus, ActivityAction, ActivityLog, Broadcast, BroadcastStatus, Dataset, DnsRecord,
    DnsStatus, Domain, DomainStatus, DomainUsage, Mailbox, Quota, Role, TopUser, User,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};

pub fn dataset() -> Dataset {
    dataset_at(Utc::now())
}

pub fn dataset_at(now: DateTime<Utc>) -> Dataset {
    Dataset {
        domains: domains(),
        mailboxes: mailboxes(now),
        users: users(),
        broadcasts: broadcasts(),
        domain_usage: domain_usage(),
        top_users: top_users(),
        activity: activity(now),
    }
}

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn verified() -> Vec<DnsRecord> {
    DnsRecord::template()
        .into_iter()
        .map(|record| DnsRecord {
            status: DnsStatus::Verified,
            ..record
        })
        .collect()
}

fn domains() -> Vec<Domain> {
    vec![
        Domain {
            id: 1,
            name: "kerjamail.co".into(),
            status: DomainStatus::Active,
            expiry_date: day(2026, 8, 15),
            active_mailboxes: 15,
            created_at: day(2023, 1, 10),
            dns_records: verified(),
        },
        Domain {
            id: 2,
            name: "example.com".into(),
            status: DomainStatus::PendingDns,
            expiry_date: day(2025, 11, 20),
            active_mailboxes: 0,
            created_at: day(2023, 9, 1),
            dns_records: DnsRecord::template(),
        },
        Domain {
            id: 3,
            name: "suspended-co.com".into(),
            status: DomainStatus::Suspended,
            expiry_date: day(2025, 10, 5),
            active_mailboxes: 5,
            created_at: day(2023, 5, 12),
            dns_records: verified(),
        },
    ]
}

fn mailboxes(now: DateTime<Utc>) -> Vec<Mailbox> {
    vec![
        Mailbox {
            id: 1,
            email: "hello@kerjamail.co".into(),
            domain: "kerjamail.co".into(),
            quota: Quota::Limited(5.0),
            storage_used_gb: 2.1,
            status: AccountStatus::Active,
            last_login: Some(now - Duration::days(1)),
            owner: Some("John Doe".into()),
        },
        Mailbox {
            id: 2,
            email: "info@example.com".into(),
            domain: "example.com".into(),
            quota: Quota::Limited(2.0),
            storage_used_gb: 1.8,
            status: AccountStatus::Active,
            last_login: Some(now - Duration::days(2)),
            owner: Some("Jane Smith".into()),
        },
        Mailbox {
            id: 3,
            email: "support@example.com".into(),
            domain: "example.com".into(),
            quota: Quota::Limited(10.0),
            storage_used_gb: 9.5,
            status: AccountStatus::Suspended,
            last_login: Some(now - Duration::days(7)),
            owner: Some("Jane Smith".into()),
        },
        Mailbox {
            id: 4,
            email: "contact@new-project.io".into(),
            domain: "new-project.io".into(),
            quota: Quota::Unlimited,
            storage_used_gb: 15.3,
            status: AccountStatus::Active,
            last_login: Some(now),
            owner: Some("Mike Johnson".into()),
        },
    ]
}

fn users() -> Vec<User> {
    let user = |id, name: &str, email: &str, role, status, joined| User {
        id,
        name: name.into(),
        email: email.into(),
        role,
        status,
        joined,
    };
    vec![
        user(1, "John Doe (You)", "john.doe@kerjamail.co", Role::Owner, AccountStatus::Active, day(2023, 1, 10)),
        user(2, "Jane Smith", "jane.smith@kerjamail.co", Role::Admin, AccountStatus::Active, day(2023, 2, 20)),
        user(3, "Mike Johnson", "mike.j@kerjamail.co", Role::Member, AccountStatus::Active, day(2023, 5, 15)),
        user(4, "Sarah Conner", "s.conner@kerjamail.co", Role::Member, AccountStatus::Suspended, day(2023, 6, 10)),
    ]
}

fn broadcasts() -> Vec<Broadcast> {
    vec![
        Broadcast {
            id: 1,
            name: "Weekly Newsletter - Sep Week 4".into(),
            status: BroadcastStatus::Sent,
            recipients: 1450,
            sent_date: Some(day(2025, 9, 25)),
        },
        Broadcast {
            id: 2,
            name: "Product Update: New Features".into(),
            status: BroadcastStatus::Sent,
            recipients: 830,
            sent_date: Some(day(2025, 9, 23)),
        },
        Broadcast {
            id: 3,
            name: "Monthly Promo October".into(),
            status: BroadcastStatus::Draft,
            recipients: 0,
            sent_date: None,
        },
        Broadcast {
            id: 4,
            name: "Internal Team Announcement".into(),
            status: BroadcastStatus::Scheduled,
            recipients: 58,
            sent_date: Some(day(2025, 9, 28)),
        },
    ]
}

fn domain_usage() -> Vec<DomainUsage> {
    let usage = |id, domain: &str, mailbox_count, storage_used_gb, storage_quota_gb| DomainUsage {
        id,
        domain: domain.into(),
        mailbox_count,
        storage_used_gb,
        storage_quota_gb,
    };
    vec![
        usage(1, "kerjamail.co", 15, 75.0, 200.0),
        usage(2, "example.com", 5, 12.0, 50.0),
        usage(3, "new-project.io", 22, 150.0, 250.0),
    ]
}

fn top_users() -> Vec<TopUser> {
    let top = |id, name: &str, email: &str, storage_used_gb| TopUser {
        id,
        name: name.into(),
        email: email.into(),
        storage_used_gb,
    };
    vec![
        top(1, "John Doe", "john.doe@kerjamail.co", 12.5),
        top(2, "Project Manager", "pm@new-project.io", 10.1),
        top(3, "Jane Smith", "jane.smith@kerjamail.co", 8.7),
        top(4, "Marketing Team", "marketing@new-project.io", 7.5),
    ]
}

fn activity(now: DateTime<Utc>) -> Vec<ActivityLog> {
    let log = |id, ago: Duration, actor: &str, action, details: &str| ActivityLog {
        id,
        timestamp: now - ago,
        actor: actor.into(),
        action,
        details: details.into(),
    };
    vec![
        log(1, Duration::zero(), "john.doe@kerjamail.co", ActivityAction::Login, "IP: 103.22.11.5"),
        log(2, Duration::hours(1), "jane.smith@kerjamail.co", ActivityAction::PasswordReset, "Success"),
        log(3, Duration::hours(2), "admin@system", ActivityAction::CreateMailbox, "user: new.user@example.com"),
        log(4, Duration::days(1), "admin@system", ActivityAction::DeleteMailbox, "user: old.user@kerjamail.co"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_ids_are_unique_per_collection() {
        let data = dataset();
        let mut ids: Vec<u64> = data.domains.iter().map(|d| d.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), data.domains.len());
        assert_eq!(data.mailboxes.len(), 4);
        assert_eq!(data.users.len(), 4);
        assert_eq!(data.broadcasts.len(), 4);
        assert_eq!(data.activity.len(), 4);
    }

    #[test]
    fn last_logins_are_relative_to_seed_time() {
        let now = Utc::now();
        let data = dataset_at(now);
        assert_eq!(data.mailboxes[0].last_login, Some(now - Duration::days(1)));
        assert_eq!(data.mailboxes[3].last_login, Some(now));
        assert_eq!(data.activity[1].timestamp, now - Duration::hours(1));
    }

    #[test]
    fn only_pending_domain_has_unverified_records() {
        let data = dataset();
        for domain in &data.domains {
            let all_verified = domain
                .dns_records
                .iter()
                .all(|r| r.status == DnsStatus::Verified);
            assert_eq!(all_verified, domain.status != DomainStatus::PendingDns);
        }
    }

    #[test]
    fn stored_json_uses_display_labels() {
        let json = serde_json::to_value(dataset()).unwrap();
        assert_eq!(json["domains"][1]["status"], "Pending DNS");
        assert_eq!(json["mailboxes"][3]["quota"], "unlimited");
        assert_eq!(json["activity"][2]["action"], "CREATE_MAILBOX");
        assert!(json["broadcasts"][2]["sent_date"].is_null());
    }
}
