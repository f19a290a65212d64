use super::DataStore;
use crate::error::Result;
use crate::model::Dataset;

/// In-memory storage for testing.
/// Does NOT persist data.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: Dataset,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: Dataset) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }
}

impl DataStore for InMemoryStore {
    fn load(&self) -> Result<Dataset> {
        Ok(self.data.clone())
    }

    fn save(&mut self, data: &Dataset) -> Result<()> {
        self.data = data.clone();
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{AccountStatus, Domain, DomainStatus, DnsRecord, Mailbox, Quota, Role, User};
    use crate::seed;
    use chrono::NaiveDate;

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        /// An empty dataset.
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        /// The same sample records a fresh install starts with.
        pub fn seeded() -> Self {
            Self {
                store: InMemoryStore::with_data(seed::dataset()),
            }
        }

        fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
            ids.max().unwrap_or(0) + 1
        }

        pub fn with_domain(mut self, name: &str, status: DomainStatus) -> Self {
            let id = Self::next_id(self.store.data.domains.iter().map(|d| d.id));
            let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            self.store.data.domains.push(Domain {
                id,
                name: name.to_string(),
                status,
                expiry_date: today,
                active_mailboxes: 0,
                created_at: today,
                dns_records: DnsRecord::template(),
            });
            self
        }

        pub fn with_mailbox(mut self, email: &str, quota: Quota, used: f64) -> Self {
            let id = Self::next_id(self.store.data.mailboxes.iter().map(|m| m.id));
            let domain = email.split('@').nth(1).unwrap_or_default().to_string();
            self.store.data.mailboxes.push(Mailbox {
                id,
                email: email.to_string(),
                domain,
                quota,
                storage_used_gb: used,
                status: AccountStatus::Active,
                last_login: None,
                owner: None,
            });
            self
        }

        pub fn with_user(mut self, name: &str, email: &str, role: Role) -> Self {
            let id = Self::next_id(self.store.data.users.iter().map(|u| u.id));
            self.store.data.users.push(User {
                id,
                name: name.to_string(),
                email: email.to_string(),
                role,
                status: AccountStatus::Active,
                joined: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            });
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::StoreFixture;
    use super::*;
    use crate::model::{DomainStatus, Quota};

    #[test]
    fn save_replaces_whole_dataset() {
        let mut store = StoreFixture::seeded().store;
        let mut data = store.load().unwrap();
        data.domains.clear();
        store.save(&data).unwrap();

        let reloaded = store.load().unwrap();
        assert!(reloaded.domains.is_empty());
        assert_eq!(reloaded.users.len(), 4);
    }

    #[test]
    fn fixture_assigns_sequential_ids() {
        let fixture = StoreFixture::default()
            .with_domain("a.io", DomainStatus::Active)
            .with_domain("b.io", DomainStatus::Suspended)
            .with_mailbox("x@a.io", Quota::Limited(1.0), 0.5);

        let data = fixture.store.data();
        assert_eq!(data.domains[1].id, 2);
        assert_eq!(data.mailboxes[0].domain, "a.io");
    }
}
