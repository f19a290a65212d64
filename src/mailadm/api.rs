//! # API Facade
//!
//! The API layer is a thin facade over the command layer and the single entry
//! point for every console operation, whatever client drives it.
//!
//! It:
//! - **Dispatches** to the command module for each collection
//! - **Normalizes inputs**: raw selector strings (`3`, `3-5`, `example.com`)
//!   become [`Selector`]s, the verification delay comes from the config
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does not hold business logic, print, or format anything.
//!
//! ## Generic Over DataStore
//!
//! `MailAdmApi<S: DataStore>` runs over any backend:
//! - Production: `MailAdmApi<FileStore>`
//! - Testing: `MailAdmApi<InMemoryStore>`
//!
//! API tests check dispatch and argument handling. Command behavior is tested
//! in the command modules.

use crate::commands::{self, users::UserUpdate, CmdResult, Confirm};
use crate::config::MailAdmConfig;
use crate::error::{MailAdmError, Result};
use crate::model::{BroadcastStatus, Quota, Role};
use crate::selector::{parse_selectors, Selector};
use crate::store::fs::FileStore;
use crate::store::DataStore;
use crate::table::TableQuery;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use crate::commands::config::ConfigAction;
pub use crate::commands::{CmdMessage, Listing, MessageLevel, Summary};

pub struct MailAdmApi<S: DataStore> {
    store: S,
    config: MailAdmConfig,
    data_dir: PathBuf,
}

impl<S: DataStore> MailAdmApi<S> {
    pub fn new(store: S, config: MailAdmConfig, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            config,
            data_dir: data_dir.into(),
        }
    }

    pub fn config(&self) -> &MailAdmConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // Domains

    pub fn list_domains(&self, query: &TableQuery) -> Result<CmdResult> {
        commands::domains::list(&self.store, query)
    }

    pub fn create_domain(&mut self, name: &str) -> Result<CmdResult> {
        commands::domains::create(&mut self.store, name)
    }

    pub fn delete_domains<I: AsRef<str>>(
        &mut self,
        selectors: &[I],
        confirm: Confirm<'_>,
    ) -> Result<CmdResult> {
        let selectors = parse_selectors(selectors)?;
        commands::domains::delete(&mut self.store, &selectors, confirm)
    }

    pub fn toggle_domains<I: AsRef<str>>(&mut self, selectors: &[I]) -> Result<CmdResult> {
        let selectors = parse_selectors(selectors)?;
        commands::domains::toggle(&mut self.store, &selectors)
    }

    /// Blocks for the configured verification delay.
    pub fn verify_domain(&mut self, selector: &str) -> Result<CmdResult> {
        let selector = single(selector)?;
        let delay = Duration::from_millis(self.config.verify_delay_ms);
        commands::domains::verify(&mut self.store, &selector, delay)
    }

    pub fn domain_dns(&self, selector: &str) -> Result<CmdResult> {
        commands::domains::dns(&self.store, &single(selector)?)
    }

    pub fn domain_stats(&self) -> Result<CmdResult> {
        commands::domains::stats(&self.store)
    }

    // Mailboxes

    pub fn list_mailboxes(&self, query: &TableQuery) -> Result<CmdResult> {
        commands::mailboxes::list(&self.store, query)
    }

    pub fn create_mailbox(&mut self, username: &str, domain: &str, quota: Quota) -> Result<CmdResult> {
        commands::mailboxes::create(&mut self.store, username, domain, quota)
    }

    pub fn set_mailbox_quota(&mut self, selector: &str, quota: Quota) -> Result<CmdResult> {
        commands::mailboxes::update_quota(&mut self.store, &single(selector)?, quota)
    }

    pub fn delete_mailboxes<I: AsRef<str>>(
        &mut self,
        selectors: &[I],
        confirm: Confirm<'_>,
    ) -> Result<CmdResult> {
        let selectors = parse_selectors(selectors)?;
        commands::mailboxes::delete(&mut self.store, &selectors, confirm)
    }

    pub fn toggle_mailboxes<I: AsRef<str>>(&mut self, selectors: &[I]) -> Result<CmdResult> {
        let selectors = parse_selectors(selectors)?;
        commands::mailboxes::toggle(&mut self.store, &selectors)
    }

    pub fn mailbox_stats(&self) -> Result<CmdResult> {
        commands::mailboxes::stats(&self.store)
    }

    // Users

    pub fn list_users(&self, query: &TableQuery) -> Result<CmdResult> {
        commands::users::list(&self.store, query)
    }

    pub fn create_user(&mut self, name: &str, email: &str, role: Role) -> Result<CmdResult> {
        commands::users::create(&mut self.store, name, email, role)
    }

    pub fn update_user(&mut self, selector: &str, update: UserUpdate) -> Result<CmdResult> {
        commands::users::update(&mut self.store, &single(selector)?, update)
    }

    pub fn delete_users<I: AsRef<str>>(
        &mut self,
        selectors: &[I],
        confirm: Confirm<'_>,
    ) -> Result<CmdResult> {
        let selectors = parse_selectors(selectors)?;
        commands::users::delete(&mut self.store, &selectors, confirm)
    }

    pub fn toggle_users<I: AsRef<str>>(&mut self, selectors: &[I]) -> Result<CmdResult> {
        let selectors = parse_selectors(selectors)?;
        commands::users::toggle(&mut self.store, &selectors)
    }

    pub fn user_stats(&self) -> Result<CmdResult> {
        commands::users::stats(&self.store)
    }

    // Broadcasts

    pub fn list_broadcasts(&self, query: &TableQuery) -> Result<CmdResult> {
        commands::broadcasts::list(&self.store, query)
    }

    pub fn create_broadcast(&mut self, name: &str, status: BroadcastStatus) -> Result<CmdResult> {
        commands::broadcasts::create(&mut self.store, name, status)
    }

    pub fn update_broadcast(
        &mut self,
        selector: &str,
        name: Option<&str>,
        status: Option<BroadcastStatus>,
    ) -> Result<CmdResult> {
        commands::broadcasts::update(&mut self.store, &single(selector)?, name, status)
    }

    pub fn delete_broadcasts<I: AsRef<str>>(
        &mut self,
        selectors: &[I],
        confirm: Confirm<'_>,
    ) -> Result<CmdResult> {
        let selectors = parse_selectors(selectors)?;
        commands::broadcasts::delete(&mut self.store, &selectors, confirm)
    }

    // Reports

    pub fn report_summary(&self) -> Result<CmdResult> {
        commands::reports::summary(&self.store)
    }

    pub fn usage_report(&self, query: &TableQuery) -> Result<CmdResult> {
        commands::reports::usage(&self.store, query)
    }

    pub fn top_users(&self, query: &TableQuery) -> Result<CmdResult> {
        commands::reports::top(&self.store, query)
    }

    pub fn activity_log(&self, query: &TableQuery) -> Result<CmdResult> {
        commands::reports::activity(&self.store, query)
    }

    pub fn export_report(&self) -> Result<CmdResult> {
        commands::reports::export(&self.store)
    }

    pub fn dashboard(&self) -> Result<CmdResult> {
        commands::dashboard::run(&self.store, self.config.top_users)
    }

    // Maintenance

    pub fn config_action(&mut self, action: ConfigAction) -> Result<CmdResult> {
        let result = commands::config::run(&self.data_dir, action)?;
        if let Some(config) = &result.config {
            self.config = config.clone();
        }
        Ok(result)
    }

    pub fn reset(&mut self, confirm: Confirm<'_>) -> Result<CmdResult> {
        commands::init::reset(&mut self.store, confirm)
    }
}

impl MailAdmApi<FileStore> {
    pub fn init(&mut self) -> Result<CmdResult> {
        commands::init::init(&mut self.store)
    }
}

/// Commands that act on one record reject ranges and empty input.
fn single(input: &str) -> Result<Selector> {
    let mut selectors = parse_selectors(&[input])?;
    match selectors.len() {
        1 => Ok(selectors.remove(0)),
        n => Err(MailAdmError::Api(format!(
            "Expected a single record, '{}' selects {}",
            input, n
        ))),
    }
}
