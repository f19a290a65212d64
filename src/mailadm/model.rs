use crate::error::{MailAdmError, Result};
use crate::table::{CellValue, Row};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A closed set of display labels, parsed leniently from the command line.
pub trait Choice: Copy + 'static {
    const KIND: &'static str;
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;

    /// Accepts the label or code in any case, ignoring spaces, dashes and underscores.
    fn parse_choice(input: &str) -> Result<Self> {
        let wanted = normalize(input);
        Self::ALL
            .iter()
            .copied()
            .find(|c| normalize(c.label()) == wanted)
            .ok_or_else(|| {
                let labels: Vec<&str> = Self::ALL.iter().map(|c| c.label()).collect();
                MailAdmError::Validation(format!(
                    "Unknown {} '{}' (expected one of: {})",
                    Self::KIND,
                    input,
                    labels.join(", ")
                ))
            })
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainStatus {
    Active,
    #[serde(rename = "Pending DNS")]
    PendingDns,
    Suspended,
}

impl Choice for DomainStatus {
    const KIND: &'static str = "domain status";
    const ALL: &'static [Self] = &[Self::Active, Self::PendingDns, Self::Suspended];

    fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::PendingDns => "Pending DNS",
            Self::Suspended => "Suspended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    Mx,
    Txt,
    Cname,
}

impl Choice for DnsRecordType {
    const KIND: &'static str = "record type";
    const ALL: &'static [Self] = &[Self::Mx, Self::Txt, Self::Cname];

    fn label(&self) -> &'static str {
        match self {
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Cname => "CNAME",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DnsStatus {
    Verified,
    Unverified,
}

impl Choice for DnsStatus {
    const KIND: &'static str = "record status";
    const ALL: &'static [Self] = &[Self::Verified, Self::Unverified];

    fn label(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Unverified => "unverified",
        }
    }
}

/// Mailbox and user accounts share the same two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Suspended,
}

impl AccountStatus {
    pub fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Suspended,
            Self::Suspended => Self::Active,
        }
    }
}

impl Choice for AccountStatus {
    const KIND: &'static str = "status";
    const ALL: &'static [Self] = &[Self::Active, Self::Suspended];

    fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Suspended => "Suspended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Owner,
    Admin,
    Member,
}

impl Choice for Role {
    const KIND: &'static str = "role";
    const ALL: &'static [Self] = &[Self::Owner, Self::Admin, Self::Member];

    fn label(&self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Admin => "Admin",
            Self::Member => "Member",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BroadcastStatus {
    Sent,
    Draft,
    Scheduled,
}

impl Choice for BroadcastStatus {
    const KIND: &'static str = "broadcast status";
    const ALL: &'static [Self] = &[Self::Sent, Self::Draft, Self::Scheduled];

    fn label(&self) -> &'static str {
        match self {
            Self::Sent => "Sent",
            Self::Draft => "Draft",
            Self::Scheduled => "Scheduled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    Login,
    PasswordReset,
    CreateMailbox,
    DeleteMailbox,
}

impl ActivityAction {
    /// The stored code, e.g. `CREATE_MAILBOX`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::PasswordReset => "PASSWORD_RESET",
            Self::CreateMailbox => "CREATE_MAILBOX",
            Self::DeleteMailbox => "DELETE_MAILBOX",
        }
    }
}

impl Choice for ActivityAction {
    const KIND: &'static str = "action";
    const ALL: &'static [Self] = &[
        Self::Login,
        Self::PasswordReset,
        Self::CreateMailbox,
        Self::DeleteMailbox,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::PasswordReset => "Password Reset",
            Self::CreateMailbox => "Create Mailbox",
            Self::DeleteMailbox => "Delete Mailbox",
        }
    }
}

macro_rules! choice_traits {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = MailAdmError;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_choice(s)
            }
        }
    )*};
}

choice_traits!(
    DomainStatus,
    DnsRecordType,
    DnsStatus,
    AccountStatus,
    Role,
    BroadcastStatus,
    ActivityAction
);

/// Mailbox storage quota in GB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuotaRepr", into = "QuotaRepr")]
pub enum Quota {
    Limited(f64),
    Unlimited,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum QuotaRepr {
    Gb(f64),
    Word(String),
}

impl From<Quota> for QuotaRepr {
    fn from(quota: Quota) -> Self {
        match quota {
            Quota::Limited(gb) => QuotaRepr::Gb(gb),
            Quota::Unlimited => QuotaRepr::Word("unlimited".to_string()),
        }
    }
}

impl TryFrom<QuotaRepr> for Quota {
    type Error = MailAdmError;

    fn try_from(repr: QuotaRepr) -> Result<Self> {
        match repr {
            QuotaRepr::Gb(gb) => Ok(Quota::Limited(gb)),
            QuotaRepr::Word(word) => word.parse(),
        }
    }
}

impl FromStr for Quota {
    type Err = MailAdmError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unlimited") {
            return Ok(Quota::Unlimited);
        }
        let gb: f64 = s
            .trim_end_matches("GB")
            .trim()
            .parse()
            .map_err(|_| MailAdmError::Validation(format!("Invalid quota '{}'", s)))?;
        if !gb.is_finite() || gb < 0.0 {
            return Err(MailAdmError::Validation(format!(
                "Quota must be a non-negative number of GB, got '{}'",
                s
            )));
        }
        Ok(Quota::Limited(gb))
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quota::Limited(gb) => write!(f, "{} GB", gb),
            Quota::Unlimited => f.write_str("Unlimited"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    pub host: String,
    pub value: String,
    pub status: DnsStatus,
}

impl DnsRecord {
    /// The records a newly added domain must publish, all unverified.
    pub fn template() -> Vec<DnsRecord> {
        let record = |record_type, host: &str, value: &str| DnsRecord {
            record_type,
            host: host.to_string(),
            value: value.to_string(),
            status: DnsStatus::Unverified,
        };
        vec![
            record(DnsRecordType::Mx, "@", "mx.kerjamail.co"),
            record(DnsRecordType::Txt, "@", "v=spf1 include:spf.kerjamail.co ~all"),
            record(DnsRecordType::Cname, "mail", "mail.kerjamail.co"),
            record(DnsRecordType::Txt, "kerjamail._domainkey", "v=DKIM1; k=rsa; p=..."),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub id: u64,
    pub name: String,
    pub status: DomainStatus,
    pub expiry_date: NaiveDate,
    pub active_mailboxes: u64,
    pub created_at: NaiveDate,
    pub dns_records: Vec<DnsRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mailbox {
    pub id: u64,
    pub email: String,
    pub domain: String,
    pub quota: Quota,
    pub storage_used_gb: f64,
    pub status: AccountStatus,
    /// `None` means the mailbox has never been logged into.
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
    pub joined: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Broadcast {
    pub id: u64,
    pub name: String,
    pub status: BroadcastStatus,
    pub recipients: u64,
    pub sent_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainUsage {
    pub id: u64,
    pub domain: String,
    pub mailbox_count: u64,
    pub storage_used_gb: f64,
    pub storage_quota_gb: f64,
}

impl DomainUsage {
    /// Share of the quota in use, 0 when the domain has no quota.
    pub fn usage_percent(&self) -> f64 {
        if self.storage_quota_gb == 0.0 {
            0.0
        } else {
            self.storage_used_gb / self.storage_quota_gb * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub storage_used_gb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub action: ActivityAction,
    pub details: String,
}

/// Every collection the console manages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub domains: Vec<Domain>,
    pub mailboxes: Vec<Mailbox>,
    pub users: Vec<User>,
    pub broadcasts: Vec<Broadcast>,
    #[serde(default)]
    pub domain_usage: Vec<DomainUsage>,
    #[serde(default)]
    pub top_users: Vec<TopUser>,
    #[serde(default)]
    pub activity: Vec<ActivityLog>,
}

/// A stored record addressable by a human-readable key.
pub trait Record: Row + Clone {
    const KIND: &'static str;

    fn natural_key(&self) -> &str;
}

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

fn text(s: impl Into<String>) -> Option<CellValue> {
    Some(CellValue::Text(s.into()))
}

fn date(d: &NaiveDate) -> Option<CellValue> {
    text(d.format("%Y-%m-%d").to_string())
}

impl Row for Domain {
    fn id(&self) -> u64 {
        self.id
    }

    fn value(&self, key: &str) -> Option<CellValue> {
        match key {
            "id" => Some(self.id.into()),
            "name" => text(&self.name),
            "status" => text(self.status.label()),
            "expiry" => date(&self.expiry_date),
            "mailboxes" => Some(self.active_mailboxes.into()),
            "created" => date(&self.created_at),
            _ => None,
        }
    }
}

impl Record for Domain {
    const KIND: &'static str = "Domain";

    fn natural_key(&self) -> &str {
        &self.name
    }
}

impl Row for Mailbox {
    fn id(&self) -> u64 {
        self.id
    }

    fn value(&self, key: &str) -> Option<CellValue> {
        match key {
            "id" => Some(self.id.into()),
            "email" => text(&self.email),
            "domain" => text(&self.domain),
            "quota" => match self.quota {
                Quota::Limited(gb) => Some(gb.into()),
                Quota::Unlimited => text("unlimited"),
            },
            "used" => Some(self.storage_used_gb.into()),
            "status" => text(self.status.label()),
            "last_login" => self
                .last_login
                .map(|t| CellValue::Text(t.format(TIMESTAMP_FORMAT).to_string())),
            "owner" => self.owner.as_ref().map(|o| CellValue::Text(o.clone())),
            _ => None,
        }
    }
}

impl Record for Mailbox {
    const KIND: &'static str = "Mailbox";

    fn natural_key(&self) -> &str {
        &self.email
    }
}

impl Row for User {
    fn id(&self) -> u64 {
        self.id
    }

    fn value(&self, key: &str) -> Option<CellValue> {
        match key {
            "id" => Some(self.id.into()),
            "name" => text(&self.name),
            "email" => text(&self.email),
            "role" => text(self.role.label()),
            "status" => text(self.status.label()),
            "joined" => date(&self.joined),
            _ => None,
        }
    }
}

impl Record for User {
    const KIND: &'static str = "User";

    fn natural_key(&self) -> &str {
        &self.email
    }
}

impl Row for Broadcast {
    fn id(&self) -> u64 {
        self.id
    }

    fn value(&self, key: &str) -> Option<CellValue> {
        match key {
            "id" => Some(self.id.into()),
            "name" => text(&self.name),
            "status" => text(self.status.label()),
            "recipients" => Some(self.recipients.into()),
            "sent" => self.sent_date.as_ref().and_then(date),
            _ => None,
        }
    }
}

impl Record for Broadcast {
    const KIND: &'static str = "Broadcast";

    fn natural_key(&self) -> &str {
        &self.name
    }
}

impl Row for DomainUsage {
    fn id(&self) -> u64 {
        self.id
    }

    fn value(&self, key: &str) -> Option<CellValue> {
        match key {
            "id" => Some(self.id.into()),
            "domain" => text(&self.domain),
            "mailboxes" => Some(self.mailbox_count.into()),
            "used" => Some(self.storage_used_gb.into()),
            "quota" => Some(self.storage_quota_gb.into()),
            "usage" => Some(self.usage_percent().into()),
            _ => None,
        }
    }
}

impl Row for TopUser {
    fn id(&self) -> u64 {
        self.id
    }

    fn value(&self, key: &str) -> Option<CellValue> {
        match key {
            "id" => Some(self.id.into()),
            "name" => text(&self.name),
            "email" => text(&self.email),
            "used" => Some(self.storage_used_gb.into()),
            _ => None,
        }
    }
}

impl Row for ActivityLog {
    fn id(&self) -> u64 {
        self.id
    }

    fn value(&self, key: &str) -> Option<CellValue> {
        match key {
            "id" => Some(self.id.into()),
            "timestamp" => text(self.timestamp.format(TIMESTAMP_FORMAT).to_string()),
            "actor" => text(&self.actor),
            "action" => text(self.action.code()),
            "details" => text(&self.details),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_parse_leniently() {
        assert_eq!("pending dns".parse::<DomainStatus>().unwrap(), DomainStatus::PendingDns);
        assert_eq!("Pending-DNS".parse::<DomainStatus>().unwrap(), DomainStatus::PendingDns);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(
            "create_mailbox".parse::<ActivityAction>().unwrap(),
            ActivityAction::CreateMailbox
        );
    }

    #[test]
    fn unknown_choice_lists_expected_values() {
        let err = "superuser".parse::<Role>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown role 'superuser'"));
        assert!(msg.contains("Owner, Admin, Member"));
    }

    #[test]
    fn domain_status_serializes_with_label() {
        let json = serde_json::to_string(&DomainStatus::PendingDns).unwrap();
        assert_eq!(json, "\"Pending DNS\"");
    }

    #[test]
    fn quota_parses_numbers_and_unlimited() {
        assert_eq!("5".parse::<Quota>().unwrap(), Quota::Limited(5.0));
        assert_eq!("2.5 GB".parse::<Quota>().unwrap(), Quota::Limited(2.5));
        assert_eq!("Unlimited".parse::<Quota>().unwrap(), Quota::Unlimited);
        assert!("-1".parse::<Quota>().is_err());
        assert!("lots".parse::<Quota>().is_err());
        assert!("NaN".parse::<Quota>().is_err());
    }

    #[test]
    fn quota_json_matches_stored_shape() {
        assert_eq!(serde_json::to_string(&Quota::Limited(5.0)).unwrap(), "5.0");
        assert_eq!(serde_json::to_string(&Quota::Unlimited).unwrap(), "\"unlimited\"");

        let q: Quota = serde_json::from_str("\"unlimited\"").unwrap();
        assert_eq!(q, Quota::Unlimited);
        let q: Quota = serde_json::from_str("10").unwrap();
        assert_eq!(q, Quota::Limited(10.0));
    }

    #[test]
    fn dns_template_is_unverified() {
        let records = DnsRecord::template();
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.status == DnsStatus::Unverified));
        assert_eq!(records[1].value, "v=spf1 include:spf.kerjamail.co ~all");
        assert_eq!(records[3].host, "kerjamail._domainkey");
    }

    #[test]
    fn usage_percent_handles_zero_quota() {
        let mut usage = DomainUsage {
            id: 1,
            domain: "a.io".into(),
            mailbox_count: 1,
            storage_used_gb: 75.0,
            storage_quota_gb: 200.0,
        };
        assert_eq!(usage.usage_percent(), 37.5);
        usage.storage_quota_gb = 0.0;
        assert_eq!(usage.usage_percent(), 0.0);
    }

    #[test]
    fn unlimited_quota_is_a_text_cell() {
        let mailbox = Mailbox {
            id: 1,
            email: "a@b.c".into(),
            domain: "b.c".into(),
            quota: Quota::Unlimited,
            storage_used_gb: 0.0,
            status: AccountStatus::Active,
            last_login: None,
            owner: None,
        };
        assert_eq!(mailbox.value("quota"), Some(CellValue::from("unlimited")));
        assert_eq!(mailbox.value("last_login"), None);
        assert_eq!(mailbox.value("owner"), None);
    }
}
