use crate::commands::helpers::{find_index, find_indexes, next_id, required, valid_email};
use crate::commands::{CmdMessage, CmdResult, Confirm, Listing, Summary};
use crate::error::{MailAdmError, Result};
use crate::model::{AccountStatus, Choice, Role, User};
use crate::selector::Selector;
use crate::store::DataStore;
use crate::table::{self, ColumnDef, FilterConfig, FilterOption, TableQuery};
use chrono::Utc;
use serde::Serialize;

pub fn columns() -> Vec<ColumnDef<User>> {
    vec![
        ColumnDef::new("name", "Name"),
        ColumnDef::new("email", "Email"),
        ColumnDef::new("role", "Role"),
        ColumnDef::new("status", "Status"),
        ColumnDef::new("joined", "Date Joined").not_searchable(),
    ]
}

pub fn filter_config() -> FilterConfig {
    FilterConfig::new()
        .column(
            "role",
            Role::ALL.iter().map(|r| FilterOption::plain(r.label())).collect(),
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
        "listing users"
    );

    let options = filter_config().with_counts(&data.users);
    let columns = columns();
    let view = table::apply(data.users, &columns, query);
    let listing = Listing::from_view("Users", &view, &columns, "No users found.");

    Ok(CmdResult::default()
        .with_listing(listing)
        .with_filter_options(options))
}

fn ensure_unique_email(users: &[User], email: &str, except: Option<u64>) -> Result<()> {
    let taken = users
        .iter()
        .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email));
    if taken {
        return Err(MailAdmError::Validation(format!(
            "A user with email '{}' already exists",
            email
        )));
    }
    Ok(())
}

/// New users always start Active.
pub fn create<S: DataStore>(
    store: &mut S,
    name: &str,
    email: &str,
    role: Role,
) -> Result<CmdResult> {
    let name = required(name, "Name")?;
    let email = valid_email(email)?;

    let mut data = store.load()?;
    ensure_unique_email(&data.users, &email, None)?;

    let user = User {
        id: next_id(&data.users),
        name,
        email,
        role,
        status: AccountStatus::Active,
        joined: Utc::now().date_naive(),
    };
    let id = user.id;
    let message = format!("Invited {} <{}> as {}", user.name, user.email, user.role);
    data.users.push(user);
    store.save(&data)?;
    tracing::info!(id, "user created");

    let mut result = CmdResult::default().with_affected_ids(vec![id]);
    result.add_message(CmdMessage::success(message));
    Ok(result)
}

/// Changes to apply to an existing user. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

pub fn update<S: DataStore>(
    store: &mut S,
    selector: &Selector,
    update: UserUpdate,
) -> Result<CmdResult> {
    let mut data = store.load()?;
    let idx = find_index(&data.users, selector)?;
    let id = data.users[idx].id;

    let name = update.name.as_deref().map(|n| required(n, "Name")).transpose()?;
    let email = update.email.as_deref().map(valid_email).transpose()?;
    if let Some(email) = &email {
        ensure_unique_email(&data.users, email, Some(id))?;
    }

    let user = &mut data.users[idx];
    let mut changed = Vec::new();
    if let Some(name) = name {
        user.name = name;
        changed.push("name");
    }
    if let Some(email) = email {
        user.email = email;
        changed.push("email");
    }
    if let Some(role) = update.role {
        user.role = role;
        changed.push("role");
    }

    let mut result = CmdResult::default();
    if changed.is_empty() {
        result.add_message(CmdMessage::warning("Nothing to update."));
        return Ok(result);
    }

    result.add_message(CmdMessage::success(format!(
        "Updated {} for {}",
        changed.join(", "),
        user.email
    )));
    result.affected_ids.push(id);
    store.save(&data)?;
    tracing::info!(id, "user updated");
    Ok(result)
}

pub fn delete<S: DataStore>(
    store: &mut S,
    selectors: &[Selector],
    confirm: Confirm<'_>,
) -> Result<CmdResult> {
    let mut data = store.load()?;
    let indexes = find_indexes(&data.users, selectors)?;
    let labels: Vec<String> = indexes
        .iter()
        .map(|&i| format!("{} <{}>", data.users[i].name, data.users[i].email))
        .collect();

    if !confirm(&labels) {
        return Ok(CmdResult::cancelled());
    }

    let ids: Vec<u64> = indexes.iter().map(|&i| data.users[i].id).collect();
    data.users.retain(|u| !ids.contains(&u.id));
    store.save(&data)?;
    tracing::info!(count = ids.len(), "users deleted");

    let mut result = CmdResult::default().with_affected_ids(ids);
    for label in labels {
        result.add_message(CmdMessage::success(format!("Removed {}", label)));
    }
    Ok(result)
}

pub fn toggle<S: DataStore>(store: &mut S, selectors: &[Selector]) -> Result<CmdResult> {
    let mut data = store.load()?;
    let indexes = find_indexes(&data.users, selectors)?;

    let mut result = CmdResult::default();
    for &i in &indexes {
        let user = &mut data.users[i];
        user.status = user.status.toggled();
        result.add_message(CmdMessage::success(format!(
            "{} is now {}",
            user.name, user.status
        )));
        result.affected_ids.push(user.id);
    }

    store.save(&data)?;
    tracing::info!(count = indexes.len(), "user status toggled");
    Ok(result)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total: usize,
    pub admins: usize,
    pub members: usize,
    pub suspended: usize,
}

/// Owners are counted in the total only.
pub fn stats_of(users: &[User]) -> UserStats {
    let mut stats = UserStats {
        total: users.len(),
        ..Default::default()
    };
    for user in users {
        match user.role {
            Role::Admin => stats.admins += 1,
            Role::Member => stats.members += 1,
            Role::Owner => {}
        }
        if user.status == AccountStatus::Suspended {
            stats.suspended += 1;
        }
    }
    stats
}

pub fn stats<S: DataStore>(store: &S) -> Result<CmdResult> {
    let data = store.load()?;
    let stats = stats_of(&data.users);
    Ok(CmdResult::default().with_summary(
        Summary::new("Users")
            .entry("Total Users", stats.total)
            .entry("Admins", stats.admins)
            .entry("Members", stats.members)
            .entry("Suspended", stats.suspended),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn filter_by_role() {
        let store = StoreFixture::seeded().store;
        let result = list(&store, &TableQuery::new().filter("role", "member")).unwrap();
        assert_eq!(result.listings[0].ids, vec![3, 4]);
    }

    #[test]
    fn create_is_always_active() {
        let mut store = StoreFixture::default().store;
        create(&mut store, "Ana", "ana@acme.io", Role::Admin).unwrap();
        let data = store.load().unwrap();
        assert_eq!(data.users[0].id, 1);
        assert_eq!(data.users[0].status, AccountStatus::Active);
    }

    #[test]
    fn create_validates() {
        let mut store = StoreFixture::seeded().store;
        assert!(create(&mut store, " ", "x@y.io", Role::Member).is_err());
        assert!(create(&mut store, "X", "not-an-email", Role::Member).is_err());
        assert!(create(&mut store, "X", "JANE.SMITH@kerjamail.co", Role::Member).is_err());
    }

    #[test]
    fn update_changes_only_given_fields() {
        let mut store = StoreFixture::seeded().store;
        let update_role = UserUpdate {
            role: Some(Role::Admin),
            ..Default::default()
        };
        update(&mut store, &Selector::Key("mike.j@kerjamail.co".into()), update_role).unwrap();

        let user = &store.load().unwrap().users[2];
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.name, "Mike Johnson");
    }

    #[test]
    fn update_may_keep_own_email() {
        let mut store = StoreFixture::seeded().store;
        let same_email = UserUpdate {
            email: Some("Jane.Smith@kerjamail.co".into()),
            ..Default::default()
        };
        assert!(update(&mut store, &Selector::Id(2), same_email).is_ok());

        let taken = UserUpdate {
            email: Some("mike.j@kerjamail.co".into()),
            ..Default::default()
        };
        assert!(update(&mut store, &Selector::Id(2), taken).is_err());
    }

    #[test]
    fn empty_update_warns() {
        let mut store = StoreFixture::seeded().store;
        let result = update(&mut store, &Selector::Id(1), UserUpdate::default()).unwrap();
        assert_eq!(result.messages[0].content, "Nothing to update.");
        assert!(result.affected_ids.is_empty());
    }

    #[test]
    fn delete_and_toggle() {
        let mut store = StoreFixture::seeded().store;
        let mut yes = |_: &[String]| true;
        delete(&mut store, &[Selector::Id(4)], &mut yes).unwrap();
        toggle(&mut store, &[Selector::Id(3)]).unwrap();

        let data = store.load().unwrap();
        assert_eq!(data.users.len(), 3);
        assert_eq!(data.users[2].status, AccountStatus::Suspended);
    }

    #[test]
    fn stats_by_role_and_status() {
        let store = StoreFixture::seeded().store;
        assert_eq!(
            stats_of(&store.load().unwrap().users),
            UserStats {
                total: 4,
                admins: 1,
                members: 2,
                suspended: 1
            }
        );
    }
}
