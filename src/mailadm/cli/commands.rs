//! # CLI Layer
//!
//! This module is **one possible client** for mailadm, not the application.
//! It is the only place that:
//! - parses arguments (via clap, see `setup.rs`)
//! - reads stdin for confirmations
//! - writes to stdout/stderr
//!
//! ## Structure
//!
//! - `run()`: main dispatch, called by `main.rs`
//! - `init_context()`: resolves the data directory and builds the API
//! - `handle_*()`: per-command handlers that call the API and print the result
//!
//! Every handler ends in [`emit`], which prints either the rendered text or,
//! with `--json`, the serialized `CmdResult`.

use super::render::{print_messages, render_result};
use super::setup::{
    BroadcastCommands, Cli, Commands, DomainCommands, ListArgs, MailboxCommands, ReportCommands,
    UserCommands,
};
use clap::Parser;
use directories::ProjectDirs;
use mailadm::api::{CmdMessage, ConfigAction, MailAdmApi};
use mailadm::commands::users::UserUpdate;
use mailadm::commands::CmdResult;
use mailadm::config::MailAdmConfig;
use mailadm::error::{MailAdmError, Result};
use mailadm::store::fs::FileStore;
use mailadm::table::{SortDirection, SortSpec, TableQuery};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

struct AppContext {
    api: MailAdmApi<FileStore>,
    json: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if cli.no_color {
        console::set_colors_enabled(false);
        colored::control::set_override(false);
    }

    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Domains(cmd)) => handle_domains(&mut ctx, cmd),
        Some(Commands::Mailboxes(cmd)) => handle_mailboxes(&mut ctx, cmd),
        Some(Commands::Users(cmd)) => handle_users(&mut ctx, cmd),
        Some(Commands::Broadcasts(cmd)) => handle_broadcasts(&mut ctx, cmd),
        Some(Commands::Reports(cmd)) => handle_reports(&mut ctx, cmd),
        Some(Commands::Dashboard) | None => {
            let result = ctx.api.dashboard()?;
            emit(&ctx, &result)
        }
        Some(Commands::Init) => {
            let result = ctx.api.init()?;
            emit(&ctx, &result)
        }
        Some(Commands::Reset { yes }) => {
            let mut confirm = confirm_with(yes, "replace");
            let result = ctx.api.reset(&mut confirm)?;
            emit(&ctx, &result)
        }
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("mailadm=debug")
    } else {
        EnvFilter::new("mailadm=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = resolve_data_dir(cli.data_dir.as_deref())?;
    tracing::debug!(data_dir = %data_dir.display(), "using data directory");

    let config = MailAdmConfig::load(&data_dir)?;
    let store = FileStore::new(&data_dir);
    Ok(AppContext {
        api: MailAdmApi::new(store, config, data_dir),
        json: cli.json,
    })
}

fn resolve_data_dir(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }
    ProjectDirs::from("com", "mailadm", "mailadm")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            MailAdmError::Store("Could not determine a data directory, use --data-dir".to_string())
        })
}

fn emit(ctx: &AppContext, result: &CmdResult) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print!("{}", render_result(result));
    }
    Ok(())
}

/// Builds a table query from list flags. `--page` is 1-based on the command line.
fn build_query(args: ListArgs, default_page_size: usize) -> Result<TableQuery> {
    let mut query = TableQuery::new();
    if let Some(term) = args.search {
        query = query.search(term);
    }

    for filter in &args.filters {
        let (column, value) = filter.split_once('=').ok_or_else(|| {
            MailAdmError::Validation(format!(
                "Filter must look like column=value, got '{}'",
                filter
            ))
        })?;
        query = query.filter(column.trim(), value.trim());
    }

    if let Some(sort) = args.sort {
        let mut spec: SortSpec = sort.parse().map_err(MailAdmError::Validation)?;
        if args.desc {
            spec.direction = SortDirection::Desc;
        }
        query = query.sort(spec);
    }

    let size = args.page_size.unwrap_or(default_page_size);
    Ok(query.page(args.page.saturating_sub(1), size))
}

/// Asks on stdin before a destructive change. Anything but y/yes declines.
fn confirm_with(skip: bool, verb: &'static str) -> impl FnMut(&[String]) -> bool {
    move |labels: &[String]| {
        if skip {
            return true;
        }
        eprintln!("This will {}:", verb);
        for label in labels {
            eprintln!("  {}", label);
        }
        eprint!("Continue? [y/N] ");
        let _ = std::io::stderr().flush();

        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

fn handle_domains(ctx: &mut AppContext, cmd: DomainCommands) -> Result<()> {
    let page_size = ctx.api.config().page_size;
    let result = match cmd {
        DomainCommands::List(args) => ctx.api.list_domains(&build_query(args, page_size)?)?,
        DomainCommands::Add { name } => ctx.api.create_domain(&name)?,
        DomainCommands::Remove { selectors, yes } => {
            let mut confirm = confirm_with(yes, "delete");
            ctx.api.delete_domains(&selectors, &mut confirm)?
        }
        DomainCommands::Toggle { selectors } => ctx.api.toggle_domains(&selectors)?,
        DomainCommands::Verify { selector } => {
            if !ctx.json {
                print_messages(&[CmdMessage::info(format!(
                    "Checking DNS records for {}...",
                    selector
                ))]);
            }
            ctx.api.verify_domain(&selector)?
        }
        DomainCommands::Dns { selector } => ctx.api.domain_dns(&selector)?,
        DomainCommands::Stats => ctx.api.domain_stats()?,
    };
    emit(ctx, &result)
}

fn handle_mailboxes(ctx: &mut AppContext, cmd: MailboxCommands) -> Result<()> {
    let page_size = ctx.api.config().page_size;
    let result = match cmd {
        MailboxCommands::List(args) => ctx.api.list_mailboxes(&build_query(args, page_size)?)?,
        MailboxCommands::Add {
            username,
            domain,
            quota,
        } => ctx.api.create_mailbox(&username, &domain, quota)?,
        MailboxCommands::Quota { selector, quota } => ctx.api.set_mailbox_quota(&selector, quota)?,
        MailboxCommands::Remove { selectors, yes } => {
            let mut confirm = confirm_with(yes, "delete");
            ctx.api.delete_mailboxes(&selectors, &mut confirm)?
        }
        MailboxCommands::Toggle { selectors } => ctx.api.toggle_mailboxes(&selectors)?,
        MailboxCommands::Stats => ctx.api.mailbox_stats()?,
    };
    emit(ctx, &result)
}

fn handle_users(ctx: &mut AppContext, cmd: UserCommands) -> Result<()> {
    let page_size = ctx.api.config().page_size;
    let result = match cmd {
        UserCommands::List(args) => ctx.api.list_users(&build_query(args, page_size)?)?,
        UserCommands::Add { name, email, role } => ctx.api.create_user(&name, &email, role)?,
        UserCommands::Edit {
            selector,
            name,
            email,
            role,
        } => ctx
            .api
            .update_user(&selector, UserUpdate { name, email, role })?,
        UserCommands::Remove { selectors, yes } => {
            let mut confirm = confirm_with(yes, "remove");
            ctx.api.delete_users(&selectors, &mut confirm)?
        }
        UserCommands::Toggle { selectors } => ctx.api.toggle_users(&selectors)?,
        UserCommands::Stats => ctx.api.user_stats()?,
    };
    emit(ctx, &result)
}

fn handle_broadcasts(ctx: &mut AppContext, cmd: BroadcastCommands) -> Result<()> {
    let page_size = ctx.api.config().page_size;
    let result = match cmd {
        BroadcastCommands::List(args) => ctx.api.list_broadcasts(&build_query(args, page_size)?)?,
        BroadcastCommands::Add { name, status } => ctx.api.create_broadcast(&name, status)?,
        BroadcastCommands::Edit {
            selector,
            name,
            status,
        } => ctx
            .api
            .update_broadcast(&selector, name.as_deref(), status)?,
        BroadcastCommands::Remove { selectors, yes } => {
            let mut confirm = confirm_with(yes, "delete");
            ctx.api.delete_broadcasts(&selectors, &mut confirm)?
        }
    };
    emit(ctx, &result)
}

fn handle_reports(ctx: &mut AppContext, cmd: ReportCommands) -> Result<()> {
    let page_size = ctx.api.config().page_size;
    let result = match cmd {
        ReportCommands::Summary => ctx.api.report_summary()?,
        ReportCommands::Usage(args) => ctx.api.usage_report(&build_query(args, page_size)?)?,
        ReportCommands::Top(args) => ctx.api.top_users(&build_query(args, page_size)?)?,
        ReportCommands::Activity(args) => ctx.api.activity_log(&build_query(args, page_size)?)?,
        ReportCommands::Export { output } => return handle_export(ctx, output),
    };
    emit(ctx, &result)
}

fn handle_export(ctx: &mut AppContext, output: Option<PathBuf>) -> Result<()> {
    let result = ctx.api.export_report()?;
    let Some(export) = result.export else {
        return Ok(());
    };
    let content = serde_json::to_string_pretty(&export)?;

    match output {
        Some(path) => {
            std::fs::write(&path, content)?;
            tracing::info!(path = %path.display(), "report written");
            let mut done = CmdResult::default();
            done.add_message(CmdMessage::success(format!(
                "Report exported to {}",
                path.display()
            )));
            emit(ctx, &done)
        }
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };
    let result = ctx.api.config_action(action)?;
    emit(ctx, &result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ListArgs {
        ListArgs {
            page: 1,
            ..ListArgs::default()
        }
    }

    #[test]
    fn default_query_uses_configured_page_size() {
        let query = build_query(args(), 10).unwrap();
        assert_eq!(query, TableQuery::new().page(0, 10));
    }

    #[test]
    fn flags_map_onto_query() {
        let query = build_query(
            ListArgs {
                search: Some("kerja".into()),
                filters: vec!["status=Active".into(), "status = Suspended".into()],
                sort: Some("expiry".into()),
                desc: true,
                page: 3,
                page_size: Some(5),
            },
            10,
        )
        .unwrap();

        let expected = TableQuery::new()
            .search("kerja")
            .filter("status", "Active")
            .filter("status", "Suspended")
            .sort(SortSpec::desc("expiry"))
            .page(2, 5);
        assert_eq!(query, expected);
    }

    #[test]
    fn dash_prefix_sorts_descending() {
        let query = build_query(
            ListArgs {
                sort: Some("-used".into()),
                ..args()
            },
            10,
        )
        .unwrap();
        assert_eq!(query.sort, Some(SortSpec::desc("used")));
    }

    #[test]
    fn malformed_filter_is_rejected() {
        let err = build_query(
            ListArgs {
                filters: vec!["status".into()],
                ..args()
            },
            10,
        )
        .unwrap_err();
        assert!(matches!(err, MailAdmError::Validation(_)));
    }

    #[test]
    fn page_zero_is_first_page() {
        let query = build_query(ListArgs { page: 0, ..args() }, 10).unwrap();
        assert_eq!(query.page.map(|p| p.index), Some(0));
    }

    #[test]
    fn confirmation_skipped_with_yes() {
        let mut confirm = confirm_with(true, "delete");
        assert!(confirm(&["example.com".to_string()][..]));
    }

    #[test]
    fn explicit_data_dir_wins() {
        let dir = resolve_data_dir(Some(Path::new("/tmp/mailadm-test"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/mailadm-test"));
    }
}
