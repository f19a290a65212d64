use crate::commands::{CmdMessage, CmdResult, Confirm};
use crate::error::Result;
use crate::seed;
use crate::store::fs::FileStore;
use crate::store::DataStore;

/// Writes the sample dataset unless the data directory already holds one.
pub fn init(store: &mut FileStore) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if store.exists() {
        result.add_message(CmdMessage::info(format!(
            "Data already initialized at {}",
            store.root().display()
        )));
        return Ok(result);
    }

    store.save(&seed::dataset())?;
    tracing::info!(root = %store.root().display(), "data directory initialized");
    result.add_message(CmdMessage::success(format!(
        "Initialized mailadm data at {}",
        store.root().display()
    )));
    Ok(result)
}

/// Replaces every collection with the sample dataset.
pub fn reset<S: DataStore>(store: &mut S, confirm: Confirm<'_>) -> Result<CmdResult> {
    let labels = vec!["all domains, mailboxes, users, broadcasts and reports".to_string()];
    if !confirm(&labels) {
        return Ok(CmdResult::cancelled());
    }

    store.save(&seed::dataset())?;
    tracing::info!("dataset reset to sample data");
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success("Restored sample data."));
    Ok(result)
}
