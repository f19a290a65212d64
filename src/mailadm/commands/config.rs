use crate::commands::{CmdMessage, CmdResult, Summary};
use crate::config::MailAdmConfig;
use crate::error::{MailAdmError, Result};
use std::path::Path;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

pub fn run(dir: &Path, action: ConfigAction) -> Result<CmdResult> {
    match action {
        ConfigAction::ShowAll => {
            let config = MailAdmConfig::load(dir)?;
            let summary = config
                .list_all()
                .into_iter()
                .fold(Summary::new("Configuration"), |s, (key, value)| {
                    s.entry(key, value)
                });
            Ok(CmdResult::default().with_summary(summary).with_config(config))
        }
        ConfigAction::ShowKey(key) => {
            let config = MailAdmConfig::load(dir)?;
            let val = config.get(&key).ok_or_else(|| {
                MailAdmError::Validation(format!("Unknown config key: {}", key))
            })?;
            let mut result = CmdResult::default();
            result.add_message(CmdMessage::info(val));
            Ok(result)
        }
        ConfigAction::Set(key, value) => {
            let mut config = MailAdmConfig::load(dir)?;
            config.set(&key, &value)?;
            config.save(dir)?;
            tracing::info!(key = %key, "config updated");

            let display_val = config.get(&key).unwrap_or(value);
            let mut result = CmdResult::default().with_config(config);
            result.add_message(CmdMessage::success(format!(
                "{} set to {}",
                key, display_val
            )));
            Ok(result)
        }
    }
}
