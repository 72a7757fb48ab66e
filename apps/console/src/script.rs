use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use shared::{domain::Message, protocol::Intent};

/// One line of a replay script. Steps are plain JSON objects:
/// `{"wait_ms": 500}`, `{"append": {...message...}}` or an intent such as
/// `{"type": "tap_like", "payload": {"message_id": "3"}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    Wait { wait_ms: u64 },
    Append { append: Message },
    Intent(Intent),
}

pub fn load_script(path: &Path) -> Result<Vec<ScriptStep>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read script '{}'", path.display()))?;
    parse_script(&raw).with_context(|| format!("invalid script '{}'", path.display()))
}

pub fn parse_script(raw: &str) -> Result<Vec<ScriptStep>> {
    Ok(serde_json::from_str(raw)?)
}
