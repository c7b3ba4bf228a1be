use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::links;
use crate::scripts;

pub const STATE_FILE: &str = "tdl_easy_runner.json";
const MAX_RETRIES: u32 = 1;
const DEFAULT_RANGE_SPAN: u32 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "field", rename_all = "camelCase")]
pub enum CountField {
    StartId,
    EndId { start: u32 },
    DownloadLimit,
    Threads,
}

impl CountField {
    pub fn min(self) -> u32 {
        match self {
            Self::StartId | Self::DownloadLimit | Self::Threads => 1,
            Self::EndId { start } => start,
        }
    }

    pub fn max(self) -> Option<u32> {
        match self {
            Self::StartId | Self::EndId { .. } => None,
            Self::DownloadLimit => Some(10),
            Self::Threads => Some(8),
        }
    }

    pub fn default_value(self) -> u32 {
        match self {
            Self::StartId => 1,
            Self::EndId { start } => start.saturating_add(DEFAULT_RANGE_SPAN),
            Self::DownloadLimit => 2,
            Self::Threads => 4,
        }
    }

    /// Parses dialog input. Blank input takes the default.
    pub fn parse(self, raw: &str) -> Result<u32, InputError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(self.default_value());
        }
        let value: i64 = raw
            .parse()
            .map_err(|_| InputError::NotANumber(raw.to_string()))?;
        self.check(value)
    }

    pub fn check(self, value: i64) -> Result<u32, InputError> {
        let min = self.min();
        if value < i64::from(min) {
            return Err(InputError::BelowMin { value, min });
        }
        if let Some(max) = self.max() {
            if value > i64::from(max) {
                return Err(InputError::AboveMax { value, max });
            }
        }
        u32::try_from(value).map_err(|_| InputError::AboveMax {
            value,
            max: u32::MAX,
        })
    }
}

pub fn resolve_path(raw: &str, default: &Path) -> Result<PathBuf, InputError> {
    let raw = raw.trim();
    let path = if raw.is_empty() {
        default.to_path_buf()
    } else {
        PathBuf::from(raw)
    };
    if path.exists() {
        Ok(path)
    } else {
        Err(InputError::PathNotFound(path.display().to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeRequest {
    pub tdl_path: String,
    pub media_dir: String,
    pub base_link: String,
    pub start_id: i64,
    pub end_id: i64,
    pub download_limit: i64,
    pub threads: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullChatRequest {
    pub tdl_path: String,
    pub media_dir: String,
    pub message_link: String,
    pub download_limit: i64,
    pub threads: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeTask {
    #[serde(rename = "tdl_path")]
    pub tdl_path: String,
    pub telegram_url: String,
    pub media_dir: String,
    pub start_id: u32,
    pub end_id: u32,
    pub download_limit: u32,
    pub threads: u32,
    pub max_retries: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullChatTask {
    #[serde(rename = "tdl_path")]
    pub tdl_path: String,
    pub telegram_message_url: String,
    pub media_dir: String,
    pub download_limit: u32,
    pub threads: u32,
    pub max_retries: u32,
}

impl RangeRequest {
    pub fn validate(&self, launcher_dir: &Path) -> Result<RangeTask, InputError> {
        let tdl_path = resolve_path(&self.tdl_path, launcher_dir)?;
        let media_dir = resolve_path(&self.media_dir, launcher_dir)?;
        let telegram_url = links::normalize_base_link(&self.base_link)?;
        let start_id = CountField::StartId.check(self.start_id)?;
        let end_id = CountField::EndId { start: start_id }.check(self.end_id)?;
        Ok(RangeTask {
            tdl_path: tdl_path.display().to_string(),
            telegram_url,
            media_dir: media_dir.display().to_string(),
            start_id,
            end_id,
            download_limit: CountField::DownloadLimit.check(self.download_limit)?,
            threads: CountField::Threads.check(self.threads)?,
            max_retries: MAX_RETRIES,
        })
    }
}

impl FullChatRequest {
    pub fn validate(&self, launcher_dir: &Path) -> Result<FullChatTask, InputError> {
        let tdl_path = resolve_path(&self.tdl_path, launcher_dir)?;
        let media_dir = resolve_path(&self.media_dir, launcher_dir)?;
        Ok(FullChatTask {
            tdl_path: tdl_path.display().to_string(),
            telegram_message_url: links::check_message_link(&self.message_link)?,
            media_dir: media_dir.display().to_string(),
            download_limit: CountField::DownloadLimit.check(self.download_limit)?,
            threads: CountField::Threads.check(self.threads)?,
            max_retries: MAX_RETRIES,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskKind {
    Range,
    FullChat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SavedTask {
    Range(RangeTask),
    FullChat(FullChatTask),
}

impl SavedTask {
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::Range(_) => TaskKind::Range,
            Self::FullChat(_) => TaskKind::FullChat,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Self::Range(task) => format!(
                "{} [{}..{}] -> {}",
                task.telegram_url, task.start_id, task.end_id, task.media_dir
            ),
            Self::FullChat(task) => {
                format!("{} -> {}", task.telegram_message_url, task.media_dir)
            }
        }
    }
}

pub fn state_path(launcher_dir: &Path) -> PathBuf {
    launcher_dir.join(STATE_FILE)
}

pub fn write_state(launcher_dir: &Path, task: &SavedTask) -> Result<PathBuf> {
    let path = state_path(launcher_dir);
    let json = serde_json::to_string_pretty(task).context("Failed to serialize task state")?;
    fs::write(&path, json)
        .with_context(|| format!("Failed to write state file {}", path.display()))?;
    tracing::info!("Wrote task state to {}", path.display());
    Ok(path)
}

pub fn load_state(launcher_dir: &Path) -> Option<SavedTask> {
    let path = state_path(launcher_dir);
    if !path.exists() {
        return None;
    }
    let raw = match fs::read(&path) {
        Ok(bytes) => scripts::decode_script(&bytes),
        Err(e) => {
            tracing::warn!("Failed to read state file {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(task) => Some(task),
        Err(e) => {
            tracing::warn!("Ignoring unrecognised state file {}: {}", path.display(), e);
            None
        }
    }
}
