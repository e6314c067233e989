//! Flat-file persistence: one JSON file per chat, a recent-model list and a per-day
//! newline-delimited request log.
//!
//! Layout under the store root:
//!
//! ```text
//! chats/<YYYY-MM-DD>-<title>-<suffix>.json
//! recent-models.json
//! chat-<YYYY-MM-DD>.json      (one JSON record per line)
//! ```

use crate::chat::Chat;
use crate::error::StoreError;
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

const CHATS_DIR: &str = "chats";
const RECENT_MODELS_FILE: &str = "recent-models.json";
const MAX_RECENT_MODELS: usize = 10;
const TITLE_CHARS: usize = 50;
const ID_SUFFIX_CHARS: usize = 8;
pub const DEFAULT_LOG_TAIL: usize = 20;

/// Which stored chat to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRef {
    File(String),
    Id(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Request,
    Response,
    Error,
}

/// One line of the daily request log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: LogKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_flow: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LogRecord {
    pub fn request(model: &str, prompt: &str, has_flow: bool) -> Self {
        Self {
            model: Some(model.to_string()),
            prompt: Some(prompt.to_string()),
            has_flow: Some(has_flow),
            ..Self::empty(LogKind::Request)
        }
    }

    pub fn response(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            ..Self::empty(LogKind::Response)
        }
    }

    pub fn error(error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::empty(LogKind::Error)
        }
    }

    fn empty(kind: LogKind) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            model: None,
            prompt: None,
            has_flow: None,
            response: None,
            error: None,
        }
    }
}

/// File name for a chat: date, sanitized title and the tail of the id.
pub fn chat_file_name(chat: &Chat, date: DateTime<Utc>) -> String {
    let title: String = chat
        .title
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '-',
            other => other,
        })
        .take(TITLE_CHARS)
        .collect();
    let chars: Vec<char> = chat.id.chars().collect();
    let suffix: String = chars[chars.len().saturating_sub(ID_SUFFIX_CHARS)..]
        .iter()
        .collect();
    format!("{}-{}-{}.json", date.format("%Y-%m-%d"), title, suffix)
}

pub struct ChatStore {
    root: PathBuf,
}

impl ChatStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let chats = root.join(CHATS_DIR);
        fs::create_dir_all(&chats).map_err(|e| io_error(&chats, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn chats_dir(&self) -> PathBuf {
        self.root.join(CHATS_DIR)
    }

    /// Writes the chat to its file. Chats without messages are not written.
    /// A previous file of the same chat under another name is removed.
    pub fn save(&self, chat: &mut Chat) -> Result<Option<PathBuf>, StoreError> {
        if chat.messages.is_empty() {
            return Ok(None);
        }
        let name = chat_file_name(chat, Utc::now());
        let path = self.chats_dir().join(&name);
        let json = serde_json::to_string_pretty(chat).map_err(|e| json_error(&path, e))?;
        fs::write(&path, json).map_err(|e| io_error(&path, e))?;

        if let Some(previous) = chat.file.replace(name.clone()) {
            if previous != name {
                let stale = self.chats_dir().join(&previous);
                if let Err(e) = fs::remove_file(&stale) {
                    warn!(file = %stale.display(), error = %e, "could not remove stale chat file");
                }
            }
        }
        Ok(Some(path))
    }

    /// Loads every stored chat, keyed by chat id. Unreadable files are skipped.
    pub fn load_all(&self) -> Result<AHashMap<String, Chat>, StoreError> {
        let dir = self.chats_dir();
        let mut chats = AHashMap::new();
        if !dir.exists() {
            return Ok(chats);
        }
        for (name, path) in self.chat_files()? {
            match read_chat(&path) {
                Ok(mut chat) => {
                    chat.file = Some(name);
                    chats.insert(chat.id.clone(), chat);
                }
                Err(e) => warn!(file = %path.display(), error = %e, "skipping unreadable chat file"),
            }
        }
        Ok(chats)
    }

    pub fn delete(&self, chat: &ChatRef) -> Result<PathBuf, StoreError> {
        let path = match chat {
            ChatRef::File(name) => {
                if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
                    return Err(StoreError::InvalidFileName(name.clone()));
                }
                self.chats_dir().join(name)
            }
            ChatRef::Id(id) => self
                .chat_files()?
                .into_iter()
                .map(|(_, path)| path)
                .find(|path| read_chat(path).map(|c| &c.id == id).unwrap_or(false))
                .ok_or_else(|| StoreError::ChatNotFound(id.clone()))?,
        };
        fs::remove_file(&path).map_err(|e| io_error(&path, e))?;
        Ok(path)
    }

    fn chat_files(&self) -> Result<Vec<(String, PathBuf)>, StoreError> {
        let dir = self.chats_dir();
        let entries = fs::read_dir(&dir).map_err(|e| io_error(&dir, e))?;
        let mut files: Vec<(String, PathBuf)> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?.to_string();
                Some((name, path))
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// Moves `model` to the front of the recent list, keeping at most ten entries.
    pub fn remember_model(&self, model: &str) -> Result<Vec<String>, StoreError> {
        let mut models = self.recent_models().unwrap_or_else(|e| {
            warn!(error = %e, "recent model list unreadable, starting fresh");
            Vec::new()
        });
        models.retain(|m| m != model);
        models.insert(0, model.to_string());
        models.truncate(MAX_RECENT_MODELS);

        let path = self.root.join(RECENT_MODELS_FILE);
        let json = serde_json::to_string_pretty(&models).map_err(|e| json_error(&path, e))?;
        fs::write(&path, json).map_err(|e| io_error(&path, e))?;
        Ok(models)
    }

    pub fn recent_models(&self) -> Result<Vec<String>, StoreError> {
        let path = self.root.join(RECENT_MODELS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        serde_json::from_str(&content).map_err(|e| json_error(&path, e))
    }

    /// Appends a record to the log file of the record's day.
    pub fn append_log(&self, record: &LogRecord) -> Result<(), StoreError> {
        let path = self
            .root
            .join(format!("chat-{}.json", record.timestamp.format("%Y-%m-%d")));
        let mut line = serde_json::to_string(record).map_err(|e| json_error(&path, e))?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| io_error(&path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| io_error(&path, e))
    }

    /// The last `limit` parseable records of the newest log file.
    pub fn recent_log_entries(&self, limit: usize) -> Result<Vec<LogRecord>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|e| io_error(&self.root, e))?;
        let latest = entries
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| name.starts_with("chat-") && name.ends_with(".json"))
            .max();
        let Some(latest) = latest else {
            return Ok(Vec::new());
        };

        let path = self.root.join(latest);
        let content = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        let records: Vec<LogRecord> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();
        let skip = records.len().saturating_sub(limit);
        Ok(records.into_iter().skip(skip).collect())
    }
}

fn read_chat(path: &Path) -> Result<Chat, StoreError> {
    let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    serde_json::from_str(&content).map_err(|e| json_error(path, e))
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn json_error(path: &Path, source: serde_json::Error) -> StoreError {
    StoreError::Json {
        path: path.display().to_string(),
        source,
    }
}
