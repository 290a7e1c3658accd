//! Storage for player progress and word reports.
//!
//! Everything goes through [`DocumentStore`], a plain collection/key →
//! JSON document map. Writes merge top-level fields into what is already
//! stored.

use anyhow::{Context, Result};
use chrono::Local;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::models::{Report, ReportStatus, UserData, WordEntry};

pub const USERS: &str = "users";
pub const REPORTS: &str = "reports";

/// Document key for players who have not given a name.
pub const GUEST_KEY: &str = "guest";

/// Shown as the reporter for guest reports.
pub const GUEST_REPORTER: &str = "Invitado";

/// A key → document map grouped in collections.
pub trait DocumentStore {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Value>>;

    /// Merge `doc`'s top-level fields into the stored document.
    fn set(&self, collection: &str, key: &str, doc: &Value) -> Result<()>;

    fn list(&self, collection: &str) -> Result<Vec<(String, Value)>>;
}

fn merge(existing: Option<Value>, doc: &Value) -> Value {
    match (existing, doc) {
        (Some(Value::Object(mut current)), Value::Object(update)) => {
            for (field, value) in update {
                current.insert(field.clone(), value.clone());
            }
            Value::Object(current)
        }
        _ => doc.clone(),
    }
}

/// One pretty-printed JSON file per document.
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create data directory: {:?}", root))?;
        Ok(Self { root })
    }

    /// Get default storage location.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pasapalabra")
    }

    fn doc_path(&self, collection: &str, key: &str) -> PathBuf {
        self.root
            .join(collection)
            .join(format!("{}.json", sanitize_key(key)))
    }
}

fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

impl DocumentStore for FileDocumentStore {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let path = self.doc_path(collection, key);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read document: {:?}", path))?;
        let doc = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse document: {:?}", path))?;
        Ok(Some(doc))
    }

    fn set(&self, collection: &str, key: &str, doc: &Value) -> Result<()> {
        let path = self.doc_path(collection, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create collection directory: {:?}", parent))?;
        }
        let merged = merge(self.get(collection, key)?, doc);
        let json = serde_json::to_string_pretty(&merged)?;
        fs::write(&path, json).with_context(|| format!("Failed to write document: {:?}", path))?;
        Ok(())
    }

    fn list(&self, collection: &str) -> Result<Vec<(String, Value)>> {
        let dir = self.root.join(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut docs = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().map_or(true, |e| e != "json") {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|json| serde_json::from_str(&json).map_err(anyhow::Error::from))
            {
                Ok(doc) => docs.push((key.to_string(), doc)),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable document"),
            }
        }

        docs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(docs)
    }
}

/// Progress and report access on top of a document store.
pub struct GameStorage {
    store: Box<dyn DocumentStore>,
}

impl GameStorage {
    pub fn new(store: Box<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn open(root: PathBuf) -> Result<Self> {
        Ok(Self::new(Box::new(FileDocumentStore::new(root)?)))
    }

    fn user_key(user: Option<&str>) -> &str {
        user.unwrap_or(GUEST_KEY)
    }

    /// Load a player's progress, starting fresh when none is stored.
    pub fn load_user(&self, user: Option<&str>) -> Result<UserData> {
        let key = Self::user_key(user);
        let data = match self.store.get(USERS, key)? {
            Some(doc) => serde_json::from_value(doc)
                .with_context(|| format!("Failed to parse progress for {}", key))?,
            None => UserData::default(),
        };
        info!(user = key, words = data.progress.len(), "progress loaded");
        Ok(data)
    }

    pub fn save_user(&self, user: Option<&str>, data: &mut UserData) -> Result<()> {
        data.last_updated = Some(Local::now());
        let doc = serde_json::to_value(&*data)?;
        self.store.set(USERS, Self::user_key(user), &doc)
    }

    /// Wipe progress and personal best.
    pub fn reset_user(&self, user: Option<&str>, data: &mut UserData) -> Result<()> {
        data.reset();
        info!(user = Self::user_key(user), "progress reset");
        self.save_user(user, data)
    }

    /// File a report against a word. Returns the report id.
    pub fn submit_report(&self, word: &WordEntry, issue: &str, user: Option<&str>) -> Result<String> {
        let now = Local::now();
        let id = format!("{}_{}", word.id, now.timestamp_millis());
        let report = Report {
            word_id: word.id.clone(),
            word: word.word.clone(),
            issue: issue.trim().to_string(),
            reported_by: user.unwrap_or(GUEST_REPORTER).to_string(),
            timestamp: now,
            status: ReportStatus::Pending,
            resolved_by: None,
            resolved_at: None,
        };
        self.store.set(REPORTS, &id, &serde_json::to_value(&report)?)?;
        info!(report = %id, word = %word.word, "report submitted");
        Ok(id)
    }

    /// Pending reports, oldest first.
    pub fn pending_reports(&self) -> Result<Vec<(String, Report)>> {
        let mut reports: Vec<(String, Report)> = self
            .store
            .list(REPORTS)?
            .into_iter()
            .filter_map(|(id, doc)| match serde_json::from_value::<Report>(doc) {
                Ok(report) => Some((id, report)),
                Err(e) => {
                    warn!(report = %id, error = %e, "skipping malformed report");
                    None
                }
            })
            .filter(|(_, report)| report.status == ReportStatus::Pending)
            .collect();
        reports.sort_by(|a, b| a.1.timestamp.cmp(&b.1.timestamp));
        Ok(reports)
    }

    /// Ids of words with a pending report; these sit out of play.
    pub fn pending_word_ids(&self) -> Result<HashSet<String>> {
        Ok(self
            .pending_reports()?
            .into_iter()
            .map(|(_, report)| report.word_id)
            .collect())
    }

    pub fn resolve_report(&self, report_id: &str, resolver: &str) -> Result<()> {
        let update = json!({
            "status": ReportStatus::Resolved,
            "resolvedBy": resolver,
            "resolvedAt": Local::now(),
        });
        self.store.set(REPORTS, report_id, &update)?;
        info!(report = %report_id, "report resolved");
        Ok(())
    }
}
