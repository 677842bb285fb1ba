//! Portfolio document store.
//!
//! # Responsibility
//! - Own the single live document and be the only place it is mutated.
//! - Persist the full document to one storage slot after every mutation.
//! - Provide import/export of the document as a JSON file.
//!
//! # Invariants
//! - Loading never fails: a missing or unparsable slot yields the defaults.
//! - Repair runs once on load, before any caller can read the document.
//! - Mutations build the next document first and swap it in afterwards, so
//!   readers see either the old or the new document, never a mix.
//! - A failed persist keeps the in-memory document authoritative.
//!
//! # See also
//! - `model::path` for path semantics, `model::repair` for the repair rule.

use crate::logging::sanitize_message;
use crate::model::balance::{clamp_balance_value, Balance, BALANCE_MAX};
use crate::model::document::{
    to_value, EventRecord, Partner, Section, SkillFlag, MAX_EVENTS, MIN_EVENTS,
};
use crate::model::path::{get_path, set_path, DocPath, PathError};
use crate::model::repair::{needs_repair, repair_document};
use crate::repo::slot_repo::SlotRepository;
use chrono::NaiveDate;
use log::{debug, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const MAX_LOGGED_ERROR_CHARS: usize = 200;

/// Import failure surfaced to the user; the document stays unchanged.
#[derive(Debug)]
pub enum ImportError {
    Parse(serde_json::Error),
}

impl ImportError {
    /// Message shown in the UI alert.
    pub fn user_message(&self) -> &'static str {
        "Неверный JSON"
    }
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "import file is not valid JSON: {err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
        }
    }
}

/// Store-level error for rejected mutations.
#[derive(Debug)]
pub enum StoreError {
    Path(PathError),
    Import(ImportError),
    /// A list section already holds its maximum number of entries.
    ListFull { section: Section, max: usize },
    /// Removing would drop a list section below its minimum.
    ListMinimum { section: Section, min: usize },
    IndexOutOfRange { section: Section, index: usize, len: usize },
    /// The node at this path holds something else than a list.
    NotAList(DocPath),
    UnknownSkillFlag(String),
    Serialize(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(err) => write!(f, "{err}"),
            Self::Import(err) => write!(f, "{err}"),
            Self::ListFull { section, max } => {
                write!(f, "`{}` already holds {max} entries", section.as_key())
            }
            Self::ListMinimum { section, min } => {
                write!(f, "`{}` must keep at least {min} entries", section.as_key())
            }
            Self::IndexOutOfRange {
                section,
                index,
                len,
            } => write!(
                f,
                "index {index} is out of range for `{}` with {len} entries",
                section.as_key()
            ),
            Self::NotAList(path) => write!(f, "`{path}` is not a list"),
            Self::UnknownSkillFlag(flag) => {
                write!(f, "unknown skill flag `{flag}`; expected tried|mastered|want")
            }
            Self::Serialize(err) => write!(f, "failed to serialize document: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Path(err) => Some(err),
            Self::Import(err) => Some(err),
            Self::Serialize(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PathError> for StoreError {
    fn from(value: PathError) -> Self {
        Self::Path(value)
    }
}

impl From<ImportError> for StoreError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

/// Downloadable export of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// `skillhunter_YYYY-MM-DD.json`.
    pub file_name: String,
    /// Pretty-printed document.
    pub content: String,
}

/// Returns the export file name for `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("skillhunter_{}.json", date.format("%Y-%m-%d"))
}

fn check_index(section: Section, index: usize, len: usize) -> Result<(), StoreError> {
    if index >= len {
        return Err(StoreError::IndexOutOfRange {
            section,
            index,
            len,
        });
    }
    Ok(())
}

/// Parses import file text. No schema validation is applied.
pub fn parse_import(text: &str) -> Result<Value, ImportError> {
    serde_json::from_str(text).map_err(ImportError::Parse)
}

/// Single source of truth for the portfolio document.
pub struct PortfolioStore<R: SlotRepository> {
    repo: R,
    storage_key: String,
    defaults: Value,
    doc: Value,
    last_persist_error: Option<String>,
}

impl<R: SlotRepository> PortfolioStore<R> {
    /// Loads the document stored under `storage_key`, falling back to
    /// `defaults`, then applies the repair rule.
    ///
    /// # Side effects
    /// - Persists once when the repair changed the loaded document.
    pub fn open(repo: R, storage_key: impl Into<String>, defaults: Value) -> Self {
        let storage_key = storage_key.into();
        let loaded = load_or_default(&repo, &storage_key, &defaults);
        let mut store = Self {
            repo,
            storage_key,
            defaults,
            doc: Value::Null,
            last_persist_error: None,
        };

        if needs_repair(&loaded) {
            info!(
                "event=doc_repair module=store status=ok key={}",
                store.storage_key
            );
            store.commit(repair_document(loaded));
        } else {
            store.doc = loaded;
        }
        store
    }

    /// Re-reads the slot, as a fresh session would.
    pub fn reload(&mut self) {
        let loaded = load_or_default(&self.repo, &self.storage_key, &self.defaults);
        if needs_repair(&loaded) {
            self.commit(repair_document(loaded));
        } else {
            self.doc = loaded;
        }
    }

    pub fn document(&self) -> &Value {
        &self.doc
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Message of the most recent failed write, cleared by the next success.
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// Reads the node at `path`.
    pub fn get(&self, path: &DocPath) -> Option<&Value> {
        get_path(&self.doc, path)
    }

    /// Replaces the node at `path` and persists the document.
    pub fn set(&mut self, path: &DocPath, value: Value) -> Result<(), StoreError> {
        let next = set_path(&self.doc, path, value)?;
        debug!("event=doc_set module=store status=ok path_len={}", path.len());
        self.commit(next);
        Ok(())
    }

    /// Wholesale substitution of the document; no validation.
    pub fn replace(&mut self, doc: Value) {
        self.commit(doc);
    }

    /// Pretty-printed serialization of the document.
    pub fn snapshot(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(&self.doc).map_err(StoreError::Serialize)
    }

    /// Builds the export file for today's UTC date.
    pub fn export(&self) -> Result<ExportArtifact, StoreError> {
        self.export_on(chrono::Utc::now().date_naive())
    }

    pub fn export_on(&self, date: NaiveDate) -> Result<ExportArtifact, StoreError> {
        Ok(ExportArtifact {
            file_name: export_file_name(date),
            content: self.snapshot()?,
        })
    }

    /// Replaces the document with the parsed import file.
    ///
    /// On parse failure the document is left untouched.
    pub fn import_json(&mut self, text: &str) -> Result<(), ImportError> {
        match parse_import(text) {
            Ok(doc) => {
                info!(
                    "event=doc_import module=store status=ok bytes={}",
                    text.len()
                );
                self.replace(doc);
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=doc_import module=store status=error bytes={} error={}",
                    text.len(),
                    sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
                );
                Err(err)
            }
        }
    }

    /// Appends a blank event page.
    pub fn add_event(&mut self) -> Result<usize, StoreError> {
        self.push_entry(Section::Events, to_value(&EventRecord::blank()), Some(MAX_EVENTS))
    }

    /// Removes event `index`; later events shift down by one.
    pub fn remove_event(&mut self, index: usize) -> Result<(), StoreError> {
        self.remove_entry(Section::Events, index, MIN_EVENTS)
    }

    /// Appends a blank partner.
    pub fn add_partner(&mut self) -> Result<usize, StoreError> {
        self.push_entry(Section::Partners, to_value(&Partner::blank()), None)
    }

    /// Removes partner `index`; later partners shift down by one.
    pub fn remove_partner(&mut self, index: usize) -> Result<(), StoreError> {
        self.remove_entry(Section::Partners, index, 0)
    }

    /// Sets category `index` of the balance wheel to `raw`, clamped to
    /// `[0, BALANCE_MAX]`. Returns the stored value.
    ///
    /// When `balance.categories` is not a list, the edit applies to the
    /// default wheel and writes the whole `balance` section at once.
    pub fn set_balance_value(&mut self, index: usize, raw: f64) -> Result<u8, StoreError> {
        let value = clamp_balance_value(raw);
        if !(0.0..=f64::from(BALANCE_MAX)).contains(&raw) {
            debug!(
                "event=balance_clamp module=store status=ok index={} stored={}",
                index, value
            );
        }

        let categories = DocPath::section(Section::Balance).key("categories");
        if let Some(len) = self.get(&categories).and_then(Value::as_array).map(Vec::len) {
            check_index(Section::Balance, index, len)?;
            self.set(&categories.index(index).key("value"), Value::from(value))?;
            return Ok(value);
        }

        let mut seeded = Balance::default();
        let explain_seen = DocPath::section(Section::Balance).key("explainSeen");
        if let Some(seen) = self.get(&explain_seen).and_then(Value::as_bool) {
            seeded.explain_seen = seen;
        }
        let len = seeded.categories.len();
        check_index(Section::Balance, index, len)?;
        seeded.categories[index].value = value;
        info!(
            "event=balance_seed module=store status=ok index={} stored={}",
            index, value
        );
        self.set(&DocPath::section(Section::Balance), to_value(&seeded))?;
        Ok(value)
    }

    /// Records that the balance wheel hint was dismissed.
    pub fn mark_balance_explained(&mut self) -> Result<(), StoreError> {
        let path = DocPath::section(Section::Balance).key("explainSeen");
        self.set(&path, Value::Bool(true))
    }

    /// Sets one checklist flag of `skill`.
    pub fn set_skill_flag(&mut self, skill: &str, flag: &str, on: bool) -> Result<(), StoreError> {
        let flag =
            SkillFlag::from_key(flag).ok_or_else(|| StoreError::UnknownSkillFlag(flag.into()))?;
        let path = DocPath::section(Section::Skills)
            .key(skill)
            .key(flag.as_key());
        self.set(&path, Value::Bool(on))
    }

    fn list_len(&self, section: Section) -> Result<usize, StoreError> {
        let path = DocPath::section(section);
        match self.get(&path).and_then(Value::as_array) {
            Some(items) => Ok(items.len()),
            None => Err(StoreError::NotAList(path)),
        }
    }

    fn push_entry(
        &mut self,
        section: Section,
        entry: Value,
        max: Option<usize>,
    ) -> Result<usize, StoreError> {
        let len = self.list_len(section)?;
        if let Some(max) = max {
            if len >= max {
                return Err(StoreError::ListFull { section, max });
            }
        }
        self.set(&DocPath::section(section).index(len), entry)?;
        Ok(len)
    }

    fn remove_entry(&mut self, section: Section, index: usize, min: usize) -> Result<(), StoreError> {
        let path = DocPath::section(section);
        let Some(items) = self.get(&path).and_then(Value::as_array) else {
            return Err(StoreError::NotAList(path));
        };
        let len = items.len();
        check_index(section, index, len)?;
        if len <= min {
            return Err(StoreError::ListMinimum { section, min });
        }

        let remaining: Vec<Value> = items
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != index)
            .map(|(_, item)| item.clone())
            .collect();
        self.set(&DocPath::section(section), Value::Array(remaining))
    }

    /// Swaps in `next` and writes it to the slot.
    fn commit(&mut self, next: Value) {
        self.doc = next;
        self.persist();
    }

    fn persist(&mut self) {
        let started_at = Instant::now();
        let payload = match serde_json::to_string(&self.doc) {
            Ok(payload) => payload,
            Err(err) => {
                self.record_persist_failure(err.to_string(), started_at);
                return;
            }
        };

        match self.repo.save_slot(&self.storage_key, &payload) {
            Ok(()) => {
                self.last_persist_error = None;
                debug!(
                    "event=doc_persist module=store status=ok key={} bytes={} duration_ms={}",
                    self.storage_key,
                    payload.len(),
                    started_at.elapsed().as_millis()
                );
            }
            Err(err) => self.record_persist_failure(err.to_string(), started_at),
        }
    }

    fn record_persist_failure(&mut self, message: String, started_at: Instant) {
        warn!(
            "event=doc_persist module=store status=error key={} duration_ms={} error={}",
            self.storage_key,
            started_at.elapsed().as_millis(),
            sanitize_message(&message, MAX_LOGGED_ERROR_CHARS)
        );
        self.last_persist_error = Some(message);
    }
}

fn load_or_default<R: SlotRepository>(repo: &R, key: &str, defaults: &Value) -> Value {
    let raw = match repo.load_slot(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("event=doc_load module=store status=fallback key={key} reason=absent");
            return defaults.clone();
        }
        Err(err) => {
            warn!(
                "event=doc_load module=store status=fallback key={} reason=read_failed error={}",
                key,
                sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
            );
            return defaults.clone();
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(doc) => {
            info!(
                "event=doc_load module=store status=ok key={} bytes={}",
                key,
                raw.len()
            );
            doc
        }
        Err(_) => {
            warn!(
                "event=doc_load module=store status=fallback key={} reason=parse_failed bytes={}",
                key,
                raw.len()
            );
            defaults.clone()
        }
    }
}
