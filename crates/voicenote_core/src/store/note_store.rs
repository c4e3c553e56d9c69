//! Note store over a key-value storage backend.
//!
//! # Responsibility
//! - Load the persisted note array at startup, degrading to empty on failure.
//! - Create and delete notes, rewriting the full array on every mutation.
//! - Serve the pure search filter over the current list.
//!
//! # Invariants
//! - Insertion position encodes order: newest note first.
//! - Ids are unique; loaded duplicates keep their first occurrence.
//! - A malformed record is dropped alone; only a non-array payload loads
//!   as empty.
//! - A failed write rolls the in-memory list back, so memory always equals
//!   the last successfully written collection.
//! - Log lines carry counts and ids only, never note content.

use crate::model::note::{Note, NoteId};
use crate::search::filter::filter_notes;
use crate::storage::{KeyValueStorage, StorageError};
use crate::store::sources::{Clock, IdGenerator, SystemClock, UuidV4Generator};
use chrono::SubsecRound;
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the serialized note array.
pub const DEFAULT_STORAGE_KEY: &str = "notes";

/// Note store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Key under which the full note array is persisted.
    pub storage_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure for mutations.
///
/// Loading never fails; see [`NoteStore::initialize`].
#[derive(Debug)]
pub enum StoreError {
    /// Writing the collection failed; the mutation was rolled back.
    Storage(StorageError),
    /// The collection could not be serialized.
    Encode(serde_json::Error),
    /// The id source produced an id that is already in use.
    DuplicateId(NoteId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "failed to persist notes: {err}"),
            Self::Encode(err) => write!(f, "failed to encode notes: {err}"),
            Self::DuplicateId(id) => write!(f, "generated note id already exists: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::DuplicateId(_) => None,
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Owner of the note list and its persisted mirror.
pub struct NoteStore<S: KeyValueStorage> {
    storage: S,
    config: StoreConfig,
    notes: Vec<Note>,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl<S: KeyValueStorage> NoteStore<S> {
    /// Loads the persisted collection with default id and time sources.
    ///
    /// Absent, unreadable or unparsable storage yields an empty list.
    pub fn initialize(storage: S, config: StoreConfig) -> Self {
        Self::initialize_with(
            storage,
            config,
            Box::new(UuidV4Generator),
            Box::new(SystemClock),
        )
    }

    /// Loads the persisted collection with caller-provided sources.
    pub fn initialize_with(
        storage: S,
        config: StoreConfig,
        ids: Box<dyn IdGenerator>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let notes = load_notes(&storage, config.storage_key.as_str());
        info!(
            "event=store_init module=store status=ok key={} note_count={}",
            config.storage_key,
            notes.len()
        );
        Self {
            storage,
            config,
            notes,
            ids,
            clock,
        }
    }

    /// Current list, newest first.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Creates a note and returns the updated list.
    ///
    /// Empty `content` is a no-op; no trimming happens here.
    pub fn create(&mut self, content: impl Into<String>) -> StoreResult<&[Note]> {
        self.create_note(content)?;
        Ok(&self.notes)
    }

    /// Creates a note and returns it, or `None` when `content` is empty.
    ///
    /// # Errors
    /// - [`StoreError::DuplicateId`] when the id source repeats an id.
    /// - [`StoreError::Storage`] / [`StoreError::Encode`] when the write fails;
    ///   the list is left unchanged.
    pub fn create_note(&mut self, content: impl Into<String>) -> StoreResult<Option<Note>> {
        let content = content.into();
        if content.is_empty() {
            debug!("event=note_create module=store status=skipped reason=empty_content");
            return Ok(None);
        }

        let id = self.ids.next_id();
        if self.get(id.as_str()).is_some() {
            error!(
                "event=note_create module=store status=error error_code=duplicate_id id={}",
                id
            );
            return Err(StoreError::DuplicateId(id));
        }

        // Millisecond precision keeps the persisted ISO string lossless.
        let note = Note::new(id, self.clock.now().trunc_subsecs(3), content);
        self.notes.insert(0, note.clone());

        if let Err(err) = self.persist() {
            self.notes.remove(0);
            error!(
                "event=note_create module=store status=error error_code=persist_failed error={}",
                err
            );
            return Err(err);
        }

        info!(
            "event=note_create module=store status=ok id={} note_count={}",
            note.id,
            self.notes.len()
        );
        Ok(Some(note))
    }

    /// Removes the note with `id` and returns the updated list.
    ///
    /// A missing id is not an error; the unchanged list is still persisted.
    pub fn delete(&mut self, id: &str) -> StoreResult<&[Note]> {
        let position = self.notes.iter().position(|note| note.id == id);
        let removed = position.map(|index| (index, self.notes.remove(index)));

        if let Err(err) = self.persist() {
            if let Some((index, note)) = removed {
                self.notes.insert(index, note);
            }
            error!(
                "event=note_delete module=store status=error error_code=persist_failed id={} error={}",
                id, err
            );
            return Err(err);
        }

        info!(
            "event=note_delete module=store status={} id={} note_count={}",
            if removed.is_some() { "ok" } else { "absent" },
            id,
            self.notes.len()
        );
        Ok(&self.notes)
    }

    /// Case-insensitive substring search over the current list.
    pub fn search(&self, query: &str) -> Vec<&Note> {
        filter_notes(&self.notes, query)
    }

    fn persist(&mut self) -> StoreResult<()> {
        let payload = serde_json::to_string(&self.notes).map_err(StoreError::Encode)?;
        self.storage
            .set(self.config.storage_key.as_str(), payload.as_str())?;
        Ok(())
    }
}

fn load_notes<S: KeyValueStorage>(storage: &S, key: &str) -> Vec<Note> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("event=store_load module=store status=empty reason=absent key={key}");
            return Vec::new();
        }
        Err(err) => {
            error!(
                "event=store_load module=store status=degraded error_code=read_failed key={} error={}",
                key, err
            );
            return Vec::new();
        }
    };

    // Only the outer array is strict; each record is decoded on its own.
    let records = match serde_json::from_str::<Vec<serde_json::Value>>(raw.as_str()) {
        Ok(records) => records,
        Err(err) => {
            warn!(
                "event=store_load module=store status=degraded error_code=unparsable key={} error={}",
                key, err
            );
            return Vec::new();
        }
    };

    retain_valid_unique(decode_records(records))
}

fn decode_records(records: Vec<serde_json::Value>) -> Vec<Note> {
    let mut notes = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Note>(record) {
            Ok(note) => notes.push(note),
            Err(err) => warn!(
                "event=store_load module=store status=record_dropped error_code=undecodable index={} error={}",
                index, err
            ),
        }
    }
    notes
}

fn retain_valid_unique(parsed: Vec<Note>) -> Vec<Note> {
    let total = parsed.len();
    let mut seen = HashSet::with_capacity(total);
    let notes = parsed
        .into_iter()
        .filter(|note| note.validate().is_ok() && seen.insert(note.id.clone()))
        .collect::<Vec<_>>();

    if notes.len() != total {
        warn!(
            "event=store_load module=store status=partial dropped={} kept={}",
            total - notes.len(),
            notes.len()
        );
    }
    notes
}
