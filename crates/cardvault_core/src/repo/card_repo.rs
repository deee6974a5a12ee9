//! Card repository over the key-value store.
//!
//! # Responsibility
//! - Own CRUD, id assignment and visibility toggling for the collection.
//! - Keep the whole-collection write discipline in one place.
//!
//! # Invariants
//! - Read-modify-write sequences never yield between the read and the
//!   write; `&mut self` on every mutating operation enforces single-writer
//!   access.
//! - A corrupt persisted blob is recovered to an empty collection and
//!   reported through `CollectionProvenance`, never raised.
//! - On `QuotaExceeded` the repository runs stale eviction exactly once and
//!   then surfaces `StorageFull` regardless of whether space was freed, so
//!   eviction-induced data loss is never masked by a silent retry.

use crate::model::card::{CardId, CardRecord, CardValidationError, ImportedCard};
use crate::store::{KeyValueStore, StoreError};
use chrono::Utc;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Store key holding the JSON-serialized collection.
pub const COLLECTION_KEY: &str = "cards";
/// Store key holding the ISO-8601 marker of the last successful write.
pub const LAST_UPDATED_KEY: &str = "cards.last_updated";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for collection persistence and mutation operations.
#[derive(Debug)]
pub enum RepoError {
    /// A write exceeded device capacity; one eviction pass already ran.
    StorageFull,
    /// Transport failure from the store backend.
    Store(StoreError),
    /// Card construction or mutation input was invalid.
    Validation(CardValidationError),
    /// The collection could not be serialized for persistence.
    Serialization(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageFull => write!(
                f,
                "storage capacity exceeded after one eviction attempt; collection not written"
            ),
            Self::Store(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "failed to serialize collection: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageFull => None,
            Self::Store(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<CardValidationError> for RepoError {
    fn from(value: CardValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Id assignment strategy for new and imported cards.
///
/// Kept behind a trait so tests can pin ids and so the generation scheme
/// can change without touching repository call sites.
pub trait IdGenerator {
    fn next_id(&mut self) -> CardId;
}

/// Default id generator producing random v4 UUIDs.
#[derive(Debug, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> CardId {
        Uuid::new_v4()
    }
}

/// Where a loaded collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionProvenance {
    /// The collection key has never been written.
    Fresh,
    /// The blob parsed cleanly.
    Stored,
    /// The blob was present but corrupt; the collection was recovered to
    /// empty and the corruption logged.
    Recovered,
}

/// A loaded collection together with its provenance, letting callers
/// distinguish "never written" from "empty because corrupted".
#[derive(Debug)]
pub struct LoadedCollection {
    pub cards: Vec<CardRecord>,
    pub provenance: CollectionProvenance,
}

/// Repository owning the persisted card collection.
pub struct CardRepository<S: KeyValueStore> {
    store: S,
    ids: Box<dyn IdGenerator>,
}

impl<S: KeyValueStore> CardRepository<S> {
    /// Creates a repository over `store` with random UUID id assignment.
    pub fn new(store: S) -> Self {
        Self::with_id_generator(store, Box::new(UuidIdGenerator))
    }

    /// Creates a repository with a caller-provided id strategy.
    pub fn with_id_generator(store: S, ids: Box<dyn IdGenerator>) -> Self {
        Self { store, ids }
    }

    /// Read-only access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the repository, returning the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Creates a card and appends it to the end of the collection.
    ///
    /// # Contract
    /// - Assigns a fresh unique id; `created_at == last_modified == now`,
    ///   `hidden == false`.
    /// - On capacity rejection, runs stale eviction once and returns
    ///   [`RepoError::StorageFull`] without retrying; the caller decides
    ///   whether to retry.
    ///
    /// # Errors
    /// - [`RepoError::Validation`] when `name` or `image_data` is empty.
    /// - [`RepoError::StorageFull`] when the write exceeded capacity.
    pub fn create(&mut self, name: &str, image_data: &str) -> RepoResult<CardRecord> {
        let card = CardRecord::new(name, image_data, self.ids.next_id(), Utc::now())?;

        let mut cards = self.load()?.cards;
        cards.push(card.clone());
        self.persist(&cards)?;

        info!(
            "event=card_create module=repo status=ok id={} collection_size={}",
            card.id,
            cards.len()
        );
        Ok(card)
    }

    /// Loads the collection together with its provenance.
    ///
    /// A corrupt blob is recovered to an empty collection and logged as a
    /// diagnostic so a damaged store never hard-fails the caller.
    pub fn load(&self) -> RepoResult<LoadedCollection> {
        let Some(bytes) = self.store.read(COLLECTION_KEY)? else {
            return Ok(LoadedCollection {
                cards: Vec::new(),
                provenance: CollectionProvenance::Fresh,
            });
        };

        match serde_json::from_slice::<Vec<CardRecord>>(&bytes) {
            Ok(cards) => Ok(LoadedCollection {
                cards,
                provenance: CollectionProvenance::Stored,
            }),
            Err(err) => {
                warn!(
                    "event=parse_error module=repo status=recovered blob_bytes={} error={}",
                    bytes.len(),
                    err
                );
                Ok(LoadedCollection {
                    cards: Vec::new(),
                    provenance: CollectionProvenance::Recovered,
                })
            }
        }
    }

    /// Returns all cards in insertion order.
    pub fn read_all(&self) -> RepoResult<Vec<CardRecord>> {
        Ok(self.load()?.cards)
    }

    /// Returns the card with `id`, or `None` when absent.
    pub fn read_by_id(&self, id: CardId) -> RepoResult<Option<CardRecord>> {
        Ok(self.load()?.cards.into_iter().find(|card| card.id == id))
    }

    /// Overwrites the stored card matching `record.id` in place.
    ///
    /// # Contract
    /// - Refreshes `last_modified` on the persisted copy.
    /// - Returns `Ok(false)` and performs no write when the id is absent.
    pub fn update(&mut self, record: &CardRecord) -> RepoResult<bool> {
        record.validate()?;

        let mut cards = self.load()?.cards;
        let Some(slot) = cards.iter_mut().find(|card| card.id == record.id) else {
            return Ok(false);
        };

        let mut updated = record.clone();
        updated.touch(Utc::now());
        *slot = updated;

        self.persist(&cards)?;
        Ok(true)
    }

    /// Removes the card with `id`.
    ///
    /// Idempotent: returns `Ok(true)` whether or not the id existed, and
    /// always persists the filtered collection.
    pub fn remove(&mut self, id: CardId) -> RepoResult<bool> {
        let mut cards = self.load()?.cards;
        cards.retain(|card| card.id != id);
        self.persist(&cards)?;
        Ok(true)
    }

    /// Flips the `hidden` flag of the card with `id`.
    ///
    /// Returns `Ok(false)` without writing when the id is absent.
    pub fn toggle_visibility(&mut self, id: CardId) -> RepoResult<bool> {
        let Some(mut card) = self.read_by_id(id)? else {
            return Ok(false);
        };
        card.hidden = !card.hidden;
        self.update(&card)
    }

    /// Sets `hidden` on every card and persists the collection once.
    pub fn bulk_set_visibility(&mut self, hidden: bool) -> RepoResult<()> {
        let mut cards = self.load()?.cards;
        let now = Utc::now();
        for card in &mut cards {
            card.hidden = hidden;
            card.touch(now);
        }
        self.persist(&cards)?;
        Ok(())
    }

    /// Appends pre-validated imported drafts in one batched write.
    ///
    /// # Contract
    /// - Each draft receives a fresh id; defaults are filled by
    ///   [`CardRecord::from_import`].
    /// - The whole batch is persisted in a single write, so a capacity
    ///   failure leaves none of the batch behind.
    ///
    /// # Errors
    /// - [`RepoError::Validation`] when a draft lacks `name`/`image_data`.
    /// - [`RepoError::StorageFull`] when the batched write exceeded
    ///   capacity.
    pub fn import_cards(&mut self, drafts: Vec<ImportedCard>) -> RepoResult<usize> {
        let now = Utc::now();
        let mut cards = self.load()?.cards;
        let mut appended = 0usize;
        for draft in drafts {
            let card = CardRecord::from_import(draft, self.ids.next_id(), now)?;
            cards.push(card);
            appended += 1;
        }
        self.persist(&cards)?;
        Ok(appended)
    }

    /// Serializes and writes the collection, then refreshes the
    /// last-update marker.
    ///
    /// Marker failures are logged only; the collection write is the
    /// durability contract.
    pub(crate) fn write_collection(&mut self, cards: &[CardRecord]) -> RepoResult<()> {
        let blob = serde_json::to_vec(cards)?;
        self.store.write(COLLECTION_KEY, &blob)?;

        let marker = Utc::now().to_rfc3339();
        if let Err(err) = self.store.write(LAST_UPDATED_KEY, marker.as_bytes()) {
            warn!(
                "event=marker_write module=repo status=error error={}",
                err
            );
        }
        Ok(())
    }

    fn persist(&mut self, cards: &[CardRecord]) -> RepoResult<()> {
        match self.write_collection(cards) {
            Ok(()) => Ok(()),
            Err(RepoError::Store(err)) if err.is_quota_exceeded() => {
                warn!(
                    "event=collection_persist module=repo status=error error_code=quota_exceeded error={}",
                    err
                );
                let evicted = self.evict_stale(Self::default_eviction_cutoff());
                info!(
                    "event=quota_recovery module=repo status=done evicted={}",
                    evicted
                );
                Err(RepoError::StorageFull)
            }
            Err(err) => Err(err),
        }
    }
}
