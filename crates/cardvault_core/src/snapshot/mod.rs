//! Versioned export/import codec for the whole collection.
//!
//! # Responsibility
//! - Produce self-contained snapshot documents for backup/sharing.
//! - Re-import current and legacy snapshot shapes through the
//!   repository's batched write path.
//!
//! # Invariants
//! - Export always carries `id`, `name`, `hidden` and `createdAt` for
//!   every card; `imageData`/`metadata` follow the options.
//! - Imported records always receive fresh ids; snapshots are never
//!   merged by content, so re-importing a backup appends duplicates.
//! - Validation failures are raised before any write is attempted.

use crate::model::card::{CardId, CardMetadata, CardRecord, ImportedCard};
use crate::repo::card_repo::{CardRepository, RepoError};
use crate::store::KeyValueStore;
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Schema version stamped on every export.
pub const SNAPSHOT_VERSION: &str = "2.0";

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Error surface of the snapshot codec.
#[derive(Debug)]
pub enum SnapshotError {
    /// The import document is missing `cards`, `cards` is not a sequence,
    /// or no entry survived validation.
    InvalidImportFormat(String),
    /// Capacity was exceeded while persisting the imported batch. Import
    /// is not transactional: records persisted by earlier imports remain.
    ImportStorageFull,
    /// Repository failure unrelated to capacity.
    Repo(RepoError),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidImportFormat(reason) => {
                write!(f, "invalid import document: {reason}")
            }
            Self::ImportStorageFull => {
                write!(f, "storage capacity exceeded while importing snapshot")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidImportFormat(_) => None,
            Self::ImportStorageFull => None,
            Self::Repo(err) => Some(err),
        }
    }
}

/// Which optional card fields an export includes.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    pub include_images: bool,
    pub include_metadata: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_images: true,
            include_metadata: true,
        }
    }
}

/// One card entry inside a snapshot document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotCard {
    pub id: CardId,
    pub name: String,
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CardMetadata>,
}

/// Self-contained, versioned export of the whole collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub card_count: usize,
    pub cards: Vec<SnapshotCard>,
}

/// Builds a snapshot document from the current collection.
///
/// Pure with respect to the store; callers obtain `cards` from the
/// repository and decide what to do with the document.
pub fn export_snapshot(cards: &[CardRecord], options: &ExportOptions) -> SnapshotDocument {
    let entries = cards
        .iter()
        .map(|card| SnapshotCard {
            id: card.id,
            name: card.name.clone(),
            hidden: card.hidden,
            created_at: card.created_at,
            image_data: options.include_images.then(|| card.image_data.clone()),
            metadata: if options.include_metadata {
                card.metadata.clone()
            } else {
                None
            },
        })
        .collect::<Vec<_>>();

    info!(
        "event=snapshot_export module=snapshot status=ok card_count={} include_images={} include_metadata={}",
        entries.len(),
        options.include_images,
        options.include_metadata
    );

    SnapshotDocument {
        version: SNAPSHOT_VERSION.to_string(),
        export_date: Utc::now(),
        card_count: entries.len(),
        cards: entries,
    }
}

/// Imports a snapshot document into the repository.
///
/// Accepts both the current schema and legacy shapes lacking
/// `version`/`metadata`; any missing or type-mismatched card field is
/// defaulted by [`CardRecord::from_import`]. Entries without a non-empty `name` and
/// `imageData` are dropped. The surviving batch is persisted through one
/// repository write.
///
/// Returns the number of records persisted.
///
/// # Errors
/// - [`SnapshotError::InvalidImportFormat`] when `cards` is missing, not
///   a sequence, or no entry survives validation; raised before any write.
/// - [`SnapshotError::ImportStorageFull`] when capacity was exceeded.
pub fn import_snapshot<S: KeyValueStore>(
    repo: &mut CardRepository<S>,
    document: &Value,
) -> SnapshotResult<usize> {
    let entries = document
        .get("cards")
        .ok_or_else(|| SnapshotError::InvalidImportFormat("missing `cards` field".to_string()))?
        .as_array()
        .ok_or_else(|| {
            SnapshotError::InvalidImportFormat("`cards` is not a sequence".to_string())
        })?;

    let drafts: Vec<ImportedCard> = entries
        .iter()
        .map(lenient_draft)
        .filter(ImportedCard::is_importable)
        .collect();

    if drafts.is_empty() {
        return Err(SnapshotError::InvalidImportFormat(
            "no card entry carries a non-empty name and imageData".to_string(),
        ));
    }

    let accepted = drafts.len();
    match repo.import_cards(drafts) {
        Ok(count) => {
            info!(
                "event=snapshot_import module=snapshot status=ok imported={} skipped={}",
                count,
                entries.len() - accepted
            );
            Ok(count)
        }
        Err(RepoError::StorageFull) => Err(SnapshotError::ImportStorageFull),
        Err(err) => Err(SnapshotError::Repo(err)),
    }
}

/// Builds an import draft from one card entry, field by field.
///
/// Acceptance hinges only on `name`/`imageData`; a type-mismatched
/// optional field (a numeric `createdAt`, a non-bool `hidden`) is treated
/// as absent and left to the default-filling constructor rather than
/// discarding the whole entry.
fn lenient_draft(entry: &Value) -> ImportedCard {
    fn field<T: serde::de::DeserializeOwned>(entry: &Value, name: &str) -> Option<T> {
        entry
            .get(name)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    ImportedCard {
        name: field(entry, "name"),
        image_data: field(entry, "imageData"),
        hidden: field(entry, "hidden"),
        created_at: field(entry, "createdAt"),
        last_modified: field(entry, "lastModified"),
        metadata: field(entry, "metadata"),
    }
}

/// Parses snapshot JSON text into a document value for import.
///
/// # Errors
/// - [`SnapshotError::InvalidImportFormat`] when the text is not JSON.
pub fn parse_snapshot(json: &str) -> SnapshotResult<Value> {
    serde_json::from_str(json)
        .map_err(|err| SnapshotError::InvalidImportFormat(format!("not valid JSON: {err}")))
}
