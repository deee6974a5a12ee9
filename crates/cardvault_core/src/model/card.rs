//! Card record model.
//!
//! # Responsibility
//! - Define the canonical record persisted in the collection blob.
//! - Provide the two sanctioned constructors: direct creation and
//!   default-filling import.
//!
//! # Invariants
//! - `id` is stable and never reused for another card.
//! - `name` and `image_data` are non-empty.
//! - `last_modified >= created_at` at all times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a stored card.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type CardId = Uuid;

/// Validation error for card construction and mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardValidationError {
    /// `name` is empty.
    EmptyName,
    /// `image_data` is empty.
    EmptyImageData,
}

impl Display for CardValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "card name cannot be empty"),
            Self::EmptyImageData => write!(f, "card image data cannot be empty"),
        }
    }
}

impl Error for CardValidationError {}

/// Informational metadata bag attached to a card.
///
/// Never used for identity or invariants; every field is optional so both
/// current and legacy persisted shapes deserialize without loss.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardMetadata {
    /// Approximate size in bytes of the embedded image payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    /// Whether the payload was compressed before capture.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed: Option<bool>,
    /// Producer version string, informational only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Set when the record entered the collection through an import.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported: Option<bool>,
}

impl CardMetadata {
    /// Default metadata stamped onto imported records lacking their own.
    pub fn stamped_imported(file_size: u64) -> Self {
        Self {
            file_size: Some(file_size),
            imported: Some(true),
            ..Self::default()
        }
    }
}

/// One stored labeled image item.
///
/// Wire field names are camelCase to match the persisted collection blob
/// and the snapshot export format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    /// Stable unique ID assigned at creation, immutable thereafter.
    pub id: CardId,
    /// Non-empty user-supplied label.
    pub name: String,
    /// Embedded image payload as self-describing text (e.g. a data URI).
    /// Opaque to the repository.
    pub image_data: String,
    /// Creation timestamp, ISO-8601 on the wire.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent mutation. Never earlier than
    /// `created_at`.
    pub last_modified: DateTime<Utc>,
    /// Visibility flag, defaults to `false`.
    #[serde(default)]
    pub hidden: bool,
    /// Informational metadata, never used for identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CardMetadata>,
}

/// Raw card entry accepted by the import path.
///
/// Every field is optional so legacy export shapes (no `metadata`, no
/// timestamps) still parse; unknown fields such as old-style ids are
/// ignored. Defaults are filled by [`CardRecord::from_import`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportedCard {
    pub name: Option<String>,
    pub image_data: Option<String>,
    pub hidden: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub metadata: Option<CardMetadata>,
}

impl ImportedCard {
    /// Returns whether this entry carries the mandatory payload fields.
    ///
    /// # Contract
    /// - `true` only when `name` and `image_data` are both present and
    ///   non-empty.
    pub fn is_importable(&self) -> bool {
        self.name.as_deref().is_some_and(|name| !name.is_empty())
            && self
                .image_data
                .as_deref()
                .is_some_and(|data| !data.is_empty())
    }
}

impl CardRecord {
    /// Creates a new card with caller-provided id and clock reading.
    ///
    /// # Invariants
    /// - `created_at == last_modified == now`.
    /// - `hidden` starts as `false`, `metadata` as `None`.
    ///
    /// # Errors
    /// - [`CardValidationError::EmptyName`] when `name` is empty.
    /// - [`CardValidationError::EmptyImageData`] when `image_data` is empty.
    pub fn new(
        name: impl Into<String>,
        image_data: impl Into<String>,
        id: CardId,
        now: DateTime<Utc>,
    ) -> Result<Self, CardValidationError> {
        let card = Self {
            id,
            name: name.into(),
            image_data: image_data.into(),
            created_at: now,
            last_modified: now,
            hidden: false,
            metadata: None,
        };
        card.validate()?;
        Ok(card)
    }

    /// Builds a card from an imported entry, filling every absent field.
    ///
    /// This is the single default-filling step for the import path:
    /// - `created_at` falls back to `now`.
    /// - `last_modified` falls back to `created_at` and is clamped so it
    ///   never precedes it.
    /// - `hidden` falls back to `false`.
    /// - `metadata` falls back to a bag stamped `imported: true`.
    ///
    /// # Errors
    /// - Validation errors when `name` or `image_data` is absent or empty.
    pub fn from_import(
        draft: ImportedCard,
        id: CardId,
        now: DateTime<Utc>,
    ) -> Result<Self, CardValidationError> {
        let name = draft.name.unwrap_or_default();
        let image_data = draft.image_data.unwrap_or_default();
        let created_at = draft.created_at.unwrap_or(now);
        let last_modified = draft
            .last_modified
            .unwrap_or(created_at)
            .max(created_at);
        let metadata = draft
            .metadata
            .unwrap_or_else(|| CardMetadata::stamped_imported(image_data.len() as u64));

        let card = Self {
            id,
            name,
            image_data,
            created_at,
            last_modified,
            hidden: draft.hidden.unwrap_or(false),
            metadata: Some(metadata),
        };
        card.validate()?;
        Ok(card)
    }

    /// Checks construction/mutation invariants that do not depend on the
    /// surrounding collection.
    pub fn validate(&self) -> Result<(), CardValidationError> {
        if self.name.is_empty() {
            return Err(CardValidationError::EmptyName);
        }
        if self.image_data.is_empty() {
            return Err(CardValidationError::EmptyImageData);
        }
        Ok(())
    }

    /// Records a mutation by refreshing `last_modified`.
    ///
    /// Keeps the `last_modified >= created_at` invariant even when the
    /// provided clock reading is stale.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_modified = now.max(self.created_at);
    }
}
