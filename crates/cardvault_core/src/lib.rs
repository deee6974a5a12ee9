//! Core domain logic for CardVault.
//! This crate is the single source of truth for collection invariants.

pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod snapshot;
pub mod stats;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::card::{CardId, CardMetadata, CardRecord, CardValidationError, ImportedCard};
pub use repo::card_repo::{
    CardRepository, CollectionProvenance, IdGenerator, LoadedCollection, RepoError, RepoResult,
    UuidIdGenerator, COLLECTION_KEY, LAST_UPDATED_KEY,
};
pub use repo::quota::DEFAULT_EVICTION_CUTOFF_DAYS;
pub use search::filter_by_name;
pub use snapshot::{
    export_snapshot, import_snapshot, parse_snapshot, ExportOptions, SnapshotCard,
    SnapshotDocument, SnapshotError, SnapshotResult, SNAPSHOT_VERSION,
};
pub use stats::{compute_stats, CollectionStats, SOFT_CAPACITY_BYTES};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
