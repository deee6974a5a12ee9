//! Age-based eviction invoked on capacity failure.
//!
//! # Responsibility
//! - Free space by dropping records older than a cutoff age.
//! - Stay silent on failure: eviction runs inside another operation's
//!   recovery path and must never obscure the original error.
//!
//! # Invariants
//! - Records younger than the cutoff are never removed.
//! - The collection is written back only when its size strictly
//!   decreased.
//! - Eviction never returns an error; failures are logged.

use super::card_repo::CardRepository;
use crate::store::KeyValueStore;
use chrono::{Duration, Utc};
use log::{info, warn};

/// Default eviction cutoff age in days.
pub const DEFAULT_EVICTION_CUTOFF_DAYS: i64 = 365;

impl<S: KeyValueStore> CardRepository<S> {
    /// The policy-default cutoff used by the capacity-failure path.
    pub fn default_eviction_cutoff() -> Duration {
        Duration::days(DEFAULT_EVICTION_CUTOFF_DAYS)
    }

    /// Removes every card created before `now - cutoff`.
    ///
    /// Returns the number of cards durably evicted; `0` when nothing was
    /// old enough or when eviction itself failed (logged, never raised).
    pub fn evict_stale(&mut self, cutoff: Duration) -> usize {
        let loaded = match self.load() {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(
                    "event=quota_evict module=quota status=error error_code=load_failed error={}",
                    err
                );
                return 0;
            }
        };

        let threshold = Utc::now() - cutoff;
        let before = loaded.cards.len();
        let kept: Vec<_> = loaded
            .cards
            .into_iter()
            .filter(|card| card.created_at >= threshold)
            .collect();

        if kept.len() == before {
            info!("event=quota_evict module=quota status=ok evicted=0 collection_size={before}");
            return 0;
        }

        match self.write_collection(&kept) {
            Ok(()) => {
                let evicted = before - kept.len();
                info!(
                    "event=quota_evict module=quota status=ok evicted={} collection_size={}",
                    evicted,
                    kept.len()
                );
                evicted
            }
            Err(err) => {
                warn!(
                    "event=quota_evict module=quota status=error error_code=write_failed error={}",
                    err
                );
                0
            }
        }
    }
}
