//! Derived usage statistics over the loaded collection.
//!
//! # Responsibility
//! - Report counts and serialized-size figures for display layers.
//! - Recompute on every call; the input is already in memory, so caching
//!   would only add staleness.

use crate::model::card::CardRecord;
use log::warn;

/// Soft capacity reference for `usage_percent`, matching the typical
/// per-origin budget of the device key-value surface.
pub const SOFT_CAPACITY_BYTES: usize = 5 * 1024 * 1024;

/// Usage figures derived from the current collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectionStats {
    /// Total number of cards.
    pub card_count: usize,
    /// Cards with `hidden == false`.
    pub visible_count: usize,
    /// Byte length of the collection's serialized JSON form.
    pub serialized_size: usize,
    /// `serialized_size` relative to [`SOFT_CAPACITY_BYTES`], clamped to
    /// 100.
    pub usage_percent: f64,
    /// `serialized_size / card_count`; `0` for an empty collection.
    pub average_record_size: usize,
}

/// Computes usage statistics for `cards`.
pub fn compute_stats(cards: &[CardRecord]) -> CollectionStats {
    let serialized_size = match serde_json::to_vec(cards) {
        Ok(blob) => blob.len(),
        Err(err) => {
            warn!("event=stats_serialize module=stats status=error error={err}");
            0
        }
    };

    let card_count = cards.len();
    let usage_percent =
        (serialized_size as f64 / SOFT_CAPACITY_BYTES as f64 * 100.0).min(100.0);
    let average_record_size = if card_count == 0 {
        0
    } else {
        serialized_size / card_count
    };

    CollectionStats {
        card_count,
        visible_count: cards.iter().filter(|card| !card.hidden).count(),
        serialized_size,
        usage_percent,
        average_record_size,
    }
}

#[cfg(test)]
mod tests {
    use super::{compute_stats, SOFT_CAPACITY_BYTES};
    use crate::model::card::CardRecord;
    use chrono::Utc;
    use uuid::Uuid;

    fn card(name: &str, image_data: &str) -> CardRecord {
        CardRecord::new(name, image_data, Uuid::new_v4(), Utc::now())
            .expect("valid card should construct")
    }

    #[test]
    fn empty_collection_reports_zeroes() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.card_count, 0);
        assert_eq!(stats.visible_count, 0);
        assert_eq!(stats.average_record_size, 0);
        assert!(stats.usage_percent < 1.0);
    }

    #[test]
    fn counts_follow_hidden_flags() {
        let mut hidden = card("Visa", "data:AAA");
        hidden.hidden = true;
        let cards = vec![hidden, card("Amex", "data:BBB")];

        let stats = compute_stats(&cards);
        assert_eq!(stats.card_count, 2);
        assert_eq!(stats.visible_count, 1);
        assert!(stats.serialized_size > 0);
        assert_eq!(
            stats.average_record_size,
            stats.serialized_size / 2
        );
    }

    #[test]
    fn usage_percent_is_clamped_to_100() {
        let oversized = card("Big", &"x".repeat(SOFT_CAPACITY_BYTES + 1024));
        let stats = compute_stats(&[oversized]);
        assert_eq!(stats.usage_percent, 100.0);
    }
}
