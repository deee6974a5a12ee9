//! Read-side filtering over the loaded collection.
//!
//! # Responsibility
//! - Provide case-insensitive name search for display layers.
//! - Stay pure: the store is never touched.

use crate::model::card::CardRecord;

/// Filters cards whose `name` contains `query`, ignoring case.
///
/// # Contract
/// - An empty `query` returns the full collection in original order.
/// - Matching never mutates the collection or the store.
pub fn filter_by_name<'a>(cards: &'a [CardRecord], query: &str) -> Vec<&'a CardRecord> {
    if query.is_empty() {
        return cards.iter().collect();
    }

    let needle = query.to_lowercase();
    cards
        .iter()
        .filter(|card| card.name.to_lowercase().contains(&needle))
        .collect()
}
