//! Domain model for the card collection.
//!
//! # Responsibility
//! - Define the canonical stored record shape and its wire names.
//! - Keep construction and default-filling rules in one place.
//!
//! # Invariants
//! - Every record is identified by a stable `CardId`.
//! - `last_modified` is never earlier than `created_at`.

pub mod card;
