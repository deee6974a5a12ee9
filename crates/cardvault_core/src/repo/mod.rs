//! Repository layer owning the persisted card collection.
//!
//! # Responsibility
//! - Define CRUD and visibility contracts over the collection blob.
//! - Isolate store serialization details from feature modules.
//!
//! # Invariants
//! - Every mutation rewrites the whole collection in one store write.
//! - Card ids stay unique across the collection at all times.
//! - Capacity rejection triggers at most one eviction pass before the
//!   error is surfaced.

pub mod card_repo;
pub mod quota;
