//! Persistent key-value surface consumed by the repository.
//!
//! # Responsibility
//! - Define the single-writer blob store contract the repository writes
//!   through.
//! - Provide an in-memory fake and a durable file-backed implementation.
//!
//! # Invariants
//! - A `write` either replaces the whole value under a key or fails; there
//!   are no partial writes and no transactions.
//! - Capacity rejection is reported as `StoreError::QuotaExceeded`, never as
//!   a silent truncation.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error surface of the persistent store.
#[derive(Debug)]
pub enum StoreError {
    /// The write would exceed the store's capacity.
    QuotaExceeded {
        attempted_bytes: usize,
        capacity_bytes: usize,
    },
    /// Transport-level failure from the backing medium.
    Io(std::io::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded {
                attempted_bytes,
                capacity_bytes,
            } => write!(
                f,
                "write of {attempted_bytes} bytes exceeds store capacity of {capacity_bytes} bytes"
            ),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::QuotaExceeded { .. } => None,
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl StoreError {
    /// Returns whether this error is a capacity rejection.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

/// Durable single-writer key-value surface.
///
/// The platform provides no isolation, so callers must treat every
/// read-modify-write sequence as its own critical section; `&mut self` on
/// `write` makes that exclusivity explicit in the type system.
pub trait KeyValueStore {
    /// Reads the full value stored under `key`, or `None` when absent.
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Replaces the full value stored under `key`.
    ///
    /// # Errors
    /// - [`StoreError::QuotaExceeded`] when the value does not fit.
    /// - [`StoreError::Io`] on transport failure.
    fn write(&mut self, key: &str, value: &[u8]) -> StoreResult<()>;
}
