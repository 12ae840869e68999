//! Error taxonomy for the paging core (spec §7).
//!
//! Severity is increasing top to bottom. `Exhaustion` is surfaced to the
//! caller as a plain `None` from the allocator (spec §4.1) — it is not
//! represented here. Everything in [`PagingError`] is fatal: no error is
//! retried inside the core.

use thiserror::Error;

/// The reason a Merkle verification failed (spec §4.6, §9 open question on
/// distinguishing mismatch vs not-found).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IntegrityFailure {
    /// An internal node's recomputed hash did not match its stored hash.
    #[error("internal node hash mismatch")]
    InternalMismatch,
    /// The root's recomputed hash did not match its stored hash.
    #[error("root hash mismatch")]
    RootMismatch,
    /// The key was not present in the leaf its descent path led to.
    #[error("key not present in tree")]
    KeyAbsent,
    /// The leaf's recomputed hash did not match its stored hash, or the
    /// stored value for the key did not match the expected hash.
    #[error("leaf value mismatch")]
    LeafMismatch,
}

/// Fatal errors raised by the paging core.
#[derive(Debug, Error)]
pub enum PagingError {
    /// The pageout counter directory is undersized for this backing region.
    /// This is a configuration error, not a runtime condition: it is fatal
    /// on the first offending slot (spec §4.2).
    #[error("counter directory too small: slot {slot_index} needs directory len > {directory_len}")]
    ConfigTooSmall { slot_index: u64, directory_len: usize },

    /// `verify` failed: root/internal hash mismatch, key absent, or leaf
    /// value mismatch (spec §4.6, §7).
    #[error("integrity failure: {0}")]
    IntegrityFailure(#[from] IntegrityFailure),

    /// The backing region has cycled through every slot without a free one
    /// turning up (spec §4.1, §4.7).
    #[error("backing region exhausted")]
    BackingRegionExhausted,
}
