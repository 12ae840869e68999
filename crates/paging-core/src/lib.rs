//! Authenticated paging for a confidential backing-memory subsystem.
//!
//! A trusted runtime (an enclave, a hypervisor shadowing guest memory, or
//! similar) needs to evict pages to memory it does not trust and later
//! notice if that memory was tampered with or rolled back to an older
//! version. This crate provides the four pieces that make that possible:
//!
//! - [`allocator`] hands out backing slots in a scrambled, exhaustively
//!   cycling order so slot reuse does not leak an access pattern.
//! - [`counters`] tracks a monotonic pageout counter per slot, the nonce
//!   every encryption and hash is bound to.
//! - [`crypto`] is the encrypt/decrypt/hash envelope bound to that counter.
//! - [`merkle`] is a B+ Merkle tree over backing addresses, so a caller can
//!   detect any tamper or rollback against a single cached root hash.
//! - [`pipeline`] composes all four into the two operations callers
//!   actually need: evict and restore.
//!
//! # Residual risk
//!
//! The pageout counter directory itself ([`counters::CounterStore`]) is not
//! covered by the Merkle tree. A caller that needs the counters themselves
//! tamper-evident must keep that directory in trusted memory, exactly as
//! the boot key is — this crate does not claim otherwise.

pub mod allocator;
pub mod config;
pub mod counters;
pub mod crypto;
pub mod error;
pub mod merkle;
pub mod pipeline;

pub use config::PagingConfig;
pub use error::{IntegrityFailure, PagingError};
pub use pipeline::PagingPipeline;
