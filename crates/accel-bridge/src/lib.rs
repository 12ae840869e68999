//! External collaborators for the authenticated paging core.
//!
//! The paging pipeline treats the raw block cipher, the hash primitive, the
//! SBI trampolines and the backing-page allocator as collaborators it does
//! not own: on real enclave hardware these tunnel through privileged SBI
//! calls to a security monitor. This crate gives that boundary a concrete
//! shape as a handful of traits, plus an in-process software fallback so the
//! pipeline can be built, exercised and tested without real hardware.

mod traits;
pub use traits::{AccelBridge, BackingMedium, PageCipher, PageHasher};

#[cfg(feature = "software")]
mod software;
#[cfg(feature = "software")]
pub use software::{Aes256CtrCipher, InMemoryBackingMedium, Sha256Hasher, SoftwareAccel};

#[cfg(feature = "software")]
mod rng;
#[cfg(feature = "software")]
pub use rng::random_bytes;
