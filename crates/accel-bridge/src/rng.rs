//! Cryptographic randomness, matching spec §6's `random_bytes(buf, n)`.

use rand::RngCore;

/// Fill `buf` with cryptographically random bytes.
///
/// Used to seed pageout counters with an unpredictable initial value (spec
/// §4.2) and to establish the boot key (spec §4.3).
pub fn random_bytes(buf: &mut [u8]) { rand::thread_rng().fill_bytes(buf); }
