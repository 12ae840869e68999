//! Paging pipeline orchestrator (spec §4.7): wires the backing allocator,
//! pageout counter store, crypto envelope and Merkle tree into the two
//! operations a caller actually performs — evicting a page to backing
//! memory, and restoring one back with its integrity checked.

use accel_bridge::{PageCipher, PageHasher};
use tracing::{debug, instrument};

use crate::allocator::BackingAllocator;
use crate::config::PagingConfig;
use crate::counters::CounterStore;
use crate::crypto::CryptoEnvelope;
use crate::error::PagingError;
use crate::merkle::Tree;

/// The untrusted byte store backing pages are written to and read from,
/// addressed the same way [`BackingAllocator`] hands addresses out.
struct BackingStore {
    region_base: u64,
    page_size: usize,
    bytes: Vec<u8>,
}

impl BackingStore {
    fn new(region_base: u64, page_size: usize, num_pages: u64) -> Self {
        Self { region_base, page_size, bytes: vec![0u8; page_size * num_pages as usize] }
    }

    fn offset_of(&self, addr: u64) -> usize { (addr - self.region_base) as usize }

    fn write_page(&mut self, addr: u64, data: &[u8]) {
        let off = self.offset_of(addr);
        self.bytes[off..off + self.page_size].copy_from_slice(data);
    }

    fn read_page(&self, addr: u64) -> &[u8] {
        let off = self.offset_of(addr);
        &self.bytes[off..off + self.page_size]
    }
}

/// Ties the backing-slot allocator, the pageout counter store, the crypto
/// envelope and the Merkle index together behind two operations: evict and
/// restore (spec §4.7, "the paging pipeline").
pub struct PagingPipeline<H, C> {
    allocator: BackingAllocator,
    counters: CounterStore,
    crypto: CryptoEnvelope<H, C>,
    tree: Tree<H>,
    backing: BackingStore,
}

impl<H: PageHasher + Clone, C: PageCipher> PagingPipeline<H, C> {
    /// Build a pipeline over a backing region of `num_pages` page-sized
    /// slots starting at `region_base`.
    pub fn new(
        config: PagingConfig,
        region_base: u64,
        num_pages: u64,
        hasher: H,
        cipher: C,
    ) -> Result<Self, PagingError> {
        let allocator = BackingAllocator::new(region_base, config.page_size as u64, num_pages);
        let counters = CounterStore::new(config.page_size, config.counter_dir_len);
        let crypto = CryptoEnvelope::new(hasher.clone(), cipher, config.confidentiality);
        let nodes_per_chunk = (config.page_size / PagingConfig::NODE_SIZE).max(1);
        let tree = Tree::new(config.fanout, nodes_per_chunk, hasher)?;
        let backing = BackingStore::new(region_base, config.page_size, num_pages);
        Ok(Self { allocator, counters, crypto, tree, backing })
    }

    /// Evict `plaintext` to a freshly allocated backing slot: bump that
    /// slot's pageout counter, encrypt and hash the page under it, persist
    /// the ciphertext, and record the hash in the Merkle tree. Returns the
    /// backing address the page now lives at (spec §4.7 step 1–2).
    #[instrument(skip(self, plaintext))]
    pub fn evict(&mut self, plaintext: &[u8]) -> Result<u64, PagingError> {
        let addr = self.allocator.alloc_backing_slot().ok_or(PagingError::BackingRegionExhausted)?;
        let slot_index = self.allocator.slot_index_of(addr);

        let counter = self.counters.counter_mut(slot_index)?;
        *counter = counter.wrapping_add(1);
        let counter = *counter;

        let ciphertext = self.crypto.encrypt_page(plaintext, counter);
        let hash = self.crypto.hash_page(plaintext, counter);
        self.backing.write_page(addr, &ciphertext);
        self.tree.insert(addr, hash)?;

        debug!(addr, counter, "evicted page to backing slot");
        Ok(addr)
    }

    /// Restore the page at `addr`: decrypt it under its slot's current
    /// pageout counter, then verify the decrypted content against the
    /// Merkle-covered hash before handing it back (spec §4.7 step 3–4).
    #[instrument(skip(self))]
    pub fn restore(&mut self, addr: u64) -> Result<Vec<u8>, PagingError> {
        let slot_index = self.allocator.slot_index_of(addr);
        let counter = *self.counters.counter_mut(slot_index)?;

        let ciphertext = self.backing.read_page(addr);
        let plaintext = self.crypto.decrypt_page(ciphertext, counter);
        let expected_hash = self.crypto.hash_page(&plaintext, counter);

        self.tree.verify(addr, &expected_hash)?;
        debug!(addr, counter, "restored page from backing slot");
        Ok(plaintext)
    }

    /// The Merkle root hash, as a caller would cache it across restores.
    pub fn root_hash(&self) -> [u8; 32] { self.tree.root_hash() }

    /// Flip one byte of the ciphertext backing `addr`, simulating a
    /// hostile write to untrusted memory. For demos and tests only — real
    /// callers never get a handle onto the backing bytes directly.
    pub fn debug_corrupt_byte(&mut self, addr: u64, offset: usize) {
        let off = self.backing.offset_of(addr) + offset;
        self.backing.bytes[off] ^= 0xFF;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accel_bridge::{Aes256CtrCipher, Sha256Hasher};

    fn pipeline() -> PagingPipeline<Sha256Hasher, Aes256CtrCipher> {
        let config = PagingConfig { page_size: 64, fanout: 4, counter_dir_len: 8, confidentiality: true };
        PagingPipeline::new(config, 0x1000, 32, Sha256Hasher, Aes256CtrCipher).unwrap()
    }

    #[test]
    fn evict_then_restore_round_trips() {
        let mut p = pipeline();
        let page = vec![0x7A; 64];
        let addr = p.evict(&page).unwrap();
        assert_eq!(p.restore(addr).unwrap(), page);
    }

    #[test]
    fn many_evictions_each_restore_correctly() {
        let mut p = pipeline();
        let mut addrs = Vec::new();
        for tag in 0..20u8 {
            addrs.push((p.evict(&vec![tag; 64]).unwrap(), tag));
        }
        for (addr, tag) in addrs {
            assert_eq!(p.restore(addr).unwrap(), vec![tag; 64]);
        }
    }

    #[test]
    fn tampering_with_backing_ciphertext_is_caught_on_restore() {
        let mut p = pipeline();
        let page = vec![0x11; 64];
        let addr = p.evict(&page).unwrap();
        p.debug_corrupt_byte(addr, 0);
        assert!(p.restore(addr).is_err());
    }
}
