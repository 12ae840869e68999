//! Pageout counter store (spec §4.2): a lazily-populated two-level table
//! mapping each backing slot to a monotonic 64-bit counter.

use accel_bridge::random_bytes;

use crate::error::PagingError;

/// Two-level indirect table of per-backing-slot pageout counters.
///
/// Indirect pages are allocated lazily and filled with random bytes on
/// first touch, so that counters start at an unpredictable value (spec
/// §4.2) — this is what gives rollback detection teeth before the first
/// legitimate eviction to a slot.
pub struct CounterStore {
    page_size: usize,
    /// `M` top-level slots, each either empty or a boxed indirect page of
    /// `page_size / 8` counters.
    indirect: Vec<Option<Box<[u64]>>>,
}

impl CounterStore {
    /// Build a store sized for `directory_len` (`M`) top-level indirect
    /// pointers, each covering `page_size / 8` backing slots.
    pub fn new(page_size: usize, directory_len: usize) -> Self {
        let mut indirect = Vec::with_capacity(directory_len);
        indirect.resize_with(directory_len, || None);
        Self { page_size, indirect }
    }

    fn counters_per_page(&self) -> usize { self.page_size / 8 }

    /// Returns a mutable reference to the counter for backing-slot index
    /// `slot_index` (i.e. `(addr - region_base) / page_size`), allocating
    /// and randomizing the backing indirect page on first touch.
    ///
    /// Returns [`PagingError::ConfigTooSmall`] if the directory is
    /// undersized for this backing region — a configuration error, fatal
    /// on the first offending slot (spec §4.2).
    pub fn counter_mut(&mut self, slot_index: u64) -> Result<&mut u64, PagingError> {
        let per_page = self.counters_per_page() as u64;
        let top = (slot_index / per_page) as usize;
        let inner = (slot_index % per_page) as usize;

        if top >= self.indirect.len() {
            return Err(PagingError::ConfigTooSmall { slot_index, directory_len: self.indirect.len() });
        }

        let page = self.indirect[top].get_or_insert_with(|| random_indirect_page(per_page as usize));

        Ok(&mut page[inner])
    }
}

/// Allocate a fresh indirect page filled with cryptographically random
/// 64-bit values, so counters begin unpredictable (spec §4.2).
fn random_indirect_page(len: usize) -> Box<[u64]> {
    let mut raw = vec![0u8; len * 8];
    random_bytes(&mut raw);
    raw.chunks_exact(8).map(|c| u64::from_le_bytes(c.try_into().unwrap())).collect()
}
