//! Configuration constants for the paging core (spec §6).

/// Reference configuration for the paging pipeline.
///
/// The values match the reference implementation's constants exactly;
/// implementers are free to retune `fanout` (the spec requires only `D >=
/// 3`) but the rest are fixed by the on-disk/on-wire layout this crate
/// targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    /// Size, in bytes, of one backing/EPM page.
    pub page_size: usize,
    /// B+ tree fan-out `D`: max values per leaf, max `D+1` children per
    /// internal node.
    pub fanout: usize,
    /// Number of top-level pointers in the pageout counter directory (`M`).
    pub counter_dir_len: usize,
    /// Whether `encrypt_page`/`decrypt_page` actually run the cipher, or
    /// degrade to a byte copy (spec §4.3). The counter is consumed by
    /// `hash_page` either way.
    pub confidentiality: bool,
}

impl PagingConfig {
    /// Page size used throughout the reference: 4096 bytes.
    pub const PAGE_SIZE: usize = 4096;
    /// Reference fan-out.
    pub const FANOUT: usize = 5;
    /// Reference node size in bytes (a layout target, not load-bearing
    /// here; see spec §9's note on the arena chunk size).
    pub const NODE_SIZE: usize = 320;
    /// Reference counter-directory length.
    pub const COUNTER_DIR_LEN: usize = 960;

    /// Number of 64-bit counter slots addressable by one indirect page.
    pub fn counters_per_indirect_page(&self) -> usize { self.page_size / 8 }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: Self::PAGE_SIZE,
            fanout: Self::FANOUT,
            counter_dir_len: Self::COUNTER_DIR_LEN,
            confidentiality: true,
        }
    }
}
