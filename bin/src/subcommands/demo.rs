//! The `demo` subcommand for the pager-cli binary

use anyhow::Result;
use clap::Args;

use accel_bridge::{Aes256CtrCipher, Sha256Hasher};
use paging_core::{PagingConfig, PagingPipeline};

use super::PagerSubcommandDispatcher;

/// Command line arguments for `pager-cli demo`
#[derive(Args, Debug)]
#[command(author, version, about)]
pub(crate) struct DemoArgs {
    /// Number of pages to evict before restoring them all back.
    #[arg(long, default_value = "12")]
    pages: u32,

    /// B+ tree fan-out to demo a split with. Low values make a split
    /// visible after only a few evictions.
    #[arg(long, default_value = "4")]
    fanout: usize,
}

impl PagerSubcommandDispatcher for DemoArgs {
    fn dispatch(self) -> Result<()> {
        let config = PagingConfig { fanout: self.fanout, ..PagingConfig::default() };
        let mut pipeline =
            PagingPipeline::new(config, 0x8000_0000, self.pages as u64 * 2, Sha256Hasher, Aes256CtrCipher)?;

        tracing::info!(target: "pager-cli::demo", "evicting {} pages (fanout {})", self.pages, self.fanout);

        let mut addrs = Vec::new();
        for i in 0..self.pages {
            let page = vec![i as u8; config.page_size];
            let addr = pipeline.evict(&page)?;
            tracing::info!(target: "pager-cli::demo", "evicted page {i} -> backing addr {addr:#x}");
            addrs.push((addr, page));
        }

        tracing::info!(target: "pager-cli::demo", "root hash after eviction: {}", hex(&pipeline.root_hash()));

        for (addr, expected) in addrs {
            let restored = pipeline.restore(addr)?;
            assert_eq!(restored, expected, "restored page must match what was evicted");
            tracing::info!(target: "pager-cli::demo", "restored and verified backing addr {addr:#x}");
        }

        tracing::info!(target: "pager-cli::demo", "all pages restored and verified");
        Ok(())
    }
}

fn hex(bytes: &[u8; 32]) -> String { bytes.iter().map(|b| format!("{b:02x}")).collect() }
