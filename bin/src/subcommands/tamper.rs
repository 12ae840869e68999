//! The `tamper` subcommand for the pager-cli binary

use anyhow::Result;
use clap::Args;

use accel_bridge::{Aes256CtrCipher, Sha256Hasher};
use paging_core::{PagingConfig, PagingPipeline};

use super::PagerSubcommandDispatcher;

/// Command line arguments for `pager-cli tamper`
#[derive(Args, Debug)]
#[command(author, version, about)]
pub(crate) struct TamperArgs {}

impl PagerSubcommandDispatcher for TamperArgs {
    fn dispatch(self) -> Result<()> {
        let config = PagingConfig::default();
        let mut pipeline = PagingPipeline::new(config, 0x8000_0000, 16, Sha256Hasher, Aes256CtrCipher)?;

        let page = vec![0x42u8; config.page_size];
        let addr = pipeline.evict(&page)?;
        tracing::info!(target: "pager-cli::tamper", "evicted page to backing addr {addr:#x}");

        let restored = pipeline.restore(addr)?;
        assert_eq!(restored, page);
        tracing::info!(target: "pager-cli::tamper", "restore without tampering succeeded, as expected");

        pipeline.debug_corrupt_byte(addr, 0);
        tracing::warn!(target: "pager-cli::tamper", "flipped one ciphertext byte at backing addr {addr:#x}");

        match pipeline.restore(addr) {
            Ok(_) => anyhow::bail!("tampering went undetected — this should never happen"),
            Err(err) => tracing::info!(target: "pager-cli::tamper", "restore correctly rejected the tampered page: {err}"),
        }

        Ok(())
    }
}
