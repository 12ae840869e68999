//! Subcommands for the `pager-cli` binary

use anyhow::Result;
use clap::Subcommand;

mod demo;
mod tamper;

pub(crate) trait PagerSubcommandDispatcher {
    /// Dispatches the subcommand
    fn dispatch(self) -> Result<()>;
}

/// The subcommands for the `pager-cli` binary
#[derive(Subcommand, Debug)]
pub(crate) enum PagerSubcommand {
    Demo(demo::DemoArgs),
    Tamper(tamper::TamperArgs),
}

impl PagerSubcommandDispatcher for PagerSubcommand {
    fn dispatch(self) -> Result<()> {
        match self {
            PagerSubcommand::Demo(args) => args.dispatch(),
            PagerSubcommand::Tamper(args) => args.dispatch(),
        }
    }
}
