//! Rewrites the priority class of flows in a trace.

use std::path::PathBuf;

use anyhow::Context;
use log::info;
use tracekit_core::{reclass, units::Bytes, PriorityClass};

#[derive(Debug, Clone, clap::Args)]
pub struct ReprioritizeArgs {
    /// Input trace
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output trace
    #[arg(short, long)]
    pub output: PathBuf,

    /// Class to move flows out of
    #[arg(long, default_value_t = 2)]
    pub from: u32,

    /// Class to move flows into
    #[arg(long, default_value_t = 3)]
    pub to: u32,

    /// Only move flows smaller than this many bytes
    #[arg(short, long)]
    pub size_threshold: Option<u64>,
}

pub fn run(args: ReprioritizeArgs) -> anyhow::Result<()> {
    let mut trace = ns3_io::read_flows(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    info!("Total number of flows: {}", trace.flows.len());
    let nr_changed = reclass::shift_priority(
        &mut trace.flows,
        PriorityClass::new(args.from),
        PriorityClass::new(args.to),
        args.size_threshold.map(Bytes::new),
    );
    ns3_io::write_flows(&args.output, &trace.flows)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    match args.size_threshold {
        Some(max) => info!(
            "Changed {nr_changed} flows from priority {} to {} (size < {max})",
            args.from, args.to
        ),
        None => info!(
            "Changed {nr_changed} flows from priority {} to {}",
            args.from, args.to
        ),
    }
    info!("Output written to {}", args.output.display());
    Ok(())
}
