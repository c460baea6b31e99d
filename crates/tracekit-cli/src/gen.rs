//! Adds synthetic Poisson traffic to a background trace.

use std::path::PathBuf;

use anyhow::Context;
use log::{info, warn};
use rand::prelude::*;
use rustc_hash::FxHashMap;
use tracekit_core::{
    units::{BitsPerSec, Nanosecs, Secs9},
    Flow, FlowTrace, NodeId, WorkloadSpec,
};

use crate::bandwidth::parse_bandwidth;

/// Endpoints of shared-mode traffic when the background trace is empty.
const SHARED_FALLBACK: (NodeId, NodeId) = (NodeId::new(0), NodeId::new(2));

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Synthetic traffic uses its own sender and receiver (`--src`, `--dst`)
    Independent,
    /// Synthetic traffic shares the endpoints of the first background flow
    Shared,
}

#[derive(Debug, Clone, clap::Args)]
pub struct GenArgs {
    /// Background trace
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output trace
    #[arg(short, long)]
    pub output: PathBuf,

    /// Synthetic traffic load, as a fraction of the link bandwidth
    #[arg(long, default_value_t = 0.5)]
    pub load: f64,

    #[arg(long, value_enum, default_value_t = Mode::Independent)]
    pub mode: Mode,

    /// Flow size CDF
    #[arg(short, long, default_value = "dist_cdf/WebSearch_distribution.txt")]
    pub cdf: PathBuf,

    /// Link bandwidth, e.g. 10G
    #[arg(short, long, default_value = "10G", value_parser = parse_bandwidth)]
    pub bandwidth: BitsPerSec,

    /// Generation window in seconds
    #[arg(short, long, default_value_t = 10.0)]
    pub time: f64,

    /// Offset added to synthetic start times, in seconds; may be negative
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub start_offset: f64,

    /// Clock value at which generation starts, in seconds
    #[arg(long, default_value_t = 2.0)]
    pub base_time: f64,

    /// Synthetic source node (independent mode)
    #[arg(long, default_value_t = 1)]
    pub src: usize,

    /// Synthetic destination node (independent mode)
    #[arg(long, default_value_t = 3)]
    pub dst: usize,

    /// Only copy the background traffic
    #[arg(long)]
    pub no_synthetic: bool,

    /// Random seed; omit for a non-reproducible run
    #[arg(short, long)]
    pub seed: Option<u64>,
}

pub fn run(args: GenArgs) -> anyhow::Result<()> {
    info!("Reading background traffic from {}", args.input.display());
    let background = ns3_io::read_flows(&args.input)
        .with_context(|| format!("failed to read background trace {}", args.input.display()))?;
    info!("  Background flows: {}", background.flows.len());
    let background = FlowTrace::from_sorted(background.flows).unwrap_or_else(|flows| {
        warn!("Background trace is not sorted by start time; sorting it");
        FlowTrace::from_unsorted(flows)
    });

    let synthetic = if args.no_synthetic {
        info!("Skipping synthetic traffic generation");
        FlowTrace::default()
    } else {
        let (src, dst) = match args.mode {
            Mode::Independent => (NodeId::new(args.src), NodeId::new(args.dst)),
            Mode::Shared => background
                .first()
                .map(|f| (f.src, f.dst))
                .unwrap_or(SHARED_FALLBACK),
        };
        let dist = ns3_io::read_cdf(&args.cdf)
            .with_context(|| format!("failed to read CDF {}", args.cdf.display()))?;
        let spec = WorkloadSpec::builder()
            .load(args.load)
            .bandwidth(args.bandwidth)
            .duration(Nanosecs::from_secs_f64(args.time))
            .src(src)
            .dst(dst)
            .start_offset(offset_from_secs(args.start_offset)?)
            .base_time(Nanosecs::from_secs_f64(args.base_time))
            .build();
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let flows = spec.generate(&dist, &mut rng)?;
        info!("  Synthetic flows: {}", flows.len());
        FlowTrace::from_unsorted(flows)
    };

    let merged = background.merge(synthetic);
    ns3_io::write_flows(&args.output, merged.flows())
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!("Wrote {} flows to {}", merged.len(), args.output.display());
    log_statistics(merged.flows());
    Ok(())
}

/// Converts a signed offset in seconds into whole nanoseconds.
fn offset_from_secs(secs: f64) -> anyhow::Result<i64> {
    let ns = (secs * 1e9).round();
    anyhow::ensure!(
        ns.is_finite() && ns.abs() < i64::MAX as f64,
        "start offset {secs}s is out of range"
    );
    Ok(ns as i64)
}

fn log_statistics(flows: &[Flow]) {
    let (Some(first), Some(last)) = (flows.first(), flows.last()) else {
        return;
    };
    info!("Time range: {}s - {}s", Secs9(first.start), Secs9(last.start));
    let mut pairs = FxHashMap::default();
    for f in flows {
        *pairs.entry((f.src, f.dst)).or_insert(0usize) += 1;
    }
    let mut pairs = pairs.into_iter().collect::<Vec<_>>();
    pairs.sort();
    for ((src, dst), count) in pairs {
        info!("  {src}->{dst}: {count} flows");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_keep_their_sign() -> anyhow::Result<()> {
        assert_eq!(offset_from_secs(0.0)?, 0);
        assert_eq!(offset_from_secs(1.5)?, 1_500_000_000);
        assert_eq!(offset_from_secs(-1.0)?, -1_000_000_000);
        assert!(offset_from_secs(f64::NAN).is_err());
        assert!(offset_from_secs(1e30).is_err());
        Ok(())
    }
}
