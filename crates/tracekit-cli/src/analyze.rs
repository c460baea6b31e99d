//! The `slowdown` and `throughput` subcommands, which compare the FCT traces of several groups.

use std::path::{Path, PathBuf};

use anyhow::Context;
use indicatif::ProgressBar;
use log::{info, warn};
use tracekit_core::{
    opts::{buckets_from_step, DEFAULT_TIME_LIMIT},
    throughput,
    units::{Bytes, Nanosecs},
    AnalysisOpts, FctRecord, Group, SlowdownTable, TrafficKind,
};

use crate::groups::GroupArgs;

#[derive(Debug, Clone, clap::Args)]
pub struct FilterArgs {
    /// Directory containing the FCT files
    #[arg(short, long, default_value = ".")]
    pub directory: PathBuf,

    /// Traffic to consider: normal (0), incast (1), or all (2)
    #[arg(short = 't', long = "type", default_value = "all", value_parser = parse_traffic)]
    pub traffic: TrafficKind,

    /// Only consider flows that finish before this time (ns)
    #[arg(short = 'T', long, default_value_t = DEFAULT_TIME_LIMIT.into_u64())]
    pub time_limit: u64,

    /// Output file; defaults to a timestamped file in the FCT directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub groups: GroupArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct SlowdownArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Bucket width as a percentage of the flow count; must divide 100
    #[arg(short, long, default_value_t = 5)]
    pub step: usize,

    /// Only consider flows with size <= max_size (bytes)
    #[arg(short, long)]
    pub max_size: Option<u64>,

    /// Only consider flows with size >= min_size (bytes)
    #[arg(long)]
    pub min_size: Option<u64>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ThroughputArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Only consider flows with size >= min_size (bytes)
    #[arg(short, long, default_value_t = 0)]
    pub min_size: u64,
}

pub fn parse_traffic(s: &str) -> Result<TrafficKind, String> {
    match s {
        "0" | "normal" => Ok(TrafficKind::Normal),
        "1" | "incast" => Ok(TrafficKind::Incast),
        "2" | "all" => Ok(TrafficKind::All),
        _ => Err(format!("unknown traffic type {s:?} (expected normal, incast, or all)")),
    }
}

pub fn run_slowdown(args: SlowdownArgs) -> anyhow::Result<()> {
    let groups = args.filter.groups.resolve()?;
    let mut opts = AnalysisOpts::builder()
        .traffic(args.filter.traffic)
        .time_limit(Nanosecs::new(args.filter.time_limit))
        .nr_buckets(buckets_from_step(args.step)?)
        .build();
    opts.max_size = args.max_size.map(Bytes::new);
    opts.min_size = args.min_size.map(Bytes::new);

    let records = load_groups(&args.filter.directory, &groups)?;
    let table = SlowdownTable::new(groups.iter().zip(records.iter().map(Vec::as_slice)), &opts)?;
    let s = ns3_io::translate_slowdown_table(&table);
    print!("{s}");
    let output = output_path(&args.filter, "fct_analysis_result");
    ns3_io::write_atomic(&output, s)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!("Result written to {}", output.display());
    Ok(())
}

pub fn run_throughput(args: ThroughputArgs) -> anyhow::Result<()> {
    let groups = args.filter.groups.resolve()?;
    let opts = AnalysisOpts::builder()
        .traffic(args.filter.traffic)
        .time_limit(Nanosecs::new(args.filter.time_limit))
        .min_size(Bytes::new(args.min_size))
        .build();

    let records = load_groups(&args.filter.directory, &groups)?;
    let summaries = groups
        .iter()
        .zip(&records)
        .map(|(group, records)| throughput::aggregate(group, records, &opts))
        .collect::<Vec<_>>();
    let s = ns3_io::translate_throughput(&summaries);
    print!("{s}");
    let output = output_path(&args.filter, "throughput_analysis_result");
    ns3_io::write_atomic(&output, s)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!("Result written to {}", output.display());
    info!("Min size filter: >= {} bytes", args.min_size);
    Ok(())
}

/// Reads each group's FCT file. A missing file yields an empty group.
fn load_groups(dir: &Path, groups: &[Group]) -> anyhow::Result<Vec<Vec<FctRecord>>> {
    let bar = ProgressBar::new(groups.len() as u64);
    let mut all = Vec::with_capacity(groups.len());
    for group in groups {
        bar.set_message(format!("Reading {}", group.name));
        let path = dir.join(format!("{}.txt", group.name));
        let records = match ns3_io::read_fct_file(&path) {
            Ok(file) => file.records,
            Err(ns3_io::Error::MissingFile(path)) => {
                warn!("{} not found, skipping", path.display());
                Vec::new()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        all.push(records);
        bar.inc(1);
    }
    bar.finish_and_clear();
    Ok(all)
}

fn output_path(args: &FilterArgs, prefix: &str) -> PathBuf {
    args.output.clone().unwrap_or_else(|| {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        args.directory.join(format!("{prefix}_{timestamp}.txt"))
    })
}
