//! The `tracekit` command line tool. Each subcommand reads its inputs, hands them to
//! `tracekit-core`, and writes the result atomically.

#![warn(unreachable_pub, missing_debug_implementations)]

pub mod analyze;
pub mod bandwidth;
pub mod gen;
pub mod groups;
pub mod reprioritize;

/// Synthesize and analyze ns-3 flow traces.
#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Add synthetic Poisson traffic to a background trace
    Gen(gen::GenArgs),
    /// Bucket flows by size and report slowdown percentiles per group
    Slowdown(analyze::SlowdownArgs),
    /// Report delivered bytes and flow counts per group
    Throughput(analyze::ThroughputArgs),
    /// Move flows of a trace from one priority class to another
    Reprioritize(reprioritize::ReprioritizeArgs),
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Gen(args) => gen::run(args),
        Command::Slowdown(args) => analyze::run_slowdown(args),
        Command::Throughput(args) => analyze::run_throughput(args),
        Command::Reprioritize(args) => reprioritize::run(args),
    }
}
