#![warn(unreachable_pub, missing_debug_implementations)]

//! The core tracekit library. It synthesizes flow workloads from [empirical size
//! distributions](edist::EmpiricalDist) and [Poisson arrivals](arrival::ArrivalProcess), merges
//! them into background traces, and turns completed-simulation records into
//! [slowdown tables](analysis::SlowdownTable).

#[macro_use]
mod ident;

pub mod analysis;
pub mod arrival;
pub mod edist;
pub mod flow;
pub mod opts;
pub mod reclass;
pub mod throughput;
pub mod trace;
pub mod units;
pub mod workload;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use analysis::{PercentileBucket, SlowdownTable};
pub use arrival::ArrivalProcess;
pub use edist::{EDistError, EmpiricalDist};
pub use flow::{FctRecord, Flow, NodeId, Port, PriorityClass};
pub use opts::{AnalysisOpts, Group, ParamError, PortConvention, TrafficKind};
pub use throughput::ThroughputSummary;
pub use trace::FlowTrace;
pub use workload::{ClassPolicy, WorkloadSpec};
