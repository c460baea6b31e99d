//! Core data structures and routines. The most common entry points are
//! [WorkloadSpec::generate()], which samples a synthetic workload, and [SlowdownTable::new()],
//! which buckets completed flows by size.

pub use tracekit_core::*;
