//! Fixtures shared by the tests of this and downstream crates. Downstream crates enable the
//! `testing` feature to use them.

use crate::edist::EmpiricalDist;
use crate::flow::{FctRecord, Flow, NodeId, Port, PriorityClass};
use crate::units::{Bytes, Nanosecs};

/// A three-breakpoint distribution: `[(100, 10), (1000, 50), (10000, 100)]`.
pub fn three_point_dist() -> EmpiricalDist {
    EmpiricalDist::from_breakpoints([(100.0, 10.0), (1000.0, 50.0), (10000.0, 100.0)])
        .expect("fixture CDF is valid")
}

/// One 1000-byte flow from `src` to node 2 at each of `starts` (in nanoseconds).
pub fn flows_at(src: NodeId, starts: &[u64]) -> Vec<Flow> {
    starts
        .iter()
        .map(|&start| Flow {
            src,
            dst: NodeId::new(2),
            priority: PriorityClass::new(2),
            dport: Port::new(100),
            size: Bytes::new(1000),
            start: Nanosecs::new(start),
        })
        .collect()
}

/// A completed normal-port flow with the given size, FCT and standalone FCT, started at 2 s.
pub fn record(size: u64, fct: u64, ideal: u64) -> FctRecord {
    FctRecord {
        dport: Port::new(100),
        priority: Some(PriorityClass::new(3)),
        size: Bytes::new(size),
        start: Nanosecs::new(2_000_000_000),
        fct: Nanosecs::new(fct),
        ideal: Nanosecs::new(ideal),
    }
}
