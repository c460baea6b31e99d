//! Flow records on both sides of a simulation: [`Flow`]s are simulation inputs and
//! [`FctRecord`]s are what a completed simulation reports for each flow.

use std::cmp::Ordering;

use crate::units::{Bytes, Nanosecs};

identifier!(NodeId, usize);
identifier!(PriorityClass, u32);
identifier!(Port, u16);

/// A flow to be simulated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Flow {
    pub src: NodeId,
    pub dst: NodeId,
    pub priority: PriorityClass,
    pub dport: Port,
    pub size: Bytes,
    pub start: Nanosecs,
}

impl Flow {
    /// Creates a flow, coercing a zero size to one byte.
    pub fn new(
        src: NodeId,
        dst: NodeId,
        priority: PriorityClass,
        dport: Port,
        size: Bytes,
        start: Nanosecs,
    ) -> Self {
        Self {
            src,
            dst,
            priority,
            dport,
            size: std::cmp::max(size, Bytes::ONE),
            start,
        }
    }
}

/// A completed flow as reported by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FctRecord {
    pub dport: Port,
    /// Absent in trace layouts that do not carry a priority field.
    pub priority: Option<PriorityClass>,
    pub size: Bytes,
    pub start: Nanosecs,
    pub fct: Nanosecs,
    /// The standalone completion time.
    pub ideal: Nanosecs,
}

impl FctRecord {
    /// The time at which the flow finished.
    pub fn end(&self) -> Nanosecs {
        self.start + self.fct
    }

    /// The ratio of the FCT to the standalone FCT, never below 1. A zero standalone FCT carries
    /// no information and yields exactly 1.
    pub fn slowdown(&self) -> f64 {
        if self.ideal == Nanosecs::ZERO {
            return 1.0;
        }
        let slowdown = self.fct.into_f64() / self.ideal.into_f64();
        // Some of these cases are possible because of rounding in the simulator
        match slowdown.partial_cmp(&1.0) {
            Some(Ordering::Greater) => slowdown,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fct: u64, ideal: u64) -> FctRecord {
        FctRecord {
            dport: Port::new(100),
            priority: None,
            size: Bytes::new(1000),
            start: Nanosecs::new(2_000_000_000),
            fct: Nanosecs::new(fct),
            ideal: Nanosecs::new(ideal),
        }
    }

    #[test]
    fn zero_ideal_slowdown_is_one() {
        assert_eq!(record(12_345, 0).slowdown(), 1.0);
        assert_eq!(record(0, 0).slowdown(), 1.0);
    }

    #[test]
    fn slowdown_is_floored() {
        assert_eq!(record(900, 1000).slowdown(), 1.0);
        assert_eq!(record(1000, 1000).slowdown(), 1.0);
        assert_eq!(record(2500, 1000).slowdown(), 2.5);
    }

    #[test]
    fn zero_size_flow_is_coerced() {
        let flow = Flow::new(
            NodeId::new(0),
            NodeId::new(1),
            PriorityClass::new(2),
            Port::new(100),
            Bytes::ZERO,
            Nanosecs::ZERO,
        );
        assert_eq!(flow.size, Bytes::ONE);
    }
}
