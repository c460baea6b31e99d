//! This module defines the options that configure the analysis routines, along with the
//! [`ParamError`] raised when numeric parameters are out of range.

use derivative::Derivative;
use rustc_hash::FxHashSet;

use crate::flow::{FctRecord, Port, PriorityClass};
use crate::units::{Bytes, Nanosecs};

/// The destination port carried by "normal" traffic.
pub const NORMAL_PORT: Port = Port::new(100);

/// The destination port carried by incast traffic.
pub const INCAST_PORT: Port = Port::new(200);

/// The default number of size buckets in a slowdown table.
pub const DEFAULT_NR_BUCKETS: usize = 20;

/// The default observation window. Flows finishing at or after this time are dropped.
pub const DEFAULT_TIME_LIMIT: Nanosecs = Nanosecs::new(4_000_000_000);

/// Maps traffic kinds to destination ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Derivative, serde::Serialize, serde::Deserialize)]
#[derivative(Default)]
pub struct PortConvention {
    #[derivative(Default(value = "NORMAL_PORT"))]
    pub normal: Port,
    #[derivative(Default(value = "INCAST_PORT"))]
    pub incast: Port,
}

/// Which traffic to consider, selected by destination port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Derivative, serde::Serialize, serde::Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "lowercase")]
pub enum TrafficKind {
    /// Flows to the normal port.
    Normal,
    /// Flows to the incast port.
    Incast,
    /// Every flow.
    #[derivative(Default)]
    All,
}

impl TrafficKind {
    /// The set of admissible destination ports, or `None` if every port is admissible.
    pub fn ports(&self, convention: PortConvention) -> Option<FxHashSet<Port>> {
        match self {
            TrafficKind::Normal => Some([convention.normal].into_iter().collect()),
            TrafficKind::Incast => Some([convention.incast].into_iter().collect()),
            TrafficKind::All => None,
        }
    }
}

/// A comparison group, e.g. the FCT trace of one congestion control variant.
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new, serde::Serialize, serde::Deserialize)]
pub struct Group {
    pub name: String,
    /// If set, only flows of this priority class are analyzed.
    #[serde(default)]
    pub priority: Option<PriorityClass>,
}

/// Analysis options shared by all comparison groups.
#[derive(Debug, Clone, typed_builder::TypedBuilder)]
pub struct AnalysisOpts {
    /// Which traffic to consider.
    #[builder(default)]
    pub traffic: TrafficKind,
    /// The port convention used to resolve `traffic`.
    #[builder(default)]
    pub ports: PortConvention,
    /// Only flows that finish strictly before this time are considered.
    #[builder(default = DEFAULT_TIME_LIMIT)]
    pub time_limit: Nanosecs,
    /// Inclusive lower bound on flow size.
    #[builder(default, setter(strip_option))]
    pub min_size: Option<Bytes>,
    /// Inclusive upper bound on flow size.
    #[builder(default, setter(strip_option))]
    pub max_size: Option<Bytes>,
    /// Number of equal-count size buckets.
    #[builder(default = DEFAULT_NR_BUCKETS)]
    pub nr_buckets: usize,
}

impl AnalysisOpts {
    /// Builds the record filter for one group.
    pub fn filter_for(&self, group: &Group) -> FlowFilter {
        FlowFilter {
            ports: self.traffic.ports(self.ports),
            priority: group.priority,
            time_limit: self.time_limit,
            min_size: self.min_size,
            max_size: self.max_size,
        }
    }
}

/// Converts a percentage step, as in "one bucket every 5%", into a bucket count.
pub fn buckets_from_step(step: usize) -> Result<usize, ParamError> {
    if step == 0 || step > 100 || 100 % step != 0 {
        return Err(ParamError::InvalidStep(step));
    }
    Ok(100 / step)
}

/// Decides which completed flows take part in an analysis.
#[derive(Debug, Clone, Default)]
pub struct FlowFilter {
    pub ports: Option<FxHashSet<Port>>,
    pub priority: Option<PriorityClass>,
    pub time_limit: Nanosecs,
    pub min_size: Option<Bytes>,
    pub max_size: Option<Bytes>,
}

impl FlowFilter {
    pub fn admits(&self, record: &FctRecord) -> bool {
        // Records without a priority field cannot be excluded by class.
        if let (Some(expected), Some(actual)) = (self.priority, record.priority) {
            if expected != actual {
                return false;
            }
        }
        if let Some(ports) = &self.ports {
            if !ports.contains(&record.dport) {
                return false;
            }
        }
        if record.end() >= self.time_limit {
            return false;
        }
        if self.min_size.is_some_and(|min| record.size < min) {
            return false;
        }
        if self.max_size.is_some_and(|max| record.size > max) {
            return false;
        }
        true
    }
}

/// An out-of-range numeric parameter.
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    /// A parameter that must be positive is not.
    #[error("{name} must be positive (got {value})")]
    NonPositive {
        /// The parameter name.
        name: &'static str,
        /// The offending value.
        value: f64,
    },

    /// The load factor is outside of (0, 1].
    #[error("load must be in (0, 1] (got {0})")]
    InvalidLoad(f64),

    /// The bucket step does not evenly divide 100.
    #[error(
        "bucket step must evenly divide 100 (got {0}); uneven steps, which would leave a short \
         final bucket, are not supported"
    )]
    InvalidStep(usize),

    /// The start offset would move generated flows before time zero.
    #[error("start offset of {offset}ns moves flows generated from {base} before time zero")]
    NegativeStart {
        /// The signed offset in nanoseconds.
        offset: i64,
        /// The clock value generation starts at.
        base: Nanosecs,
    },

    /// A time computed from the parameters does not fit in the nanosecond clock.
    #[error("{0} overflows the nanosecond clock")]
    ClockOverflow(&'static str),

    /// No comparison groups were given.
    #[error("at least one comparison group is required")]
    NoGroups,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(dport: u16, priority: Option<u32>, size: u64, start: u64, fct: u64) -> FctRecord {
        FctRecord {
            dport: Port::new(dport),
            priority: priority.map(PriorityClass::new),
            size: Bytes::new(size),
            start: Nanosecs::new(start),
            fct: Nanosecs::new(fct),
            ideal: Nanosecs::new(1),
        }
    }

    #[test]
    fn traffic_kind_selects_ports() {
        let opts = AnalysisOpts::builder().traffic(TrafficKind::Incast).build();
        let filter = opts.filter_for(&Group::new("cc".into(), None));
        assert!(filter.admits(&record(200, None, 10, 0, 10)));
        assert!(!filter.admits(&record(100, None, 10, 0, 10)));
        let opts = AnalysisOpts::builder().build();
        let filter = opts.filter_for(&Group::new("cc".into(), None));
        assert!(filter.admits(&record(100, None, 10, 0, 10)));
        assert!(filter.admits(&record(7, None, 10, 0, 10)));
    }

    #[test]
    fn late_flows_are_dropped() {
        let opts = AnalysisOpts::builder()
            .time_limit(Nanosecs::new(1_000))
            .build();
        let filter = opts.filter_for(&Group::new("cc".into(), None));
        assert!(filter.admits(&record(100, None, 10, 500, 499)));
        assert!(!filter.admits(&record(100, None, 10, 500, 500)));
    }

    #[test]
    fn priority_only_excludes_known_classes() {
        let opts = AnalysisOpts::builder().build();
        let filter = opts.filter_for(&Group::new("cc".into(), Some(PriorityClass::new(3))));
        assert!(filter.admits(&record(100, Some(3), 10, 0, 10)));
        assert!(!filter.admits(&record(100, Some(2), 10, 0, 10)));
        assert!(filter.admits(&record(100, None, 10, 0, 10)));
    }

    #[test]
    fn size_bounds_are_inclusive() {
        let opts = AnalysisOpts::builder()
            .min_size(Bytes::new(10))
            .max_size(Bytes::new(20))
            .build();
        let filter = opts.filter_for(&Group::new("cc".into(), None));
        assert!(!filter.admits(&record(100, None, 9, 0, 10)));
        assert!(filter.admits(&record(100, None, 10, 0, 10)));
        assert!(filter.admits(&record(100, None, 20, 0, 10)));
        assert!(!filter.admits(&record(100, None, 21, 0, 10)));
    }

    #[test]
    fn step_must_divide_100() {
        assert_eq!(buckets_from_step(5).unwrap(), 20);
        assert_eq!(buckets_from_step(25).unwrap(), 4);
        assert!(buckets_from_step(0).is_err());
        assert!(buckets_from_step(200).is_err());
        let err = buckets_from_step(30).unwrap_err();
        assert!(matches!(err, ParamError::InvalidStep(30)));
        assert!(err.to_string().contains("not supported"));
    }
}
