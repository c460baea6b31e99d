//! Total delivered bytes and flow counts per comparison group.

use log::info;

use crate::flow::FctRecord;
use crate::opts::{AnalysisOpts, Group};
use crate::units::Bytes;

/// The flows of one group that passed the filter.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ThroughputSummary {
    pub name: String,
    pub total_size: Bytes,
    pub nr_flows: usize,
}

impl ThroughputSummary {
    /// An all-zero summary, used for groups whose trace is unavailable.
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }
}

/// Sums the sizes of a group's flows. The port, time, and minimum size filters of `opts` apply;
/// priority classes and the maximum size do not.
pub fn aggregate(group: &Group, records: &[FctRecord], opts: &AnalysisOpts) -> ThroughputSummary {
    let mut filter = opts.filter_for(group);
    filter.priority = None;
    filter.max_size = None;
    let (total_size, nr_flows) = records
        .iter()
        .filter(|r| filter.admits(r))
        .fold((Bytes::ZERO, 0), |(total, n), r| (total + r.size, n + 1));
    info!("{} delivered {total_size} in {nr_flows} flows", group.name);
    ThroughputSummary {
        name: group.name.clone(),
        total_size,
        nr_flows,
    }
}
