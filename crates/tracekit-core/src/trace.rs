//! Time-ordered flow traces and the merge that combines them.

use itertools::Itertools;

use crate::flow::Flow;

/// A sequence of flows sorted by start time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowTrace {
    flows: Vec<Flow>,
}

impl FlowTrace {
    /// Creates a trace from flows that are already sorted by start time, or returns them back if
    /// they are not.
    pub fn from_sorted(flows: Vec<Flow>) -> Result<Self, Vec<Flow>> {
        if is_sorted(&flows) {
            Ok(Self { flows })
        } else {
            Err(flows)
        }
    }

    /// Creates a trace, sorting the flows by start time. The sort is stable, so flows starting
    /// at the same time keep their relative order.
    pub fn from_unsorted(mut flows: Vec<Flow>) -> Self {
        flows.sort_by_key(|f| f.start);
        Self { flows }
    }

    /// Merges two traces in linear time. Flows from `self` come before flows from `other` that
    /// start at the same time.
    pub fn merge(self, other: FlowTrace) -> FlowTrace {
        FlowTrace {
            flows: merge(self.flows, other.flows),
        }
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn flows_mut(&mut self) -> &mut [Flow] {
        &mut self.flows
    }

    pub fn into_flows(self) -> Vec<Flow> {
        self.flows
    }

    delegate::delegate! {
        to self.flows {
            pub fn len(&self) -> usize;
            pub fn is_empty(&self) -> bool;
            pub fn first(&self) -> Option<&Flow>;
            pub fn last(&self) -> Option<&Flow>;
            pub fn iter(&self) -> std::slice::Iter<'_, Flow>;
        }
    }
}

/// Merges two start-time-sorted flow sequences into one sorted sequence.
///
/// PRECONDITION: `a` and `b` are each sorted by start time.
pub fn merge<A, B>(a: A, b: B) -> Vec<Flow>
where
    A: IntoIterator<Item = Flow>,
    B: IntoIterator<Item = Flow>,
{
    // Ties go to `a`.
    a.into_iter()
        .merge_by(b, |x, y| x.start <= y.start)
        .collect()
}

pub(crate) fn is_sorted(flows: &[Flow]) -> bool {
    flows.windows(2).all(|w| w[0].start <= w[1].start)
}
