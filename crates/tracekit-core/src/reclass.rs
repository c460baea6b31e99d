use crate::flow::{Flow, PriorityClass};
use crate::units::Bytes;

/// Moves flows from one priority class to another. If `below` is set, only flows strictly
/// smaller than it are moved. Returns the number of flows changed.
pub fn shift_priority(
    flows: &mut [Flow],
    from: PriorityClass,
    to: PriorityClass,
    below: Option<Bytes>,
) -> usize {
    let mut nr_changed = 0;
    for flow in flows
        .iter_mut()
        .filter(|f| f.priority == from && below.map_or(true, |max| f.size < max))
    {
        flow.priority = to;
        nr_changed += 1;
    }
    nr_changed
}
