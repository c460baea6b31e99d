//! Flow trace files, the input format of the ns-3 simulation.
//!
//! ```text
//! <number of flows>
//! src0 dst0 priority0 dport0 size0 start_time0
//! src1 dst1 priority1 dport1 size1 start_time1
//! ...
//! ```
//!
//! Start times are in seconds with nine decimal digits.

use std::fmt::Write;
use std::path::Path;

use tracekit_core::{
    units::{Nanosecs, Secs9},
    Flow,
};

use crate::{field, Error, MalformedLine, SkipReport};

const NR_TRACE_FIELDS: usize = 6;

/// The contents of a flow trace file.
#[derive(Debug, Clone, Default)]
pub struct TraceFile {
    /// The flow count declared on the first line, if it parses.
    pub declared: Option<usize>,
    /// The flows, in file order.
    pub flows: Vec<Flow>,
    /// Lines that could not be parsed.
    pub skipped: SkipReport,
}

/// Reads a flow trace file.
pub fn read_flows(path: impl AsRef<Path>) -> Result<TraceFile, Error> {
    let path = path.as_ref();
    let s = crate::read_input(path)?;
    let trace = parse_flows(&s);
    trace.skipped.log(path);
    if let Some(declared) = trace.declared {
        if declared != trace.flows.len() {
            log::warn!(
                "{}: header declares {declared} flows but {} were read",
                path.display(),
                trace.flows.len()
            );
        }
    }
    Ok(trace)
}

/// Parses a flow trace. The first line is the flow count and is only informational.
pub fn parse_flows(s: &str) -> TraceFile {
    let mut lines = s.lines();
    let declared = lines.next().and_then(|l| l.trim().parse().ok());
    let mut flows = Vec::new();
    let mut skipped = SkipReport::default();
    for (i, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_flow(line) {
            Ok(flow) => flows.push(flow),
            // Line numbers are one-based and the header is line 1.
            Err(e) => skipped.record(i + 2, e),
        }
    }
    TraceFile {
        declared,
        flows,
        skipped,
    }
}

fn parse_flow(s: &str) -> Result<Flow, MalformedLine> {
    let fields = s.split_whitespace().collect::<Vec<_>>();
    if fields.len() < NR_TRACE_FIELDS {
        return Err(MalformedLine::WrongNrFields {
            expected: NR_TRACE_FIELDS,
            got: fields.len(),
        });
    }
    let start: f64 = field(&fields, 5)?;
    Ok(Flow::new(
        field(&fields, 0)?,
        field(&fields, 1)?,
        field(&fields, 2)?,
        field(&fields, 3)?,
        field(&fields, 4)?,
        Nanosecs::from_secs_f64(start),
    ))
}

/// Renders flows in the trace format.
pub fn translate_flows(flows: &[Flow]) -> String {
    let mut s = String::new();
    // First line: # of flows
    writeln!(s, "{}", flows.len()).unwrap();
    // src dst priority dport size start_time
    for f in flows {
        writeln!(
            s,
            "{} {} {} {} {} {}",
            f.src,
            f.dst,
            f.priority,
            f.dport,
            f.size.into_u64(),
            Secs9(f.start)
        )
        .unwrap();
    }
    s
}

/// Writes flows to a trace file, replacing it atomically.
pub fn write_flows(path: impl AsRef<Path>, flows: &[Flow]) -> Result<(), Error> {
    crate::write_atomic(path, translate_flows(flows))
}

#[cfg(test)]
mod tests {
    use tracekit_core::{units::Bytes, NodeId, Port, PriorityClass};

    use super::*;

    fn flows() -> Vec<Flow> {
        vec![
            Flow::new(
                NodeId::new(0),
                NodeId::new(2),
                PriorityClass::new(3),
                Port::new(100),
                Bytes::new(1234),
                Nanosecs::new(2_000_000_000),
            ),
            Flow::new(
                NodeId::new(1),
                NodeId::new(3),
                PriorityClass::new(2),
                Port::new(100),
                Bytes::new(5678),
                Nanosecs::new(2_000_012_345),
            ),
        ]
    }

    #[test]
    fn translate_flows_correct() {
        let s = translate_flows(&flows());
        insta::assert_snapshot!(s, @r###"
        2
        0 2 3 100 1234 2.000000000
        1 3 2 100 5678 2.000012345
        "###);
    }

    #[test]
    fn parse_flows_reads_translated_trace() {
        let trace = parse_flows(&translate_flows(&flows()));
        assert_eq!(trace.declared, Some(2));
        assert_eq!(trace.flows, flows());
        assert_eq!(trace.skipped.nr_skipped, 0);
    }

    #[test]
    fn malformed_lines_are_skipped_and_counted() {
        let s = "4 \n0 2 3 100 1234 2.5\n0 2 3 100\n\n1 3 2 100 x 2.6\n1 3 2 100 0 2.7\n";
        let trace = parse_flows(s);
        assert_eq!(trace.declared, Some(4));
        assert_eq!(trace.flows.len(), 2);
        // Zero-byte flows are coerced to one byte.
        assert_eq!(trace.flows[1].size, Bytes::ONE);
        assert_eq!(trace.flows[1].start, Nanosecs::new(2_700_000_000));
        assert_eq!(trace.skipped.nr_skipped, 2);
        assert_eq!(
            trace.skipped.first,
            Some((3, MalformedLine::WrongNrFields { expected: 6, got: 4 }))
        );
    }

    #[test]
    fn empty_trace_has_no_flows() {
        let trace = parse_flows("");
        assert_eq!(trace.declared, None);
        assert!(trace.flows.is_empty());
        assert_eq!(translate_flows(&[]), "0\n");
    }
}
