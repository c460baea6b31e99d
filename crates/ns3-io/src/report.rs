//! Result tables consumed by the plotting scripts.

use std::fmt::Write;

use tracekit_core::{SlowdownTable, ThroughputSummary};

/// Header of the throughput table.
pub const THROUGHPUT_HEADER: &str = "CC\tTotal_Size(bytes)\tFlow_Count";

/// Renders a slowdown table, one line per bucket:
///
/// ```text
/// rank max_size<TAB>p50 p95 p99<TAB>p50 p95 p99 ...
/// ```
pub fn translate_slowdown_table(table: &SlowdownTable) -> String {
    let mut s = String::new();
    for row in table.rows() {
        write!(s, "{:.3} {}", row.rank, row.max_size.into_u64()).unwrap();
        for b in row.buckets {
            write!(s, "\t{:.3} {:.3} {:.3}", b.p50, b.p95, b.p99).unwrap();
        }
        writeln!(s).unwrap();
    }
    s
}

/// Renders a throughput table with a header line and one line per group.
pub fn translate_throughput(summaries: &[ThroughputSummary]) -> String {
    let mut s = String::new();
    writeln!(s, "{THROUGHPUT_HEADER}").unwrap();
    for t in summaries {
        writeln!(s, "{}\t{}\t{}", t.name, t.total_size.into_u64(), t.nr_flows).unwrap();
    }
    s
}

#[cfg(test)]
mod tests {
    use tracekit_core::{testing, units::Bytes, AnalysisOpts, Group};

    use super::*;

    #[test]
    fn translate_slowdown_table_correct() {
        let a = (1..=8)
            .map(|i| testing::record(i * 100, 1000 + 250 * i, 1000))
            .collect::<Vec<_>>();
        let b = (1..=3)
            .map(|i| testing::record(i * 10, 3000, 1000))
            .collect::<Vec<_>>();
        let (ga, gb) = (Group::new("a".into(), None), Group::new("b".into(), None));
        let opts = AnalysisOpts::builder().nr_buckets(4).build();
        let table = SlowdownTable::new([(&ga, &a[..]), (&gb, &b[..])], &opts).unwrap();
        insta::assert_snapshot!(translate_slowdown_table(&table), @r###"
        0.000 200	1.500 1.500 1.500	0.000 0.000 0.000
        0.250 400	2.000 2.000 2.000	3.000 3.000 3.000
        0.500 600	2.500 2.500 2.500	3.000 3.000 3.000
        0.750 800	3.000 3.000 3.000	3.000 3.000 3.000
        "###);
    }

    #[test]
    fn translate_throughput_correct() {
        let summaries = vec![
            ThroughputSummary {
                name: "cc_1_fct".into(),
                total_size: Bytes::new(123_456),
                nr_flows: 7,
            },
            ThroughputSummary::empty("bfc_fct"),
        ];
        insta::assert_snapshot!(translate_throughput(&summaries), @r###"
        CC	Total_Size(bytes)	Flow_Count
        cc_1_fct	123456	7
        bfc_fct	0	0
        "###);
    }
}
