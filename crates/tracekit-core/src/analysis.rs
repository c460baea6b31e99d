//! Percentile-binned slowdown analysis.
//!
//! For every comparison group, the surviving flows are sorted by size and cut into buckets of
//! equal count (by rank, not by size value). Each bucket reports its largest flow size and the
//! median, 95th, and 99th percentile slowdowns. Buckets are indexed the same way in every group,
//! so rows of a [`SlowdownTable`] line up across groups even though their size ranges differ.

use std::ops::Range;

use log::info;
use ordered_float::OrderedFloat;

use crate::flow::FctRecord;
use crate::opts::{AnalysisOpts, FlowFilter, Group, ParamError};
use crate::units::Bytes;

/// The percentiles reported for each bucket.
pub const PERCENTILES: [f64; 3] = [0.50, 0.95, 0.99];

/// One equal-count bucket of a group's flows.
#[derive(Debug, Default, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PercentileBucket {
    /// The size of the largest flow in the bucket.
    pub max_size: Bytes,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub nr_flows: usize,
}

/// The analysis of one comparison group.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GroupSlowdowns {
    pub name: String,
    pub buckets: Vec<PercentileBucket>,
    /// Flows that survived the filter.
    pub nr_flows: usize,
    /// Total size of the flows that survived the filter.
    pub total_size: Bytes,
}

/// Slowdown percentiles of several comparison groups over a shared bucket axis.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SlowdownTable {
    nr_buckets: usize,
    groups: Vec<GroupSlowdowns>,
}

impl SlowdownTable {
    /// Analyzes each group's records. `groups` yields the groups in output column order; a group
    /// whose records are unavailable can be passed with an empty slice.
    pub fn new<'a, I>(groups: I, opts: &AnalysisOpts) -> Result<Self, ParamError>
    where
        I: IntoIterator<Item = (&'a Group, &'a [FctRecord])>,
    {
        if opts.nr_buckets == 0 {
            return Err(ParamError::NonPositive {
                name: "bucket count",
                value: 0.0,
            });
        }
        let groups = groups
            .into_iter()
            .map(|(group, records)| {
                let filter = opts.filter_for(group);
                analyze_group(&group.name, records, &filter, opts.nr_buckets)
            })
            .collect::<Vec<_>>();
        if groups.is_empty() {
            return Err(ParamError::NoGroups);
        }
        Ok(Self {
            nr_buckets: opts.nr_buckets,
            groups,
        })
    }

    pub fn nr_buckets(&self) -> usize {
        self.nr_buckets
    }

    pub fn groups(&self) -> &[GroupSlowdowns] {
        &self.groups
    }

    /// The rows of the table, one per bucket index.
    pub fn rows(&self) -> impl Iterator<Item = SlowdownRow<'_>> + '_ {
        (0..self.nr_buckets).map(move |i| SlowdownRow {
            rank: i as f64 / self.nr_buckets as f64,
            // Rows are labelled with the first group's bucket boundary.
            max_size: self.groups[0].buckets[i].max_size,
            buckets: self.groups.iter().map(|g| &g.buckets[i]).collect(),
        })
    }
}

/// One row of a [`SlowdownTable`].
#[derive(Debug)]
pub struct SlowdownRow<'a> {
    /// The lower rank bound of the bucket as a fraction of the flow count.
    pub rank: f64,
    pub max_size: Bytes,
    /// The bucket of each group, in group order.
    pub buckets: Vec<&'a PercentileBucket>,
}

/// Filters one group's records and computes its bucketed slowdown percentiles.
pub fn analyze_group(
    name: &str,
    records: &[FctRecord],
    filter: &FlowFilter,
    nr_buckets: usize,
) -> GroupSlowdowns {
    let mut flows = records
        .iter()
        .filter(|r| filter.admits(r))
        .map(|r| (r.size, r.slowdown()))
        .collect::<Vec<_>>();
    let total_size = flows.iter().map(|&(size, _)| size).sum::<Bytes>();
    info!("{name} has {} flows ({total_size})", flows.len());
    // Stable, so equal sizes keep file order.
    flows.sort_by_key(|&(size, _)| size);
    let n = flows.len();
    let buckets = (0..nr_buckets)
        .map(|i| {
            let range = bucket_range(i, n, nr_buckets);
            summarize(&flows[range])
        })
        .collect();
    GroupSlowdowns {
        name: name.to_owned(),
        buckets,
        nr_flows: n,
        total_size,
    }
}

/// The rank range of bucket `i` out of `k` over `n` sorted flows.
pub fn bucket_range(i: usize, n: usize, k: usize) -> Range<usize> {
    (i * n / k)..((i + 1) * n / k)
}

/// The element at rank `floor(len * p)` of sorted `points`, without interpolation.
///
/// PRECONDITION: `points` is non-empty and sorted, and `p` is in `[0, 1)`.
pub fn percentile<T: Copy>(points: &[T], p: f64) -> T {
    let i = (points.len() as f64 * p) as usize;
    points[i]
}

fn summarize(flows: &[(Bytes, f64)]) -> PercentileBucket {
    let Some(&(max_size, _)) = flows.last() else {
        return PercentileBucket::default();
    };
    let mut slowdowns = flows
        .iter()
        .map(|&(_, s)| OrderedFloat(s))
        .collect::<Vec<_>>();
    slowdowns.sort();
    let [p50, p95, p99] = PERCENTILES.map(|p| percentile(&slowdowns, p).into_inner());
    PercentileBucket {
        max_size,
        p50,
        p95,
        p99,
        nr_flows: flows.len(),
    }
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;
    use rand_distr::Exp;

    use super::*;
    use crate::flow::PriorityClass;
    use crate::opts::TrafficKind;
    use crate::testing;
    use crate::units::Nanosecs;

    fn group(name: &str) -> Group {
        Group::new(name.into(), None)
    }

    #[test]
    fn twenty_flows_four_buckets() {
        // Sizes grow geometrically, so size-value cuts would be badly unbalanced.
        let records = (0..20)
            .map(|i| testing::record(1 << i, 1000 + 100 * i, 1000))
            .collect::<Vec<_>>();
        let opts = AnalysisOpts::builder().nr_buckets(4).build();
        let g = group("cc");
        let table = SlowdownTable::new([(&g, &records[..])], &opts).unwrap();
        let buckets = &table.groups()[0].buckets;
        assert_eq!(buckets.len(), 4);
        for (i, b) in buckets.iter().enumerate() {
            assert_eq!(b.nr_flows, 5);
            assert_eq!(b.max_size, Bytes::new(1 << (5 * i + 4)));
        }
        // Bucket 1 holds slowdowns 1.5..=1.9, and floor(5 * p) picks ranks 2, 4, 4.
        assert_eq!(buckets[1].p50, 1.7);
        assert_eq!(buckets[1].p95, 1.9);
        assert_eq!(buckets[1].p99, 1.9);
    }

    #[test]
    fn records_are_sorted_by_size_before_bucketing() {
        let records = [
            testing::record(400, 4000, 1000),
            testing::record(100, 1000, 1000),
            testing::record(300, 3000, 1000),
            testing::record(200, 2000, 1000),
        ];
        let filter = FlowFilter {
            time_limit: Nanosecs::MAX,
            ..Default::default()
        };
        let g = analyze_group("cc", &records, &filter, 2);
        assert_eq!(g.buckets[0].max_size, Bytes::new(200));
        assert_eq!(g.buckets[0].p50, 2.0);
        assert_eq!(g.buckets[1].max_size, Bytes::new(400));
        assert_eq!(g.buckets[1].p50, 4.0);
        assert_eq!(g.total_size, Bytes::new(1000));
    }

    #[test]
    fn empty_buckets_are_zero() {
        let records = [testing::record(10, 1000, 1000), testing::record(20, 1000, 1000)];
        let filter = FlowFilter {
            time_limit: Nanosecs::MAX,
            ..Default::default()
        };
        let g = analyze_group("cc", &records, &filter, 4);
        // Ranks: [0, 0), [0, 1), [1, 1), [1, 2)
        assert_eq!(g.buckets[0], PercentileBucket::default());
        assert_eq!(g.buckets[1].max_size, Bytes::new(10));
        assert_eq!(g.buckets[2], PercentileBucket::default());
        assert_eq!(g.buckets[3].max_size, Bytes::new(20));
        let g = analyze_group("cc", &[], &filter, 4);
        assert!(g.buckets.iter().all(|b| *b == PercentileBucket::default()));
    }

    #[test]
    fn rows_align_groups_on_bucket_index() {
        let a = (1..=10)
            .map(|i| testing::record(i * 10, 2000, 1000))
            .collect::<Vec<_>>();
        let b = (1..=10)
            .map(|i| testing::record(i * 1000, 3000, 1000))
            .collect::<Vec<_>>();
        let (ga, gb) = (group("a"), group("b"));
        let opts = AnalysisOpts::builder().nr_buckets(5).build();
        let table = SlowdownTable::new([(&ga, &a[..]), (&gb, &b[..])], &opts).unwrap();
        let rows = table.rows().collect::<Vec<_>>();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2].rank, 0.4);
        assert_eq!(rows[2].max_size, Bytes::new(60));
        assert_eq!(rows[2].buckets[0].p99, 2.0);
        assert_eq!(rows[2].buckets[1].p99, 3.0);
        assert_eq!(rows[2].buckets[1].max_size, Bytes::new(6000));
    }

    #[test]
    fn group_priority_filters_records() {
        let mut records = (1..=4)
            .map(|i| testing::record(i, 1000, 1000))
            .collect::<Vec<_>>();
        records[0].priority = Some(PriorityClass::new(2));
        let g = Group::new("cc".into(), Some(PriorityClass::new(3)));
        let opts = AnalysisOpts::builder().nr_buckets(1).build();
        let table = SlowdownTable::new([(&g, &records[..])], &opts).unwrap();
        assert_eq!(table.groups()[0].nr_flows, 3);
    }

    #[test]
    fn no_groups_or_buckets_fail() {
        let opts = AnalysisOpts::builder().build();
        let none: [(&Group, &[FctRecord]); 0] = [];
        assert!(matches!(SlowdownTable::new(none, &opts), Err(ParamError::NoGroups)));
        let opts = AnalysisOpts::builder().nr_buckets(0).build();
        let g = group("cc");
        let empty: &[FctRecord] = &[];
        assert!(SlowdownTable::new([(&g, empty)], &opts).is_err());
    }

    #[test]
    fn random_traces_conserve_counts_and_order_percentiles() {
        let mut rng = StdRng::seed_from_u64(0);
        let sizes = Exp::new(1.0 / 50_000.0).unwrap();
        let fcts = Exp::new(1.0 / 20_000.0).unwrap();
        for traffic in [TrafficKind::Normal, TrafficKind::Incast, TrafficKind::All] {
            for nr_buckets in [1, 3, 20, 50] {
                let records = (0..rng.gen_range(0..500))
                    .map(|_| {
                        let mut r = testing::record(
                            sizes.sample(&mut rng) as u64 + 1,
                            fcts.sample(&mut rng) as u64,
                            rng.gen_range(0..10_000),
                        );
                        if rng.gen_bool(0.3) {
                            r.dport = crate::flow::Port::new(200);
                        }
                        r
                    })
                    .collect::<Vec<_>>();
                let opts = AnalysisOpts::builder()
                    .traffic(traffic)
                    .max_size(Bytes::new(100_000))
                    .nr_buckets(nr_buckets)
                    .build();
                let g = group("cc");
                let filter = opts.filter_for(&g);
                let survivors = records.iter().filter(|r| filter.admits(r)).count();
                let table = SlowdownTable::new([(&g, &records[..])], &opts).unwrap();
                let summary = &table.groups()[0];
                assert_eq!(summary.nr_flows, survivors);
                let counted = summary.buckets.iter().map(|b| b.nr_flows).sum::<usize>();
                assert_eq!(counted, survivors);
                for b in summary.buckets.iter().filter(|b| b.nr_flows > 0) {
                    assert!(1.0 <= b.p50 && b.p50 <= b.p95 && b.p95 <= b.p99);
                }
            }
        }
    }

    #[test]
    fn percentile_indexes_without_interpolation() {
        let points = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        assert_eq!(percentile(&points, 0.5), 6);
        assert_eq!(percentile(&points, 0.95), 10);
        assert_eq!(percentile(&points, 0.99), 10);
        assert_eq!(percentile(&[7], 0.99), 7);
    }
}
