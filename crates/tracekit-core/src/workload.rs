//! Synthetic workload generation. Flow sizes are drawn from an [`EmpiricalDist`] and arrivals
//! follow a Poisson process sized so that the long-run offered load matches the requested load.

use derivative::Derivative;
use log::info;
use rand::prelude::*;

use crate::arrival::ArrivalProcess;
use crate::edist::EmpiricalDist;
use crate::flow::{Flow, NodeId, Port, PriorityClass};
use crate::opts::{ParamError, NORMAL_PORT};
use crate::units::{BitsPerSec, Bytes, Nanosecs};

/// Flows strictly larger than this are placed in the large-flow class.
pub const LARGE_FLOW_THRESHOLD: Bytes = Bytes::new(1_000_000);

/// Class of flows above [`LARGE_FLOW_THRESHOLD`].
pub const LARGE_FLOW_CLASS: PriorityClass = PriorityClass::new(3);

/// Class of all other flows.
pub const DEFAULT_FLOW_CLASS: PriorityClass = PriorityClass::new(2);

/// Clock value at which generation starts.
pub const DEFAULT_BASE_TIME: Nanosecs = Nanosecs::new(2_000_000_000);

/// How generated flows are classified and addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Derivative)]
#[derivative(Default)]
pub struct ClassPolicy {
    #[derivative(Default(value = "LARGE_FLOW_THRESHOLD"))]
    pub large_threshold: Bytes,
    #[derivative(Default(value = "LARGE_FLOW_CLASS"))]
    pub large_class: PriorityClass,
    #[derivative(Default(value = "DEFAULT_FLOW_CLASS"))]
    pub default_class: PriorityClass,
    /// Destination port of every generated flow.
    #[derivative(Default(value = "NORMAL_PORT"))]
    pub dport: Port,
}

impl ClassPolicy {
    pub fn classify(&self, size: Bytes) -> PriorityClass {
        if size > self.large_threshold {
            self.large_class
        } else {
            self.default_class
        }
    }
}

/// A synthetic workload between one source and one destination.
#[derive(Debug, Clone, typed_builder::TypedBuilder)]
pub struct WorkloadSpec {
    /// Offered load as a fraction of the link bandwidth, in `(0, 1]`.
    pub load: f64,
    /// The bandwidth of the link being loaded.
    #[builder(setter(into))]
    pub bandwidth: BitsPerSec,
    /// How long to generate arrivals for.
    #[builder(setter(into))]
    pub duration: Nanosecs,
    pub src: NodeId,
    pub dst: NodeId,
    /// Signed shift, in nanoseconds, added to every start time after generation.
    #[builder(default)]
    pub start_offset: i64,
    /// The clock value at which generation starts.
    #[builder(default = DEFAULT_BASE_TIME, setter(into))]
    pub base_time: Nanosecs,
    #[builder(default)]
    pub classes: ClassPolicy,
}

impl WorkloadSpec {
    /// Checks the numeric parameters.
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(self.load.is_finite() && self.load > 0.0 && self.load <= 1.0) {
            return Err(ParamError::InvalidLoad(self.load));
        }
        if self.bandwidth == BitsPerSec::ZERO {
            return Err(ParamError::NonPositive {
                name: "bandwidth",
                value: 0.0,
            });
        }
        if self.duration == Nanosecs::ZERO {
            return Err(ParamError::NonPositive {
                name: "duration",
                value: 0.0,
            });
        }
        let end = self.end()?;
        // Arrivals lie in (base_time, end], so checking both ends covers every shifted start.
        if self.base_time.checked_shift(self.start_offset).is_none() {
            return Err(ParamError::NegativeStart {
                offset: self.start_offset,
                base: self.base_time,
            });
        }
        if end.checked_shift(self.start_offset).is_none() {
            return Err(ParamError::ClockOverflow("shifted end of the generation window"));
        }
        Ok(())
    }

    fn end(&self) -> Result<Nanosecs, ParamError> {
        self.base_time
            .checked_add(self.duration)
            .ok_or(ParamError::ClockOverflow("end of the generation window"))
    }

    /// The Poisson arrival process that offers `load` with flows drawn from `dist`.
    pub fn arrivals(&self, dist: &EmpiricalDist) -> Result<ArrivalProcess, ParamError> {
        self.validate()?;
        let mean_size = dist.mean();
        if !(mean_size.is_finite() && mean_size > 0.0) {
            return Err(ParamError::NonPositive {
                name: "mean flow size",
                value: mean_size,
            });
        }
        // Flows per second at the desired rate, inverted into nanoseconds per flow.
        let flows_per_sec = self.bandwidth.into_f64() * self.load / 8.0 / mean_size;
        ArrivalProcess::new(1e9 / flows_per_sec)
    }

    /// Generates the workload.
    ///
    /// The returned flows are sorted by start time: the clock only moves forward.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        dist: &EmpiricalDist,
        rng: &mut R,
    ) -> Result<Vec<Flow>, ParamError> {
        let arrivals = self.arrivals(dist)?;
        let nr_expected = (self.duration.into_f64() / arrivals.mean_gap()) as usize;
        info!(
            "Generating ~{nr_expected} flows from {} to {} (mean gap {:.0}ns)",
            self.src,
            self.dst,
            arrivals.mean_gap()
        );
        let end = self.end()?;
        let mut clock = self.base_time;
        let mut flows = Vec::with_capacity(nr_expected);
        loop {
            // Huge gaps saturate, so the sum may not fit.
            clock = match clock.checked_add(arrivals.next_gap(rng)) {
                Some(next) if next <= end => next,
                _ => break,
            };
            let size = dist.sample(rng);
            let start = clock
                .checked_shift(self.start_offset)
                .ok_or(ParamError::ClockOverflow("shifted start time"))?;
            flows.push(Flow::new(
                self.src,
                self.dst,
                self.classes.classify(size),
                self.classes.dport,
                size,
                start,
            ));
        }
        info!("Generated {} flows from {} to {}", flows.len(), self.src, self.dst);
        Ok(flows)
    }
}
