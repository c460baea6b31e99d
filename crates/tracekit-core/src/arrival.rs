use rand::Rng;

use crate::opts::ParamError;
use crate::units::Nanosecs;

/// A Poisson arrival process. Inter-arrival gaps are exponentially distributed and drawn by
/// inverse transform from the generator handed to each call, so reseeding that generator is the
/// only way to replay a sequence.
#[derive(Debug, Clone, Copy)]
pub struct ArrivalProcess {
    mean_gap: f64,
}

impl ArrivalProcess {
    /// Creates a process whose gaps average `mean_gap` nanoseconds.
    pub fn new(mean_gap: f64) -> Result<Self, ParamError> {
        if !(mean_gap.is_finite() && mean_gap > 0.0) {
            return Err(ParamError::NonPositive {
                name: "mean inter-arrival time",
                value: mean_gap,
            });
        }
        Ok(Self { mean_gap })
    }

    pub fn mean_gap(&self) -> f64 {
        self.mean_gap
    }

    /// Draws the next gap, truncated to whole nanoseconds.
    pub fn next_gap<R: Rng + ?Sized>(&self, rng: &mut R) -> Nanosecs {
        let u = rng.gen::<f64>();
        let gap = -(1.0 - u).ln() * self.mean_gap;
        Nanosecs::new(gap as u64)
    }

    /// An infinite stream of gaps.
    pub fn gaps<'a, R: Rng + ?Sized>(
        &'a self,
        rng: &'a mut R,
    ) -> impl Iterator<Item = Nanosecs> + 'a {
        std::iter::repeat_with(move || self.next_gap(&mut *rng))
    }
}
