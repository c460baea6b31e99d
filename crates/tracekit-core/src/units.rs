//! Integer units used throughout the crate. Sizes are bytes, times are nanoseconds, and link
//! rates are bits per second.

macro_rules! unit {
    ($name: ident) => {
        #[derive(
            Debug,
            Default,
            Copy,
            Clone,
            PartialOrd,
            Ord,
            PartialEq,
            Eq,
            Hash,
            derive_more::Add,
            derive_more::Sub,
            derive_more::AddAssign,
            derive_more::SubAssign,
            derive_more::Sum,
            derive_more::FromStr,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(u64);

        impl $name {
            pub const ZERO: $name = Self::new(0);
            pub const ONE: $name = Self::new(1);
            pub const MAX: $name = Self::new(u64::MAX);

            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn into_u64(self) -> u64 {
                self.0
            }

            pub fn into_f64(self) -> f64 {
                self.0 as f64
            }

            pub fn scale_by(self, val: f64) -> Self {
                Self((self.0 as f64 * val).round() as u64)
            }

            pub fn checked_add(self, other: Self) -> Option<Self> {
                self.0.checked_add(other.0).map(Self)
            }
        }
    };
}

unit!(Bytes);

impl std::fmt::Display for Bytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}B", self.0)
    }
}

unit!(Nanosecs);

impl Nanosecs {
    const PER_SEC: u64 = 1_000_000_000;

    /// Converts fractional seconds into nanoseconds, rounding to the nearest nanosecond. Negative
    /// and non-finite inputs saturate to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        let ns = (secs * Self::PER_SEC as f64).round();
        if ns.is_finite() && ns > 0.0 {
            Self(ns as u64)
        } else {
            Self::ZERO
        }
    }

    pub fn into_secs_f64(self) -> f64 {
        self.0 as f64 / Self::PER_SEC as f64
    }

    /// Moves this time by a signed number of nanoseconds. Returns `None` if the result would be
    /// negative or would not fit.
    pub fn checked_shift(self, ns: i64) -> Option<Self> {
        self.0.checked_add_signed(ns).map(Self)
    }
}

impl std::fmt::Display for Nanosecs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

/// Renders a time as seconds with nine decimal digits, as the ns-3 trace files expect.
#[derive(Debug, Clone, Copy)]
pub struct Secs9(pub Nanosecs);

impl std::fmt::Display for Secs9 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ns = self.0.into_u64();
        write!(f, "{}.{:09}", ns / Nanosecs::PER_SEC, ns % Nanosecs::PER_SEC)
    }
}

unit!(BitsPerSec);

impl std::fmt::Display for BitsPerSec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}bps", self.0)
    }
}
