use serde::{Deserialize, Serialize};

/// Headroom applied above the largest value when deriving a domain.
pub const DOMAIN_PADDING: f64 = 1.1;

/// Continuous linear map from a data domain onto an output range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    /// Data interval.
    pub domain: (f64, f64),
    /// Output interval; may run backwards (screen y).
    pub range: (f64, f64),
}

impl LinearScale {
    /// Scale mapping `domain` onto `range`.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// `[0, max * 1.1]` over `values`; `None` for an empty set.
    pub fn padded_zero_domain(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
        let max = values.into_iter().reduce(f64::max)?;
        Some((0.0, max * DOMAIN_PADDING))
    }

    /// `[min, max]` of `values`; `None` for an empty set.
    pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
    }

    /// Map `v`; a zero-width domain maps everything to the range start.
    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// Evenly spaced bands for categorical positions, with the same padding inside and outside.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandScale {
    /// Number of categories.
    pub count: usize,
    /// Output interval the bands are centered in.
    pub range: (f64, f64),
    /// Fraction of each step left empty, in `[0, 1)`.
    pub padding: f64,
}

impl BandScale {
    /// Scale over `count` categories.
    pub fn new(count: usize, range: (f64, f64), padding: f64) -> Self {
        Self {
            count,
            range,
            padding,
        }
    }

    /// Distance between the starts of adjacent bands.
    pub fn step(&self) -> f64 {
        let n = self.count as f64;
        (self.range.1 - self.range.0) / (n - self.padding + 2.0 * self.padding).max(1.0)
    }

    /// Width of one band.
    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Start of band `index`.
    pub fn position(&self, index: usize) -> f64 {
        let (r0, r1) = self.range;
        let step = self.step();
        let used = step * (self.count as f64 - self.padding);
        r0 + (r1 - r0 - used) / 2.0 + step * index as f64
    }
}
