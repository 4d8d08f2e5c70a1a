use crate::aggregate::pipeline::AggregatedPoint;
use crate::animation::lerp::Lerp;
use crate::encoding::{Encoding, Mark, per_point, require_metric};
use crate::foundation::core::{MetricName, Rgba8};
use crate::foundation::error::{ChartError, ChartResult};
use crate::scene::attrs::{AttrValue, AttributeSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Region fill from a two-stop sequential ramp over `[0, domain_max]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChoroplethEncoding {
    /// Metric that drives the fill.
    pub metric: MetricName,
    /// Value painted with `high`.
    pub domain_max: f64,
    /// Per-metric upper bounds, used when the shown metric is picked at render time.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub domain_max_by: BTreeMap<MetricName, f64>,
    /// Color at zero.
    #[serde(default = "default_low")]
    pub low: Rgba8,
    /// Color at `domain_max` and above.
    #[serde(default = "default_high")]
    pub high: Rgba8,
}

fn default_low() -> Rgba8 {
    Rgba8::rgb(0xff, 0xf5, 0xf0)
}

fn default_high() -> Rgba8 {
    Rgba8::rgb(0x67, 0x00, 0x0d)
}

impl ChoroplethEncoding {
    /// Red sequential ramp over `[0, domain_max]`.
    pub fn new(metric: impl Into<MetricName>, domain_max: f64) -> Self {
        Self {
            metric: metric.into(),
            domain_max,
            domain_max_by: BTreeMap::new(),
            low: default_low(),
            high: default_high(),
        }
    }

    /// Declare the upper bound used when `metric` is the one shown.
    pub fn with_domain_max_for(mut self, metric: impl Into<MetricName>, max: f64) -> Self {
        self.domain_max_by.insert(metric.into(), max);
        self
    }

    /// Same ramp, showing `metric` with its own domain bound when one is declared.
    pub fn for_metric(&self, metric: &MetricName) -> Self {
        Self {
            metric: metric.clone(),
            domain_max: self
                .domain_max_by
                .get(metric)
                .copied()
                .unwrap_or(self.domain_max),
            domain_max_by: BTreeMap::new(),
            low: self.low,
            high: self.high,
        }
    }

    /// Fill for value `v`, clamped onto the ramp.
    pub fn color_for(&self, v: f64) -> Rgba8 {
        let t = if self.domain_max > 0.0 {
            (v / self.domain_max).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Rgba8::lerp(&self.low, &self.high, t)
    }
}

impl Encoding for ChoroplethEncoding {
    fn encode(&self, points: &[AggregatedPoint]) -> ChartResult<Vec<Mark>> {
        if !(self.domain_max.is_finite() && self.domain_max > 0.0) {
            return Err(ChartError::validation(
                "choropleth domain_max must be finite and > 0",
            ));
        }
        per_point(points, |p| {
            let v = require_metric(p, &self.metric)?;
            Ok(AttributeSet::new()
                .with("fill", AttrValue::Color(self.color_for(v)))
                .with("opacity", AttrValue::Opacity(1.0)))
        })
    }
}
