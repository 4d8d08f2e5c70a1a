use crate::aggregate::pipeline::AggregatedPoint;
use crate::encoding::scale::{BandScale, LinearScale};
use crate::encoding::scatter::Margin;
use crate::encoding::{Encoding, Mark, require_metric, require_positive};
use crate::foundation::core::{MetricName, Rgba8};
use crate::foundation::error::{ChartError, ChartResult};
use crate::scene::attrs::{AttrValue, AttributeSet};
use serde::{Deserialize, Serialize};

/// One subgroup of a stack, drawn bottom up in declaration order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StackLayer {
    /// Metric giving the segment height.
    pub metric: MetricName,
    /// Segment paint.
    pub fill: Rgba8,
}

impl StackLayer {
    /// Layer for `metric` painted with `fill`.
    pub fn new(metric: impl Into<MetricName>, fill: Rgba8) -> Self {
        Self {
            metric: metric.into(),
            fill,
        }
    }
}

/// One bar per point (a group such as a sex), stacked from the `stack` metrics.
///
/// Segments are keyed `<group>/<metric>` and bound to the group's point. The value axis runs
/// from zero to the tallest stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StackedBarEncoding {
    /// Layers from the baseline up.
    pub stack: Vec<StackLayer>,
    /// Band padding, inner and outer.
    #[serde(default = "default_padding")]
    pub padding: f64,
    /// Canvas width.
    #[serde(default = "default_width")]
    pub width: f64,
    /// Canvas height.
    #[serde(default = "default_height")]
    pub height: f64,
    /// Plot-area insets.
    #[serde(default)]
    pub margin: Margin,
}

fn default_padding() -> f64 {
    0.3
}

fn default_width() -> f64 {
    800.0
}

fn default_height() -> f64 {
    500.0
}

impl StackedBarEncoding {
    /// Encoding over `stack` with the default geometry.
    pub fn new(stack: Vec<StackLayer>) -> Self {
        Self {
            stack,
            padding: default_padding(),
            width: default_width(),
            height: default_height(),
            margin: Margin::default(),
        }
    }

    /// Cumulative tops of each layer for `point`.
    fn tops(&self, point: &AggregatedPoint) -> ChartResult<Vec<f64>> {
        let mut total = 0.0;
        self.stack
            .iter()
            .map(|layer| {
                total += require_metric(point, &layer.metric)?;
                Ok(total)
            })
            .collect()
    }
}

impl Encoding for StackedBarEncoding {
    fn encode(&self, points: &[AggregatedPoint]) -> ChartResult<Vec<Mark>> {
        if !(0.0..1.0).contains(&self.padding) {
            return Err(ChartError::validation("stacked bar padding must be in [0, 1)"));
        }
        require_positive("stacked bar width", self.width)?;
        require_positive("stacked bar height", self.height)?;

        let tops = points
            .iter()
            .map(|p| self.tops(p))
            .collect::<ChartResult<Vec<_>>>()?;
        let Some(max) = tops.iter().filter_map(|t| t.last().copied()).reduce(f64::max) else {
            return Ok(Vec::new());
        };

        let m = self.margin;
        let x = BandScale::new(points.len(), (m.left, self.width - m.right), self.padding);
        let y = LinearScale::new((0.0, max), (self.height - m.bottom, m.top));

        let mut marks = Vec::with_capacity(points.len() * self.stack.len());
        for (i, (p, tops)) in points.iter().zip(&tops).enumerate() {
            let mut base = 0.0;
            for (layer, &top) in self.stack.iter().zip(tops) {
                let (y_top, y_base) = (y.apply(top), y.apply(base));
                marks.push(Mark::keyed(
                    format!("{}/{}", p.key, layer.metric),
                    p,
                    AttributeSet::new()
                        .with("x", AttrValue::Position(x.position(i)))
                        .with("y", AttrValue::Position(y_top))
                        .with("width", AttrValue::Extent(x.bandwidth()))
                        .with("height", AttrValue::Extent(y_base - y_top))
                        .with("fill", AttrValue::Color(layer.fill))
                        .with("opacity", AttrValue::Opacity(1.0)),
                ));
                base = top;
            }
        }
        Ok(marks)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encoding/stacked.rs"]
mod tests;
