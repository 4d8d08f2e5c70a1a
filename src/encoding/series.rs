use crate::aggregate::pipeline::AggregatedPoint;
use crate::encoding::scale::LinearScale;
use crate::encoding::scatter::Margin;
use crate::encoding::{Encoding, Mark, require_positive};
use crate::foundation::core::{EntityKey, MetricName, Rgba8};
use crate::foundation::error::{ChartError, ChartResult};
use crate::scene::attrs::{AttrValue, AttributeSet};
use serde::{Deserialize, Serialize};

/// Vertical axis a series is measured against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Shared left axis.
    #[default]
    Left,
    /// Independent right axis with its own `[0, max * 1.1]` domain.
    Right,
}

/// One metric drawn over time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesLine {
    /// Metric plotted by this series.
    pub metric: MetricName,
    /// Marker fill and segment stroke.
    pub color: Rgba8,
    /// Axis the values are scaled on.
    #[serde(default)]
    pub axis: Axis,
    /// Draw a circle per period.
    #[serde(default = "yes")]
    pub markers: bool,
    /// Join consecutive periods with segments.
    #[serde(default = "yes")]
    pub line: bool,
}

fn yes() -> bool {
    true
}

impl SeriesLine {
    /// Series with markers and a line on the left axis.
    pub fn new(metric: impl Into<MetricName>, color: Rgba8) -> Self {
        Self {
            metric: metric.into(),
            color,
            axis: Axis::Left,
            markers: true,
            line: true,
        }
    }

    /// Same series on `axis`.
    pub fn on(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }
}

/// Line chart of several metrics for one entity, one point per period.
///
/// Points are keyed by period (see [`crate::AggregationPipeline::series`]) and may carry only
/// some of the series. Markers are keyed `<metric>@<period>` and bound to their point; the
/// segment joining two consecutive periods of a series is keyed `<metric>@<from>..<to>` and is
/// decoration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesEncoding {
    /// Series in draw order.
    pub series: Vec<SeriesLine>,
    /// Marker radius.
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Segment thickness.
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
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

fn default_radius() -> f64 {
    4.0
}

fn default_stroke_width() -> f64 {
    2.0
}

fn default_width() -> f64 {
    800.0
}

fn default_height() -> f64 {
    500.0
}

impl SeriesEncoding {
    /// Encoding over `series` with the default geometry.
    pub fn new(series: Vec<SeriesLine>) -> Self {
        Self {
            series,
            radius: default_radius(),
            stroke_width: default_stroke_width(),
            width: default_width(),
            height: default_height(),
            margin: Margin::default(),
        }
    }

    /// Time scale over the numeric periods of `points`.
    fn x_scale(&self, points: &[AggregatedPoint]) -> ChartResult<Option<LinearScale>> {
        let years = points
            .iter()
            .map(period_value)
            .collect::<ChartResult<Vec<_>>>()?;
        let m = self.margin;
        Ok(LinearScale::extent(years)
            .map(|domain| LinearScale::new(domain, (m.left, self.width - m.right))))
    }

    /// Value scale for `axis`, padded above the largest value of its series.
    fn y_scale(&self, points: &[AggregatedPoint], axis: Axis) -> Option<LinearScale> {
        let values = self
            .series
            .iter()
            .filter(|s| s.axis == axis)
            .flat_map(|s| points.iter().filter_map(|p| p.metric(&s.metric)));
        let m = self.margin;
        LinearScale::padded_zero_domain(values)
            .map(|domain| LinearScale::new(domain, (self.height - m.bottom, m.top)))
    }
}

fn period_value(point: &AggregatedPoint) -> ChartResult<f64> {
    point.key.as_str().trim().parse().map_err(|_| {
        ChartError::malformed(format!("series period '{}' is not numeric", point.key))
    })
}

impl Encoding for SeriesEncoding {
    fn encode(&self, points: &[AggregatedPoint]) -> ChartResult<Vec<Mark>> {
        require_positive("series radius", self.radius)?;
        require_positive("series stroke_width", self.stroke_width)?;
        let Some(x) = self.x_scale(points)? else {
            return Ok(Vec::new());
        };

        let mut marks = Vec::new();
        for s in &self.series {
            let Some(y) = self.y_scale(points, s.axis) else {
                continue;
            };
            let mut prev: Option<(&EntityKey, f64, f64)> = None;
            for p in points {
                let Some(v) = p.metric(&s.metric) else {
                    continue;
                };
                let (cx, cy) = (x.apply(period_value(p)?), y.apply(v));
                if s.markers {
                    marks.push(Mark::keyed(
                        format!("{}@{}", s.metric, p.key),
                        p,
                        AttributeSet::new()
                            .with("cx", AttrValue::Position(cx))
                            .with("cy", AttrValue::Position(cy))
                            .with("r", AttrValue::Extent(self.radius))
                            .with("fill", AttrValue::Color(s.color))
                            .with("opacity", AttrValue::Opacity(1.0)),
                    ));
                }
                if s.line
                    && let Some((from, x1, y1)) = prev
                {
                    marks.push(Mark::decoration(
                        format!("{}@{from}..{}", s.metric, p.key),
                        AttributeSet::new()
                            .with("x1", AttrValue::Position(x1))
                            .with("y1", AttrValue::Position(y1))
                            .with("x2", AttrValue::Position(cx))
                            .with("y2", AttrValue::Position(cy))
                            .with("stroke", AttrValue::Color(s.color))
                            .with("stroke_width", AttrValue::Extent(self.stroke_width))
                            .with("opacity", AttrValue::Opacity(1.0)),
                    ));
                }
                prev = Some((&p.key, cx, cy));
            }
        }
        Ok(marks)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encoding/series.rs"]
mod tests;
