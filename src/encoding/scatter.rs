use crate::aggregate::pipeline::{AggregatedPoint, metric_mean};
use crate::encoding::scale::LinearScale;
use crate::encoding::{Encoding, Mark, per_point, require_metric};
use crate::foundation::core::{EntityKey, MetricName, Rgba8};
use crate::foundation::error::ChartResult;
use crate::scene::attrs::{AttrValue, AttributeSet};
use serde::{Deserialize, Serialize};

/// Plot-area insets.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    /// Top inset.
    pub top: f64,
    /// Right inset.
    pub right: f64,
    /// Bottom inset, room for the x axis.
    pub bottom: f64,
    /// Left inset, room for the y axis.
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 40.0,
            right: 40.0,
            bottom: 70.0,
            left: 70.0,
        }
    }
}

/// Horizontal line at the mean of the y metric, spanning the plot width.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeanLine {
    /// Line paint.
    #[serde(default = "default_mean_stroke")]
    pub stroke: Rgba8,
    /// Line thickness.
    #[serde(default = "default_mean_width")]
    pub stroke_width: f64,
}

impl Default for MeanLine {
    fn default() -> Self {
        Self {
            stroke: default_mean_stroke(),
            stroke_width: default_mean_width(),
        }
    }
}

fn default_mean_stroke() -> Rgba8 {
    Rgba8::rgb(0xff, 0, 0)
}

fn default_mean_width() -> f64 {
    2.0
}

/// Circles at (`x_metric`, `y_metric`), both axes starting at zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScatterEncoding {
    /// Metric on the horizontal axis.
    pub x_metric: MetricName,
    /// Metric on the vertical axis.
    pub y_metric: MetricName,
    /// Circle radius.
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Circle paint.
    #[serde(default = "default_fill")]
    pub fill: Rgba8,
    /// Circle opacity once entered.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Canvas width.
    #[serde(default = "default_width")]
    pub width: f64,
    /// Canvas height.
    #[serde(default = "default_height")]
    pub height: f64,
    /// Plot-area insets.
    #[serde(default)]
    pub margin: Margin,
    /// Reference line at the mean of `y_metric`, keyed `mean:<y_metric>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_line: Option<MeanLine>,
}

fn default_radius() -> f64 {
    6.0
}

fn default_fill() -> Rgba8 {
    Rgba8::rgb(0, 0, 255)
}

fn default_opacity() -> f64 {
    0.8
}

fn default_width() -> f64 {
    800.0
}

fn default_height() -> f64 {
    500.0
}

impl ScatterEncoding {
    /// Encoding with the default look and no reference line.
    pub fn new(x_metric: impl Into<MetricName>, y_metric: impl Into<MetricName>) -> Self {
        Self {
            x_metric: x_metric.into(),
            y_metric: y_metric.into(),
            radius: default_radius(),
            fill: default_fill(),
            opacity: default_opacity(),
            width: default_width(),
            height: default_height(),
            margin: Margin::default(),
            mean_line: None,
        }
    }

    /// Same encoding with a default-styled mean line.
    pub fn with_mean_line(mut self) -> Self {
        self.mean_line = Some(MeanLine::default());
        self
    }

    /// Key of the reference line element.
    pub fn mean_line_key(&self) -> EntityKey {
        EntityKey::new(format!("mean:{}", self.y_metric))
    }

    /// Axis scales for `points`; `None` when there is nothing to plot.
    pub fn scales(
        &self,
        points: &[AggregatedPoint],
    ) -> ChartResult<Option<(LinearScale, LinearScale)>> {
        let xs = points
            .iter()
            .map(|p| require_metric(p, &self.x_metric))
            .collect::<ChartResult<Vec<_>>>()?;
        let ys = points
            .iter()
            .map(|p| require_metric(p, &self.y_metric))
            .collect::<ChartResult<Vec<_>>>()?;

        let (Some(xd), Some(yd)) = (
            LinearScale::padded_zero_domain(xs),
            LinearScale::padded_zero_domain(ys),
        ) else {
            return Ok(None);
        };
        let m = self.margin;
        Ok(Some((
            LinearScale::new(xd, (m.left, self.width - m.right)),
            LinearScale::new(yd, (self.height - m.bottom, m.top)),
        )))
    }
}

impl Encoding for ScatterEncoding {
    fn encode(&self, points: &[AggregatedPoint]) -> ChartResult<Vec<Mark>> {
        let Some((x, y)) = self.scales(points)? else {
            return Ok(Vec::new());
        };
        let mut marks = per_point(points, |p| {
            let xv = require_metric(p, &self.x_metric)?;
            let yv = require_metric(p, &self.y_metric)?;
            Ok(AttributeSet::new()
                .with("cx", AttrValue::Position(x.apply(xv)))
                .with("cy", AttrValue::Position(y.apply(yv)))
                .with("r", AttrValue::Extent(self.radius))
                .with("opacity", AttrValue::Opacity(self.opacity))
                .with("fill", AttrValue::Color(self.fill)))
        })?;

        if let Some(line) = self.mean_line
            && let Some(mean) = metric_mean(points, &self.y_metric)
        {
            let cy = y.apply(mean);
            marks.push(Mark::decoration(
                self.mean_line_key(),
                AttributeSet::new()
                    .with("x1", AttrValue::Position(x.range.0))
                    .with("x2", AttrValue::Position(x.range.1))
                    .with("y1", AttrValue::Position(cy))
                    .with("y2", AttrValue::Position(cy))
                    .with("stroke", AttrValue::Color(line.stroke))
                    .with("stroke_width", AttrValue::Extent(line.stroke_width))
                    .with("opacity", AttrValue::Opacity(1.0)),
            ));
        }
        Ok(marks)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encoding/scatter.rs"]
mod tests;
