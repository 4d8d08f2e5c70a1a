use crate::aggregate::pipeline::AggregatedPoint;
use crate::foundation::core::MetricName;
use serde::{Deserialize, Serialize};

/// How the shared tooltip follows the pointer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TooltipMode {
    /// Shown on pointer-enter, follows the pointer, hidden on pointer-leave.
    #[default]
    Transient,
    /// Shown and pinned on click, hidden only by a background click.
    Persistent,
}

/// Renders tooltip text from the point bound to an element.
pub trait TooltipFormatter: Send + Sync {
    /// Tooltip text for `point`.
    fn format(&self, point: &AggregatedPoint) -> String;
}

/// One metric row of a [`MetricTooltip`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipLine {
    /// Metric shown on this line.
    pub metric: MetricName,
    /// Label; the metric name when absent.
    #[serde(default)]
    pub label: Option<String>,
    /// Digits after the decimal point.
    #[serde(default = "default_decimals")]
    pub decimals: usize,
    /// Text appended to the value.
    #[serde(default)]
    pub suffix: String,
}

fn default_decimals() -> usize {
    2
}

/// Entity name on the first line, then one `label: value suffix` line per metric.
///
/// With no lines configured, every metric of the point is listed with two decimals.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricTooltip {
    /// Rows in display order.
    pub lines: Vec<TooltipLine>,
}

impl TooltipFormatter for MetricTooltip {
    fn format(&self, point: &AggregatedPoint) -> String {
        let mut out = point.key.to_string();
        if self.lines.is_empty() {
            for (name, v) in &point.metrics {
                out.push_str(&format!("\n{name}: {v:.2}"));
            }
            return out;
        }
        for line in &self.lines {
            let label = line.label.as_deref().unwrap_or(line.metric.as_str());
            match point.metric(&line.metric) {
                Some(v) => out.push_str(&format!(
                    "\n{label}: {v:.prec$}{}",
                    line.suffix,
                    prec = line.decimals
                )),
                None => out.push_str(&format!("\n{label}: No data")),
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/tooltip.rs"]
mod tests;
