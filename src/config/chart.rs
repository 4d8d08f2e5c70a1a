use crate::animation::scheduler::TransitionOpts;
use crate::encoding::Encoding;
use crate::encoding::choropleth::ChoroplethEncoding;
use crate::encoding::scatter::ScatterEncoding;
use crate::encoding::series::SeriesEncoding;
use crate::encoding::stacked::StackedBarEncoding;
use crate::foundation::core::MetricName;
use crate::foundation::error::{ChartError, ChartResult};
use crate::interaction::tooltip::{MetricTooltip, TooltipMode};
use crate::loader::SourceSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// What a selector value filters on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorKind {
    /// The value is a period; every source is aggregated at that period and joined.
    #[default]
    Period,
    /// The value names one source metric, shown at its latest period per entity.
    Latest,
    /// The value is an entity; every source is shown over time for it.
    Entity,
}

/// Encoding declared by a chart config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncodingSpec {
    /// Circles over two metrics, optionally with a mean line.
    Scatter(ScatterEncoding),
    /// Region fills from one metric.
    Choropleth(ChoroplethEncoding),
    /// Per-entity line chart over periods.
    Series(SeriesEncoding),
    /// One stacked bar per entity.
    StackedBar(StackedBarEncoding),
}

impl EncodingSpec {
    /// Encoding for one render. `shown` is the metric picked by a [`SelectorKind::Latest`]
    /// selector, if any.
    pub fn for_selection(&self, shown: Option<&MetricName>) -> Box<dyn Encoding> {
        match (self, shown) {
            (Self::Scatter(s), _) => Box::new(s.clone()),
            (Self::Choropleth(c), Some(m)) => Box::new(c.for_metric(m)),
            (Self::Choropleth(c), None) => Box::new(c.clone()),
            (Self::Series(s), _) => Box::new(s.clone()),
            (Self::StackedBar(b), _) => Box::new(b.clone()),
        }
    }

    fn metrics(&self) -> Vec<&MetricName> {
        match self {
            Self::Scatter(s) => vec![&s.x_metric, &s.y_metric],
            Self::Choropleth(c) => vec![&c.metric],
            Self::Series(s) => s.series.iter().map(|l| &l.metric).collect(),
            Self::StackedBar(b) => b.stack.iter().map(|l| &l.metric).collect(),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Scatter(_) => "scatter",
            Self::Choropleth(_) => "choropleth",
            Self::Series(_) => "series",
            Self::StackedBar(_) => "stacked_bar",
        }
    }

    /// Selector kinds this encoding can be driven by.
    fn accepts(&self, kind: SelectorKind) -> bool {
        match self {
            Self::Scatter(_) | Self::StackedBar(_) => kind == SelectorKind::Period,
            Self::Choropleth(_) => kind != SelectorKind::Entity,
            Self::Series(_) => kind == SelectorKind::Entity,
        }
    }
}

/// Tooltip behavior and content.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    /// Hover-follow or click-to-pin.
    pub mode: TooltipMode,
    /// Metric rows; empty lists every metric.
    pub lines: MetricTooltip,
}

/// JSON description of one chart page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Tables to load, one metric each.
    pub sources: Vec<SourceSpec>,
    /// How points become marks.
    pub encoding: EncodingSpec,
    /// What selector values mean.
    #[serde(default)]
    pub selector: SelectorKind,
    /// Transition timing.
    #[serde(default)]
    pub transition: TransitionOpts,
    /// Tooltip behavior and content.
    #[serde(default)]
    pub tooltip: TooltipConfig,
    /// Selector value of the first render. Defaults to the latest period, the first source for
    /// [`SelectorKind::Latest`], or the first entity common to all sources for
    /// [`SelectorKind::Entity`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
}

impl ChartConfig {
    /// Parse a chart config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ChartResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ChartError::serde(format!("parse chart config JSON: {e}")))
    }

    /// Parse a chart config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ChartResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ChartError::validation(format!("open chart config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check cross-references between sources, encoding and tooltip lines.
    pub fn validate(&self) -> ChartResult<()> {
        if self.sources.is_empty() {
            return Err(ChartError::validation("at least one source must be declared"));
        }

        let mut metrics = BTreeSet::new();
        for s in &self.sources {
            if s.metric.as_str().trim().is_empty() {
                return Err(ChartError::validation("source metric must be non-empty"));
            }
            if s.path.as_os_str().is_empty() {
                return Err(ChartError::validation(format!(
                    "source '{}' path must be non-empty",
                    s.metric
                )));
            }
            if !metrics.insert(&s.metric) {
                return Err(ChartError::validation(format!(
                    "source metric '{}' is declared twice",
                    s.metric
                )));
            }
        }

        if !self.encoding.accepts(self.selector) {
            return Err(ChartError::validation(format!(
                "{} encoding cannot be driven by a {:?} selector",
                self.encoding.kind_name(),
                self.selector
            )));
        }

        match &self.encoding {
            EncodingSpec::Scatter(s) => {
                for (name, v) in [("radius", s.radius), ("width", s.width), ("height", s.height)]
                {
                    if !v.is_finite() || v <= 0.0 {
                        return Err(ChartError::validation(format!(
                            "scatter {name} must be finite and > 0"
                        )));
                    }
                }
                if !(0.0..=1.0).contains(&s.opacity) {
                    return Err(ChartError::validation("scatter opacity must be in [0, 1]"));
                }
                if let Some(line) = &s.mean_line
                    && !(line.stroke_width.is_finite() && line.stroke_width > 0.0)
                {
                    return Err(ChartError::validation(
                        "scatter mean_line stroke_width must be finite and > 0",
                    ));
                }
            }
            EncodingSpec::Choropleth(c) => {
                for v in std::iter::once(c.domain_max).chain(c.domain_max_by.values().copied()) {
                    if !v.is_finite() || v <= 0.0 {
                        return Err(ChartError::validation(
                            "choropleth domain bounds must be finite and > 0",
                        ));
                    }
                }
            }
            EncodingSpec::Series(s) => {
                if s.series.is_empty() {
                    return Err(ChartError::validation("series encoding needs a series"));
                }
                for (name, v) in [
                    ("radius", s.radius),
                    ("stroke_width", s.stroke_width),
                    ("width", s.width),
                    ("height", s.height),
                ] {
                    if !v.is_finite() || v <= 0.0 {
                        return Err(ChartError::validation(format!(
                            "series {name} must be finite and > 0"
                        )));
                    }
                }
            }
            EncodingSpec::StackedBar(b) => {
                if b.stack.is_empty() {
                    return Err(ChartError::validation("stacked bar encoding needs a layer"));
                }
                if !(0.0..1.0).contains(&b.padding) {
                    return Err(ChartError::validation("stacked bar padding must be in [0, 1)"));
                }
            }
        }

        let mut seen = BTreeSet::new();
        for m in self.encoding.metrics() {
            if !seen.insert(m) && !matches!(self.encoding, EncodingSpec::Scatter(_)) {
                return Err(ChartError::validation(format!(
                    "encoding lists metric '{m}' twice"
                )));
            }
        }

        if self.selector != SelectorKind::Latest {
            for m in self.encoding.metrics() {
                if !metrics.contains(m) {
                    return Err(ChartError::validation(format!(
                        "encoding references unknown metric '{m}'"
                    )));
                }
            }
        }
        for line in &self.tooltip.lines.lines {
            if !metrics.contains(&line.metric) {
                return Err(ChartError::validation(format!(
                    "tooltip references unknown metric '{}'",
                    line.metric
                )));
            }
        }
        if self.selector == SelectorKind::Latest
            && let Some(v) = &self.initial
            && !metrics.contains(&MetricName::new(v.as_str()))
        {
            return Err(ChartError::validation(format!(
                "initial selector '{v}' is not a source metric"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/chart.rs"]
mod tests;
