//! Mapping of aggregated points to drawable attributes.

pub(crate) mod choropleth;
pub(crate) mod scale;
pub(crate) mod scatter;
pub(crate) mod series;
pub(crate) mod stacked;

use crate::aggregate::pipeline::AggregatedPoint;
use crate::foundation::core::{EntityKey, MetricName};
use crate::foundation::error::{ChartError, ChartResult};
use crate::scene::attrs::AttributeSet;

/// One keyed drawable requested by an encoding.
///
/// Most encodings draw one mark per point, keyed by the point's entity. Series, stacks and
/// reference lines draw several marks per point (or marks with no point at all), each under its
/// own key.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    /// Identity across renders; reconciliation matches elements on it.
    pub key: EntityKey,
    /// Point the tooltip describes. `None` marks are decoration and take no pointer input.
    pub datum: Option<AggregatedPoint>,
    /// Target attributes for this render.
    pub attrs: AttributeSet,
}

impl Mark {
    /// Mark drawn for `point`, keyed by its entity.
    pub fn for_point(point: &AggregatedPoint, attrs: AttributeSet) -> Self {
        Self {
            key: point.key.clone(),
            datum: Some(point.clone()),
            attrs,
        }
    }

    /// Mark that belongs to `point` but carries its own key.
    pub fn keyed(key: impl Into<EntityKey>, point: &AggregatedPoint, attrs: AttributeSet) -> Self {
        Self {
            key: key.into(),
            datum: Some(point.clone()),
            attrs,
        }
    }

    /// Decoration with no bound point (segments, reference lines).
    pub fn decoration(key: impl Into<EntityKey>, attrs: AttributeSet) -> Self {
        Self {
            key: key.into(),
            datum: None,
            attrs,
        }
    }
}

/// Turns one render's points into the marks that should be on screen.
///
/// Scale domains are derived from the whole point set, so an empty set encodes to no marks
/// rather than to a fallback domain.
pub trait Encoding: Send + Sync {
    /// Marks for `points`. Keys must be unique within one render.
    fn encode(&self, points: &[AggregatedPoint]) -> ChartResult<Vec<Mark>>;
}

/// One [`Mark::for_point`] per point, in order.
pub(crate) fn per_point(
    points: &[AggregatedPoint],
    mut attrs: impl FnMut(&AggregatedPoint) -> ChartResult<AttributeSet>,
) -> ChartResult<Vec<Mark>> {
    points
        .iter()
        .map(|p| Ok(Mark::for_point(p, attrs(p)?)))
        .collect()
}

pub(crate) fn require_metric(point: &AggregatedPoint, metric: &MetricName) -> ChartResult<f64> {
    point.metric(metric).ok_or_else(|| {
        ChartError::malformed(format!(
            "point '{}' has no metric '{metric}'",
            point.key
        ))
    })
}

pub(crate) fn require_positive(what: &str, v: f64) -> ChartResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ChartError::validation(format!("{what} must be finite and > 0")))
    }
}
