use crate::foundation::core::{EntityKey, MetricName, PeriodKey};
use serde::{Deserialize, Serialize};

/// One typed row of a source table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Subject of the row.
    pub entity: EntityKey,
    /// Period the value was observed in.
    pub period: PeriodKey,
    /// `None` when the source cell was not numeric. Never treated as zero.
    pub value: Option<f64>,
}

impl Observation {
    /// Row for `entity` in `period`.
    pub fn new(
        entity: impl Into<EntityKey>,
        period: impl Into<PeriodKey>,
        value: Option<f64>,
    ) -> Self {
        Self {
            entity: entity.into(),
            period: period.into(),
            value,
        }
    }
}

/// Typed rows of one source, tagged with the metric they measure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObservationTable {
    /// Metric every row measures.
    pub metric: MetricName,
    /// Rows in source order.
    pub rows: Vec<Observation>,
}

impl ObservationTable {
    /// Table of `rows` measuring `metric`.
    pub fn new(metric: impl Into<MetricName>, rows: Vec<Observation>) -> Self {
        Self {
            metric: metric.into(),
            rows,
        }
    }

    /// Number of rows, numeric or not.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows with a numeric value.
    pub fn numeric_rows(&self) -> impl Iterator<Item = (&Observation, f64)> {
        self.rows.iter().filter_map(|o| o.value.map(|v| (o, v)))
    }
}

/// Parse a cell's text into a finite number; anything else is a missing value.
pub fn parse_value(text: &str) -> Option<f64> {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
#[path = "../../tests/unit/data/observation.rs"]
mod tests;
