use crate::data::observation::{Observation, ObservationTable, parse_value};
use crate::foundation::core::{EntityKey, MetricName, PeriodKey};
use crate::foundation::error::{ChartError, ChartResult};
use serde::{Deserialize, Serialize};

/// One record per source row: column name to cell.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Untyped rows as handed over by a loader (the shape a CSV parser produces).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTable {
    /// Rows in source order.
    pub records: Vec<RawRecord>,
}

impl RawTable {
    /// Table over `records`.
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    /// Parse a JSON array of records.
    pub fn from_reader<R: std::io::Read>(r: R) -> ChartResult<Self> {
        serde_json::from_reader(r).map_err(|e| ChartError::serde(format!("parse table JSON: {e}")))
    }
}

/// Keep only rows whose `column` cell equals `equals` (e.g. `MEASURE == "SP_DS"`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    /// Column to test.
    pub column: String,
    /// Required cell text.
    pub equals: String,
}

/// Column mapping applied at the loader boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Column holding the entity name.
    #[serde(default = "default_entity_column")]
    pub entity: String,
    /// Column holding the period.
    #[serde(default = "default_period_column")]
    pub period: String,
    /// Column holding the value text.
    #[serde(default = "default_value_column")]
    pub value: String,
    /// Row filters, all of which must match.
    #[serde(default)]
    pub filters: Vec<ColumnFilter>,
}

fn default_entity_column() -> String {
    "Reference area".to_owned()
}

fn default_period_column() -> String {
    "TIME_PERIOD".to_owned()
}

fn default_value_column() -> String {
    "OBS_VALUE".to_owned()
}

impl Default for TableSchema {
    fn default() -> Self {
        Self {
            entity: default_entity_column(),
            period: default_period_column(),
            value: default_value_column(),
            filters: Vec::new(),
        }
    }
}

impl TableSchema {
    /// Schema with explicit column names and no filters.
    pub fn new(
        entity: impl Into<String>,
        period: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            period: period.into(),
            value: value.into(),
            filters: Vec::new(),
        }
    }

    /// Also require `column == equals`.
    pub fn with_filter(mut self, column: impl Into<String>, equals: impl Into<String>) -> Self {
        self.filters.push(ColumnFilter {
            column: column.into(),
            equals: equals.into(),
        });
        self
    }

    /// Validate `raw` against this schema and produce typed observations.
    ///
    /// Every row must carry the entity, period, value and filter columns. Non-numeric value
    /// cells become missing values, they never fail the table.
    pub fn apply(
        &self,
        raw: &RawTable,
        metric: impl Into<MetricName>,
    ) -> ChartResult<ObservationTable> {
        let metric = metric.into();
        let mut rows = Vec::with_capacity(raw.records.len());

        for (i, rec) in raw.records.iter().enumerate() {
            let cell = |col: &str| {
                rec.get(col).ok_or_else(|| {
                    ChartError::malformed(format!(
                        "table '{metric}' row {i} lacks column \"{col}\""
                    ))
                })
            };

            let mut keep = true;
            for f in &self.filters {
                if cell_text(cell(&f.column)?).trim() != f.equals {
                    keep = false;
                }
            }

            let entity = cell_text(cell(&self.entity)?);
            let period = cell_text(cell(&self.period)?);
            let value = cell_text(cell(&self.value)?);
            if !keep {
                continue;
            }

            let entity = entity.trim();
            if entity.is_empty() {
                return Err(ChartError::malformed(format!(
                    "table '{metric}' row {i} has an empty \"{}\" cell",
                    self.entity
                )));
            }

            rows.push(Observation {
                entity: EntityKey::new(entity),
                period: PeriodKey::new(period),
                value: parse_value(&value),
            });
        }

        Ok(ObservationTable { metric, rows })
    }
}

fn cell_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/schema.rs"]
mod tests;
