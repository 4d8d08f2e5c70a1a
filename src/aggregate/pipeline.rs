use crate::data::observation::ObservationTable;
use crate::foundation::core::{EntityKey, MetricName, PeriodKey};
use crate::foundation::error::{ChartError, ChartResult};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Clone, Debug, PartialEq, Serialize)]
/// One joined data point per entity, produced fresh on every render.
pub struct AggregatedPoint {
    /// Entity this point (and its visual element) represents.
    pub key: EntityKey,
    /// One value per source table, keyed by the table's metric.
    pub metrics: BTreeMap<MetricName, f64>,
}

impl AggregatedPoint {
    /// Value of `name`, if this point carries it.
    pub fn metric(&self, name: &MetricName) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// Per-entity reduction of one table, remembering first-encounter order.
struct Grouping {
    order: Vec<EntityKey>,
    values: HashMap<EntityKey, f64>,
}

impl Grouping {
    fn get(&self, key: &EntityKey) -> Option<f64> {
        self.values.get(key).copied()
    }
}

/// Stateless filter / group / join pipeline over observation tables.
pub struct AggregationPipeline;

impl AggregationPipeline {
    /// Mean of each entity's numeric observations in `period`, inner-joined across `tables`.
    ///
    /// Output order follows the first table's first-encounter order. Missing values count
    /// toward neither sum nor denominator; an entity with no numeric rows in any one table is
    /// dropped from the result.
    #[tracing::instrument(skip(tables), fields(tables = tables.len()))]
    pub fn aggregate(
        tables: &[ObservationTable],
        period: &PeriodKey,
    ) -> ChartResult<Vec<AggregatedPoint>> {
        check_tables(tables)?;
        let groupings: Vec<Grouping> = tables.iter().map(|t| group_mean(t, period)).collect();
        Ok(join(tables, &groupings))
    }

    /// Latest numeric value per entity (greatest period, first row wins ties), inner-joined.
    #[tracing::instrument(skip(tables), fields(tables = tables.len()))]
    pub fn aggregate_latest(tables: &[ObservationTable]) -> ChartResult<Vec<AggregatedPoint>> {
        check_tables(tables)?;
        let groupings: Vec<Grouping> = tables.iter().map(group_latest).collect();
        Ok(join(tables, &groupings))
    }

    /// One point per period for `entity`, each carrying the mean of every table that has a
    /// numeric observation for it in that period.
    ///
    /// Unlike [`Self::aggregate`] nothing is joined: a period present in only some tables
    /// yields a point with only those metrics. Points are keyed by period text and ordered by
    /// period.
    #[tracing::instrument(skip(tables), fields(tables = tables.len()))]
    pub fn series(
        tables: &[ObservationTable],
        entity: &EntityKey,
    ) -> ChartResult<Vec<AggregatedPoint>> {
        check_tables(tables)?;
        let mut periods: BTreeMap<&PeriodKey, BTreeMap<MetricName, (f64, u32)>> = BTreeMap::new();
        for t in tables {
            for (obs, v) in t.numeric_rows() {
                if &obs.entity != entity {
                    continue;
                }
                let slot = periods
                    .entry(&obs.period)
                    .or_default()
                    .entry(t.metric.clone())
                    .or_insert((0.0, 0));
                slot.0 += v;
                slot.1 += 1;
            }
        }

        Ok(periods
            .into_iter()
            .map(|(period, sums)| AggregatedPoint {
                key: EntityKey::new(period.as_str()),
                metrics: sums
                    .into_iter()
                    .map(|(m, (sum, n))| (m, sum / f64::from(n)))
                    .collect(),
            })
            .collect())
    }
}

fn check_tables(tables: &[ObservationTable]) -> ChartResult<()> {
    if tables.is_empty() {
        return Err(ChartError::malformed(
            "aggregation requires at least one source table",
        ));
    }
    let mut seen = BTreeSet::new();
    for t in tables {
        if t.metric.as_str().trim().is_empty() {
            return Err(ChartError::malformed("source table metric must be non-empty"));
        }
        if !seen.insert(&t.metric) {
            return Err(ChartError::malformed(format!(
                "metric '{}' is provided by more than one table",
                t.metric
            )));
        }
    }
    Ok(())
}

fn group_mean(table: &ObservationTable, period: &PeriodKey) -> Grouping {
    let mut order = Vec::new();
    let mut acc: HashMap<EntityKey, (f64, u32)> = HashMap::new();

    for (obs, v) in table.numeric_rows() {
        if &obs.period != period {
            continue;
        }
        let slot = acc.entry(obs.entity.clone()).or_insert_with(|| {
            order.push(obs.entity.clone());
            (0.0, 0)
        });
        slot.0 += v;
        slot.1 += 1;
    }

    let values = acc
        .into_iter()
        .map(|(k, (sum, n))| (k, sum / f64::from(n)))
        .collect();
    Grouping { order, values }
}

fn group_latest(table: &ObservationTable) -> Grouping {
    let mut order = Vec::new();
    let mut latest: HashMap<EntityKey, (&PeriodKey, f64)> = HashMap::new();

    for (obs, v) in table.numeric_rows() {
        match latest.get_mut(&obs.entity) {
            Some(slot) => {
                if obs.period > *slot.0 {
                    *slot = (&obs.period, v);
                }
            }
            None => {
                order.push(obs.entity.clone());
                latest.insert(obs.entity.clone(), (&obs.period, v));
            }
        }
    }

    let values = latest.into_iter().map(|(k, (_, v))| (k, v)).collect();
    Grouping { order, values }
}

fn join(tables: &[ObservationTable], groupings: &[Grouping]) -> Vec<AggregatedPoint> {
    let Some(first) = groupings.first() else {
        return Vec::new();
    };

    first
        .order
        .iter()
        .filter_map(|key| {
            let metrics = tables
                .iter()
                .zip(groupings)
                .map(|(t, g)| g.get(key).map(|v| (t.metric.clone(), v)))
                .collect::<Option<BTreeMap<_, _>>>()?;
            Some(AggregatedPoint {
                key: key.clone(),
                metrics,
            })
        })
        .collect()
}

/// Distinct periods holding at least one numeric observation, ascending.
pub fn available_periods(tables: &[ObservationTable]) -> Vec<PeriodKey> {
    let set: BTreeSet<&PeriodKey> = tables
        .iter()
        .flat_map(|t| t.numeric_rows().map(|(o, _)| &o.period))
        .collect();
    set.into_iter().cloned().collect()
}

/// Entities with numeric observations in every table, ascending.
pub fn common_entities(tables: &[ObservationTable]) -> Vec<EntityKey> {
    let mut sets = tables.iter().map(|t| {
        t.numeric_rows()
            .map(|(o, _)| &o.entity)
            .collect::<BTreeSet<_>>()
    });
    let Some(mut common) = sets.next() else {
        return Vec::new();
    };
    for s in sets {
        common.retain(|k| s.contains(k));
    }
    common.into_iter().cloned().collect()
}

/// Mean of one metric over a joined point set. `None` when no point carries it.
pub fn metric_mean(points: &[AggregatedPoint], metric: &MetricName) -> Option<f64> {
    let (sum, n) = points
        .iter()
        .filter_map(|p| p.metric(metric))
        .fold((0.0, 0u32), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / f64::from(n))
}

#[cfg(test)]
#[path = "../../tests/unit/aggregate/pipeline.rs"]
mod tests;
