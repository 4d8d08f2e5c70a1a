use crate::aggregate::pipeline::{
    AggregatedPoint, AggregationPipeline, available_periods, common_entities, metric_mean,
};
use crate::animation::scheduler::{TickReport, TransitionOpts, TransitionScheduler};
use crate::config::chart::{ChartConfig, EncodingSpec, SelectorKind};
use crate::data::observation::ObservationTable;
use crate::encoding::Encoding;
use crate::foundation::core::{EntityKey, MetricName, Millis, PeriodKey};
use crate::foundation::error::{ChartError, ChartResult};
use crate::interaction::layer::{InteractionLayer, PointerEvent};
use crate::loader::{SourceLoader, load_all};
use crate::scene::element::ElementRef;
use crate::scene::pool::ElementPool;
use crate::scene::reconcile::SceneReconciler;
use crate::surface::{RenderSurface, TooltipSurface};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Outcome of one selector-driven render.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RenderReport {
    /// Selector value that was rendered.
    pub selector: String,
    /// Keys of elements created by this render.
    pub entered: Vec<EntityKey>,
    /// Keys of elements retained and retargeted.
    pub updated: Vec<EntityKey>,
    /// Keys of elements now leaving.
    pub exited: Vec<EntityKey>,
    /// The aggregation produced no point; every element is on its way out.
    pub empty_join: bool,
    /// Mean of each metric across the rendered points (reference lines).
    pub metric_means: BTreeMap<MetricName, f64>,
}

/// One chart: loaded tables, the element pool and its animations, interaction state, and the
/// surfaces they draw on.
///
/// Every render goes through [`ChartController::on_selector_change`]; nothing is torn down
/// between renders.
pub struct ChartController<S: RenderSurface, T: TooltipSurface> {
    tables: Vec<ObservationTable>,
    encoding: EncodingSpec,
    selector_kind: SelectorKind,
    transition: TransitionOpts,
    pool: ElementPool,
    scheduler: TransitionScheduler,
    interaction: InteractionLayer,
    selector: Option<String>,
    points: Arc<[AggregatedPoint]>,
    surface: S,
    tooltip: T,
}

impl<S: RenderSurface, T: TooltipSurface> ChartController<S, T> {
    /// Build a controller over already-typed tables. Nothing is rendered yet.
    pub fn from_tables(
        config: &ChartConfig,
        tables: Vec<ObservationTable>,
        surface: S,
        tooltip: T,
    ) -> ChartResult<Self> {
        config.validate()?;
        Ok(Self {
            tables,
            encoding: config.encoding.clone(),
            selector_kind: config.selector,
            transition: config.transition,
            pool: ElementPool::new(),
            scheduler: TransitionScheduler::new(),
            interaction: InteractionLayer::new(
                config.tooltip.mode,
                Box::new(config.tooltip.lines.clone()),
            ),
            selector: None,
            points: Arc::from(Vec::new()),
            surface,
            tooltip,
        })
    }

    /// Load every source, then render the initial selector value.
    ///
    /// A failed load returns [`ChartError::LoadFailure`] and no controller: nothing was drawn.
    pub fn init(
        config: &ChartConfig,
        loader: &dyn SourceLoader,
        surface: S,
        tooltip: T,
        now: Millis,
    ) -> ChartResult<(Self, RenderReport)> {
        config.validate()?;
        let tables = load_all(loader, &config.sources)?;
        let mut chart = Self::from_tables(config, tables, surface, tooltip)?;
        let initial = match &config.initial {
            Some(v) => v.clone(),
            None => chart.default_selector()?,
        };
        let report = chart.on_selector_change(&initial, now)?;
        Ok((chart, report))
    }

    /// Re-aggregate for `value` and move the scene toward the result.
    ///
    /// Aggregation and encoding run before any state is touched; on error the pool, the
    /// current points and the active selector are left as they were.
    #[tracing::instrument(skip_all, fields(selector = value))]
    pub fn on_selector_change(&mut self, value: &str, now: Millis) -> ChartResult<RenderReport> {
        let (points, encoding) = self.prepare(value).inspect_err(|e| {
            tracing::warn!(error = %e, "render aborted");
        })?;

        let diff = SceneReconciler::reconcile(&points, encoding.as_ref(), &mut self.pool)
            .inspect_err(|e| tracing::warn!(error = %e, "render aborted"))?;

        for r in &diff.enter {
            if let Some(el) = self.pool.resolve(r) {
                self.surface.create(r.id, &r.key, el.current());
            }
        }

        let bound: Vec<ElementRef> = diff.bound().cloned().collect();
        let opts = self.transition;
        self.scheduler
            .schedule(&mut self.pool, &bound, Millis(opts.duration_ms), opts.ease, now)?;
        self.scheduler.schedule(
            &mut self.pool,
            &diff.exit,
            Millis(opts.exit_duration_ms),
            opts.ease,
            now,
        )?;

        self.interaction
            .rebind(&diff, &self.pool, &mut self.surface, &mut self.tooltip);

        let metrics: BTreeSet<&MetricName> =
            points.iter().flat_map(|p| p.metrics.keys()).collect();
        let metric_means = metrics
            .into_iter()
            .filter_map(|m| metric_mean(&points, m).map(|v| (m.clone(), v)))
            .collect();

        let keys = |refs: &[ElementRef]| -> Vec<EntityKey> {
            refs.iter().map(|r| r.key.clone()).collect()
        };
        let report = RenderReport {
            selector: value.to_owned(),
            entered: keys(&diff.enter),
            updated: keys(&diff.update),
            exited: keys(&diff.exit),
            empty_join: points.is_empty(),
            metric_means,
        };

        self.points = Arc::from(points);
        self.selector = Some(value.to_owned());
        Ok(report)
    }

    /// Advance animations to `now` and push the new attributes to the surface.
    pub fn tick(&mut self, now: Millis) -> TickReport {
        let report = self.scheduler.tick(&mut self.pool, now);
        for r in report.advanced.iter().chain(&report.finished) {
            if let Some(el) = self.pool.resolve(r) {
                self.surface.update(r.id, el.current());
            }
        }
        for r in &report.removed {
            self.surface.remove(r.id);
        }
        if !report.removed.is_empty() {
            tracing::debug!(removed = report.removed.len(), "exit transitions completed");
        }
        report
    }

    /// Dispatch one pointer event. Returns whether it hit a live element.
    pub fn pointer(&mut self, event: &PointerEvent) -> bool {
        self.interaction
            .handle(event, &self.pool, &mut self.surface, &mut self.tooltip)
    }

    /// Tick every `step` from `start` until no animation is in flight. Returns the last tick.
    pub fn run_until_idle(&mut self, start: Millis, step: Millis) -> ChartResult<Millis> {
        if step.0 == 0 {
            return Err(ChartError::validation("tick step must be > 0 ms"));
        }
        let mut now = start;
        while !self.pool.is_idle() {
            now = now.saturating_add(step);
            self.tick(now);
        }
        Ok(now)
    }

    /// Selector value of the latest successful render.
    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    /// Points of the latest successful render.
    pub fn points(&self) -> Arc<[AggregatedPoint]> {
        Arc::clone(&self.points)
    }

    /// Every pooled element, exiting ones included.
    pub fn pool(&self) -> &ElementPool {
        &self.pool
    }

    /// Tables loaded at init.
    pub fn tables(&self) -> &[ObservationTable] {
        &self.tables
    }

    /// The render surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The tooltip surface.
    pub fn tooltip(&self) -> &T {
        &self.tooltip
    }

    /// Hover and click state.
    pub fn interaction(&self) -> &InteractionLayer {
        &self.interaction
    }

    /// Periods a selector may offer.
    pub fn available_periods(&self) -> Vec<PeriodKey> {
        available_periods(&self.tables)
    }

    /// Entities an entity selector may offer: those with data in every source.
    pub fn common_entities(&self) -> Vec<EntityKey> {
        common_entities(&self.tables)
    }

    fn default_selector(&self) -> ChartResult<String> {
        match self.selector_kind {
            SelectorKind::Period => self
                .available_periods()
                .pop()
                .map(|p| p.to_string())
                .ok_or_else(|| ChartError::malformed("no period has a numeric observation")),
            SelectorKind::Latest => self
                .tables
                .first()
                .map(|t| t.metric.to_string())
                .ok_or_else(|| ChartError::malformed("no source table loaded")),
            SelectorKind::Entity => self
                .common_entities()
                .into_iter()
                .next()
                .map(|e| e.to_string())
                .ok_or_else(|| ChartError::malformed("no entity is present in every source")),
        }
    }

    fn prepare(&self, value: &str) -> ChartResult<(Vec<AggregatedPoint>, Box<dyn Encoding>)> {
        match self.selector_kind {
            SelectorKind::Period => {
                let points = AggregationPipeline::aggregate(&self.tables, &PeriodKey::new(value))?;
                Ok((points, self.encoding.for_selection(None)))
            }
            SelectorKind::Latest => {
                let metric = MetricName::new(value.trim());
                let table = self
                    .tables
                    .iter()
                    .find(|t| t.metric == metric)
                    .ok_or_else(|| {
                        ChartError::validation(format!("unknown selector value '{value}'"))
                    })?;
                let points = AggregationPipeline::aggregate_latest(std::slice::from_ref(table))?;
                Ok((points, self.encoding.for_selection(Some(&metric))))
            }
            SelectorKind::Entity => {
                let entity = EntityKey::new(value.trim());
                let points = AggregationPipeline::series(&self.tables, &entity)?;
                Ok((points, self.encoding.for_selection(None)))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/controller/chart.rs"]
mod tests;
