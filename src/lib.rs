//! chartweave turns observation tables into keyed, animated chart scenes.
//!
//! A chart re-renders whenever its selector changes. Instead of rebuilding, each render is a
//! diff against the elements already on screen:
//!
//! 1. **Load**: every declared source is fetched and typed at the loader boundary, all or
//!    nothing ([`load_all`], [`TableSchema`]).
//! 2. **Aggregate**: filter by period, average per entity, inner-join across tables, or
//!    follow one entity over time ([`AggregationPipeline`]).
//! 3. **Reconcile**: encode the points into keyed marks and split them into
//!    enter/update/exit by key ([`SceneReconciler`]).
//! 4. **Transition**: tween every changed element on a shared clock, restarting mid-flight
//!    tweens from where they are and removing exits once they arrive ([`TransitionScheduler`]).
//! 5. **Interact**: hover and click handling with a single shared tooltip
//!    ([`InteractionLayer`]).
//!
//! [`ChartController`] owns one chart and drives the steps above against a [`RenderSurface`]
//! and a [`TooltipSurface`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod aggregate;
mod animation;
mod config;
mod controller;
mod data;
mod encoding;
mod foundation;
mod interaction;
mod loader;
mod scene;
mod surface;

pub use aggregate::pipeline::{
    AggregatedPoint, AggregationPipeline, available_periods, common_entities, metric_mean,
};
pub use animation::ease::Ease;
pub use animation::lerp::{Lerp, lerp_angle};
pub use animation::scheduler::{
    AnimationHandle, AnimationId, TickReport, TransitionOpts, TransitionScheduler,
};
pub use config::chart::{ChartConfig, EncodingSpec, SelectorKind, TooltipConfig};
pub use controller::chart::{ChartController, RenderReport};
pub use data::observation::{Observation, ObservationTable, parse_value};
pub use data::schema::{ColumnFilter, RawRecord, RawTable, TableSchema};
pub use encoding::{Encoding, Mark};
pub use encoding::choropleth::ChoroplethEncoding;
pub use encoding::scale::{BandScale, DOMAIN_PADDING, LinearScale};
pub use encoding::scatter::{Margin, MeanLine, ScatterEncoding};
pub use encoding::series::{Axis, SeriesEncoding, SeriesLine};
pub use encoding::stacked::{StackLayer, StackedBarEncoding};
pub use foundation::core::{
    ElementId, EntityKey, MetricName, Millis, PeriodKey, Point, Rgba8, Vec2,
};
pub use foundation::error::{ChartError, ChartResult};
pub use interaction::layer::{InteractionLayer, PointerEvent, TOOLTIP_OFFSET};
pub use interaction::tooltip::{MetricTooltip, TooltipFormatter, TooltipLine, TooltipMode};
pub use loader::{JsonFileLoader, MemoryLoader, SourceLoader, SourceSpec, load_all};
pub use scene::attrs::{AttrValue, AttributeSet};
pub use scene::element::{ElementPhase, ElementRef, VisualElement};
pub use scene::pool::ElementPool;
pub use scene::reconcile::{SceneDiff, SceneReconciler};
pub use surface::recording::{RecordingSurface, RecordingTooltip, SurfaceNode, SurfaceOps};
pub use surface::{RenderSurface, TooltipSurface};
