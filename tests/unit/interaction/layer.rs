use super::*;
use crate::aggregate::pipeline::AggregatedPoint;
use crate::encoding::{Encoding, Mark};
use crate::foundation::core::MetricName;
use crate::foundation::error::ChartResult;
use crate::interaction::tooltip::MetricTooltip;
use crate::scene::attrs::{AttrValue, AttributeSet};
use crate::scene::reconcile::SceneReconciler;
use crate::surface::recording::{RecordingSurface, RecordingTooltip};
use std::collections::BTreeMap;

struct Dot;

impl Encoding for Dot {
    fn encode(&self, points: &[AggregatedPoint]) -> ChartResult<Vec<Mark>> {
        let mut marks = crate::encoding::per_point(points, |_| {
            Ok(AttributeSet::new().with("r", AttrValue::Extent(6.0)))
        })?;
        if !points.is_empty() {
            marks.push(Mark::decoration(
                "mean:v",
                AttributeSet::new().with("y1", AttrValue::Position(10.0)),
            ));
        }
        Ok(marks)
    }
}

struct Harness {
    pool: ElementPool,
    layer: InteractionLayer,
    surface: RecordingSurface,
    tooltip: RecordingTooltip,
}

impl Harness {
    fn new(mode: TooltipMode) -> Self {
        Self {
            pool: ElementPool::new(),
            layer: InteractionLayer::new(mode, Box::new(MetricTooltip::default())),
            surface: RecordingSurface::new(),
            tooltip: RecordingTooltip::default(),
        }
    }

    fn render(&mut self, items: &[(&str, f64)]) -> SceneDiff {
        let points: Vec<AggregatedPoint> = items
            .iter()
            .map(|(k, v)| AggregatedPoint {
                key: (*k).into(),
                metrics: BTreeMap::from([(MetricName::new("v"), *v)]),
            })
            .collect();
        let diff = SceneReconciler::reconcile(&points, &Dot, &mut self.pool).unwrap();
        for r in &diff.enter {
            let el = self.pool.resolve(r).unwrap();
            self.surface.create(r.id, &r.key, el.current());
        }
        self.layer
            .rebind(&diff, &self.pool, &mut self.surface, &mut self.tooltip);
        diff
    }

    fn send(&mut self, ev: PointerEvent) -> bool {
        self.layer
            .handle(&ev, &self.pool, &mut self.surface, &mut self.tooltip)
    }
}

fn enter(key: &str) -> PointerEvent {
    PointerEvent::Enter {
        target: key.into(),
        at: Point::new(100.0, 100.0),
    }
}

#[test]
fn transient_tooltip_follows_hover() {
    let mut h = Harness::new(TooltipMode::Transient);
    h.render(&[("FI", 1.5)]);

    assert!(h.send(enter("FI")));
    assert!(h.tooltip.visible);
    assert_eq!(h.tooltip.content, "FI\nv: 1.50");
    assert_eq!(h.tooltip.position, Point::new(110.0, 72.0));
    assert!(h.surface.node_for(&"FI".into()).unwrap().highlighted);

    h.send(PointerEvent::Move {
        at: Point::new(200.0, 50.0),
    });
    assert_eq!(h.tooltip.position, Point::new(210.0, 22.0));

    h.send(PointerEvent::Leave {
        target: "FI".into(),
    });
    assert!(!h.tooltip.visible);
    assert!(!h.surface.node_for(&"FI".into()).unwrap().highlighted);
}

#[test]
fn transient_mode_ignores_clicks() {
    let mut h = Harness::new(TooltipMode::Transient);
    h.render(&[("FI", 1.0)]);
    assert!(!h.send(PointerEvent::Click {
        target: Some("FI".into()),
        at: Point::ZERO,
    }));
    assert!(!h.tooltip.visible);
}

#[test]
fn persistent_tooltip_pins_until_background_click() {
    let mut h = Harness::new(TooltipMode::Persistent);
    h.render(&[("FI", 1.0), ("SE", 2.0)]);

    assert!(h.send(PointerEvent::Click {
        target: Some("SE".into()),
        at: Point::new(10.0, 40.0),
    }));
    assert!(h.tooltip.visible);
    assert_eq!(h.tooltip.content, "SE\nv: 2.00");

    // Hover traffic does not dismiss a pinned tooltip.
    h.send(enter("FI"));
    h.send(PointerEvent::Leave {
        target: "FI".into(),
    });
    assert!(h.tooltip.visible);
    assert_eq!(h.tooltip.content, "SE\nv: 2.00");

    assert!(!h.send(PointerEvent::Click {
        target: None,
        at: Point::ZERO,
    }));
    assert!(!h.tooltip.visible);
}

#[test]
fn tooltip_content_tracks_recomputed_point() {
    let mut h = Harness::new(TooltipMode::Persistent);
    h.render(&[("FI", 1.0)]);
    h.send(PointerEvent::Click {
        target: Some("FI".into()),
        at: Point::ZERO,
    });
    h.render(&[("FI", 7.25)]);
    assert!(h.tooltip.visible);
    assert_eq!(h.tooltip.content, "FI\nv: 7.25");

    h.send(PointerEvent::Click {
        target: Some("FI".into()),
        at: Point::ZERO,
    });
    assert_eq!(h.tooltip.content, "FI\nv: 7.25");
}

#[test]
fn exiting_elements_are_unbound() {
    let mut h = Harness::new(TooltipMode::Persistent);
    h.render(&[("FI", 1.0), ("SE", 2.0)]);
    h.send(PointerEvent::Click {
        target: Some("SE".into()),
        at: Point::ZERO,
    });
    h.send(enter("SE"));

    h.render(&[("FI", 1.0)]);
    assert!(!h.layer.is_bound(&"SE".into()));
    assert_eq!(h.layer.bound_len(), 1);
    assert!(!h.tooltip.visible);
    assert!(!h.surface.node_for(&"SE".into()).unwrap().highlighted);

    // Still pooled while it tweens out, but no longer a click target.
    assert!(h.pool.contains(&"SE".into()));
    assert!(!h.send(PointerEvent::Click {
        target: Some("SE".into()),
        at: Point::ZERO,
    }));
    assert!(!h.send(enter("SE")));
}

#[test]
fn rebinding_does_not_duplicate_handlers() {
    let mut h = Harness::new(TooltipMode::Transient);
    h.render(&[("FI", 1.0)]);
    h.render(&[("FI", 2.0)]);
    h.render(&[("FI", 3.0)]);
    assert_eq!(h.layer.bound_len(), 1);
    h.send(enter("FI"));
    assert_eq!(h.tooltip.shows, 1);
}

#[test]
fn decoration_marks_take_no_pointer_input() {
    let mut h = Harness::new(TooltipMode::Persistent);
    h.render(&[("FI", 1.0)]);
    assert!(h.pool.contains(&"mean:v".into()));
    assert!(!h.layer.is_bound(&"mean:v".into()));

    assert!(!h.send(enter("mean:v")));
    assert!(!h.send(PointerEvent::Click {
        target: Some("mean:v".into()),
        at: Point::ZERO,
    }));
    assert!(!h.tooltip.visible);
    assert!(!h.surface.node_for(&"mean:v".into()).unwrap().highlighted);
}
