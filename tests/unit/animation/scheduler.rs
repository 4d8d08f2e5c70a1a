use super::*;
use crate::aggregate::pipeline::AggregatedPoint;
use crate::encoding::{Encoding, Mark};
use crate::foundation::core::{EntityKey, MetricName};
use crate::foundation::error::ChartResult;
use crate::scene::attrs::AttrValue;
use crate::scene::reconcile::{SceneDiff, SceneReconciler};
use std::collections::BTreeMap;

struct Radius;

impl Encoding for Radius {
    fn encode(&self, points: &[AggregatedPoint]) -> ChartResult<Vec<Mark>> {
        crate::encoding::per_point(points, |p| {
            let v = crate::encoding::require_metric(p, &MetricName::new("v"))?;
            Ok(AttributeSet::new()
                .with("cx", AttrValue::Position(v * 10.0))
                .with("r", AttrValue::Extent(v))
                .with("opacity", AttrValue::Opacity(1.0)))
        })
    }
}

fn pts(items: &[(&str, f64)]) -> Vec<AggregatedPoint> {
    items
        .iter()
        .map(|(k, v)| AggregatedPoint {
            key: (*k).into(),
            metrics: BTreeMap::from([(MetricName::new("v"), *v)]),
        })
        .collect()
}

fn render(
    sched: &mut TransitionScheduler,
    pool: &mut ElementPool,
    points: &[AggregatedPoint],
    now: u64,
) -> SceneDiff {
    let diff = SceneReconciler::reconcile(points, &Radius, pool).unwrap();
    let bound: Vec<ElementRef> = diff.bound().cloned().collect();
    sched
        .schedule(pool, &bound, Millis(1000), Ease::Linear, Millis(now))
        .unwrap();
    sched
        .schedule(pool, &diff.exit, Millis(500), Ease::Linear, Millis(now))
        .unwrap();
    diff
}

fn r_of(pool: &ElementPool, key: &str) -> f64 {
    pool.get(&EntityKey::new(key))
        .unwrap()
        .current()
        .get("r")
        .and_then(AttrValue::as_f64)
        .unwrap()
}

#[test]
fn enter_tweens_from_neutral_to_target() {
    let mut sched = TransitionScheduler::new();
    let mut pool = ElementPool::new();
    render(&mut sched, &mut pool, &pts(&[("FI", 6.0)]), 0);
    assert_eq!(r_of(&pool, "FI"), 0.0);

    let rep = sched.tick(&mut pool, Millis(500));
    assert_eq!(rep.advanced.len(), 1);
    assert_eq!(r_of(&pool, "FI"), 3.0);

    let rep = sched.tick(&mut pool, Millis(1000));
    assert_eq!(rep.finished.len(), 1);
    let fi = pool.get(&"FI".into()).unwrap();
    assert_eq!(fi.current(), fi.target());
    assert!(fi.animation().is_none());
    assert!(pool.is_idle());
}

#[test]
fn attributes_share_one_clock() {
    let mut sched = TransitionScheduler::new();
    let mut pool = ElementPool::new();
    render(&mut sched, &mut pool, &pts(&[("FI", 4.0)]), 0);
    sched.tick(&mut pool, Millis(250));
    let cur = pool.get(&"FI".into()).unwrap().current().clone();
    assert_eq!(cur.get("r"), Some(AttrValue::Extent(1.0)));
    assert_eq!(cur.get("opacity"), Some(AttrValue::Opacity(0.25)));
    assert_eq!(cur.get("cx"), Some(AttrValue::Position(40.0)));
}

#[test]
fn exit_removes_element_after_its_duration() {
    let mut sched = TransitionScheduler::new();
    let mut pool = ElementPool::new();
    render(&mut sched, &mut pool, &pts(&[("FI", 6.0), ("SE", 2.0)]), 0);
    sched.tick(&mut pool, Millis(1000));

    let diff = render(&mut sched, &mut pool, &pts(&[("FI", 6.0)]), 2000);
    assert_eq!(diff.exit.len(), 1);
    sched.tick(&mut pool, Millis(2250));
    assert!(pool.contains(&"SE".into()));
    assert_eq!(r_of(&pool, "SE"), 1.0);

    let rep = sched.tick(&mut pool, Millis(2500));
    assert_eq!(rep.removed, diff.exit);
    assert!(!pool.contains(&"SE".into()));
    assert_eq!(pool.len(), 1);
}

#[test]
fn restart_starts_from_interpolated_position() {
    let mut sched = TransitionScheduler::new();
    let mut pool = ElementPool::new();
    render(&mut sched, &mut pool, &pts(&[("FI", 8.0)]), 0);
    let first = pool.get(&"FI".into()).unwrap().animation().unwrap().id;
    sched.tick(&mut pool, Millis(250));

    // Retarget at 500ms without an intervening tick: the restart point is sampled at 500ms.
    render(&mut sched, &mut pool, &pts(&[("FI", 2.0)]), 500);
    let fi = pool.get(&"FI".into()).unwrap();
    let anim = fi.animation().unwrap();
    assert_ne!(anim.id, first);
    assert_eq!(anim.start, Millis(500));
    assert_eq!(anim.from.get("r"), Some(AttrValue::Extent(4.0)));
    assert_ne!(anim.from.get("r"), Some(AttrValue::Extent(0.0)));

    sched.tick(&mut pool, Millis(1000));
    assert_eq!(r_of(&pool, "FI"), 3.0);
    sched.tick(&mut pool, Millis(1500));
    assert_eq!(r_of(&pool, "FI"), 2.0);
}

fn cx_of(attrs: &AttributeSet) -> f64 {
    attrs.get("cx").and_then(|v| v.as_f64()).unwrap()
}

#[test]
fn exit_during_update_holds_the_sampled_position() {
    let mut sched = TransitionScheduler::new();
    let mut pool = ElementPool::new();
    render(&mut sched, &mut pool, &pts(&[("FI", 8.0)]), 0);
    sched.tick(&mut pool, Millis(1000));

    // Update tween cx 80 -> 20 from t=1000, last ticked at t=1100 (cx 74).
    render(&mut sched, &mut pool, &pts(&[("FI", 2.0)]), 1000);
    sched.tick(&mut pool, Millis(1100));
    assert!((cx_of(pool.get(&"FI".into()).unwrap().current()) - 74.0).abs() < 1e-9);

    // Exit at t=1900 with no tick in between: the tween is sampled at cx 26.
    let diff = render(&mut sched, &mut pool, &[], 1900);
    assert_eq!(diff.exit.len(), 1);
    let fi = pool.get(&"FI".into()).unwrap();
    let from = cx_of(&fi.animation().unwrap().from);
    assert!((from - 26.0).abs() < 1e-9);
    assert_eq!(cx_of(fi.target()), from);
    assert_eq!(fi.target().get("opacity"), Some(AttrValue::Opacity(0.0)));

    for t in [2000, 2150, 2300] {
        sched.tick(&mut pool, Millis(t));
        let cx = cx_of(pool.get(&"FI".into()).unwrap().current());
        assert!((cx - 26.0).abs() < 1e-9, "cx drifted to {cx} at {t}");
    }
    let rep = sched.tick(&mut pool, Millis(2400));
    assert_eq!(rep.removed, diff.exit);
}

#[test]
fn unchanged_target_keeps_its_tween() {
    let mut sched = TransitionScheduler::new();
    let mut pool = ElementPool::new();
    render(&mut sched, &mut pool, &pts(&[("FI", 8.0)]), 0);
    let first = pool.get(&"FI".into()).unwrap().animation().unwrap().clone();

    render(&mut sched, &mut pool, &pts(&[("FI", 8.0)]), 300);
    let again = pool.get(&"FI".into()).unwrap().animation().unwrap();
    assert_eq!(again, &first);
}

#[test]
fn exit_then_return_redirects_without_removal() {
    let mut sched = TransitionScheduler::new();
    let mut pool = ElementPool::new();
    render(&mut sched, &mut pool, &pts(&[("FI", 8.0)]), 0);
    sched.tick(&mut pool, Millis(1000));

    render(&mut sched, &mut pool, &[], 1000);
    sched.tick(&mut pool, Millis(1250));
    assert_eq!(r_of(&pool, "FI"), 4.0);

    render(&mut sched, &mut pool, &pts(&[("FI", 8.0)]), 1250);
    let rep = sched.tick(&mut pool, Millis(1750));
    assert!(rep.removed.is_empty());
    assert_eq!(r_of(&pool, "FI"), 6.0);
    sched.tick(&mut pool, Millis(2250));
    assert_eq!(r_of(&pool, "FI"), 8.0);
    assert!(pool.get(&"FI".into()).unwrap().is_live());
}

#[test]
fn scheduling_a_stale_reference_fails() {
    let mut sched = TransitionScheduler::new();
    let mut pool = ElementPool::new();
    let stale = ElementRef {
        id: crate::foundation::core::ElementId(42),
        key: "XX".into(),
    };
    let err = sched
        .schedule(&mut pool, &[stale], Millis(10), Ease::Linear, Millis(0))
        .unwrap_err();
    assert!(err.to_string().contains("animation error"));
}

#[test]
fn zero_duration_finishes_on_next_tick() {
    let mut sched = TransitionScheduler::new();
    let mut pool = ElementPool::new();
    let diff = SceneReconciler::reconcile(&pts(&[("FI", 5.0)]), &Radius, &mut pool).unwrap();
    sched
        .schedule(&mut pool, &diff.enter, Millis(0), Ease::InOutCubic, Millis(7))
        .unwrap();
    let rep = sched.tick(&mut pool, Millis(7));
    assert_eq!(rep.finished.len(), 1);
    assert_eq!(r_of(&pool, "FI"), 5.0);
}
