use crate::animation::ease::Ease;
use crate::animation::lerp::Lerp;
use crate::foundation::core::Millis;
use crate::foundation::error::{ChartError, ChartResult};
use crate::scene::attrs::AttributeSet;
use crate::scene::element::{ElementPhase, ElementRef};
use crate::scene::pool::ElementPool;
use serde::{Deserialize, Serialize};

/// Identity of one started tween. A restart always allocates a new id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AnimationId(pub u64);

/// In-flight tween of one element from `from` toward the element's target.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationHandle {
    /// Fresh for every started tween.
    pub id: AnimationId,
    /// Attributes at the moment the tween started.
    pub from: AttributeSet,
    /// Clock reading the tween started at.
    pub start: Millis,
    /// Length of the tween.
    pub duration: Millis,
    /// Curve applied to linear progress.
    pub ease: Ease,
}

impl AnimationHandle {
    /// Linear progress in `[0, 1]` at `now`.
    pub fn progress(&self, now: Millis) -> f64 {
        if self.duration.0 == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start).0 as f64;
        (elapsed / self.duration.0 as f64).clamp(0.0, 1.0)
    }
}

/// Durations and curve for one page's transitions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionOpts {
    /// Enter and update duration.
    pub duration_ms: u64,
    /// Exit duration.
    pub exit_duration_ms: u64,
    /// Curve shared by every transition.
    pub ease: Ease,
}

impl Default for TransitionOpts {
    fn default() -> Self {
        Self {
            duration_ms: 750,
            exit_duration_ms: 500,
            ease: Ease::InOutCubic,
        }
    }
}

/// Result of one animation frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Elements whose current attributes moved but have not arrived.
    pub advanced: Vec<ElementRef>,
    /// Elements that reached their target this tick (removed ones included).
    pub finished: Vec<ElementRef>,
    /// Exiting elements dropped from the pool this tick.
    pub removed: Vec<ElementRef>,
}

/// Drives per-element tweens on a shared clock.
///
/// Each element holds at most one [`AnimationHandle`]. Retargeting an element mid-flight
/// replaces its handle, starting from wherever the old tween had got to.
#[derive(Debug, Default)]
pub struct TransitionScheduler {
    next_id: u64,
}

impl TransitionScheduler {
    /// Scheduler with no tweens started yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tweens toward the current targets of `elements`.
    ///
    /// Elements whose target did not change since their last schedule keep their in-flight
    /// tween (or stay at rest). Returns the number of tweens started.
    pub fn schedule(
        &mut self,
        pool: &mut ElementPool,
        elements: &[ElementRef],
        duration: Millis,
        ease: Ease,
        now: Millis,
    ) -> ChartResult<usize> {
        // Resolve everything first so a stale reference cannot leave a half-scheduled batch.
        for r in elements {
            if pool.resolve(r).is_none() {
                return Err(ChartError::animation(format!(
                    "element {:?} ('{}') is not in the pool",
                    r.id, r.key
                )));
            }
        }

        let mut started = 0;
        for r in elements {
            let Some(el) = pool.resolve_mut(r) else {
                continue;
            };
            if !el.retargeted {
                continue;
            }
            if let Some(anim) = el.animation.take() {
                // Cancel: freeze at the interpolated position reached so far.
                el.current = sample(&anim, el.tween_target(), now);
                el.prev_target = None;
            }
            if el.phase == ElementPhase::Exiting {
                // Exit holds geometry where the element is now, not where the last tick left it.
                el.target = el.current.neutral();
            }
            el.animation = Some(AnimationHandle {
                id: self.allocate_id(),
                from: el.current.clone(),
                start: now,
                duration,
                ease,
            });
            el.retargeted = false;
            started += 1;
        }
        Ok(started)
    }

    /// Advance every in-flight tween to `now`; drop exiting elements that arrived.
    pub fn tick(&mut self, pool: &mut ElementPool, now: Millis) -> TickReport {
        let mut report = TickReport::default();

        for el in pool.values_mut() {
            let Some(anim) = el.animation.as_ref() else {
                continue;
            };
            if anim.progress(now) >= 1.0 {
                el.current = el.tween_target().clone();
                el.animation = None;
                el.prev_target = None;
                report.finished.push(el.element_ref());
                if el.phase == ElementPhase::Exiting {
                    report.removed.push(el.element_ref());
                }
            } else {
                el.current = sample(anim, el.tween_target(), now);
                report.advanced.push(el.element_ref());
            }
        }

        for r in &report.removed {
            pool.remove(r);
        }
        report
    }

    fn allocate_id(&mut self) -> AnimationId {
        let id = AnimationId(self.next_id);
        self.next_id += 1;
        id
    }
}

fn sample(anim: &AnimationHandle, target: &AttributeSet, now: Millis) -> AttributeSet {
    let t = anim.ease.apply(anim.progress(now));
    AttributeSet::lerp(&anim.from, target, t)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/scheduler.rs"]
mod tests;
