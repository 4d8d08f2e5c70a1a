use crate::aggregate::pipeline::AggregatedPoint;
use crate::animation::scheduler::AnimationHandle;
use crate::foundation::core::{ElementId, EntityKey};
use crate::scene::attrs::AttributeSet;
use serde::Serialize;

/// Lifecycle stage of a pooled element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementPhase {
    /// Drawn by the latest render.
    Live,
    /// Absent from the latest render; tweening toward neutral, removed when done.
    Exiting,
}

/// Lightweight reference to a pooled element, as listed in a [`crate::SceneDiff`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ElementRef {
    /// Allocation id.
    pub id: ElementId,
    /// Key the element is matched on.
    pub key: EntityKey,
}

/// A retained drawable owned by the element pool.
#[derive(Clone, Debug, Serialize)]
pub struct VisualElement {
    id: ElementId,
    key: EntityKey,
    pub(crate) current: AttributeSet,
    pub(crate) target: AttributeSet,
    #[serde(skip)]
    pub(crate) animation: Option<AnimationHandle>,
    pub(crate) phase: ElementPhase,
    #[serde(skip)]
    pub(crate) datum: Option<AggregatedPoint>,
    /// Target changed since the scheduler last looked at this element.
    #[serde(skip)]
    pub(crate) retargeted: bool,
    /// Where the in-flight tween is heading when the target moved on since it started.
    #[serde(skip)]
    pub(crate) prev_target: Option<AttributeSet>,
}

impl VisualElement {
    /// Fresh element sitting at the neutral state of `target`.
    pub(crate) fn entering(
        id: ElementId,
        key: EntityKey,
        datum: Option<AggregatedPoint>,
        target: AttributeSet,
    ) -> Self {
        Self {
            id,
            key,
            current: target.neutral(),
            target,
            animation: None,
            phase: ElementPhase::Live,
            datum,
            retargeted: true,
            prev_target: None,
        }
    }

    /// Allocation id, stable for the element's lifetime.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Reconciliation key.
    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    /// Attributes as last drawn.
    pub fn current(&self) -> &AttributeSet {
        &self.current
    }

    /// Attributes the element is heading to.
    pub fn target(&self) -> &AttributeSet {
        &self.target
    }

    /// In-flight tween, if any.
    pub fn animation(&self) -> Option<&AnimationHandle> {
        self.animation.as_ref()
    }

    /// Lifecycle stage.
    pub fn phase(&self) -> ElementPhase {
        self.phase
    }

    /// True unless exiting.
    pub fn is_live(&self) -> bool {
        self.phase == ElementPhase::Live
    }

    /// Point bound by the latest render; `None` once exiting and for decoration marks.
    pub fn datum(&self) -> Option<&AggregatedPoint> {
        self.datum.as_ref()
    }

    /// Reference for diffs and stale checks.
    pub fn element_ref(&self) -> ElementRef {
        ElementRef {
            id: self.id,
            key: self.key.clone(),
        }
    }

    pub(crate) fn retarget(&mut self, target: AttributeSet) {
        if self.target == target {
            return;
        }
        if self.animation.is_some() && self.prev_target.is_none() {
            self.prev_target = Some(std::mem::replace(&mut self.target, target));
        } else {
            self.target = target;
        }
        self.retargeted = true;
    }

    /// Destination of the in-flight tween.
    pub(crate) fn tween_target(&self) -> &AttributeSet {
        self.prev_target.as_ref().unwrap_or(&self.target)
    }
}
