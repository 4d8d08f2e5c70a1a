use crate::aggregate::pipeline::AggregatedPoint;
use crate::encoding::{Encoding, Mark};
use crate::foundation::core::EntityKey;
use crate::foundation::error::{ChartError, ChartResult};
use crate::scene::element::{ElementPhase, ElementRef, VisualElement};
use crate::scene::pool::ElementPool;
use serde::Serialize;
use std::collections::HashSet;

/// Key-identity diff of one render against the element pool.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SceneDiff {
    /// Keys new to the pool; allocated at the neutral state.
    pub enter: Vec<ElementRef>,
    /// Keys already pooled (exiting ones are revived); retained and retargeted.
    pub update: Vec<ElementRef>,
    /// Live keys missing from the render; retargeted to neutral, still pooled.
    pub exit: Vec<ElementRef>,
}

impl SceneDiff {
    /// Nothing entered, updated or exited.
    pub fn is_empty(&self) -> bool {
        self.enter.is_empty() && self.update.is_empty() && self.exit.is_empty()
    }

    /// Elements that should carry interaction handlers after this render.
    pub fn bound(&self) -> impl Iterator<Item = &ElementRef> {
        self.enter.iter().chain(self.update.iter())
    }
}

/// Stateless keyed reconciliation of computed points against the element pool.
pub struct SceneReconciler;

impl SceneReconciler {
    /// Encode `points` and diff the resulting marks against `pool` by key.
    ///
    /// Encoding and key checks run before the pool is touched, so an error leaves the pool as
    /// it was.
    pub fn reconcile(
        points: &[AggregatedPoint],
        encoding: &dyn Encoding,
        pool: &mut ElementPool,
    ) -> ChartResult<SceneDiff> {
        let marks = encoding.encode(points)?;

        let mut keys: HashSet<EntityKey> = HashSet::with_capacity(marks.len());
        for m in &marks {
            if !keys.insert(m.key.clone()) {
                return Err(ChartError::malformed(format!(
                    "key '{}' appears twice in one render",
                    m.key
                )));
            }
        }

        let mut diff = SceneDiff::default();

        for Mark { key, datum, attrs } in marks {
            match pool.get_mut(&key) {
                Some(el) => {
                    el.retarget(attrs);
                    el.phase = ElementPhase::Live;
                    el.datum = datum;
                    diff.update.push(el.element_ref());
                }
                None => {
                    let id = pool.allocate_id();
                    let el = VisualElement::entering(id, key, datum, attrs);
                    diff.enter.push(el.element_ref());
                    pool.insert(el);
                }
            }
        }

        for el in pool.values_mut() {
            if el.is_live() && !keys.contains(el.key()) {
                let neutral = el.current.neutral();
                el.retarget(neutral);
                el.retargeted = true;
                el.phase = ElementPhase::Exiting;
                el.datum = None;
                diff.exit.push(el.element_ref());
            }
        }
        diff.exit.sort_by_key(|r| r.id);

        tracing::debug!(
            enter = diff.enter.len(),
            update = diff.update.len(),
            exit = diff.exit.len(),
            "reconciled scene"
        );
        Ok(diff)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/reconcile.rs"]
mod tests;
