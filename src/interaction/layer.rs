use crate::foundation::core::{ElementId, EntityKey, Point, Vec2};
use crate::interaction::tooltip::{TooltipFormatter, TooltipMode};
use crate::scene::element::{ElementRef, VisualElement};
use crate::scene::pool::ElementPool;
use crate::scene::reconcile::SceneDiff;
use crate::surface::{RenderSurface, TooltipSurface};
use std::collections::HashMap;

/// Tooltip placement relative to the pointer.
pub const TOOLTIP_OFFSET: Vec2 = Vec2::new(10.0, -28.0);

/// Pointer input, already hit-tested by the surface.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent {
    /// Pointer entered an element.
    Enter {
        /// Key of the element under the pointer.
        target: EntityKey,
        /// Pointer position.
        at: Point,
    },
    /// Pointer moved anywhere over the chart.
    Move {
        /// Pointer position.
        at: Point,
    },
    /// Pointer left an element.
    Leave {
        /// Key of the element just left.
        target: EntityKey,
    },
    /// Click on the chart.
    Click {
        /// Clicked element, `None` for a click that hit no element.
        target: Option<EntityKey>,
        /// Pointer position.
        at: Point,
    },
}

/// Hover/click handling over the live elements of one chart.
///
/// Holds element references only; the bound point is read from the pool at event time so the
/// tooltip always reflects the latest render.
pub struct InteractionLayer {
    mode: TooltipMode,
    formatter: Box<dyn TooltipFormatter>,
    bindings: HashMap<EntityKey, ElementId>,
    highlighted: Option<ElementRef>,
    /// Element the tooltip currently describes.
    subject: Option<ElementRef>,
}

impl InteractionLayer {
    /// Layer with no bindings, formatting tooltips with `formatter`.
    pub fn new(mode: TooltipMode, formatter: Box<dyn TooltipFormatter>) -> Self {
        Self {
            mode,
            formatter,
            bindings: HashMap::new(),
            highlighted: None,
            subject: None,
        }
    }

    /// Tooltip model in use.
    pub fn mode(&self) -> TooltipMode {
        self.mode
    }

    /// Whether `key` currently takes pointer input.
    pub fn is_bound(&self, key: &EntityKey) -> bool {
        self.bindings.contains_key(key)
    }

    /// Number of bound elements.
    pub fn bound_len(&self) -> usize {
        self.bindings.len()
    }

    /// Bind handlers on entering and updated elements that carry a point, drop them from
    /// exiting ones.
    ///
    /// A visible tooltip whose element was updated is refilled from the new point; one whose
    /// element exited is hidden.
    pub fn rebind(
        &mut self,
        diff: &SceneDiff,
        pool: &ElementPool,
        surface: &mut dyn RenderSurface,
        tooltip: &mut dyn TooltipSurface,
    ) {
        for r in diff.bound() {
            if pool.resolve(r).is_some_and(|el| el.datum().is_some()) {
                self.bindings.insert(r.key.clone(), r.id);
            } else {
                // Decoration marks take no pointer input.
                self.bindings.remove(&r.key);
            }
        }
        for r in &diff.exit {
            self.bindings.remove(&r.key);
            if self.highlighted.as_ref() == Some(r) {
                surface.set_highlight(r.id, false);
                self.highlighted = None;
            }
            if self.subject.as_ref() == Some(r) {
                tooltip.hide();
                self.subject = None;
            }
        }

        if let Some(subject) = &self.subject
            && let Some(point) = self.live(pool, &subject.key).and_then(|el| el.datum())
        {
            tooltip.set_content(&self.formatter.format(point));
        }
    }

    /// Apply one pointer event. Returns whether it targeted a bound element.
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        pool: &ElementPool,
        surface: &mut dyn RenderSurface,
        tooltip: &mut dyn TooltipSurface,
    ) -> bool {
        match event {
            PointerEvent::Enter { target, at } => {
                let Some(el) = self.live(pool, target) else {
                    return false;
                };
                let r = el.element_ref();
                let content = el.datum().map(|p| self.formatter.format(p));
                self.set_highlight(Some(r.clone()), surface);
                if self.mode == TooltipMode::Transient
                    && let Some(content) = content
                {
                    tooltip.show(&content, *at + TOOLTIP_OFFSET);
                    self.subject = Some(r);
                }
                true
            }
            PointerEvent::Move { at } => {
                if self.mode == TooltipMode::Transient && self.subject.is_some() {
                    tooltip.move_to(*at + TOOLTIP_OFFSET);
                }
                self.subject.is_some()
            }
            PointerEvent::Leave { target } => {
                if self.highlighted.as_ref().is_some_and(|h| &h.key == target) {
                    self.set_highlight(None, surface);
                }
                if self.mode == TooltipMode::Transient
                    && self.subject.as_ref().is_some_and(|s| &s.key == target)
                {
                    tooltip.hide();
                    self.subject = None;
                    return true;
                }
                false
            }
            PointerEvent::Click { target, at } => {
                if self.mode != TooltipMode::Persistent {
                    return false;
                }
                let hit = target.as_ref().and_then(|k| self.live(pool, k));
                match hit.and_then(|el| el.datum().map(|p| (el.element_ref(), p))) {
                    Some((r, point)) => {
                        tooltip.show(&self.formatter.format(point), *at + TOOLTIP_OFFSET);
                        self.subject = Some(r);
                        true
                    }
                    None => {
                        // Background click (or a click on an element that is leaving).
                        if self.subject.take().is_some() {
                            tooltip.hide();
                        }
                        false
                    }
                }
            }
        }
    }

    /// Bound, live element for `key`, if its binding still names the pooled allocation.
    fn live<'p>(&self, pool: &'p ElementPool, key: &EntityKey) -> Option<&'p VisualElement> {
        let id = *self.bindings.get(key)?;
        pool.get(key).filter(|e| e.id() == id && e.is_live())
    }

    fn set_highlight(&mut self, next: Option<ElementRef>, surface: &mut dyn RenderSurface) {
        if let Some(prev) = self.highlighted.take() {
            surface.set_highlight(prev.id, false);
        }
        if let Some(r) = &next {
            surface.set_highlight(r.id, true);
        }
        self.highlighted = next;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/layer.rs"]
mod tests;
