use crate::foundation::core::{ElementId, EntityKey};
use crate::scene::element::{ElementRef, VisualElement};
use std::collections::BTreeMap;

/// Keyed store of every element on the surface, exiting ones included.
#[derive(Debug, Default)]
pub struct ElementPool {
    elements: BTreeMap<EntityKey, VisualElement>,
    next_id: u64,
}

impl ElementPool {
    /// Empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pooled elements, exiting ones included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when nothing is pooled.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether `key` is pooled, live or exiting.
    pub fn contains(&self, key: &EntityKey) -> bool {
        self.elements.contains_key(key)
    }

    /// Element for `key`, live or exiting.
    pub fn get(&self, key: &EntityKey) -> Option<&VisualElement> {
        self.elements.get(key)
    }

    /// Element by reference, only if it is still the same allocation.
    pub fn resolve(&self, r: &ElementRef) -> Option<&VisualElement> {
        self.elements.get(&r.key).filter(|e| e.id() == r.id)
    }

    /// Elements in creation (draw) order.
    pub fn iter(&self) -> impl Iterator<Item = &VisualElement> {
        let mut v: Vec<&VisualElement> = self.elements.values().collect();
        v.sort_by_key(|e| e.id());
        v.into_iter()
    }

    /// Elements that are not exiting.
    pub fn live_len(&self) -> usize {
        self.elements.values().filter(|e| e.is_live()).count()
    }

    /// True when no element has an animation in flight.
    pub fn is_idle(&self) -> bool {
        self.elements.values().all(|e| e.animation.is_none())
    }

    pub(crate) fn get_mut(&mut self, key: &EntityKey) -> Option<&mut VisualElement> {
        self.elements.get_mut(key)
    }

    pub(crate) fn resolve_mut(&mut self, r: &ElementRef) -> Option<&mut VisualElement> {
        self.elements.get_mut(&r.key).filter(|e| e.id() == r.id)
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut VisualElement> {
        self.elements.values_mut()
    }

    pub(crate) fn allocate_id(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn insert(&mut self, el: VisualElement) {
        self.elements.insert(el.key().clone(), el);
    }

    pub(crate) fn remove(&mut self, r: &ElementRef) -> Option<VisualElement> {
        if self.resolve(r).is_none() {
            return None;
        }
        self.elements.remove(&r.key)
    }
}
