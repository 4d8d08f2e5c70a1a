use crate::foundation::core::{ElementId, EntityKey, Point};
use crate::scene::attrs::AttributeSet;
use crate::surface::{RenderSurface, TooltipSurface};
use serde::Serialize;
use std::collections::BTreeMap;

/// One node of a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SurfaceNode {
    /// Key of the element drawn by this node.
    pub key: EntityKey,
    /// Attributes as last pushed.
    pub attrs: AttributeSet,
    /// Hover styling on.
    pub highlighted: bool,
}

/// Operation tallies, to check that updates stay incremental.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SurfaceOps {
    /// Nodes created.
    pub created: u64,
    /// Attribute pushes.
    pub updated: u64,
    /// Nodes removed.
    pub removed: u64,
}

/// In-memory render surface. Used headless by the CLI and in tests.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RecordingSurface {
    nodes: BTreeMap<ElementId, SurfaceNode>,
    ops: SurfaceOps,
}

impl RecordingSurface {
    /// Surface with no nodes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes by element id.
    pub fn nodes(&self) -> &BTreeMap<ElementId, SurfaceNode> {
        &self.nodes
    }

    /// Node drawing `key`, if any.
    pub fn node_for(&self, key: &EntityKey) -> Option<&SurfaceNode> {
        self.nodes.values().find(|n| &n.key == key)
    }

    /// Tallies so far.
    pub fn ops(&self) -> SurfaceOps {
        self.ops
    }
}

impl RenderSurface for RecordingSurface {
    fn create(&mut self, id: ElementId, key: &EntityKey, attrs: &AttributeSet) {
        self.ops.created += 1;
        self.nodes.insert(
            id,
            SurfaceNode {
                key: key.clone(),
                attrs: attrs.clone(),
                highlighted: false,
            },
        );
    }

    fn update(&mut self, id: ElementId, attrs: &AttributeSet) {
        if let Some(n) = self.nodes.get_mut(&id) {
            self.ops.updated += 1;
            n.attrs = attrs.clone();
        }
    }

    fn remove(&mut self, id: ElementId) {
        if self.nodes.remove(&id).is_some() {
            self.ops.removed += 1;
        }
    }

    fn set_highlight(&mut self, id: ElementId, on: bool) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.highlighted = on;
        }
    }
}

/// In-memory tooltip overlay.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RecordingTooltip {
    /// Whether the tooltip is shown.
    pub visible: bool,
    /// Text of the last show or content update.
    pub content: String,
    /// Last placement.
    pub position: Point,
    /// Number of `show` calls.
    pub shows: u64,
}

impl TooltipSurface for RecordingTooltip {
    fn show(&mut self, content: &str, at: Point) {
        self.visible = true;
        self.content = content.to_owned();
        self.position = at;
        self.shows += 1;
    }

    fn move_to(&mut self, at: Point) {
        self.position = at;
    }

    fn set_content(&mut self, content: &str) {
        self.content = content.to_owned();
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/recording.rs"]
mod tests;
