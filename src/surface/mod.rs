//! Seams to the drawing tree and the tooltip overlay.

pub(crate) mod recording;

use crate::foundation::core::{ElementId, EntityKey, Point};
use crate::scene::attrs::AttributeSet;

/// Retained tree of drawable nodes, addressed by element id.
///
/// The scene issues incremental operations only; it never asks the surface to rebuild.
pub trait RenderSurface {
    /// Add a node for a newly entered element.
    fn create(&mut self, id: ElementId, key: &EntityKey, attrs: &AttributeSet);
    /// Move a node to new attributes.
    fn update(&mut self, id: ElementId, attrs: &AttributeSet);
    /// Drop a node once its exit finished.
    fn remove(&mut self, id: ElementId);
    /// Transient hover styling; does not touch tweened attributes.
    fn set_highlight(&mut self, id: ElementId, on: bool);
}

/// The single positioned overlay shared by every element of a chart.
pub trait TooltipSurface {
    /// Show `content` at `at`.
    fn show(&mut self, content: &str, at: Point);
    /// Reposition a visible tooltip.
    fn move_to(&mut self, at: Point);
    /// Replace the text of a visible tooltip without moving it.
    fn set_content(&mut self, content: &str);
    /// Hide the tooltip.
    fn hide(&mut self);
}
