use super::*;
use crate::scene::attrs::AttrValue;

#[test]
fn surface_tracks_nodes_and_op_counts() {
    let mut s = RecordingSurface::new();
    let attrs = AttributeSet::new().with("r", AttrValue::Extent(0.0));
    s.create(ElementId(0), &"FI".into(), &attrs);
    s.update(ElementId(0), &attrs.clone().with("r", AttrValue::Extent(6.0)));
    s.update(ElementId(9), &attrs);
    s.set_highlight(ElementId(0), true);
    assert!(s.node_for(&"FI".into()).unwrap().highlighted);
    assert_eq!(
        s.nodes()[&ElementId(0)].attrs.get("r"),
        Some(AttrValue::Extent(6.0))
    );
    s.remove(ElementId(0));
    s.remove(ElementId(0));
    assert_eq!(
        s.ops(),
        SurfaceOps {
            created: 1,
            updated: 1,
            removed: 1
        }
    );
    assert!(s.nodes().is_empty());
}

#[test]
fn tooltip_remembers_last_content() {
    let mut t = RecordingTooltip::default();
    t.show("FI", Point::new(1.0, 2.0));
    t.move_to(Point::new(3.0, 4.0));
    t.hide();
    assert!(!t.visible);
    assert_eq!(t.content, "FI");
    assert_eq!(t.position, Point::new(3.0, 4.0));
    assert_eq!(t.shows, 1);
}
