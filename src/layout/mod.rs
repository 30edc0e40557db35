//! Layout passes over the component tree.
//!
//! One pass places the visible children of a single parent: children with a
//! relative offset on either axis go through [`flow`], the rest resolve
//! against the parent box directly (with centering and far-edge anchoring),
//! and the pass recurses into children that have subtrees of their own.
//!
//! Passes run on the UI thread only. Structural property writes re-run the
//! owning parent's pass automatically through change signaling; embedders
//! drive the root explicitly via [`layout_root`] when the viewport changes.

use log::trace;

use crate::component::Component;
use crate::types::{Rect, Size};
use crate::unit::{Unit, UnitReport};

pub mod flow;

pub use flow::{FlowChild, FlowLayout};

/// Terminal cell aspect correction applied to aspect-adjusted magnitudes;
/// cells are roughly twice as tall as wide.
pub const CELL_ASPECT: f32 = 0.5;

// =============================================================================
// Fixed placement
// =============================================================================

/// Resolve one fixed (non-flow) child box against its parent.
///
/// Offsets anchor to the near edge by default; `INVERTED` anchors to the far
/// edge, and `CENTERED` wins over both, with the offset acting as an
/// additive correction off dead center.
fn place_fixed(
    x: Unit,
    y: Unit,
    width: Unit,
    height: Unit,
    content: Size,
    parent: Size,
    viewport: Size,
) -> Rect {
    let w = width
        .resolve(parent.width, viewport.width, CELL_ASPECT)
        .cells_or(content.width as i32)
        .max(0) as u16;
    let h = height
        .resolve(parent.height, viewport.height, CELL_ASPECT)
        .cells_or(content.height as i32)
        .max(0) as u16;

    Rect::new(
        flow::anchor_offset(x, parent.width, viewport.width, w, CELL_ASPECT),
        flow::anchor_offset(y, parent.height, viewport.height, h, CELL_ASPECT),
        w,
        h,
    )
}

/// Parent extents available to children: the parent box, shrunk by its
/// border when the kind carries one.
fn content_box(parent: &Component) -> Size {
    let mut size = parent.geometry().size();
    if let Ok(border) = parent.kind().prop("container", "border")
        && parent.get(border).as_bool() == Some(true)
    {
        size.width = size.width.saturating_sub(2);
        size.height = size.height.saturating_sub(2);
    }
    size
}

// =============================================================================
// Passes
// =============================================================================

/// Size the root to its viewport and lay out the whole tree.
pub fn layout_root(root: &Component) {
    root.sync_context().assert_synced();
    let viewport = root.viewport();
    root.set_geometry(Rect::new(0, 0, viewport.width, viewport.height));
    root.complete_init();
    layout_pass(root);
}

/// Place the visible children of `parent` and recurse into their subtrees.
///
/// Hidden children and kinds without layout slots keep their geometry
/// untouched and never occupy flow groups. Every placed child leaves its
/// initializing phase.
pub fn layout_pass(parent: &Component) {
    parent.sync_context().assert_synced();

    let viewport = parent.viewport_synced();
    let parent_box = content_box(parent);
    let children = parent.children();

    let mut flow_children = Vec::new();
    let mut flow_slots = Vec::new();
    let mut placed = Vec::new();
    let mut max_right = 0i32;
    let mut max_bottom = 0i32;

    for child in &children {
        if !child.is_visible() {
            continue;
        }
        let Some((x, y, width, height)) = child.layout_units() else {
            continue;
        };
        placed.push(child.clone());
        let report = UnitReport::for_box(&x, &y, &width, &height);
        if report.intersects(UnitReport::X_RELATIVE | UnitReport::Y_RELATIVE) {
            flow_slots.push(child.clone());
            flow_children.push(FlowChild {
                x,
                y,
                width,
                height,
                content: child.content_size(),
            });
        } else {
            let rect = place_fixed(
                x,
                y,
                width,
                height,
                child.content_size(),
                parent_box,
                viewport,
            );
            max_right = max_right.max(rect.right());
            max_bottom = max_bottom.max(rect.bottom());
            child.set_geometry(rect);
        }
    }

    let flowed = flow::flow(&flow_children, parent_box, viewport, CELL_ASPECT);
    for (child, rect) in flow_slots.iter().zip(&flowed.rects) {
        child.set_geometry(*rect);
    }
    max_right = max_right.max(flowed.content.width as i32);
    max_bottom = max_bottom.max(flowed.content.height as i32);

    parent.set_content_size(Size::new(
        max_right.max(0) as u16,
        max_bottom.max(0) as u16,
    ));
    trace!(
        "layout pass: parent {} placed {} children in {:?}",
        parent.id(),
        placed.len(),
        parent_box
    );

    for child in placed {
        child.complete_init();
        if !child.children().is_empty() {
            layout_pass(&child);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::kinds;
    use crate::props::Value;
    use crate::sync::SyncContext;
    use crate::unit::{Axis, Role, UnitModifiers};

    fn tree(width: u16, height: u16) -> (SyncContext, Component) {
        let sync = SyncContext::new();
        let root = Component::new(kinds::widget_kind(), sync.clone());
        root.set_viewport(Size::new(width, height));
        (sync, root)
    }

    fn widget(sync: &SyncContext) -> Component {
        Component::new(kinds::widget_kind(), sync.clone())
    }

    fn set_unit(c: &Component, slot: &'static str, unit: Unit) {
        let id = c.kind().prop("layout", slot).unwrap();
        c.set(id, Value::Unit(unit)).unwrap();
    }

    fn fixed_pos(axis: Axis, cells: f32) -> Unit {
        Unit::cells(cells).with_context(axis, Role::Position)
    }

    fn fixed_dim(axis: Axis, cells: f32) -> Unit {
        Unit::cells(cells).with_context(axis, Role::Dimension)
    }

    #[test]
    fn test_root_takes_viewport() {
        let (_sync, root) = tree(40, 12);
        layout_root(&root);
        assert_eq!(root.geometry(), Rect::new(0, 0, 40, 12));
        assert!(!root.is_initializing());
    }

    #[test]
    fn test_flow_children_share_root() {
        let (sync, root) = tree(20, 10);
        let a = widget(&sync);
        let b = widget(&sync);
        root.add_child(&a);
        root.add_child(&b);

        layout_root(&root);
        // Default boxes flow horizontally and pool the full width.
        assert_eq!(a.geometry().x, 0);
        assert_eq!(b.geometry().x, 10);
        assert_eq!(a.geometry().width, 10);
        assert!(!a.is_initializing());
    }

    #[test]
    fn test_fixed_child_near_edge() {
        let (sync, root) = tree(20, 10);
        let child = widget(&sync);
        root.add_child(&child);
        set_unit(&child, "x", fixed_pos(Axis::Horizontal, 3.0));
        set_unit(&child, "y", fixed_pos(Axis::Vertical, 2.0));
        set_unit(&child, "width", fixed_dim(Axis::Horizontal, 5.0));
        set_unit(&child, "height", fixed_dim(Axis::Vertical, 4.0));

        layout_root(&root);
        assert_eq!(child.geometry(), Rect::new(3, 2, 5, 4));
    }

    #[test]
    fn test_inverted_anchors_far_edge() {
        let (sync, root) = tree(20, 10);
        let child = widget(&sync);
        root.add_child(&child);
        set_unit(
            &child,
            "x",
            Unit::cells(2.0)
                .with_modifiers(UnitModifiers::INVERTED)
                .with_context(Axis::Horizontal, Role::Position),
        );
        set_unit(&child, "y", fixed_pos(Axis::Vertical, 0.0));
        set_unit(&child, "width", fixed_dim(Axis::Horizontal, 4.0));
        set_unit(&child, "height", fixed_dim(Axis::Vertical, 1.0));

        layout_root(&root);
        // 20 - 4 - 2
        assert_eq!(child.geometry().x, 14);
    }

    #[test]
    fn test_centered_wins_over_inverted() {
        let (sync, root) = tree(20, 10);
        let child = widget(&sync);
        root.add_child(&child);
        set_unit(
            &child,
            "x",
            Unit::cells(1.0)
                .with_modifiers(UnitModifiers::CENTERED | UnitModifiers::INVERTED)
                .with_context(Axis::Horizontal, Role::Position),
        );
        set_unit(&child, "y", fixed_pos(Axis::Vertical, 0.0));
        set_unit(&child, "width", fixed_dim(Axis::Horizontal, 6.0));
        set_unit(&child, "height", fixed_dim(Axis::Vertical, 1.0));

        layout_root(&root);
        // (20 - 6) / 2 plus the one-cell correction.
        assert_eq!(child.geometry().x, 8);
    }

    #[test]
    fn test_fixed_auto_extent_takes_content() {
        let (sync, root) = tree(20, 10);
        let child = widget(&sync);
        root.add_child(&child);
        set_unit(&child, "x", fixed_pos(Axis::Horizontal, 0.0));
        set_unit(&child, "y", fixed_pos(Axis::Vertical, 0.0));
        child.set_content_size(Size::new(7, 3));

        layout_root(&root);
        assert_eq!(child.geometry().size(), Size::new(7, 3));
    }

    #[test]
    fn test_fixed_child_does_not_break_flow() {
        let (sync, root) = tree(20, 10);
        let a = widget(&sync);
        let pinned = widget(&sync);
        let b = widget(&sync);
        root.add_child(&a);
        root.add_child(&pinned);
        root.add_child(&b);
        set_unit(&pinned, "x", fixed_pos(Axis::Horizontal, 15.0));
        set_unit(&pinned, "y", fixed_pos(Axis::Vertical, 8.0));
        set_unit(&pinned, "width", fixed_dim(Axis::Horizontal, 2.0));
        set_unit(&pinned, "height", fixed_dim(Axis::Vertical, 1.0));

        layout_root(&root);
        // a and b pool as one group; the pinned child is placed apart.
        assert_eq!(a.geometry().x, 0);
        assert_eq!(a.geometry().width, 10);
        assert_eq!(b.geometry().x, 10);
        assert_eq!(pinned.geometry(), Rect::new(15, 8, 2, 1));
    }

    #[test]
    fn test_hidden_child_leaves_flow() {
        let (sync, root) = tree(20, 10);
        let a = widget(&sync);
        let hidden = widget(&sync);
        root.add_child(&a);
        root.add_child(&hidden);
        hidden.set_visible(false);

        layout_root(&root);
        // The lone visible member takes the full pool.
        assert_eq!(a.geometry().width, 20);
        assert_eq!(hidden.geometry(), Rect::default());
    }

    #[test]
    fn test_border_shrinks_child_pool() {
        let sync = SyncContext::new();
        let root = Component::new(kinds::container_kind(), sync.clone());
        root.set_viewport(Size::new(20, 10));
        let border = root.kind().prop("container", "border").unwrap();
        root.set(border, true).unwrap();
        let child = widget(&sync);
        root.add_child(&child);

        layout_root(&root);
        assert_eq!(child.geometry().width, 18);
    }

    #[test]
    fn test_structural_write_triggers_parent_relayout() {
        let (sync, root) = tree(20, 10);
        let a = widget(&sync);
        let b = widget(&sync);
        root.add_child(&a);
        root.add_child(&b);
        layout_root(&root);
        assert_eq!(b.geometry().x, 10);

        // A width write classifies as Dimensions and re-runs the parent's
        // pass without an explicit call.
        set_unit(&a, "width", fixed_dim(Axis::Horizontal, 4.0));
        assert_eq!(a.geometry().width, 4);
        assert_eq!(b.geometry().x, 4);
        assert_eq!(b.geometry().width, 16);
    }

    #[test]
    fn test_viewport_percent_resolves_from_root() {
        let (sync, root) = tree(40, 20);
        let outer = widget(&sync);
        let inner = widget(&sync);
        root.add_child(&outer);
        outer.add_child(&inner);
        set_unit(&inner, "x", fixed_pos(Axis::Horizontal, 0.0));
        set_unit(&inner, "y", fixed_pos(Axis::Vertical, 0.0));
        set_unit(
            &inner,
            "width",
            Unit::viewport_percent(25.0).with_context(Axis::Horizontal, Role::Dimension),
        );
        set_unit(&inner, "height", fixed_dim(Axis::Vertical, 1.0));

        layout_root(&root);
        // 25% of the 40-cell viewport, independent of the parent box.
        assert_eq!(inner.geometry().width, 10);
    }

    #[test]
    fn test_parent_content_box_recorded() {
        let (sync, root) = tree(20, 10);
        let child = widget(&sync);
        root.add_child(&child);
        set_unit(&child, "x", fixed_pos(Axis::Horizontal, 2.0));
        set_unit(&child, "y", fixed_pos(Axis::Vertical, 1.0));
        set_unit(&child, "width", fixed_dim(Axis::Horizontal, 5.0));
        set_unit(&child, "height", fixed_dim(Axis::Vertical, 2.0));

        layout_root(&root);
        assert_eq!(root.content_size(), Size::new(7, 3));
    }
}
