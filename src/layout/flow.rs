//! Flow layout - directional stacking with space pooling.
//!
//! Flow places the relative children of one parent: consecutive children
//! with the same stacking orientation form a *group*, each group stacks
//! along its orientation from a persistent per-orientation cursor, and
//! leftover space on the stacking axis is pooled and split evenly among the
//! group's elastic members.
//!
//! The algorithm is pure data-in/data-out over [`FlowChild`] snapshots; the
//! driver in [`super`] extracts those from the component tree and writes the
//! resulting rectangles back.

use crate::types::{Rect, Size};
use crate::unit::{Axis, Unit, UnitKind, UnitModifiers};

// =============================================================================
// Input / output
// =============================================================================

/// Layout inputs of one flow participant.
#[derive(Debug, Clone, Copy)]
pub struct FlowChild {
    pub x: Unit,
    pub y: Unit,
    pub width: Unit,
    pub height: Unit,
    /// Content-driven size, substituted for Auto extents off the stacking
    /// axis.
    pub content: Size,
}

/// Flow output: one rectangle per input child, in input order, plus the
/// bounding box of everything placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowLayout {
    pub rects: Vec<Rect>,
    pub content: Size,
}

impl FlowChild {
    fn position(&self, axis: Axis) -> Unit {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    fn dimension(&self, axis: Axis) -> Unit {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    fn content_extent(&self, axis: Axis) -> u16 {
        extent(self.content, axis)
    }
}

fn extent(size: Size, axis: Axis) -> u16 {
    match axis {
        Axis::Horizontal => size.width,
        Axis::Vertical => size.height,
    }
}

/// Whether a dimension draws from the group's space pool: content-driven
/// extents and extents explicitly flagged elastic. Percentage extents
/// resolve to fixed contributions instead.
fn pooled(dim: &Unit) -> bool {
    dim.kind == UnitKind::Auto || dim.modifiers.contains(UnitModifiers::RELATIVE)
}

/// Fully resolve one explicit offset against its axis: far-edge anchoring
/// for `INVERTED`, dead center plus the offset as correction for `CENTERED`
/// (which wins over both), near edge otherwise.
pub(crate) fn anchor_offset(
    unit: Unit,
    parent_extent: u16,
    viewport_extent: u16,
    extent: u16,
    cell_aspect: f32,
) -> i32 {
    let off = unit
        .resolve(parent_extent, viewport_extent, cell_aspect)
        .cells_or(0);
    if unit.modifiers.contains(UnitModifiers::CENTERED) {
        (parent_extent as i32 - extent as i32) / 2 + off
    } else if unit.modifiers.contains(UnitModifiers::INVERTED) {
        parent_extent as i32 - extent as i32 - off
    } else {
        off
    }
}

/// Stacking-axis extent of one member: its pool share when elastic, its
/// resolved dimension otherwise.
fn main_extent(
    child: &FlowChild,
    axis: Axis,
    share: i32,
    parent: u16,
    viewport: u16,
    cell_aspect: f32,
) -> u16 {
    let dim = child.dimension(axis);
    if pooled(&dim) {
        share.max(0) as u16
    } else {
        dim.resolve(parent, viewport, cell_aspect).cells_or(0).max(0) as u16
    }
}

/// Perpendicular extent of one member: resolved dimension, content size for
/// Auto.
fn perp_extent(child: &FlowChild, perp: Axis, parent: u16, viewport: u16, cell_aspect: f32) -> u16 {
    child
        .dimension(perp)
        .resolve(parent, viewport, cell_aspect)
        .cells_or(child.content_extent(perp) as i32)
        .max(0) as u16
}

// =============================================================================
// Grouping
// =============================================================================

/// Stacking preference derived from which offsets are relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pref {
    Horizontal,
    Vertical,
    /// Both offsets relative: always starts a fresh group, stacking along
    /// the previous group's orientation (horizontal at the top).
    Both,
}

fn pref(child: &FlowChild) -> Pref {
    match (child.x.is_relative(), child.y.is_relative()) {
        (_, false) => Pref::Horizontal,
        (false, true) => Pref::Vertical,
        (true, true) => Pref::Both,
    }
}

struct Group {
    axis: Axis,
    members: Vec<usize>,
}

fn group(children: &[FlowChild]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut last_axis = Axis::Horizontal;
    for (i, child) in children.iter().enumerate() {
        let p = pref(child);
        let axis = match p {
            Pref::Horizontal => Axis::Horizontal,
            Pref::Vertical => Axis::Vertical,
            Pref::Both => last_axis,
        };
        let joins = p != Pref::Both && groups.last().is_some_and(|g| g.axis == axis);
        if joins {
            if let Some(current) = groups.last_mut() {
                current.members.push(i);
            }
        } else {
            groups.push(Group {
                axis,
                members: vec![i],
            });
        }
        last_axis = axis;
    }
    groups
}

// =============================================================================
// Placement
// =============================================================================

/// Place `children` inside a parent content box of `parent` cells.
///
/// Pool shares use integer division with no remainder distribution; an
/// oversubscribed pool goes negative and elastic members collapse to zero
/// extent rather than pushing siblings out (rectangles may then overlap).
pub fn flow(children: &[FlowChild], parent: Size, viewport: Size, cell_aspect: f32) -> FlowLayout {
    let mut rects = vec![Rect::default(); children.len()];
    let mut cursor = [0i32; 2];
    let mut max_right = 0i32;
    let mut max_bottom = 0i32;

    for group in group(children) {
        let axis = group.axis;
        let perp = axis.perpendicular();
        let parent_main = extent(parent, axis);
        let parent_perp = extent(parent, perp);
        let viewport_main = extent(viewport, axis);
        let viewport_perp = extent(viewport, perp);

        // Pool: parent extent minus the group's fixed contributions, split
        // evenly among elastic members.
        let mut fixed: i32 = 0;
        let mut elastic = 0i32;
        for &i in &group.members {
            let dim = children[i].dimension(axis);
            if pooled(&dim) {
                elastic += 1;
            } else {
                fixed += dim.resolve(parent_main, viewport_main, cell_aspect).cells_or(0);
            }
        }
        let share = if elastic > 0 {
            (parent_main as i32 - fixed) / elastic
        } else {
            0
        };

        // The group leader's offsets position the whole group: its stacking
        // offset shifts the cursor and its perpendicular offset becomes the
        // shared perpendicular coordinate. Both anchor against the leader's
        // own extents, so inverted offsets measure from the far edge and
        // centered offsets center the leader (and the group with it). Later
        // members stack regardless of their own offsets.
        let leader = &children[group.members[0]];
        let leader_main = main_extent(leader, axis, share, parent_main, viewport_main, cell_aspect);
        let leader_perp = perp_extent(leader, perp, parent_perp, viewport_perp, cell_aspect);
        let mut main = cursor[axis as usize];
        main += anchor_offset(
            leader.position(axis),
            parent_main,
            viewport_main,
            leader_main,
            cell_aspect,
        );
        let perp_base = anchor_offset(
            leader.position(perp),
            parent_perp,
            viewport_perp,
            leader_perp,
            cell_aspect,
        );

        for &i in &group.members {
            let child = &children[i];
            let main_extent =
                main_extent(child, axis, share, parent_main, viewport_main, cell_aspect);
            let perp_extent = perp_extent(child, perp, parent_perp, viewport_perp, cell_aspect);

            let rect = match axis {
                Axis::Horizontal => Rect::new(main, perp_base, main_extent, perp_extent),
                Axis::Vertical => Rect::new(perp_base, main, perp_extent, main_extent),
            };
            max_right = max_right.max(rect.right());
            max_bottom = max_bottom.max(rect.bottom());
            rects[i] = rect;
            main += main_extent as i32;
        }
        cursor[axis as usize] = main;
    }

    FlowLayout {
        rects,
        content: Size::new(max_right.max(0) as u16, max_bottom.max(0) as u16),
    }
}

// =============================================================================
// Tests
// =============================================================================
