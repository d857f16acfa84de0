//! Hit-testing: resolves a world-space point to a node, an add-child
//! button, or nothing.
//!
//! Tests walk the scene's hit order (reverse draw order), so children are
//! always preferred over the container they sit inside and later siblings
//! over earlier ones.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Point, Rect};
use crate::consts::{ADD_BUTTON_INSET, ADD_BUTTON_SIZE};
use crate::scene::{Node, NodeId, SceneModel};

/// Which part of a node was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    /// The node's body rectangle.
    Body,
    /// The add-child button of a container node.
    AddButton,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub node_id: NodeId,
    pub part: HitPart,
}

/// Which end of an edge a connection handle anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleSide {
    Source,
    Target,
}

/// Whether `p` lies inside `rect` (edges inclusive).
#[must_use]
pub fn point_in_rect(p: Point, rect: &Rect) -> bool {
    rect.contains(p)
}

/// Whether `p` lies within `radius` of `center`.
#[must_use]
pub fn point_in_circle(p: Point, center: Point, radius: f64) -> bool {
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    dx * dx + dy * dy <= radius * radius
}

/// Whether two axis-aligned rects overlap (touching edges count).
#[must_use]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.x <= b.right() && b.x <= a.right() && a.y <= b.bottom() && b.y <= a.bottom()
}

/// Bounds of a container's add-child button: a fixed-size square inset
/// from the node's bottom-right corner. `None` for leaf nodes.
#[must_use]
pub fn add_button_bounds(node: &Node) -> Option<Rect> {
    if !node.is_container {
        return None;
    }
    let bounds = node.bounds();
    Some(Rect::new(
        bounds.right() - ADD_BUTTON_SIZE - ADD_BUTTON_INSET,
        bounds.bottom() - ADD_BUTTON_SIZE - ADD_BUTTON_INSET,
        ADD_BUTTON_SIZE,
        ADD_BUTTON_SIZE,
    ))
}

/// World position of a node's connection handle.
///
/// Contained nodes anchor edges on their top/bottom centers (vertical
/// containment flow); root nodes anchor on their left/right centers
/// (horizontal dependency flow). The asymmetry is deliberate.
#[must_use]
pub fn handle_position(node: &Node, side: HandleSide) -> Point {
    let bounds = node.bounds();
    if node.parent_id.is_some() {
        match side {
            HandleSide::Target => Point::new(bounds.center().x, bounds.y),
            HandleSide::Source => Point::new(bounds.center().x, bounds.bottom()),
        }
    } else {
        match side {
            HandleSide::Target => Point::new(bounds.x, bounds.center().y),
            HandleSide::Source => Point::new(bounds.right(), bounds.center().y),
        }
    }
}

/// The topmost node whose bounds contain `world`, if any.
#[must_use]
pub fn node_at_point(world: Point, scene: &SceneModel) -> Option<NodeId> {
    scene
        .hit_order()
        .into_iter()
        .find(|id| scene.find(*id).is_some_and(|n| n.bounds().contains(world)))
}

/// Full hit test: the topmost node under `world`, distinguishing its
/// add-child button (containers only) from its body.
#[must_use]
pub fn hit_test(world: Point, scene: &SceneModel) -> Option<Hit> {
    for id in scene.hit_order() {
        let Some(node) = scene.find(id) else {
            continue;
        };
        if add_button_bounds(node).is_some_and(|b| b.contains(world)) {
            return Some(Hit { node_id: id, part: HitPart::AddButton });
        }
        if node.bounds().contains(world) {
            return Some(Hit { node_id: id, part: HitPart::Body });
        }
    }
    None
}

/// All nodes whose bounds overlap `rect`, in draw order. Used for
/// marquee-style multi-select.
#[must_use]
pub fn nodes_in_rect(rect: &Rect, scene: &SceneModel) -> Vec<NodeId> {
    scene
        .draw_order()
        .into_iter()
        .filter(|id| {
            scene
                .find(*id)
                .is_some_and(|n| rects_overlap(&n.bounds(), rect))
        })
        .collect()
}
