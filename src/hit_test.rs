#![allow(clippy::float_cmp)]

use serde_json::json;
use uuid::Uuid;

use super::*;
use crate::scene::ResourceStatus;

// =============================================================
// Helpers
// =============================================================

fn make_node_at(
    resource_type: &str,
    parent_id: Option<NodeId>,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
) -> Node {
    Node {
        id: Uuid::new_v4(),
        label: resource_type.to_owned(),
        resource_type: resource_type.to_owned(),
        x,
        y,
        width: w,
        height: h,
        z_index: 0,
        parent_id,
        children: Vec::new(),
        is_container: resource_type != "aws_instance",
        contained_count: 0,
        status: ResourceStatus::Unknown,
        config: json!({}),
    }
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// =============================================================
// Geometry primitives
// =============================================================

#[test]
fn point_in_rect_inclusive_edges() {
    let r = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(point_in_rect(pt(0.0, 0.0), &r));
    assert!(point_in_rect(pt(10.0, 10.0), &r));
    assert!(!point_in_rect(pt(10.5, 5.0), &r));
}

#[test]
fn point_in_circle_boundary() {
    let center = pt(0.0, 0.0);
    assert!(point_in_circle(pt(3.0, 4.0), center, 5.0));
    assert!(!point_in_circle(pt(3.0, 4.1), center, 5.0));
}

#[test]
fn rects_overlap_basic() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(5.0, 5.0, 10.0, 10.0);
    let c = Rect::new(20.0, 20.0, 5.0, 5.0);
    assert!(rects_overlap(&a, &b));
    assert!(!rects_overlap(&a, &c));
}

#[test]
fn rects_overlap_touching_edges_count() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(10.0, 0.0, 10.0, 10.0);
    assert!(rects_overlap(&a, &b));
}

// =============================================================
// node_at_point
// =============================================================

#[test]
fn node_at_point_misses_empty_space() {
    let scene = SceneModel::new();
    assert!(node_at_point(pt(10.0, 10.0), &scene).is_none());
}

#[test]
fn node_at_point_finds_single_node() {
    let mut scene = SceneModel::new();
    let node = make_node_at("aws_vpc", None, 100.0, 100.0, 200.0, 150.0);
    let id = node.id;
    scene.insert(node);

    assert_eq!(node_at_point(pt(150.0, 150.0), &scene), Some(id));
    assert!(node_at_point(pt(50.0, 50.0), &scene).is_none());
}

#[test]
fn child_wins_over_containing_parent() {
    let mut scene = SceneModel::new();
    let vpc = make_node_at("aws_vpc", None, 0.0, 0.0, 400.0, 300.0);
    let vpc_id = vpc.id;
    scene.insert(vpc);
    let subnet = make_node_at("aws_subnet", Some(vpc_id), 50.0, 50.0, 200.0, 150.0);
    let subnet_id = subnet.id;
    scene.insert(subnet);

    // Point inside both: the child (higher z) wins.
    assert_eq!(node_at_point(pt(100.0, 100.0), &scene), Some(subnet_id));
    // Point only inside the VPC.
    assert_eq!(node_at_point(pt(350.0, 250.0), &scene), Some(vpc_id));
}

#[test]
fn later_root_wins_on_overlap() {
    let mut scene = SceneModel::new();
    let a = make_node_at("aws_vpc", None, 0.0, 0.0, 100.0, 100.0);
    scene.insert(a);
    let b = make_node_at("aws_vpc", None, 50.0, 50.0, 100.0, 100.0);
    let b_id = b.id;
    scene.insert(b);

    // b has z 1, a has z 0; the overlap belongs to b.
    assert_eq!(node_at_point(pt(75.0, 75.0), &scene), Some(b_id));
}

// =============================================================
// Add-child button
// =============================================================

#[test]
fn add_button_anchored_bottom_right() {
    let node = make_node_at("aws_vpc", None, 0.0, 0.0, 300.0, 200.0);
    let bounds = add_button_bounds(&node).expect("container has button");
    assert_eq!(bounds.right(), 300.0 - ADD_BUTTON_INSET);
    assert_eq!(bounds.bottom(), 200.0 - ADD_BUTTON_INSET);
    assert_eq!(bounds.width, ADD_BUTTON_SIZE);
    assert_eq!(bounds.height, ADD_BUTTON_SIZE);
}

#[test]
fn leaf_has_no_add_button() {
    let node = make_node_at("aws_instance", None, 0.0, 0.0, 180.0, 90.0);
    assert!(add_button_bounds(&node).is_none());
}

#[test]
fn hit_test_prefers_add_button_over_body() {
    let mut scene = SceneModel::new();
    let vpc = make_node_at("aws_vpc", None, 0.0, 0.0, 300.0, 200.0);
    let vpc_id = vpc.id;
    scene.insert(vpc);

    let button = add_button_bounds(scene.find(vpc_id).expect("vpc")).expect("button");
    let hit = hit_test(button.center(), &scene).expect("hit");
    assert_eq!(hit, Hit { node_id: vpc_id, part: HitPart::AddButton });

    let body = hit_test(pt(10.0, 10.0), &scene).expect("hit");
    assert_eq!(body.part, HitPart::Body);
}

#[test]
fn hit_test_leaf_button_region_is_body() {
    let mut scene = SceneModel::new();
    let node = make_node_at("aws_instance", None, 0.0, 0.0, 180.0, 90.0);
    let id = node.id;
    scene.insert(node);

    // Bottom-right corner of a leaf is plain body.
    let hit = hit_test(pt(170.0, 80.0), &scene).expect("hit");
    assert_eq!(hit, Hit { node_id: id, part: HitPart::Body });
}

// =============================================================
// Handle positions
// =============================================================

#[test]
fn root_node_handles_are_left_and_right_center() {
    let node = make_node_at("aws_vpc", None, 100.0, 100.0, 200.0, 100.0);
    assert_eq!(handle_position(&node, HandleSide::Target), pt(100.0, 150.0));
    assert_eq!(handle_position(&node, HandleSide::Source), pt(300.0, 150.0));
}

#[test]
fn child_node_handles_are_top_and_bottom_center() {
    let parent_id = Some(Uuid::new_v4());
    let node = make_node_at("aws_instance", parent_id, 100.0, 100.0, 200.0, 100.0);
    assert_eq!(handle_position(&node, HandleSide::Target), pt(200.0, 100.0));
    assert_eq!(handle_position(&node, HandleSide::Source), pt(200.0, 200.0));
}

// =============================================================
// Marquee selection
// =============================================================

#[test]
fn nodes_in_rect_returns_overlapping_nodes() {
    let mut scene = SceneModel::new();
    let a = make_node_at("aws_vpc", None, 0.0, 0.0, 100.0, 100.0);
    let a_id = a.id;
    scene.insert(a);
    let b = make_node_at("aws_vpc", None, 300.0, 300.0, 100.0, 100.0);
    let b_id = b.id;
    scene.insert(b);

    let marquee = Rect::new(50.0, 50.0, 300.0, 300.0);
    let hits = nodes_in_rect(&marquee, &scene);
    assert_eq!(hits, vec![a_id, b_id]);

    let narrow = Rect::new(0.0, 0.0, 20.0, 20.0);
    assert_eq!(nodes_in_rect(&narrow, &scene), vec![a_id]);
}

#[test]
fn nodes_in_rect_empty_when_nothing_overlaps() {
    let mut scene = SceneModel::new();
    scene.insert(make_node_at("aws_vpc", None, 0.0, 0.0, 100.0, 100.0));
    let far = Rect::new(1000.0, 1000.0, 10.0, 10.0);
    assert!(nodes_in_rect(&far, &scene).is_empty());
}

// =============================================================
// Property suites
// =============================================================

mod properties {
    use proptest::prelude::*;

    use super::*;

    fn rect_strategy() -> impl Strategy<Value = Rect> {
        (-500.0f64..500.0, -500.0f64..500.0, 20.0f64..300.0, 20.0f64..300.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    /// A point a fraction of the way across `rect`, kept off the edges
    /// so containment is unambiguous.
    fn inner_point(rect: &Rect, fx: f64, fy: f64) -> Point {
        Point::new(rect.x + rect.width * fx, rect.y + rect.height * fy)
    }

    proptest! {
        /// Any point inside a lone node's bounds hits that node.
        #[test]
        fn prop_hit_returns_containing_node(
            rect in rect_strategy(),
            fx in 0.05f64..0.95,
            fy in 0.05f64..0.95,
        ) {
            let mut scene = SceneModel::new();
            let node = make_node_at("aws_vpc", None, rect.x, rect.y, rect.width, rect.height);
            let id = node.id;
            scene.insert(node);
            prop_assert_eq!(node_at_point(inner_point(&rect, fx, fy), &scene), Some(id));
        }

        /// A child nested inside its parent's bounds always wins the
        /// overlap, whatever the geometry.
        #[test]
        fn prop_child_beats_parent_on_overlap(
            rect in rect_strategy(),
            fx in 0.05f64..0.95,
            fy in 0.05f64..0.95,
        ) {
            let mut scene = SceneModel::new();
            let parent = make_node_at("aws_vpc", None, rect.x, rect.y, rect.width, rect.height);
            let parent_id = parent.id;
            scene.insert(parent);

            // Child occupies the middle half of the parent.
            let child_rect = Rect::new(
                rect.x + rect.width / 4.0,
                rect.y + rect.height / 4.0,
                rect.width / 2.0,
                rect.height / 2.0,
            );
            let child = make_node_at(
                "aws_subnet",
                Some(parent_id),
                child_rect.x,
                child_rect.y,
                child_rect.width,
                child_rect.height,
            );
            let child_id = child.id;
            scene.insert(child);

            prop_assert_eq!(
                node_at_point(inner_point(&child_rect, fx, fy), &scene),
                Some(child_id)
            );
        }

        /// Points past a node's bottom-right corner hit nothing.
        #[test]
        fn prop_miss_outside_bounds(
            rect in rect_strategy(),
            dx in 1.0f64..100.0,
            dy in 1.0f64..100.0,
        ) {
            let mut scene = SceneModel::new();
            scene.insert(make_node_at("aws_vpc", None, rect.x, rect.y, rect.width, rect.height));
            let outside = Point::new(rect.right() + dx, rect.bottom() + dy);
            prop_assert!(node_at_point(outside, &scene).is_none());
        }
    }
}
