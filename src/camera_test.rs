#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn view(left: f64, top: f64, w: f64, h: f64) -> Viewport {
    Viewport { left, top, width: w, height: h }
}

// --- Rect ---

#[test]
fn rect_contains_interior_point() {
    let r = Rect::new(10.0, 10.0, 100.0, 50.0);
    assert!(r.contains(Point::new(50.0, 30.0)));
}

#[test]
fn rect_contains_is_edge_inclusive() {
    let r = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(r.contains(Point::new(0.0, 0.0)));
    assert!(r.contains(Point::new(10.0, 10.0)));
}

#[test]
fn rect_does_not_contain_outside_point() {
    let r = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(!r.contains(Point::new(10.1, 5.0)));
    assert!(!r.contains(Point::new(5.0, -0.1)));
}

#[test]
fn rect_center() {
    let r = Rect::new(10.0, 20.0, 100.0, 60.0);
    assert!(point_approx_eq(r.center(), Point::new(60.0, 50.0)));
}

#[test]
fn rect_union_covers_both() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(50.0, -20.0, 10.0, 10.0);
    let u = a.union(&b);
    assert_eq!(u, Rect::new(0.0, -20.0, 60.0, 30.0));
}

#[test]
fn rect_union_with_contained_rect_is_identity() {
    let a = Rect::new(0.0, 0.0, 100.0, 100.0);
    let b = Rect::new(10.0, 10.0, 20.0, 20.0);
    assert_eq!(a.union(&b), a);
}

// --- clamp_zoom ---

#[test]
fn clamp_zoom_above_max() {
    assert_eq!(clamp_zoom(5.0), 3.0);
}

#[test]
fn clamp_zoom_below_min() {
    assert_eq!(clamp_zoom(0.01), 0.1);
}

#[test]
fn clamp_zoom_in_range_unchanged() {
    assert_eq!(clamp_zoom(1.5), 1.5);
}

// --- screen_to_world ---

#[test]
fn screen_to_world_identity() {
    let cam = Camera::default();
    let v = view(0.0, 0.0, 800.0, 600.0);
    let world = cam.screen_to_world(Point::new(50.0, 75.0), &v);
    assert!(point_approx_eq(world, Point::new(50.0, 75.0)));
}

#[test]
fn screen_to_world_subtracts_viewport_origin() {
    let cam = Camera::default();
    let v = view(100.0, 40.0, 800.0, 600.0);
    let world = cam.screen_to_world(Point::new(100.0, 40.0), &v);
    assert!(point_approx_eq(world, Point::new(0.0, 0.0)));
}

#[test]
fn screen_to_world_with_zoom() {
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.0 };
    let v = view(0.0, 0.0, 800.0, 600.0);
    let world = cam.screen_to_world(Point::new(40.0, 80.0), &v);
    assert!(approx_eq(world.x, 20.0));
    assert!(approx_eq(world.y, 40.0));
}

#[test]
fn screen_to_world_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 2.0 };
    let v = view(0.0, 0.0, 800.0, 600.0);
    let world = cam.screen_to_world(Point::new(20.0, 10.0), &v);
    assert!(point_approx_eq(world, Point::new(0.0, 0.0)));
}

// --- world_to_screen ---

#[test]
fn world_to_screen_with_pan() {
    let cam = Camera { pan_x: 100.0, pan_y: 50.0, zoom: 1.0 };
    let v = view(0.0, 0.0, 800.0, 600.0);
    let screen = cam.world_to_screen(Point::new(0.0, 0.0), &v);
    assert!(point_approx_eq(screen, Point::new(100.0, 50.0)));
}

#[test]
fn world_to_screen_adds_viewport_origin() {
    let cam = Camera::default();
    let v = view(10.0, 20.0, 800.0, 600.0);
    let screen = cam.world_to_screen(Point::new(5.0, 5.0), &v);
    assert!(point_approx_eq(screen, Point::new(15.0, 25.0)));
}

// --- Round trips ---

#[test]
fn round_trip_with_pan_zoom_and_origin() {
    let cam = Camera { pan_x: 50.0, pan_y: -30.0, zoom: 2.0 };
    let v = view(120.0, 64.0, 800.0, 600.0);
    let world = Point::new(100.0, 200.0);
    let back = cam.screen_to_world(cam.world_to_screen(world, &v), &v);
    assert!(point_approx_eq(world, back));
}

#[test]
fn round_trip_fractional_zoom() {
    let cam = Camera { pan_x: 13.7, pan_y: -42.3, zoom: 0.75 };
    let v = view(3.0, 7.0, 640.0, 480.0);
    let world = Point::new(333.3, -999.9);
    let back = cam.screen_to_world(cam.world_to_screen(world, &v), &v);
    assert!(point_approx_eq(world, back));
}

// --- panned_by ---

#[test]
fn panned_by_translates_pan_only() {
    let cam = Camera { pan_x: 10.0, pan_y: 20.0, zoom: 1.5 };
    let moved = cam.panned_by(5.0, -3.0);
    assert_eq!(moved.pan_x, 15.0);
    assert_eq!(moved.pan_y, 17.0);
    assert_eq!(moved.zoom, 1.5);
}

// --- zoom_towards ---

#[test]
fn zoom_towards_changes_zoom() {
    let cam = Camera::default();
    let v = view(0.0, 0.0, 800.0, 600.0);
    let zoomed = cam.zoom_towards(0.5, Point::new(400.0, 300.0), &v);
    assert!(approx_eq(zoomed.zoom, 1.5));
}

#[test]
fn zoom_towards_keeps_pivot_world_point_stationary() {
    let cam = Camera { pan_x: 37.0, pan_y: -12.0, zoom: 1.25 };
    let v = view(15.0, 30.0, 800.0, 600.0);
    let pivot = Point::new(412.0, 233.0);

    let before = cam.screen_to_world(pivot, &v);
    let zoomed = cam.zoom_towards(0.4, pivot, &v);
    let after_screen = zoomed.world_to_screen(before, &v);

    assert!(point_approx_eq(after_screen, pivot));
}

#[test]
fn zoom_towards_clamped_returns_unchanged_camera() {
    let cam = Camera { pan_x: 5.0, pan_y: 6.0, zoom: 3.0 };
    let v = view(0.0, 0.0, 800.0, 600.0);
    let zoomed = cam.zoom_towards(1.0, Point::new(100.0, 100.0), &v);
    assert_eq!(zoomed, cam);
}

#[test]
fn zoom_towards_lower_clamp_returns_unchanged_camera() {
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 0.1 };
    let v = view(0.0, 0.0, 800.0, 600.0);
    let zoomed = cam.zoom_towards(-0.5, Point::new(0.0, 0.0), &v);
    assert_eq!(zoomed, cam);
}

#[test]
fn zoom_towards_partial_clamp_still_pivots() {
    // 2.5 + 1.0 clamps to 3.0; the pivot must still hold.
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.5 };
    let v = view(0.0, 0.0, 800.0, 600.0);
    let pivot = Point::new(200.0, 150.0);

    let before = cam.screen_to_world(pivot, &v);
    let zoomed = cam.zoom_towards(1.0, pivot, &v);

    assert!(approx_eq(zoomed.zoom, 3.0));
    assert!(point_approx_eq(zoomed.world_to_screen(before, &v), pivot));
}

// --- fitting ---

#[test]
fn fitting_small_content_hits_max_zoom_and_centers() {
    // One node at (0,0) sized 100x100 in a 500x500 viewport with 50px
    // padding: min(400/100, 400/100) = 4, clamped to 3.
    let cam = Camera::fitting(Rect::new(0.0, 0.0, 100.0, 100.0), 500.0, 500.0, 50.0);
    assert_eq!(cam.zoom, 3.0);

    let v = view(0.0, 0.0, 500.0, 500.0);
    let center_screen = cam.world_to_screen(Point::new(50.0, 50.0), &v);
    assert!(point_approx_eq(center_screen, Point::new(250.0, 250.0)));
}

#[test]
fn fitting_wide_content_limited_by_width() {
    let cam = Camera::fitting(Rect::new(0.0, 0.0, 1000.0, 100.0), 500.0, 500.0, 50.0);
    assert!(approx_eq(cam.zoom, 0.4));
}

#[test]
fn fitting_degenerate_content_is_identity() {
    let cam = Camera::fitting(Rect::new(10.0, 10.0, 0.0, 0.0), 500.0, 500.0, 50.0);
    assert_eq!(cam, Camera::default());
}

#[test]
fn fitting_huge_content_hits_min_zoom() {
    let cam = Camera::fitting(Rect::new(0.0, 0.0, 100_000.0, 100_000.0), 500.0, 500.0, 50.0);
    assert_eq!(cam.zoom, 0.1);
}

// --- screen_dist_to_world ---

#[test]
fn screen_dist_to_world_with_zoom() {
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.0 };
    assert!(approx_eq(cam.screen_dist_to_world(10.0), 5.0));
}

// --- Property suites ---

mod properties {
    use proptest::prelude::*;

    use super::*;
    use crate::consts::{ZOOM_MAX, ZOOM_MIN};

    fn camera_strategy() -> impl Strategy<Value = Camera> {
        (-2000.0f64..2000.0, -2000.0f64..2000.0, 0.1f64..3.0)
            .prop_map(|(pan_x, pan_y, zoom)| Camera { pan_x, pan_y, zoom })
    }

    fn viewport_strategy() -> impl Strategy<Value = Viewport> {
        (0.0f64..500.0, 0.0f64..500.0, 100.0f64..2000.0, 100.0f64..2000.0)
            .prop_map(|(left, top, width, height)| Viewport { left, top, width, height })
    }

    proptest! {
        /// screen_to_world(world_to_screen(p)) == p for any camera with
        /// zoom in range.
        #[test]
        fn prop_round_trip(
            cam in camera_strategy(),
            v in viewport_strategy(),
            x in -10_000.0f64..10_000.0,
            y in -10_000.0f64..10_000.0,
        ) {
            let world = Point::new(x, y);
            let back = cam.screen_to_world(cam.world_to_screen(world, &v), &v);
            prop_assert!((back.x - world.x).abs() < 1e-6);
            prop_assert!((back.y - world.y).abs() < 1e-6);
        }

        /// After an unclamped zoom step, the world point under the pivot
        /// maps back to the same screen pixel.
        #[test]
        fn prop_zoom_pivot_stability(
            cam in camera_strategy(),
            v in viewport_strategy(),
            delta in -0.5f64..0.5,
            px in 0.0f64..1000.0,
            py in 0.0f64..1000.0,
        ) {
            let pivot = Point::new(v.left + px, v.top + py);
            let new_zoom = cam.zoom + delta;
            prop_assume!(new_zoom > ZOOM_MIN + 1e-6 && new_zoom < ZOOM_MAX - 1e-6);

            let before = cam.screen_to_world(pivot, &v);
            let zoomed = cam.zoom_towards(delta, pivot, &v);
            let after = zoomed.world_to_screen(before, &v);

            prop_assert!((after.x - pivot.x).abs() < 1e-6);
            prop_assert!((after.y - pivot.y).abs() < 1e-6);
        }

        /// clamp_zoom output is always inside the permitted range.
        #[test]
        fn prop_clamp_zoom_in_range(z in -100.0f64..100.0) {
            let clamped = clamp_zoom(z);
            prop_assert!((ZOOM_MIN..=ZOOM_MAX).contains(&clamped));
        }
    }
}
