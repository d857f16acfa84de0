//! Pan/zoom camera and coordinate conversions.
//!
//! World space is the unbounded plane node bounds are defined in; screen
//! space is CSS pixels relative to the page. The camera maps between the
//! two given the canvas element's bounding box ([`Viewport`]). All
//! functions here are pure — the engine owns the single mutable camera.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{ZOOM_MAX, ZOOM_MIN};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether `p` lies inside this rect (edges inclusive).
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Smallest rect covering both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// The canvas element's bounding box in CSS pixels, as reported by the
/// host on every resize. The engine never observes resizes itself.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Left edge of the canvas element relative to the page.
    pub left: f64,
    /// Top edge of the canvas element relative to the page.
    pub top: f64,
    /// Canvas width in CSS pixels.
    pub width: f64,
    /// Canvas height in CSS pixels.
    pub height: f64,
}

/// Camera state for pan/zoom on the infinite canvas.
///
/// `pan_x` / `pan_y` are in CSS pixels, relative to the canvas origin.
/// `zoom` is a scale factor clamped to [`ZOOM_MIN`, `ZOOM_MAX`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

/// Clamp a zoom factor into the permitted range.
#[must_use]
pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(ZOOM_MIN, ZOOM_MAX)
}

impl Camera {
    /// Convert a screen-space point (CSS pixels, page-relative) to world
    /// coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point, view: &Viewport) -> Point {
        Point {
            x: (screen.x - view.left - self.pan_x) / self.zoom,
            y: (screen.y - view.top - self.pan_y) / self.zoom,
        }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels,
    /// page-relative). Exact inverse of [`Camera::screen_to_world`].
    #[must_use]
    pub fn world_to_screen(&self, world: Point, view: &Viewport) -> Point {
        Point {
            x: world.x * self.zoom + self.pan_x + view.left,
            y: world.y * self.zoom + self.pan_y + view.top,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Translate the pan by a screen-space delta. Zoom is unchanged.
    #[must_use]
    pub fn panned_by(&self, dx: f64, dy: f64) -> Camera {
        Camera {
            pan_x: self.pan_x + dx,
            pan_y: self.pan_y + dy,
            zoom: self.zoom,
        }
    }

    /// Apply a zoom delta while keeping the world point under
    /// `pivot_screen` visually stationary.
    ///
    /// If the clamp absorbs the whole delta the camera is returned
    /// unchanged, so a wheel spin at the zoom limit neither drifts the
    /// pan nor re-renders for nothing.
    #[must_use]
    pub fn zoom_towards(&self, delta: f64, pivot_screen: Point, view: &Viewport) -> Camera {
        let new_zoom = clamp_zoom(self.zoom + delta);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return *self;
        }

        // The world point under the pivot at the old zoom must map back
        // to the same screen pixel at the new zoom.
        let pivot_world = self.screen_to_world(pivot_screen, view);
        Camera {
            pan_x: (pivot_screen.x - view.left) - pivot_world.x * new_zoom,
            pan_y: (pivot_screen.y - view.top) - pivot_world.y * new_zoom,
            zoom: new_zoom,
        }
    }

    /// Camera that shows `content` centered in a `viewport_w` ×
    /// `viewport_h` canvas with `padding` pixels kept on every side.
    ///
    /// The zoom is clamped to the permitted range, so tiny content ends
    /// up centered at maximum zoom rather than blown up arbitrarily.
    #[must_use]
    pub fn fitting(content: Rect, viewport_w: f64, viewport_h: f64, padding: f64) -> Camera {
        if content.width <= 0.0 || content.height <= 0.0 {
            return Camera::default();
        }

        let zoom = clamp_zoom(f64::min(
            (viewport_w - 2.0 * padding) / content.width,
            (viewport_h - 2.0 * padding) / content.height,
        ));

        let center = content.center();
        Camera {
            pan_x: viewport_w / 2.0 - center.x * zoom,
            pan_y: viewport_h / 2.0 - center.y * zoom,
            zoom,
        }
    }
}
