//! Rendering: draws the full diagram scene to a 2D context.
//!
//! This module is the only place that touches
//! [`web_sys::CanvasRenderingContext2d`]. It receives read-only views of
//! the scene, camera, and UI state and produces pixels — it never mutates
//! application state.
//!
//! Frame sequence: clear → camera transform → background grid → edges
//! (always behind nodes) → nodes in draw order (parents before children)
//! → connection handles → selection overlay. Edges with a missing
//! endpoint are skipped rather than treated as an error.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(),
//! JsValue>`; the top-level caller ([`crate::engine::Engine::render`])
//! handles the result.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::{Camera, Point, Rect};
use crate::consts::{
    DASH_PERIOD_MS, DASH_SEGMENT, GRID_OVERDRAW, GRID_SPACING, HANDLE_RADIUS,
};
use crate::hierarchy::HierarchyRules;
use crate::hit::{self, HandleSide};
use crate::input::UiState;
use crate::scene::{Edge, Node, SceneModel};
use crate::style::{self, NodeStyle};

/// Arrowhead length in world units.
const ARROW_SIZE: f64 = 10.0;

/// Arrowhead half-angle in radians (~30°).
const ARROW_ANGLE: f64 = PI / 6.0;

/// Selection dash segment length in screen pixels.
const SELECTION_DASH_PX: f64 = 4.0;

const GRID_COLOR: &str = "#E7EBF0";
const SELECTION_COLOR: &str = "#1E90FF";
const EDGE_COLOR: &str = "#5F6B7A";
const EDGE_INFERRED_COLOR: &str = "#9AA5B1";
const DROP_OK_COLOR: &str = "#2F9E44";
const DROP_BLOCKED_COLOR: &str = "#C92A2A";
const TEXT_COLOR: &str = "#1F2933";
const MUTED_TEXT_COLOR: &str = "#7B8794";
const CONTAINER_FILL: &str = "rgba(95, 107, 122, 0.06)";

/// Corner radius of node cards in world units.
const CORNER_RADIUS: f64 = 8.0;
/// Header band height of container cards.
const CONTAINER_HEADER_H: f64 = 36.0;
/// Header band height of leaf cards.
const LEAF_HEADER_H: f64 = 24.0;

/// Per-node visual state resolved at render time. Never stored on the
/// scene.
struct VisualState {
    selected: bool,
    hovered: bool,
    drop_target: bool,
    can_drop: bool,
}

fn visual_state(node: &Node, rules: &HierarchyRules, ui: &UiState) -> VisualState {
    let drop_target = ui.drop_target_id == Some(node.id);
    // Without a known drag type, droppability is decided at drop time;
    // highlight optimistically until then.
    let can_drop = match (&ui.drag_type, drop_target) {
        (Some(dragged), true) => rules.can_contain(&node.resource_type, dragged),
        _ => true,
    };
    VisualState {
        selected: ui.selected_id == Some(node.id),
        hovered: ui.hovered_id == Some(node.id),
        drop_target,
        can_drop,
    }
}

/// Draw the full scene.
///
/// `viewport_w` / `viewport_h` are in CSS pixels, `dpr` is the device
/// pixel ratio, and `now_ms` drives the marching-ants offset of animated
/// edges.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context
/// state).
#[allow(clippy::too_many_arguments)]
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    scene: &SceneModel,
    camera: &Camera,
    rules: &HierarchyRules,
    ui: &UiState,
    viewport_w: f64,
    viewport_h: f64,
    dpr: f64,
    now_ms: f64,
) -> Result<(), JsValue> {
    // Layer 0: clear and set up the camera transform.
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, viewport_w, viewport_h);
    ctx.save();
    ctx.translate(camera.pan_x, camera.pan_y)?;
    ctx.scale(camera.zoom, camera.zoom)?;

    draw_grid(ctx, camera, viewport_w, viewport_h);

    // Layer 1: edges, always behind nodes.
    for edge in scene.edges() {
        draw_edge(ctx, edge, scene, now_ms)?;
    }

    // Layer 2: nodes, parents before children.
    for id in scene.draw_order() {
        let Some(node) = scene.find(id) else {
            continue;
        };
        let state = visual_state(node, rules, ui);
        if node.is_container {
            draw_container(ctx, node, &state)?;
        } else {
            draw_leaf(ctx, node, &state)?;
        }
        draw_handles(ctx, node, camera.zoom)?;
    }

    // Layer 3: selection overlay.
    if let Some(selected) = ui.selected_id {
        if let Some(node) = scene.find(selected) {
            draw_selection(ctx, node, camera.zoom)?;
        }
    }

    ctx.restore();
    Ok(())
}

// =============================================================
// Background grid
// =============================================================

/// Grid lines are generated only for the visible world rect plus a fixed
/// margin, so the draw count stays bounded at every zoom level.
fn draw_grid(ctx: &CanvasRenderingContext2d, camera: &Camera, viewport_w: f64, viewport_h: f64) {
    let left = (0.0 - camera.pan_x) / camera.zoom - GRID_OVERDRAW;
    let top = (0.0 - camera.pan_y) / camera.zoom - GRID_OVERDRAW;
    let right = (viewport_w - camera.pan_x) / camera.zoom + GRID_OVERDRAW;
    let bottom = (viewport_h - camera.pan_y) / camera.zoom + GRID_OVERDRAW;

    ctx.set_stroke_style_str(GRID_COLOR);
    ctx.set_line_width(1.0 / camera.zoom);
    ctx.begin_path();

    let mut x = (left / GRID_SPACING).floor() * GRID_SPACING;
    while x <= right {
        ctx.move_to(x, top);
        ctx.line_to(x, bottom);
        x += GRID_SPACING;
    }

    let mut y = (top / GRID_SPACING).floor() * GRID_SPACING;
    while y <= bottom {
        ctx.move_to(left, y);
        ctx.line_to(right, y);
        y += GRID_SPACING;
    }

    ctx.stroke();
}

// =============================================================
// Edges
// =============================================================

/// A cubic Bézier between two handle points.
struct EdgeCurve {
    start: Point,
    control1: Point,
    control2: Point,
    end: Point,
}

impl EdgeCurve {
    /// S-curve between `a` and `b`, bending along whichever axis has the
    /// greater displacement.
    fn between(a: Point, b: Point) -> Self {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let (control1, control2) = if dx.abs() >= dy.abs() {
            let mid_x = a.x + dx / 2.0;
            (Point::new(mid_x, a.y), Point::new(mid_x, b.y))
        } else {
            let mid_y = a.y + dy / 2.0;
            (Point::new(a.x, mid_y), Point::new(b.x, mid_y))
        };
        Self { start: a, control1, control2, end: b }
    }

    /// Point on the curve at parameter `t` in [0, 1].
    fn sample(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        let x = self.start.x * mt.powi(3)
            + 3.0 * self.control1.x * mt.powi(2) * t
            + 3.0 * self.control2.x * mt * t.powi(2)
            + self.end.x * t.powi(3);
        let y = self.start.y * mt.powi(3)
            + 3.0 * self.control1.y * mt.powi(2) * t
            + 3.0 * self.control2.y * mt * t.powi(2)
            + self.end.y * t.powi(3);
        Point::new(x, y)
    }

    /// Tangent direction at the target end, in radians. The Bézier
    /// tangent at t=1 points from the last control point to the end.
    fn end_angle(&self) -> f64 {
        let dx = self.end.x - self.control2.x;
        let dy = self.end.y - self.control2.y;
        if dx == 0.0 && dy == 0.0 {
            // Degenerate curve (coincident handles); fall back to the chord.
            (self.end.y - self.start.y).atan2(self.end.x - self.start.x)
        } else {
            dy.atan2(dx)
        }
    }
}

fn draw_edge(
    ctx: &CanvasRenderingContext2d,
    edge: &Edge,
    scene: &SceneModel,
    now_ms: f64,
) -> Result<(), JsValue> {
    let (Some(source), Some(target)) = (scene.find(edge.source), scene.find(edge.target)) else {
        log::debug!("skipping edge {} with missing endpoint", edge.id);
        return Ok(());
    };

    let a = hit::handle_position(source, HandleSide::Source);
    let b = hit::handle_position(target, HandleSide::Target);
    let curve = EdgeCurve::between(a, b);
    let color = if edge.is_explicit { EDGE_COLOR } else { EDGE_INFERRED_COLOR };

    ctx.save();
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(1.5);

    if edge.animated {
        let dash = js_sys::Array::new();
        dash.push(&DASH_SEGMENT.into());
        dash.push(&DASH_SEGMENT.into());
        ctx.set_line_dash(&dash)?;
        let phase = (now_ms % DASH_PERIOD_MS) / DASH_PERIOD_MS;
        ctx.set_line_dash_offset(-phase * DASH_SEGMENT * 2.0);
    }

    ctx.begin_path();
    ctx.move_to(curve.start.x, curve.start.y);
    ctx.bezier_curve_to(
        curve.control1.x,
        curve.control1.y,
        curve.control2.x,
        curve.control2.y,
        curve.end.x,
        curve.end.y,
    );
    ctx.stroke();

    if edge.animated {
        ctx.set_line_dash(&js_sys::Array::new())?;
        ctx.set_line_dash_offset(0.0);
    }

    ctx.set_fill_style_str(color);
    draw_arrowhead(ctx, curve.end, curve.end_angle());

    if let Some(label) = &edge.label {
        draw_edge_label(ctx, label, curve.sample(0.5))?;
    }

    ctx.restore();
    Ok(())
}

fn draw_arrowhead(ctx: &CanvasRenderingContext2d, tip: Point, angle: f64) {
    let x1 = tip.x - ARROW_SIZE * (angle - ARROW_ANGLE).cos();
    let y1 = tip.y - ARROW_SIZE * (angle - ARROW_ANGLE).sin();
    let x2 = tip.x - ARROW_SIZE * (angle + ARROW_ANGLE).cos();
    let y2 = tip.y - ARROW_SIZE * (angle + ARROW_ANGLE).sin();

    ctx.begin_path();
    ctx.move_to(tip.x, tip.y);
    ctx.line_to(x1, y1);
    ctx.line_to(x2, y2);
    ctx.close_path();
    ctx.fill();
}

fn draw_edge_label(
    ctx: &CanvasRenderingContext2d,
    label: &str,
    at: Point,
) -> Result<(), JsValue> {
    ctx.set_font("11px sans-serif");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");

    let width = measured_text_width(ctx, label);
    let pad = 5.0;
    let box_w = width + pad * 2.0;
    let box_h = 16.0;

    ctx.set_fill_style_str("#FFFFFF");
    ctx.fill_rect(at.x - box_w / 2.0, at.y - box_h / 2.0, box_w, box_h);
    ctx.set_stroke_style_str(GRID_COLOR);
    ctx.set_line_width(1.0);
    ctx.stroke_rect(at.x - box_w / 2.0, at.y - box_h / 2.0, box_w, box_h);

    ctx.set_fill_style_str(MUTED_TEXT_COLOR);
    ctx.fill_text(label, at.x, at.y)?;
    Ok(())
}

// =============================================================
// Nodes
// =============================================================

/// Border color and width after visual-state overrides.
fn border_for(state: &VisualState, style: &NodeStyle) -> (&'static str, f64) {
    if state.drop_target {
        let color = if state.can_drop { DROP_OK_COLOR } else { DROP_BLOCKED_COLOR };
        (color, 3.0)
    } else if state.selected {
        (SELECTION_COLOR, 2.5)
    } else if state.hovered {
        (style.accent, 2.0)
    } else {
        (style.accent, 1.5)
    }
}

fn draw_container(
    ctx: &CanvasRenderingContext2d,
    node: &Node,
    state: &VisualState,
) -> Result<(), JsValue> {
    let style = style::node_style(&node.resource_type);
    let b = node.bounds();

    ctx.save();

    // Body.
    rounded_rect_path(ctx, &b, CORNER_RADIUS)?;
    ctx.set_fill_style_str(CONTAINER_FILL);
    ctx.fill();

    // Border; dashed containers mark logical boundaries, but state
    // overrides always render solid so they read clearly.
    let (border_color, border_width) = border_for(state, &style);
    ctx.set_stroke_style_str(border_color);
    ctx.set_line_width(border_width);
    if style.dashed_border && !state.drop_target && !state.selected {
        let dash = js_sys::Array::new();
        dash.push(&6.0f64.into());
        dash.push(&4.0f64.into());
        ctx.set_line_dash(&dash)?;
    }
    rounded_rect_path(ctx, &b, CORNER_RADIUS)?;
    ctx.stroke();
    ctx.set_line_dash(&js_sys::Array::new())?;

    // Header band.
    ctx.set_fill_style_str("#FFFFFF");
    ctx.fill_rect(b.x + 1.0, b.y + 1.0, b.width - 2.0, CONTAINER_HEADER_H);

    // Icon chip.
    ctx.set_fill_style_str(style.accent);
    ctx.fill_rect(b.x + 8.0, b.y + 8.0, 26.0, 22.0);
    ctx.set_fill_style_str("#FFFFFF");
    ctx.set_font("bold 9px sans-serif");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text(style.icon, b.x + 21.0, b.y + 19.0)?;

    // Name and type.
    let text_left = b.x + 42.0;
    let text_max_w = (b.width - 110.0).max(20.0);
    ctx.set_text_align("left");
    ctx.set_fill_style_str(TEXT_COLOR);
    ctx.set_font("bold 12px sans-serif");
    let label = fit_text(ctx, &node.label, text_max_w);
    ctx.fill_text(&label, text_left, b.y + 14.0)?;
    ctx.set_fill_style_str(MUTED_TEXT_COLOR);
    ctx.set_font("10px sans-serif");
    ctx.fill_text(style.display_name, text_left, b.y + 27.0)?;

    // Status dot and contained-count badge, right-aligned in the header.
    ctx.set_fill_style_str(style::status_color(node.status));
    ctx.begin_path();
    ctx.arc(b.right() - 16.0, b.y + 19.0, 4.0, 0.0, 2.0 * PI)?;
    ctx.fill();

    let badge = node.contained_count.to_string();
    ctx.set_fill_style_str(MUTED_TEXT_COLOR);
    ctx.set_font("10px sans-serif");
    ctx.set_text_align("right");
    ctx.fill_text(&badge, b.right() - 28.0, b.y + 19.0)?;

    // One-line config summary under the header.
    if let Some(summary) = style::container_summary(node) {
        ctx.set_text_align("left");
        ctx.set_fill_style_str(MUTED_TEXT_COLOR);
        ctx.set_font("10px sans-serif");
        let summary = fit_text(ctx, &summary, (b.width - 20.0).max(20.0));
        ctx.fill_text(&summary, b.x + 10.0, b.y + CONTAINER_HEADER_H + 14.0)?;
    }

    // Add-child button, suppressed while this node is the drop target so
    // the highlight stays unobstructed.
    if !state.drop_target {
        if let Some(button) = hit::add_button_bounds(node) {
            draw_add_button(ctx, &button, style.accent)?;
        }
    }

    ctx.restore();
    Ok(())
}

fn draw_add_button(
    ctx: &CanvasRenderingContext2d,
    bounds: &Rect,
    accent: &str,
) -> Result<(), JsValue> {
    rounded_rect_path(ctx, bounds, 5.0)?;
    ctx.set_fill_style_str("#FFFFFF");
    ctx.fill();
    ctx.set_stroke_style_str(accent);
    ctx.set_line_width(1.5);
    rounded_rect_path(ctx, bounds, 5.0)?;
    ctx.stroke();

    let center = bounds.center();
    ctx.set_fill_style_str(accent);
    ctx.set_font("bold 14px sans-serif");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text("+", center.x, center.y)?;
    Ok(())
}

fn draw_leaf(
    ctx: &CanvasRenderingContext2d,
    node: &Node,
    state: &VisualState,
) -> Result<(), JsValue> {
    let style = style::node_style(&node.resource_type);
    let b = node.bounds();

    ctx.save();

    // Card.
    rounded_rect_path(ctx, &b, CORNER_RADIUS)?;
    ctx.set_fill_style_str("#FFFFFF");
    ctx.fill();

    let (border_color, border_width) = border_for(state, &style);
    ctx.set_stroke_style_str(border_color);
    ctx.set_line_width(border_width);
    rounded_rect_path(ctx, &b, CORNER_RADIUS)?;
    ctx.stroke();

    // Colored header band with icon and type label.
    ctx.set_fill_style_str(style.accent);
    ctx.fill_rect(b.x + 1.0, b.y + 1.0, b.width - 2.0, LEAF_HEADER_H);
    ctx.set_fill_style_str("#FFFFFF");
    ctx.set_font("bold 9px sans-serif");
    ctx.set_text_align("left");
    ctx.set_text_baseline("middle");
    ctx.fill_text(style.icon, b.x + 8.0, b.y + 13.0)?;
    ctx.set_font("10px sans-serif");
    let type_max_w = (b.width - 70.0).max(20.0);
    let type_label = fit_text(ctx, style.display_name, type_max_w);
    ctx.fill_text(&type_label, b.x + 38.0, b.y + 13.0)?;

    // Status dot at the header's right edge.
    ctx.set_fill_style_str(style::status_color(node.status));
    ctx.begin_path();
    ctx.arc(b.right() - 12.0, b.y + 13.0, 4.0, 0.0, 2.0 * PI)?;
    ctx.fill();

    // Name.
    ctx.set_fill_style_str(TEXT_COLOR);
    ctx.set_font("bold 12px sans-serif");
    let name = fit_text(ctx, &node.label, (b.width - 16.0).max(20.0));
    ctx.fill_text(&name, b.x + 8.0, b.y + LEAF_HEADER_H + 14.0)?;

    // Config summary lines, clipped to the card height.
    ctx.set_fill_style_str(MUTED_TEXT_COLOR);
    ctx.set_font("10px sans-serif");
    let line_height = 13.0;
    let mut y = b.y + LEAF_HEADER_H + 30.0;
    for line in style::leaf_summary_lines(node) {
        if y > b.bottom() - 6.0 {
            break;
        }
        let line = fit_text(ctx, &line, (b.width - 16.0).max(20.0));
        ctx.fill_text(&line, b.x + 8.0, y)?;
        y += line_height;
    }

    ctx.restore();
    Ok(())
}

fn draw_handles(ctx: &CanvasRenderingContext2d, node: &Node, zoom: f64) -> Result<(), JsValue> {
    let radius = HANDLE_RADIUS / zoom;
    ctx.save();
    ctx.set_fill_style_str("#FFFFFF");
    ctx.set_stroke_style_str(MUTED_TEXT_COLOR);
    ctx.set_line_width(1.0 / zoom);

    for side in [HandleSide::Target, HandleSide::Source] {
        let at = hit::handle_position(node, side);
        ctx.begin_path();
        ctx.arc(at.x, at.y, radius, 0.0, 2.0 * PI)?;
        ctx.fill();
        ctx.stroke();
    }

    ctx.restore();
    Ok(())
}

// =============================================================
// Selection UI
// =============================================================

fn draw_selection(ctx: &CanvasRenderingContext2d, node: &Node, zoom: f64) -> Result<(), JsValue> {
    let b = node.bounds();
    let outset = 3.0 / zoom;
    let dash_world = SELECTION_DASH_PX / zoom;

    ctx.save();
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.5 / zoom);
    let dash = js_sys::Array::new();
    dash.push(&dash_world.into());
    dash.push(&dash_world.into());
    ctx.set_line_dash(&dash)?;
    ctx.stroke_rect(
        b.x - outset,
        b.y - outset,
        b.width + outset * 2.0,
        b.height + outset * 2.0,
    );
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();
    Ok(())
}

// =============================================================
// Helpers
// =============================================================

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, b: &Rect, radius: f64) -> Result<(), JsValue> {
    let r = radius.min(b.width / 2.0).min(b.height / 2.0);
    ctx.begin_path();
    ctx.move_to(b.x + r, b.y);
    ctx.arc_to(b.right(), b.y, b.right(), b.bottom(), r)?;
    ctx.arc_to(b.right(), b.bottom(), b.x, b.bottom(), r)?;
    ctx.arc_to(b.x, b.bottom(), b.x, b.y, r)?;
    ctx.arc_to(b.x, b.y, b.right(), b.y, r)?;
    ctx.close_path();
    Ok(())
}

/// Truncate `text` with an ellipsis so it fits within `max_w` world
/// units at the current font.
fn fit_text(ctx: &CanvasRenderingContext2d, text: &str, max_w: f64) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() || measured_text_width(ctx, trimmed) <= max_w {
        return trimmed.to_owned();
    }

    let ellipsis = "...";
    let mut chars: Vec<char> = trimmed.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate = format!("{}{ellipsis}", chars.iter().collect::<String>().trim_end());
        if measured_text_width(ctx, &candidate) <= max_w {
            return candidate;
        }
    }
    ellipsis.to_owned()
}

fn measured_text_width(ctx: &CanvasRenderingContext2d, text: &str) -> f64 {
    match ctx.measure_text(text) {
        Ok(metrics) => metrics.width(),
        Err(_) => f64::INFINITY,
    }
}
