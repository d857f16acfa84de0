//! Shared numeric constants for the diagram engine.

// ── Camera ──────────────────────────────────────────────────────

/// Lowest permitted zoom factor.
pub const ZOOM_MIN: f64 = 0.1;

/// Highest permitted zoom factor.
pub const ZOOM_MAX: f64 = 3.0;

/// Padding in screen pixels kept around content by fit-to-view.
pub const FIT_PADDING_PX: f64 = 50.0;

// ── Background grid ─────────────────────────────────────────────

/// Grid line spacing in world units.
pub const GRID_SPACING: f64 = 50.0;

/// Extra world-space margin beyond the visible rect when generating
/// grid lines, so lines never pop in at the viewport edge.
pub const GRID_OVERDRAW: f64 = 100.0;

// ── Node chrome ─────────────────────────────────────────────────

/// Side length of the square add-child button on container nodes, in
/// world units.
pub const ADD_BUTTON_SIZE: f64 = 24.0;

/// Gap between a container's bottom-right corner and its add-child
/// button, in world units.
pub const ADD_BUTTON_INSET: f64 = 8.0;

/// Radius of a connection handle dot, in screen pixels (divided by zoom
/// at draw time so handles stay a constant size on screen).
pub const HANDLE_RADIUS: f64 = 5.0;

/// Minimum width of a container node, in world units.
pub const CONTAINER_MIN_WIDTH: f64 = 220.0;

/// Minimum height of a container node, in world units.
pub const CONTAINER_MIN_HEIGHT: f64 = 140.0;

// ── Interaction ─────────────────────────────────────────────────

/// Two pointer-downs on the same node within this window count as a
/// double-click, in milliseconds.
pub const DOUBLE_CLICK_WINDOW_MS: f64 = 300.0;

/// Zoom change per wheel-delta pixel. A typical 100px notch steps the
/// zoom by 0.1.
pub const WHEEL_ZOOM_STEP: f64 = 0.001;

// ── Edge animation ──────────────────────────────────────────────

/// Length of one dash segment on an animated edge, in world units.
pub const DASH_SEGMENT: f64 = 6.0;

/// Wall-clock period of one full dash cycle, in milliseconds.
pub const DASH_PERIOD_MS: f64 = 500.0;
