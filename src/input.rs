//! Input model: pointer buttons, keys, modifiers, cursor hints, and the
//! state carried by the gesture state machine.
//!
//! The engine consumes these types in its pointer handlers. `Gesture` is
//! the active gesture being tracked between pointer-down and pointer-up;
//! exactly one of dragging/panning can be active at a time, and a
//! pointer-down while either is active is ignored until the gesture ends.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::{Camera, Point};
use crate::scene::NodeId;

/// Drag-data key under which an external palette places the resource
/// type string. The engine reads no other payload field, and drops are
/// always advertised to the platform as a `copy` operation.
pub const DRAG_DATA_KEY: &str = "application/x-infracanvas-resource";

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g.
/// `"Delete"`, `"Backspace"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Cursor shape hint emitted while hovering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    /// Over empty space or a contained node (which cannot be dragged).
    Default,
    /// Over a draggable root node.
    Move,
    /// Over a clickable add-child button.
    Pointer,
}

impl CursorHint {
    /// The CSS cursor keyword for this hint.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Move => "move",
            Self::Pointer => "pointer",
        }
    }
}

/// A pointer-down being tracked for double-click detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickMemo {
    /// Node that was clicked.
    pub node_id: NodeId,
    /// Event timestamp in milliseconds.
    pub at_ms: f64,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The currently selected node, if any.
    pub selected_id: Option<NodeId>,
    /// The node currently under the pointer, if any.
    pub hovered_id: Option<NodeId>,
    /// Container highlighted as the target of an external palette drag.
    pub drop_target_id: Option<NodeId>,
    /// Resource type being dragged from the palette, when the host knows
    /// it before the drop.
    pub drag_type: Option<String>,
    /// Previous click, pending double-click confirmation.
    pub last_click: Option<ClickMemo>,
}

/// The active gesture between pointer-down and pointer-up.
///
/// Each active variant carries the context needed to compute incremental
/// updates and emit the final host intent on release.
#[derive(Debug, Clone, Copy, Default)]
pub enum Gesture {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A root node is being moved across the canvas.
    DraggingNode {
        /// Node being dragged.
        id: NodeId,
        /// World-space offset from the node origin to the grab point,
        /// kept so the node doesn't jump under the pointer.
        grab_offset: Point,
        /// Node origin at drag start, restored if the host rejects the
        /// position commit.
        origin: Point,
    },
    /// The canvas is being panned.
    Panning {
        /// Screen position of the initiating pointer-down.
        start_screen: Point,
        /// Camera at the start of the pan; deltas apply to this, not to
        /// the live camera, so the pan never accumulates drift.
        start_camera: Camera,
    },
}

impl Gesture {
    /// Whether a drag or pan is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}
