use uuid::Uuid;

use super::*;

// =============================================================
// Modifiers / Button
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift);
    assert!(!m.ctrl);
    assert!(!m.alt);
    assert!(!m.meta);
}

#[test]
fn button_variants_distinct() {
    assert_eq!(Button::Primary, Button::Primary);
    assert_ne!(Button::Primary, Button::Middle);
    assert_ne!(Button::Middle, Button::Secondary);
}

#[test]
fn key_compares_by_browser_name() {
    assert_eq!(Key("Delete".to_owned()), Key("Delete".to_owned()));
    assert_ne!(Key("Delete".to_owned()), Key("Escape".to_owned()));
}

// =============================================================
// CursorHint
// =============================================================

#[test]
fn cursor_hint_css_keywords() {
    assert_eq!(CursorHint::Default.as_css(), "default");
    assert_eq!(CursorHint::Move.as_css(), "move");
    assert_eq!(CursorHint::Pointer.as_css(), "pointer");
}

// =============================================================
// UiState
// =============================================================

#[test]
fn ui_state_default_is_empty() {
    let ui = UiState::default();
    assert!(ui.selected_id.is_none());
    assert!(ui.hovered_id.is_none());
    assert!(ui.drop_target_id.is_none());
    assert!(ui.drag_type.is_none());
    assert!(ui.last_click.is_none());
}

#[test]
fn click_memo_equality() {
    let id = Uuid::new_v4();
    let a = ClickMemo { node_id: id, at_ms: 100.0 };
    let b = ClickMemo { node_id: id, at_ms: 100.0 };
    assert_eq!(a, b);
}

// =============================================================
// Gesture
// =============================================================

#[test]
fn gesture_default_is_idle() {
    assert!(matches!(Gesture::default(), Gesture::Idle));
}

#[test]
fn idle_is_not_active() {
    assert!(!Gesture::Idle.is_active());
}

#[test]
fn dragging_and_panning_are_active() {
    let drag = Gesture::DraggingNode {
        id: Uuid::new_v4(),
        grab_offset: Point::new(5.0, 5.0),
        origin: Point::new(0.0, 0.0),
    };
    let pan = Gesture::Panning {
        start_screen: Point::new(10.0, 10.0),
        start_camera: Camera::default(),
    };
    assert!(drag.is_active());
    assert!(pan.is_active());
}

#[test]
fn drag_data_key_is_stable() {
    // Hosts bake this string into their palette markup; changing it is a
    // breaking change.
    assert_eq!(DRAG_DATA_KEY, "application/x-infracanvas-resource");
}
