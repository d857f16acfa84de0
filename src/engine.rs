//! Top-level engine: the pointer-interaction state machine, host intents,
//! and the canvas-owning wrapper.
//!
//! [`EngineCore`] holds everything that doesn't depend on the browser —
//! scene, camera, rules, UI state, the active gesture — so the whole
//! interaction model is testable on native targets. [`Engine`] wraps it
//! together with the canvas element and its 2d context and supplies wall
//! clock timestamps.
//!
//! Handlers return [`Action`] values for the host to process. Intents are
//! fire-and-forget: the engine applies position and selection changes
//! optimistically and never awaits the host's persistence call. The one
//! reconciliation hook is `confirm_position` / `reject_position`, which
//! resolves the origin remembered at drag start.

use std::collections::HashMap;

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, Point, Viewport};
use crate::consts::{DOUBLE_CLICK_WINDOW_MS, FIT_PADDING_PX, WHEEL_ZOOM_STEP};
use crate::hierarchy::{self, HierarchyRules, PlacementError};
use crate::hit::{self, HitPart};
use crate::input::{Button, ClickMemo, CursorHint, Gesture, Key, Modifiers, UiState, WheelDelta};
use crate::render;
use crate::scene::{Edge, EdgeId, Node, NodeId, PartialNode, SceneModel};
use crate::style;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from handlers for the host to process.
///
/// Everything except `SetCursor` and `RenderNeeded` is a persistence or
/// UI intent the engine has already validated client-side; the host
/// remains the authority and answers with `apply_*` broadcasts.
#[derive(Debug, Clone)]
pub enum Action {
    /// Open a resource-creation UI pre-scoped to this container.
    AddChildRequested { parent_id: NodeId, parent_type: String },
    /// Open the properties panel for this resource.
    ShowPropertiesRequested { id: NodeId },
    /// Create a resource of this type, optionally inside a container, at
    /// the given world position.
    CreateResourceRequested {
        resource_type: String,
        parent_id: Option<NodeId>,
        world: Point,
    },
    /// Persist the final position after a drag.
    CommitPositionRequested { id: NodeId, x: f64, y: f64 },
    /// Persist a validated reparent.
    ReparentRequested { id: NodeId, parent_id: Option<NodeId> },
    /// Delete this node and its full descendant closure. `affected`
    /// lists every id that will go, the node itself first, so the host
    /// can report impact before confirming.
    DeleteSubtreeRequested { id: NodeId, affected: Vec<NodeId> },
    /// A placement or reparent was rejected before any mutation; the
    /// error names the valid parent types for the host's message.
    PlacementRejected { error: PlacementError },
    /// The host should update the CSS cursor.
    SetCursor(CursorHint),
    /// Interaction state changed; the host should invoke `render`.
    RenderNeeded,
}

/// Fatal construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The canvas element refused to yield a 2d context. The engine must
    /// not be used afterwards.
    #[error("2d rendering context unavailable")]
    ContextUnavailable,
}

/// Core engine state — all logic that doesn't depend on the canvas element.
///
/// Separated from [`Engine`] so it can be tested without WASM/browser
/// dependencies; every handler takes explicit timestamps instead of
/// reading a clock.
pub struct EngineCore {
    pub scene: SceneModel,
    pub camera: Camera,
    pub rules: HierarchyRules,
    pub ui: UiState,
    pub gesture: Gesture,
    pub viewport: Viewport,
    pub dpr: f64,
    /// Pre-drag origins of positions sent to the host and not yet
    /// confirmed or rejected.
    pending_commits: HashMap<NodeId, Point>,
}

impl EngineCore {
    #[must_use]
    pub fn new(rules: HierarchyRules) -> Self {
        Self {
            scene: SceneModel::new(),
            camera: Camera::default(),
            rules,
            ui: UiState::default(),
            gesture: Gesture::Idle,
            viewport: Viewport::default(),
            dpr: 1.0,
            pending_commits: HashMap::new(),
        }
    }

    // --- Data inputs ---

    /// Hydrate the scene from a host snapshot.
    pub fn load_snapshot(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.scene.load_snapshot(nodes, edges);
        self.ui = UiState::default();
        self.gesture = Gesture::Idle;
        self.pending_commits.clear();
    }

    /// Replace the camera wholesale (e.g. a persisted view restored by
    /// the host).
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// Update viewport geometry and device pixel ratio.
    pub fn set_viewport(&mut self, left: f64, top: f64, width: f64, height: f64, dpr: f64) {
        self.viewport = Viewport { left, top, width, height };
        self.dpr = dpr;
    }

    /// Apply a host broadcast: resource created. Undersized nodes are
    /// normalized up to their type's minimum card size on admission.
    pub fn apply_create(&mut self, mut node: Node) {
        let style = style::node_style(&node.resource_type);
        node.width = node.width.max(style.min_width);
        node.height = node.height.max(style.min_height);
        self.scene.insert(node);
    }

    /// Apply a host broadcast: resource updated.
    pub fn apply_update(&mut self, id: NodeId, fields: &PartialNode) {
        self.scene.apply_partial(id, fields);
    }

    /// Apply a host broadcast: resource deleted, cascading through its
    /// descendants. Selection, hover, and any in-flight gesture touching
    /// a removed node are cleared.
    pub fn apply_delete(&mut self, id: NodeId) {
        let removed = self.scene.remove_subtree(id);
        if removed.is_empty() {
            return;
        }
        if self.ui.selected_id.is_some_and(|sel| removed.contains(&sel)) {
            self.ui.selected_id = None;
        }
        if self.ui.hovered_id.is_some_and(|h| removed.contains(&h)) {
            self.ui.hovered_id = None;
        }
        if self.ui.drop_target_id.is_some_and(|d| removed.contains(&d)) {
            self.ui.drop_target_id = None;
        }
        if let Gesture::DraggingNode { id: dragged, .. } = self.gesture {
            if removed.contains(&dragged) {
                self.gesture = Gesture::Idle;
            }
        }
        for rid in &removed {
            self.pending_commits.remove(rid);
        }
    }

    /// Apply a host broadcast: edge created.
    pub fn apply_create_edge(&mut self, edge: Edge) {
        self.scene.insert_edge(edge);
    }

    /// Apply a host broadcast: edge deleted.
    pub fn apply_delete_edge(&mut self, id: EdgeId) {
        self.scene.remove_edge(id);
    }

    // --- Optimistic-update reconciliation ---

    /// The host persisted a dragged position; drop the remembered origin.
    pub fn confirm_position(&mut self, id: NodeId) {
        self.pending_commits.remove(&id);
    }

    /// The host failed to persist a dragged position; restore the node
    /// (and the subtree that moved with it) to where the drag started.
    pub fn reject_position(&mut self, id: NodeId) {
        let Some(origin) = self.pending_commits.remove(&id) else {
            return;
        };
        if let Some(node) = self.scene.find(id) {
            log::debug!("position commit rejected for {id}; reverting to {origin:?}");
            let (dx, dy) = (origin.x - node.x, origin.y - node.y);
            self.scene.translate_subtree(id, dx, dy);
        }
    }

    // --- Host-triggered operations ---

    /// Re-center and re-zoom so every node is visible with standard
    /// padding. An empty scene resets to the identity camera.
    pub fn fit_to_view(&mut self) -> Vec<Action> {
        self.camera = match self.scene.world_bounds() {
            Some(bounds) => Camera::fitting(
                bounds,
                self.viewport.width,
                self.viewport.height,
                FIT_PADDING_PX,
            ),
            None => Camera::default(),
        };
        vec![Action::RenderNeeded]
    }

    /// Ask the host to delete the current selection and everything it
    /// contains. Nothing is mutated until the host confirms with
    /// [`EngineCore::apply_delete`].
    pub fn request_delete_selected(&mut self) -> Vec<Action> {
        let Some(id) = self.ui.selected_id else {
            return Vec::new();
        };
        let mut affected = vec![id];
        affected.extend(hierarchy::collect_descendants(&self.scene, id));
        vec![Action::DeleteSubtreeRequested { id, affected }]
    }

    /// Move a node under a new parent after containment and cycle
    /// validation. On success the move is applied optimistically and a
    /// persistence intent is emitted; on rejection nothing changes.
    pub fn try_reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Vec<Action> {
        match hierarchy::validate_reparent(&self.rules, &self.scene, id, new_parent) {
            Ok(()) => {
                if !self.scene.reparent(id, new_parent) {
                    return Vec::new();
                }
                vec![
                    Action::ReparentRequested { id, parent_id: new_parent },
                    Action::RenderNeeded,
                ]
            }
            Err(error) => {
                log::warn!("reparent of {id} rejected: {error}");
                vec![Action::PlacementRejected { error }]
            }
        }
    }

    // --- Pointer events ---

    /// Pointer-down at a page-relative screen position. `now_ms` is the
    /// event timestamp, used for double-click detection.
    pub fn on_pointer_down(
        &mut self,
        screen: Point,
        button: Button,
        _modifiers: Modifiers,
        now_ms: f64,
    ) -> Vec<Action> {
        if button != Button::Primary || self.gesture.is_active() {
            return Vec::new();
        }

        let world = self.camera.screen_to_world(screen, &self.viewport);
        match hit::hit_test(world, &self.scene) {
            Some(hit) if hit.part == HitPart::AddButton => {
                let Some(node) = self.scene.find(hit.node_id) else {
                    return Vec::new();
                };
                vec![Action::AddChildRequested {
                    parent_id: node.id,
                    parent_type: node.resource_type.clone(),
                }]
            }
            Some(hit) => self.pointer_down_on_node(hit.node_id, world, now_ms),
            None => {
                self.ui.selected_id = None;
                self.ui.last_click = None;
                self.gesture = Gesture::Panning {
                    start_screen: screen,
                    start_camera: self.camera,
                };
                vec![Action::RenderNeeded]
            }
        }
    }

    fn pointer_down_on_node(&mut self, id: NodeId, world: Point, now_ms: f64) -> Vec<Action> {
        let is_double = self
            .ui
            .last_click
            .is_some_and(|memo| memo.node_id == id && now_ms - memo.at_ms <= DOUBLE_CLICK_WINDOW_MS);
        if is_double {
            self.ui.last_click = None;
            return vec![Action::ShowPropertiesRequested { id }];
        }
        self.ui.last_click = Some(ClickMemo { node_id: id, at_ms: now_ms });
        self.ui.selected_id = Some(id);

        let Some(node) = self.scene.find(id) else {
            return vec![Action::RenderNeeded];
        };
        // Contained nodes move with their container; only roots drag.
        if node.parent_id.is_none() {
            let origin = Point::new(node.x, node.y);
            self.gesture = Gesture::DraggingNode {
                id,
                grab_offset: Point::new(world.x - node.x, world.y - node.y),
                origin,
            };
        }
        vec![Action::RenderNeeded]
    }

    /// Pointer movement: drives the active drag or pan, or hover
    /// detection when idle.
    pub fn on_pointer_move(&mut self, screen: Point, _modifiers: Modifiers) -> Vec<Action> {
        match self.gesture {
            Gesture::DraggingNode { id, grab_offset, .. } => {
                let world = self.camera.screen_to_world(screen, &self.viewport);
                let Some(node) = self.scene.find(id) else {
                    return Vec::new();
                };
                // The whole subtree follows; contained nodes never move
                // independently of their container.
                let dx = world.x - grab_offset.x - node.x;
                let dy = world.y - grab_offset.y - node.y;
                self.scene.translate_subtree(id, dx, dy);
                vec![Action::RenderNeeded]
            }
            Gesture::Panning { start_screen, start_camera } => {
                self.camera = start_camera
                    .panned_by(screen.x - start_screen.x, screen.y - start_screen.y);
                vec![Action::RenderNeeded]
            }
            Gesture::Idle => self.hover_at(screen),
        }
    }

    fn hover_at(&mut self, screen: Point) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen, &self.viewport);
        let hit = hit::hit_test(world, &self.scene);

        let cursor = match &hit {
            Some(h) if h.part == HitPart::AddButton => CursorHint::Pointer,
            Some(h) => {
                let is_root = self
                    .scene
                    .find(h.node_id)
                    .is_some_and(|n| n.parent_id.is_none());
                if is_root { CursorHint::Move } else { CursorHint::Default }
            }
            None => CursorHint::Default,
        };

        let hovered = hit.map(|h| h.node_id);
        let mut actions = vec![Action::SetCursor(cursor)];
        if hovered != self.ui.hovered_id {
            self.ui.hovered_id = hovered;
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Pointer-up: commits a drag to the host or ends a pan. Releasing
    /// the pointer is the only way out of either gesture.
    pub fn on_pointer_up(
        &mut self,
        _screen: Point,
        button: Button,
        _modifiers: Modifiers,
    ) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let gesture = self.gesture;
        self.gesture = Gesture::Idle;
        match gesture {
            Gesture::DraggingNode { id, origin, .. } => {
                let Some(node) = self.scene.find(id) else {
                    return Vec::new();
                };
                self.pending_commits.insert(id, origin);
                log::debug!("drag of {id} committed at ({}, {})", node.x, node.y);
                vec![Action::CommitPositionRequested { id, x: node.x, y: node.y }]
            }
            Gesture::Panning { .. } | Gesture::Idle => Vec::new(),
        }
    }

    /// Wheel: zoom towards the cursor. Active gestures are unaffected.
    pub fn on_wheel(
        &mut self,
        screen: Point,
        delta: WheelDelta,
        _modifiers: Modifiers,
    ) -> Vec<Action> {
        let zoomed = self
            .camera
            .zoom_towards(-delta.dy * WHEEL_ZOOM_STEP, screen, &self.viewport);
        if zoomed == self.camera {
            return Vec::new();
        }
        self.camera = zoomed;
        vec![Action::RenderNeeded]
    }

    /// Key-down dispatch. Delete and Backspace ask the host to delete
    /// the selection. Escape is not a gesture cancel; releasing the
    /// pointer is the only exit from a drag or pan.
    pub fn on_key_down(&mut self, key: Key, _modifiers: Modifiers) -> Vec<Action> {
        match key.0.as_str() {
            "Delete" | "Backspace" => self.request_delete_selected(),
            _ => Vec::new(),
        }
    }

    // --- External palette drag ---

    /// A palette drag is passing over the canvas. The container under
    /// the pointer becomes the drop target — visual feedback only,
    /// acceptability is re-validated at drop. The host should advertise
    /// a `copy` drop effect. `resource_type` is the dragged type when
    /// the host knows it mid-drag (drag-data is unreadable before drop
    /// on some platforms), used to tint the target by droppability.
    pub fn on_drag_over(&mut self, screen: Point, resource_type: Option<&str>) -> Vec<Action> {
        self.ui.drag_type = resource_type.map(str::to_owned);

        let world = self.camera.screen_to_world(screen, &self.viewport);
        let target = hit::node_at_point(world, &self.scene)
            .filter(|id| self.scene.find(*id).is_some_and(|n| n.is_container));

        if target == self.ui.drop_target_id {
            return Vec::new();
        }
        self.ui.drop_target_id = target;
        vec![Action::RenderNeeded]
    }

    /// The palette drag left the canvas without dropping.
    pub fn on_drag_leave(&mut self) -> Vec<Action> {
        self.ui.drag_type = None;
        if self.ui.drop_target_id.take().is_none() {
            return Vec::new();
        }
        vec![Action::RenderNeeded]
    }

    /// A palette drop at the given screen position. Validates containment
    /// before emitting a creation intent; nothing is created client-side.
    pub fn on_drop(&mut self, screen: Point, resource_type: &str) -> Vec<Action> {
        self.ui.drop_target_id = None;
        self.ui.drag_type = None;

        let world = self.camera.screen_to_world(screen, &self.viewport);
        let target = hit::node_at_point(world, &self.scene)
            .filter(|id| self.scene.find(*id).is_some_and(|n| n.is_container));

        let parent = target.and_then(|id| self.scene.find(id));
        let mut actions = match self.rules.validate_placement(resource_type, parent) {
            Ok(()) => vec![Action::CreateResourceRequested {
                resource_type: resource_type.to_owned(),
                parent_id: target,
                world,
            }],
            Err(error) => {
                log::warn!("drop of {resource_type} rejected: {error}");
                vec![Action::PlacementRejected { error }]
            }
        };
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Queries ---

    /// The currently selected node, if any.
    #[must_use]
    pub fn selection(&self) -> Option<NodeId> {
        self.ui.selected_id
    }

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.scene.find(id)
    }

    /// Whether a position commit for this node is awaiting host
    /// confirmation.
    #[must_use]
    pub fn has_pending_commit(&self, id: NodeId) -> bool {
        self.pending_commits.contains_key(&id)
    }
}

/// The full canvas engine. Wraps [`EngineCore`] and owns the browser
/// canvas element and its 2d context.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    ///
    /// # Errors
    ///
    /// [`EngineError::ContextUnavailable`] if the 2d context cannot be
    /// acquired; the engine is unusable in that case.
    pub fn new(canvas: HtmlCanvasElement, rules: HierarchyRules) -> Result<Self, EngineError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| EngineError::ContextUnavailable)?
            .ok_or(EngineError::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EngineError::ContextUnavailable)?;
        Ok(Self { canvas, ctx, core: EngineCore::new(rules) })
    }

    // --- Delegated data inputs ---

    pub fn load_snapshot(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.core.load_snapshot(nodes, edges);
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.core.set_camera(camera);
    }

    pub fn apply_create(&mut self, node: Node) {
        self.core.apply_create(node);
    }

    pub fn apply_update(&mut self, id: NodeId, fields: &PartialNode) {
        self.core.apply_update(id, fields);
    }

    pub fn apply_delete(&mut self, id: NodeId) {
        self.core.apply_delete(id);
    }

    pub fn apply_create_edge(&mut self, edge: Edge) {
        self.core.apply_create_edge(edge);
    }

    pub fn apply_delete_edge(&mut self, id: EdgeId) {
        self.core.apply_delete_edge(id);
    }

    pub fn confirm_position(&mut self, id: NodeId) {
        self.core.confirm_position(id);
    }

    pub fn reject_position(&mut self, id: NodeId) {
        self.core.reject_position(id);
    }

    // --- Viewport ---

    /// Update viewport geometry; must be called whenever the host's
    /// element resizes. Resizes the backing store to device pixels.
    pub fn set_viewport(&mut self, left: f64, top: f64, width: f64, height: f64, dpr: f64) {
        self.core.set_viewport(left, top, width, height, dpr);
        self.canvas.set_width((width * dpr).max(0.0) as u32);
        self.canvas.set_height((height * dpr).max(0.0) as u32);
    }

    // --- Delegated input events ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core
            .on_pointer_down(screen, button, modifiers, js_sys::Date::now())
    }

    pub fn on_pointer_move(&mut self, screen: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(screen, modifiers)
    }

    pub fn on_pointer_up(&mut self, screen: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen, button, modifiers)
    }

    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen, delta, modifiers)
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    pub fn on_drag_over(&mut self, screen: Point, resource_type: Option<&str>) -> Vec<Action> {
        self.core.on_drag_over(screen, resource_type)
    }

    pub fn on_drag_leave(&mut self) -> Vec<Action> {
        self.core.on_drag_leave()
    }

    pub fn on_drop(&mut self, screen: Point, resource_type: &str) -> Vec<Action> {
        self.core.on_drop(screen, resource_type)
    }

    // --- Delegated operations ---

    pub fn fit_to_view(&mut self) -> Vec<Action> {
        self.core.fit_to_view()
    }

    pub fn request_delete_selected(&mut self) -> Vec<Action> {
        self.core.request_delete_selected()
    }

    pub fn try_reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Vec<Action> {
        self.core.try_reparent(id, new_parent)
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Propagates any failing `Canvas2D` call.
    pub fn render(&self) -> Result<(), JsValue> {
        render::draw(
            &self.ctx,
            &self.core.scene,
            &self.core.camera,
            &self.core.rules,
            &self.core.ui,
            self.core.viewport.width,
            self.core.viewport.height,
            self.core.dpr,
            js_sys::Date::now(),
        )
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> Option<NodeId> {
        self.core.selection()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.core.node(id)
    }
}
