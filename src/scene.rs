//! Scene model: resource nodes, dependency edges, and the containment tree.
//!
//! This module defines the data types that describe what is on the canvas
//! (`Node`, `Edge`), a sparse-update type for incremental edits
//! (`PartialNode`), a typed accessor for the open-ended `config` JSON bag
//! (`Config`), and the runtime store that owns all live entities
//! (`SceneModel`).
//!
//! Containment is an explicit tree: each node carries an ordered list of
//! child ids, and `z_index` / `contained_count` are derived from the tree
//! on every mutation rather than maintained by hand. Draw order is a
//! depth-first traversal (parents before children); hit order is its
//! reverse.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Rect;

/// Unique identifier for a resource node. Assigned by the host.
pub type NodeId = Uuid;

/// Unique identifier for an edge. Assigned by the host.
pub type EdgeId = Uuid;

/// Provisioning status of the resource a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    #[default]
    Unknown,
    Planning,
    Applying,
    Created,
    Updating,
    Error,
    Destroyed,
}

/// A resource node as stored in the scene and on the wire.
///
/// `z_index`, `children`, and `contained_count` are derived from the
/// containment tree; the host may omit them and [`SceneModel`] recomputes
/// them on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Display name shown in the node header.
    pub label: String,
    /// Resource type tag (e.g. `"aws_vpc"`, `"aws_instance"`).
    pub resource_type: String,
    /// Left edge of the bounding box in world coordinates.
    pub x: f64,
    /// Top edge of the bounding box in world coordinates.
    pub y: f64,
    /// Width of the bounding box in world coordinates.
    pub width: f64,
    /// Height of the bounding box in world coordinates.
    pub height: f64,
    /// Derived stacking order; always strictly greater than the parent's.
    #[serde(default)]
    pub z_index: i64,
    /// Containing node, if any. Containment is a tree, never a DAG.
    pub parent_id: Option<NodeId>,
    /// Ordered ids of directly contained nodes. Derived.
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Whether this node's type may hold children.
    pub is_container: bool,
    /// Number of direct children. Derived.
    #[serde(default)]
    pub contained_count: usize,
    /// Provisioning status, drives the status dot/glyph.
    #[serde(default)]
    pub status: ResourceStatus,
    /// Open per-type configuration (CIDR, instance type, etc.). Unknown
    /// keys pass through untouched.
    #[serde(default)]
    pub config: serde_json::Value,
}

impl Node {
    /// World-space bounding box.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// A dependency edge between two nodes.
///
/// Edges reference nodes by id only; an edge whose endpoint has been
/// deleted is skipped at render time rather than treated as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge.
    pub id: EdgeId,
    /// Source node id.
    pub source: NodeId,
    /// Target node id.
    pub target: NodeId,
    /// User-declared dependency (`true`) vs inferred (`false`).
    pub is_explicit: bool,
    /// Whether the edge renders with a marching-ants dash animation.
    #[serde(default)]
    pub animated: bool,
    /// Optional label drawn at the curve midpoint.
    #[serde(default)]
    pub label: Option<String>,
}

/// Sparse update for a node. Only present fields are applied.
///
/// Structural fields (parent, type) are deliberately absent: reparenting
/// goes through the validated [`SceneModel::reparent`] path and a node's
/// type never changes after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialNode {
    /// New x position, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// New y position, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// New width, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// New height, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// New display name, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// New provisioning status, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ResourceStatus>,
    /// Config keys to merge or remove (null values delete keys).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

/// Typed read access to the known `config` fields of a node.
pub struct Config<'a> {
    value: &'a serde_json::Value,
}

impl<'a> Config<'a> {
    /// Wrap a reference to a node's `config` value for typed access.
    #[must_use]
    pub fn new(value: &'a serde_json::Value) -> Self {
        Self { value }
    }

    fn str_field(&self, key: &str) -> Option<&'a str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    fn int_field(&self, key: &str) -> Option<i64> {
        self.value.get(key).and_then(serde_json::Value::as_i64)
    }

    /// CIDR block of a network-like resource.
    #[must_use]
    pub fn cidr_block(&self) -> Option<&'a str> {
        self.str_field("cidr_block")
    }

    /// Availability zone of a subnet-like resource.
    #[must_use]
    pub fn availability_zone(&self) -> Option<&'a str> {
        self.str_field("availability_zone")
    }

    /// Instance type of a compute resource.
    #[must_use]
    pub fn instance_type(&self) -> Option<&'a str> {
        self.str_field("instance_type")
    }

    /// Machine image of a compute resource.
    #[must_use]
    pub fn ami(&self) -> Option<&'a str> {
        self.str_field("ami")
    }

    /// Database engine of an RDS-like resource.
    #[must_use]
    pub fn engine(&self) -> Option<&'a str> {
        self.str_field("engine")
    }

    /// Database instance class of an RDS-like resource.
    #[must_use]
    pub fn instance_class(&self) -> Option<&'a str> {
        self.str_field("instance_class")
    }

    /// Minimum size of an autoscaling-like resource.
    #[must_use]
    pub fn min_size(&self) -> Option<i64> {
        self.int_field("min_size")
    }

    /// Maximum size of an autoscaling-like resource.
    #[must_use]
    pub fn max_size(&self) -> Option<i64> {
        self.int_field("max_size")
    }

    /// Desired capacity of an autoscaling-like resource.
    #[must_use]
    pub fn desired_capacity(&self) -> Option<i64> {
        self.int_field("desired_capacity")
    }

    /// Raw access to any config key, known or not.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a serde_json::Value> {
        self.value.get(key)
    }
}

/// In-memory store of nodes and edges plus the containment tree.
pub struct SceneModel {
    nodes: HashMap<NodeId, Node>,
    edges: HashMap<EdgeId, Edge>,
    /// Root nodes in creation order; drives draw order across trees.
    roots: Vec<NodeId>,
    /// Monotone counter assigning z to new roots.
    next_root_z: i64,
}

impl SceneModel {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            roots: Vec::new(),
            next_root_z: 0,
        }
    }

    /// Replace all content with a host snapshot.
    ///
    /// `children`, `z_index`, and `contained_count` are rebuilt from the
    /// `parent_id` pointers; a node whose parent is absent from the
    /// snapshot is demoted to a root.
    pub fn load_snapshot(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes.clear();
        self.edges.clear();
        self.roots.clear();
        self.next_root_z = 0;

        let order: Vec<NodeId> = nodes.iter().map(|n| n.id).collect();
        for mut node in nodes {
            node.children.clear();
            node.contained_count = 0;
            self.nodes.insert(node.id, node);
        }

        // Rebuild the tree in snapshot order so sibling order is stable.
        for id in &order {
            let parent_id = self.nodes.get(id).and_then(|n| n.parent_id);
            match parent_id {
                Some(pid) if self.nodes.contains_key(&pid) => {
                    if let Some(parent) = self.nodes.get_mut(&pid) {
                        parent.children.push(*id);
                    }
                }
                Some(pid) => {
                    log::warn!("node {id} references missing parent {pid}; treating as root");
                    if let Some(node) = self.nodes.get_mut(id) {
                        node.parent_id = None;
                    }
                    self.roots.push(*id);
                }
                None => self.roots.push(*id),
            }
        }

        let roots = self.roots.clone();
        for id in roots {
            let z = self.next_root_z;
            self.next_root_z += 1;
            self.assign_z(id, z);
        }
        self.refresh_counts();

        for edge in edges {
            self.edges.insert(edge.id, edge);
        }
    }

    // --- Node mutations ---

    /// Insert or replace a node.
    ///
    /// A replaced node keeps its existing children and, when it stays at
    /// root level, its z slot; if its parent pointer changed the subtree
    /// moves with it.
    pub fn insert(&mut self, mut node: Node) {
        node.contained_count = 0;

        if let Some(pid) = node.parent_id {
            if pid == node.id || !self.nodes.contains_key(&pid) {
                log::warn!("node {} references missing parent {pid}; treating as root", node.id);
                node.parent_id = None;
            }
        }

        let prior = self
            .nodes
            .get(&node.id)
            .map(|n| (n.parent_id, n.children.clone(), n.z_index));
        let replacing = prior.is_some();
        let (old_parent, kept_children, old_z) = prior.unwrap_or((node.parent_id, Vec::new(), 0));

        node.children = kept_children;
        let new_parent = node.parent_id;
        let id = node.id;
        self.nodes.insert(id, node);

        if !replacing {
            self.attach(id, new_parent);
        } else if old_parent != new_parent {
            self.detach(id, old_parent);
            self.attach(id, new_parent);
        }

        let z = match new_parent {
            Some(pid) => self.nodes.get(&pid).map_or(0, |p| p.z_index) + 1,
            None if replacing && old_parent.is_none() => old_z,
            None => {
                let z = self.next_root_z;
                self.next_root_z += 1;
                z
            }
        };
        self.assign_z(id, z);
        self.refresh_counts();
    }

    /// Remove a node together with its full descendant closure, pruning
    /// edges that touch any removed node. Returns the removed ids, the
    /// target first.
    pub fn remove_subtree(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.nodes.contains_key(&id) {
            return Vec::new();
        }

        let mut removed = vec![id];
        let mut cursor = 0;
        while cursor < removed.len() {
            let current = removed[cursor];
            if let Some(node) = self.nodes.get(&current) {
                removed.extend(node.children.iter().copied());
            }
            cursor += 1;
        }

        let parent = self.nodes.get(&id).and_then(|n| n.parent_id);
        self.detach(id, parent);
        let gone: std::collections::HashSet<NodeId> = removed.iter().copied().collect();
        for rid in &removed {
            self.nodes.remove(rid);
        }
        self.edges
            .retain(|_, e| !gone.contains(&e.source) && !gone.contains(&e.target));
        self.refresh_counts();
        removed
    }

    /// Move a node to a new world position. Returns false if it doesn't exist.
    pub fn set_position(&mut self, id: NodeId, x: f64, y: f64) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.x = x;
        node.y = y;
        true
    }

    /// Shift a node and its full subtree by a world-space delta. Contained
    /// nodes keep their position relative to the container. Returns false
    /// if the node doesn't exist.
    pub fn translate_subtree(&mut self, id: NodeId, dx: f64, dy: f64) -> bool {
        if !self.nodes.contains_key(&id) {
            return false;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(&current) {
                node.x += dx;
                node.y += dy;
                stack.extend(node.children.iter().copied());
            }
        }
        true
    }

    /// Apply a sparse update to an existing node. Returns false if the
    /// node doesn't exist.
    pub fn apply_partial(&mut self, id: NodeId, partial: &PartialNode) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        if let Some(x) = partial.x {
            node.x = x;
        }
        if let Some(y) = partial.y {
            node.y = y;
        }
        if let Some(w) = partial.width {
            node.width = w;
        }
        if let Some(h) = partial.height {
            node.height = h;
        }
        if let Some(ref label) = partial.label {
            node.label = label.clone();
        }
        if let Some(status) = partial.status {
            node.status = status;
        }
        if let Some(ref config) = partial.config {
            let Some(incoming) = config.as_object() else {
                return false;
            };

            if !node.config.is_object() {
                node.config = serde_json::json!({});
            }

            if let Some(existing) = node.config.as_object_mut() {
                for (k, v) in incoming {
                    if v.is_null() {
                        existing.remove(k);
                    } else {
                        existing.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        true
    }

    /// Move a node (and its subtree) under a new parent, or to root level
    /// with `None`.
    ///
    /// This is the structural apply only — callers must have validated
    /// containment and acyclicity through the hierarchy rule engine first.
    /// Returns false if the node or the new parent doesn't exist.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> bool {
        if !self.nodes.contains_key(&id) {
            return false;
        }
        if let Some(pid) = new_parent {
            if !self.nodes.contains_key(&pid) {
                return false;
            }
        }

        let old_parent = self.nodes.get(&id).and_then(|n| n.parent_id);
        if old_parent == new_parent {
            return true;
        }

        self.detach(id, old_parent);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent_id = new_parent;
        }
        self.attach(id, new_parent);

        let z = self.parent_z(id);
        self.assign_z(id, z);
        self.refresh_counts();
        true
    }

    // --- Edge mutations ---

    /// Insert or replace an edge.
    pub fn insert_edge(&mut self, edge: Edge) {
        self.edges.insert(edge.id, edge);
    }

    /// Remove an edge by id, returning it if it was present.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        self.edges.remove(&id)
    }

    // --- Queries ---

    /// Look up a node by id.
    #[must_use]
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Ids of a node's direct children, in containment order.
    #[must_use]
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |n| n.children.as_slice())
    }

    /// Ancestor chain from the node's parent up to its root.
    ///
    /// Parent chains are acyclic by invariant; the visited guard merely
    /// bounds the walk if a malformed snapshot ever violates that.
    #[must_use]
    pub fn ancestors_of(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.nodes.get(&id).and_then(|n| n.parent_id);
        while let Some(pid) = current {
            if out.contains(&pid) {
                log::warn!("cycle detected in parent chain at {pid}");
                break;
            }
            out.push(pid);
            current = self.nodes.get(&pid).and_then(|n| n.parent_id);
        }
        out
    }

    /// Look up an edge by id.
    #[must_use]
    pub fn find_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// All edges, ordered by id for deterministic iteration.
    #[must_use]
    pub fn edges(&self) -> Vec<&Edge> {
        let mut edges: Vec<&Edge> = self.edges.values().collect();
        edges.sort_by_key(|e| e.id);
        edges
    }

    /// Node ids in draw order: roots in creation order, each immediately
    /// followed by its subtree, parents before children.
    #[must_use]
    pub fn draw_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.push_subtree(*root, &mut out);
        }
        out
    }

    /// Node ids in hit-test order: the exact reverse of draw order, so
    /// children are tested before their container and later siblings
    /// before earlier ones.
    #[must_use]
    pub fn hit_order(&self) -> Vec<NodeId> {
        let mut out = self.draw_order();
        out.reverse();
        out
    }

    /// Bounding box of all node bounds, or `None` for an empty scene.
    #[must_use]
    pub fn world_bounds(&self) -> Option<Rect> {
        let mut iter = self.nodes.values();
        let first = iter.next()?.bounds();
        Some(iter.fold(first, |acc, n| acc.union(&n.bounds())))
    }

    /// Number of nodes currently in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the scene contains no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // --- Derived-state maintenance ---

    fn push_subtree(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let Some(node) = self.nodes.get(&id) {
            out.push(id);
            for child in &node.children {
                self.push_subtree(*child, out);
            }
        }
    }

    fn detach(&mut self, id: NodeId, parent: Option<NodeId>) {
        match parent {
            Some(pid) => {
                if let Some(p) = self.nodes.get_mut(&pid) {
                    p.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
    }

    fn attach(&mut self, id: NodeId, parent: Option<NodeId>) {
        match parent {
            Some(pid) => {
                if let Some(p) = self.nodes.get_mut(&pid) {
                    if !p.children.contains(&id) {
                        p.children.push(id);
                    }
                }
            }
            None => {
                if !self.roots.contains(&id) {
                    self.roots.push(id);
                }
            }
        }
    }

    /// z the node should take given its parent, allocating a fresh root
    /// slot for unparented nodes.
    fn parent_z(&mut self, id: NodeId) -> i64 {
        match self.nodes.get(&id).and_then(|n| n.parent_id) {
            Some(pid) => self.nodes.get(&pid).map_or(0, |p| p.z_index) + 1,
            None => {
                let z = self.next_root_z;
                self.next_root_z += 1;
                z
            }
        }
    }

    /// Set `z` on the node and `parent + 1` recursively below it.
    fn assign_z(&mut self, id: NodeId, z: i64) {
        let children = match self.nodes.get_mut(&id) {
            Some(node) => {
                node.z_index = z;
                node.children.clone()
            }
            None => return,
        };
        for child in children {
            self.assign_z(child, z + 1);
        }
    }

    fn refresh_counts(&mut self) {
        let counts: Vec<(NodeId, usize)> = self
            .nodes
            .values()
            .map(|n| (n.id, n.children.len()))
            .collect();
        for (id, count) in counts {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.contained_count = count;
            }
        }
    }
}

impl Default for SceneModel {
    fn default() -> Self {
        Self::new()
    }
}
