//! Containment rule engine: which resource types may contain which.
//!
//! The rule table is plain data injected by the host at construction; the
//! same table drives client-side placement checks and the host's
//! server-side validation, so the two can never disagree. Everything here
//! is a pure function over the table and the scene's parent pointers —
//! nothing mutates.

#[cfg(test)]
#[path = "hierarchy_test.rs"]
mod hierarchy_test;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::{Node, NodeId, SceneModel};

/// Why a placement or reparent was rejected. Nothing has been mutated
/// when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// The type requires a parent and none was given.
    #[error("{resource_type} cannot be placed at the top level; valid parents: {}", .valid_parents.join(", "))]
    MissingParent {
        resource_type: String,
        /// Container types that may hold this type, for the host's message.
        valid_parents: Vec<String>,
    },
    /// The chosen container may not hold the candidate type.
    #[error("{parent_type} cannot contain {child_type}; valid parents: {}", .valid_parents.join(", "))]
    IncompatibleContainer {
        parent_type: String,
        child_type: String,
        /// Container types that may hold the child type.
        valid_parents: Vec<String>,
    },
    /// Reparenting a node under itself or one of its own descendants.
    #[error("cannot move a node into its own subtree")]
    CyclicParent,
}

/// The containment rule table.
///
/// A type is a container iff it has an entry in `can_contain` (possibly
/// with an empty child set). Ordered maps keep reverse lookups and error
/// messages deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyRules {
    /// Container type → types it may directly contain.
    pub can_contain: BTreeMap<String, BTreeSet<String>>,
    /// Types that must have a parent to exist at all.
    pub requires_parent: BTreeSet<String>,
}

impl HierarchyRules {
    /// The default AWS table: VPCs hold subnets and security groups,
    /// subnets hold instances and databases, autoscaling groups hold
    /// instances.
    #[must_use]
    pub fn aws_defaults() -> Self {
        let mut can_contain: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        can_contain.insert(
            "aws_vpc".to_owned(),
            ["aws_subnet", "aws_security_group"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        );
        can_contain.insert(
            "aws_subnet".to_owned(),
            ["aws_instance", "aws_rds_instance"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        );
        can_contain.insert(
            "aws_autoscaling_group".to_owned(),
            ["aws_instance"].into_iter().map(str::to_owned).collect(),
        );

        let requires_parent = ["aws_subnet", "aws_instance", "aws_rds_instance"]
            .into_iter()
            .map(str::to_owned)
            .collect();

        Self { can_contain, requires_parent }
    }

    /// Whether `parent_type` may directly contain `child_type`. Unknown
    /// parent types contain nothing.
    #[must_use]
    pub fn can_contain(&self, parent_type: &str, child_type: &str) -> bool {
        self.can_contain
            .get(parent_type)
            .is_some_and(|children| children.contains(child_type))
    }

    /// Whether `resource_type` must live inside a container.
    #[must_use]
    pub fn requires_parent(&self, resource_type: &str) -> bool {
        self.requires_parent.contains(resource_type)
    }

    /// Whether `resource_type` is eligible to be a parent.
    #[must_use]
    pub fn is_container(&self, resource_type: &str) -> bool {
        self.can_contain.contains_key(resource_type)
    }

    /// Reverse lookup: every container type that may hold `child_type`.
    #[must_use]
    pub fn valid_parents_of(&self, child_type: &str) -> Vec<String> {
        self.can_contain
            .iter()
            .filter(|(_, children)| children.contains(child_type))
            .map(|(parent, _)| parent.clone())
            .collect()
    }

    /// Check whether a node of `candidate_type` may be created under
    /// `parent` (or at the top level for `None`).
    ///
    /// # Errors
    ///
    /// [`PlacementError::MissingParent`] when the type requires a parent
    /// and none was given; [`PlacementError::IncompatibleContainer`] when
    /// the given parent may not hold the type.
    pub fn validate_placement(
        &self,
        candidate_type: &str,
        parent: Option<&Node>,
    ) -> Result<(), PlacementError> {
        match parent {
            None if self.requires_parent(candidate_type) => Err(PlacementError::MissingParent {
                resource_type: candidate_type.to_owned(),
                valid_parents: self.valid_parents_of(candidate_type),
            }),
            None => Ok(()),
            Some(parent) if self.can_contain(&parent.resource_type, candidate_type) => Ok(()),
            Some(parent) => Err(PlacementError::IncompatibleContainer {
                parent_type: parent.resource_type.clone(),
                child_type: candidate_type.to_owned(),
                valid_parents: self.valid_parents_of(candidate_type),
            }),
        }
    }
}

/// Whether making `node` a child of `candidate_parent` would create a
/// cycle: true when `candidate_parent` is `node` itself or sits anywhere
/// in `node`'s would-be descendant side of the move (i.e. `node` appears
/// in the ancestor chain starting at `candidate_parent`).
#[must_use]
pub fn detect_cycle(scene: &SceneModel, candidate_parent: NodeId, node: NodeId) -> bool {
    if candidate_parent == node {
        return true;
    }
    scene
        .ancestors_of(candidate_parent)
        .iter()
        .any(|ancestor| *ancestor == node)
}

/// Full transitive closure of a node's descendants, the node itself
/// excluded. Used to report cascading-delete impact before committing.
#[must_use]
pub fn collect_descendants(scene: &SceneModel, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = scene.children_of(id).to_vec();
    while let Some(current) = stack.pop() {
        out.push(current);
        stack.extend_from_slice(scene.children_of(current));
    }
    out
}

/// Validate moving an existing node under a new parent: the containment
/// table must allow it and the move must not create a cycle.
///
/// # Errors
///
/// [`PlacementError::CyclicParent`] when the new parent is the node or one
/// of its descendants, otherwise whatever
/// [`HierarchyRules::validate_placement`] reports.
pub fn validate_reparent(
    rules: &HierarchyRules,
    scene: &SceneModel,
    node_id: NodeId,
    new_parent: Option<NodeId>,
) -> Result<(), PlacementError> {
    let Some(node) = scene.find(node_id) else {
        return Ok(());
    };
    match new_parent {
        Some(pid) => {
            if detect_cycle(scene, pid, node_id) {
                return Err(PlacementError::CyclicParent);
            }
            rules.validate_placement(&node.resource_type, scene.find(pid))
        }
        None => rules.validate_placement(&node.resource_type, None),
    }
}
