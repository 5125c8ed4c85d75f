#![warn(missing_docs)]

//! Scene-node capabilities consumed by the cylfit engine.
//!
//! The engine never owns a scene graph; it consumes the small capability
//! set defined here: query a bounding box under a transform, enumerate
//! visible meshes with resolved world transforms, and read/write a local
//! matrix. [`MeshNode`] is the concrete implementation used by callers
//! and tests.
//!
//! Change notifications are a tagged [`ChangeKind`] plus an explicit
//! decision table mapping (kind, self-originated) to an [`Action`], kept
//! as data so each row is independently testable.

use std::sync::atomic::{AtomicU64, Ordering};

use cylfit_math::{Aabb3, Transform};
use cylfit_mesh::TriangleMesh;

// =============================================================================
// Capability traits
// =============================================================================

/// A mesh with its world transform resolved relative to a query ancestor.
#[derive(Debug)]
pub struct MeshInstance<'a> {
    /// The mesh geometry.
    pub mesh: &'a TriangleMesh,
    /// Transform from mesh-local space to the query ancestor's space.
    pub world: Transform,
}

/// The capability set the fit engine requires from an item it fits.
pub trait FitItem {
    /// Axis-aligned bounding box of the visible content under `transform`.
    ///
    /// Returns `None` when there is no visible mesh content.
    fn bounding_box(&self, transform: &Transform) -> Option<Aabb3>;

    /// Enumerate visible meshes with world transforms resolved through
    /// `to_ancestor` (the transform from this item's parent to the
    /// querying ancestor).
    fn visible_meshes(&self, to_ancestor: &Transform) -> Vec<MeshInstance<'_>>;

    /// The item's local transform matrix.
    fn matrix(&self) -> &Transform;

    /// Replace the item's local transform matrix.
    fn set_matrix(&mut self, matrix: Transform);
}

/// A concrete scene node: optional mesh, local matrix, visibility flag,
/// and child nodes.
#[derive(Debug, Clone)]
pub struct MeshNode {
    /// Mesh content, if any.
    pub mesh: Option<TriangleMesh>,
    /// Local transform relative to the parent.
    pub matrix: Transform,
    /// Invisible nodes are excluded from bounds and mesh enumeration.
    pub visible: bool,
    /// Child nodes.
    pub children: Vec<MeshNode>,
}

impl MeshNode {
    /// Create an empty, visible node with an identity matrix.
    pub fn new() -> Self {
        Self {
            mesh: None,
            matrix: Transform::identity(),
            visible: true,
            children: Vec::new(),
        }
    }

    /// Create a visible node holding `mesh`.
    pub fn with_mesh(mesh: TriangleMesh) -> Self {
        Self {
            mesh: Some(mesh),
            ..Self::new()
        }
    }
}

impl Default for MeshNode {
    fn default() -> Self {
        Self::new()
    }
}

impl FitItem for MeshNode {
    /// Direct queries answer even on an invisible node; visibility only
    /// filters children out of their parent's bounds.
    fn bounding_box(&self, transform: &Transform) -> Option<Aabb3> {
        let world = self.matrix.then(transform);
        let mut aabb = Aabb3::empty();
        if let Some(mesh) = &self.mesh {
            if let Some(own) = mesh.bounding_box(&world) {
                aabb.union(&own);
            }
        }
        for child in &self.children {
            if !child.visible {
                continue;
            }
            if let Some(child_box) = child.bounding_box(&world) {
                aabb.union(&child_box);
            }
        }
        if aabb.is_empty() {
            None
        } else {
            Some(aabb)
        }
    }

    fn visible_meshes(&self, to_ancestor: &Transform) -> Vec<MeshInstance<'_>> {
        let mut out = Vec::new();
        if !self.visible {
            return out;
        }
        let world = self.matrix.then(to_ancestor);
        if let Some(mesh) = &self.mesh {
            out.push(MeshInstance {
                mesh,
                world: world.clone(),
            });
        }
        for child in &self.children {
            out.extend(child.visible_meshes(&world));
        }
        out
    }

    fn matrix(&self) -> &Transform {
        &self.matrix
    }

    fn set_matrix(&mut self, matrix: Transform) {
        self.matrix = matrix;
    }
}

// =============================================================================
// Change notification
// =============================================================================

/// What changed on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The child set changed.
    Children,
    /// The local transform matrix changed.
    Matrix,
    /// Mesh content changed.
    Mesh,
    /// A fit parameter or other property changed.
    Properties,
}

/// How a node reacts to an incoming change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Recompute the fit transform.
    Rebuild,
    /// Reset cached state and forward the notification to the parent.
    Propagate,
    /// Drop the notification.
    Ignore,
}

/// Identity of a node, carried in outgoing notifications so the parent can
/// skip redundant recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Allocate a fresh process-unique id.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Outgoing notification: which node changed and what kind of change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeNotice {
    /// The node the change originated from.
    pub source: NodeId,
    /// What changed.
    pub kind: ChangeKind,
}

/// One row of the invalidation decision table.
#[derive(Debug, Clone, Copy)]
pub struct DispatchRule {
    /// Incoming change kind.
    pub kind: ChangeKind,
    /// Whether the change originated from the node itself.
    pub self_originated: bool,
    /// Reaction.
    pub action: Action,
}

/// Invalidation decision table.
///
/// External structural changes rebuild; a node's own property edits rebuild
/// (the setters are the rebuild trigger); everything else resets cached
/// state and propagates upward. Re-entrancy while a rebuild is in progress
/// is handled by the engine's guard, not here.
pub const DISPATCH_TABLE: [DispatchRule; 8] = [
    DispatchRule {
        kind: ChangeKind::Children,
        self_originated: false,
        action: Action::Rebuild,
    },
    DispatchRule {
        kind: ChangeKind::Matrix,
        self_originated: false,
        action: Action::Rebuild,
    },
    DispatchRule {
        kind: ChangeKind::Mesh,
        self_originated: false,
        action: Action::Rebuild,
    },
    DispatchRule {
        kind: ChangeKind::Properties,
        self_originated: false,
        action: Action::Propagate,
    },
    DispatchRule {
        kind: ChangeKind::Children,
        self_originated: true,
        action: Action::Propagate,
    },
    DispatchRule {
        kind: ChangeKind::Matrix,
        self_originated: true,
        action: Action::Propagate,
    },
    DispatchRule {
        kind: ChangeKind::Mesh,
        self_originated: true,
        action: Action::Propagate,
    },
    DispatchRule {
        kind: ChangeKind::Properties,
        self_originated: true,
        action: Action::Rebuild,
    },
];

/// Look up the reaction for `(kind, self_originated)`.
pub fn dispatch(kind: ChangeKind, self_originated: bool) -> Action {
    DISPATCH_TABLE
        .iter()
        .find(|rule| rule.kind == kind && rule.self_originated == self_originated)
        .map(|rule| rule.action)
        .unwrap_or(Action::Ignore)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cylfit_mesh::make_unit_cube;

    #[test]
    fn test_node_bounding_box_includes_children() {
        let mut root = MeshNode::new();
        let mut child = MeshNode::with_mesh(make_unit_cube());
        child.matrix = Transform::translation(10.0, 0.0, 0.0);
        root.children.push(child);
        root.children.push(MeshNode::with_mesh(make_unit_cube()));

        let aabb = root.bounding_box(&Transform::identity()).unwrap();
        assert!((aabb.min.x - (-0.5)).abs() < 1e-6);
        assert!((aabb.max.x - 10.5).abs() < 1e-6);
    }

    #[test]
    fn test_invisible_node_excluded() {
        let mut root = MeshNode::new();
        let mut hidden = MeshNode::with_mesh(make_unit_cube());
        hidden.visible = false;
        hidden.matrix = Transform::translation(100.0, 0.0, 0.0);
        root.children.push(hidden);
        root.children.push(MeshNode::with_mesh(make_unit_cube()));

        let aabb = root.bounding_box(&Transform::identity()).unwrap();
        assert!(aabb.max.x < 1.0);
        assert_eq!(root.visible_meshes(&Transform::identity()).len(), 1);
    }

    #[test]
    fn test_empty_node_has_no_bounds() {
        let root = MeshNode::new();
        assert!(root.bounding_box(&Transform::identity()).is_none());
    }

    #[test]
    fn test_visible_meshes_resolve_world_transform() {
        let mut root = MeshNode::new();
        root.matrix = Transform::translation(1.0, 0.0, 0.0);
        let mut child = MeshNode::with_mesh(make_unit_cube());
        child.matrix = Transform::translation(0.0, 2.0, 0.0);
        root.children.push(child);

        let meshes = root.visible_meshes(&Transform::identity());
        assert_eq!(meshes.len(), 1);
        let origin = meshes[0].world.apply_point(&cylfit_math::Point3::origin());
        assert!((origin.x - 1.0).abs() < 1e-12);
        assert!((origin.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_matrix_access_through_trait() {
        fn move_item<I: FitItem>(item: &mut I, dx: f64) {
            let moved = item.matrix().then(&Transform::translation(dx, 0.0, 0.0));
            item.set_matrix(moved);
        }

        let mut node = MeshNode::with_mesh(make_unit_cube());
        move_item(&mut node, 2.0);
        assert!((node.matrix().matrix[(0, 3)] - 2.0).abs() < 1e-12);
        let aabb = node.bounding_box(&Transform::identity()).unwrap();
        assert!((aabb.center().x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_dispatch_external_structural_changes_rebuild() {
        for kind in [ChangeKind::Children, ChangeKind::Matrix, ChangeKind::Mesh] {
            assert_eq!(dispatch(kind, false), Action::Rebuild);
        }
    }

    #[test]
    fn test_dispatch_own_property_change_rebuilds() {
        assert_eq!(dispatch(ChangeKind::Properties, true), Action::Rebuild);
    }

    #[test]
    fn test_dispatch_propagate_rows() {
        assert_eq!(dispatch(ChangeKind::Properties, false), Action::Propagate);
        for kind in [ChangeKind::Children, ChangeKind::Matrix, ChangeKind::Mesh] {
            assert_eq!(dispatch(kind, true), Action::Propagate);
        }
    }

    #[test]
    fn test_dispatch_table_is_total() {
        for kind in [
            ChangeKind::Children,
            ChangeKind::Matrix,
            ChangeKind::Mesh,
            ChangeKind::Properties,
        ] {
            for origin in [false, true] {
                assert_ne!(dispatch(kind, origin), Action::Ignore);
            }
        }
    }

    #[test]
    fn test_node_ids_are_unique() {
        let a = NodeId::next();
        let b = NodeId::next();
        assert_ne!(a, b);
    }
}
