//! The fit transform engine and its bounding-box cache.

use cylfit_enclose::enclosing_circle;
use cylfit_math::{Aabb3, Point2, Tolerance, Transform, Vec3};
use cylfit_mesh::make_unit_cube;
use cylfit_project::{
    filter_holes, outlines_from_triangles, project_to_xy, project_vertices, visual_center,
};
use cylfit_scene::{
    dispatch, Action, ChangeKind, ChangeNotice, FitItem, MeshInstance, MeshNode, NodeId,
};

use crate::error::{FitError, Result};
use crate::FitParams;

/// Memoized bounding-box query. Valid only while all three keys still
/// equal the corresponding live values.
#[derive(Debug, Clone)]
struct CacheEntry {
    query: Transform,
    local: Transform,
    target: Vec3,
    aabb: Aabb3,
}

/// Fits a wrapped item into a bounding cylinder.
///
/// The engine owns two synthetic children: a scale child (a matrix applied
/// around the wrapped item, receiving the computed fit transform) and a
/// bounds marker (a hidden unit cube scaled to the target cylinder's
/// bounding size, made visible only while the cache measures "what would
/// the bounds be at exactly target size").
///
/// Single-owner-thread contract: the engine mutates the item's transform
/// only inside [`rebuild`](Self::rebuild); concurrent mutation of the item
/// while a bounding-box query runs is a caller contract violation, not a
/// recoverable error.
pub struct FitToCylinder<I: FitItem> {
    id: NodeId,
    params: FitParams,
    /// This node's local transform in its parent's frame.
    matrix: Transform,
    /// The scale child's matrix, wrapping the item.
    child_matrix: Transform,
    item: I,
    bounds_marker: MeshNode,
    /// Target size last applied to the marker; zero until the first
    /// successful rebuild.
    bounds_size: Vec3,
    cache: Option<CacheEntry>,
    recompute_count: u64,
    rebuilding: bool,
    tol: Tolerance,
}

impl<I: FitItem> FitToCylinder<I> {
    /// Wrap `item` and fit it with explicit parameters.
    pub fn with_params(item: I, params: FitParams) -> Result<Self> {
        params.validate()?;
        let mut marker = MeshNode::with_mesh(make_unit_cube());
        marker.visible = false;
        let mut fit = Self {
            id: NodeId::next(),
            params,
            matrix: Transform::identity(),
            child_matrix: Transform::identity(),
            item,
            bounds_marker: marker,
            bounds_size: Vec3::zeros(),
            cache: None,
            recompute_count: 0,
            rebuilding: false,
            tol: Tolerance::DEFAULT,
        };
        fit.rebuild()?;
        Ok(fit)
    }

    /// Wrap `item` with parameters derived from its current bounds:
    /// diameter = XY diagonal of the item's AABB, height = its Z size.
    pub fn new(item: I) -> Result<Self> {
        let aabb = item
            .bounding_box(&Transform::identity())
            .ok_or_else(|| FitError::DegenerateGeometry("item has no mesh content".into()))?;
        let params = FitParams {
            diameter: (aabb.x_size() * aabb.x_size() + aabb.y_size() * aabb.y_size()).sqrt(),
            height: aabb.z_size(),
            stretch_z: true,
            alternate_centering: false,
        };
        Self::with_params(item, params)
    }

    /// Current fit parameters.
    pub fn params(&self) -> &FitParams {
        &self.params
    }

    /// This node's local transform in its parent's frame.
    pub fn matrix(&self) -> &Transform {
        &self.matrix
    }

    /// The computed fit transform applied around the wrapped item.
    pub fn child_matrix(&self) -> &Transform {
        &self.child_matrix
    }

    /// The wrapped item.
    pub fn item(&self) -> &I {
        &self.item
    }

    /// Mutable access to the wrapped item. After changing its mesh
    /// content, notify the engine via
    /// [`on_invalidate`](Self::on_invalidate) with a
    /// [`ChangeKind::Mesh`] notice.
    pub fn item_mut(&mut self) -> &mut I {
        &mut self.item
    }

    /// This node's identity, carried in outgoing notices.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// How many times the cache has recomputed the expensive
    /// marker-visible bounding box. Instrumentation for tests.
    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    // =========================================================================
    // Parameter setters, each triggering a rebuild
    // =========================================================================

    /// Set the target diameter and rebuild.
    pub fn set_diameter(&mut self, diameter: f64) -> Result<Option<ChangeNotice>> {
        if !(diameter > 0.0) || !diameter.is_finite() {
            return Err(FitError::InvalidParameters(
                "diameter must be positive".into(),
            ));
        }
        self.params.diameter = diameter;
        self.on_property_change()
    }

    /// Set the target height and rebuild.
    pub fn set_height(&mut self, height: f64) -> Result<Option<ChangeNotice>> {
        if !(height > 0.0) || !height.is_finite() {
            return Err(FitError::InvalidParameters("height must be positive".into()));
        }
        self.params.height = height;
        self.on_property_change()
    }

    /// Toggle Z stretching and rebuild.
    pub fn set_stretch_z(&mut self, stretch_z: bool) -> Result<Option<ChangeNotice>> {
        self.params.stretch_z = stretch_z;
        self.on_property_change()
    }

    /// Toggle visual-center mode and rebuild.
    pub fn set_alternate_centering(&mut self, alternate: bool) -> Result<Option<ChangeNotice>> {
        self.params.alternate_centering = alternate;
        self.on_property_change()
    }

    fn on_property_change(&mut self) -> Result<Option<ChangeNotice>> {
        self.on_invalidate(ChangeNotice {
            source: self.id,
            kind: ChangeKind::Properties,
        })
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    /// React to a change notice per the dispatch table. A notice whose
    /// source is this node's own id counts as self-originated.
    ///
    /// Propagated notices keep their original source, so a parent can
    /// still tell which node the change started at.
    ///
    /// While a rebuild is in progress, notices aimed at this node are
    /// coalesced into it (dropped), never queued for recursive execution.
    pub fn on_invalidate(&mut self, notice: ChangeNotice) -> Result<Option<ChangeNotice>> {
        if self.rebuilding {
            return Ok(None);
        }
        match dispatch(notice.kind, notice.source == self.id) {
            Action::Rebuild => self.rebuild(),
            Action::Propagate => {
                // Forgetting the cached triple forces the next query to
                // recompute.
                self.cache = None;
                Ok(Some(notice))
            }
            Action::Ignore => Ok(None),
        }
    }

    // =========================================================================
    // Rebuild
    // =========================================================================

    /// Recompute the fit transform. Idempotent: repeated calls with
    /// unchanged parameters and item produce the same transform.
    ///
    /// Returns the change notice the caller's parent graph should receive,
    /// or `None` when the call was coalesced into a rebuild already in
    /// progress.
    pub fn rebuild(&mut self) -> Result<Option<ChangeNotice>> {
        if self.rebuilding {
            return Ok(None);
        }
        self.rebuilding = true;
        let result = self.with_center_and_height_maintained(Self::rebuild_inner);
        self.rebuilding = false;
        result?;
        Ok(Some(ChangeNotice {
            source: self.id,
            kind: ChangeKind::Matrix,
        }))
    }

    fn rebuild_inner(&mut self) -> Result<()> {
        self.params.validate()?;

        // All measurement happens before any mutation, so a failed fit
        // leaves the previous transform fully in place. Measuring under an
        // identity scale child is equivalent to the reset-then-measure
        // order: the Z stretch scales about the box center with XY factors
        // of 1, which leaves every projected XY coordinate unchanged.
        let aabb = self
            .item
            .bounding_box(&Transform::identity())
            .ok_or_else(|| FitError::DegenerateGeometry("item has no mesh content".into()))?;

        let mut scale = Vec3::new(1.0, 1.0, 1.0);
        if self.params.stretch_z {
            if self.tol.is_zero(aabb.z_size()) {
                return Err(FitError::DegenerateGeometry(
                    "item has zero Z size".into(),
                ));
            }
            scale.z = self.params.height / aabb.z_size();
        }
        // The axis step never stretches XY: both factors start at 1, so
        // their min is 1. XY fitting comes entirely from the circle step.
        let min_xy = scale.x.min(scale.y);
        scale.x = min_xy;
        scale.y = min_xy;

        let (center, radius) = if self.params.alternate_centering {
            self.measure_visual_center()?
        } else {
            self.measure_enclosing_circle()?
        };
        let xy_scale = (self.params.diameter / 2.0) / radius;

        // Commit as one matrix: Z scale about the box center, then move
        // the circle center to the origin, then uniform XY scale.
        self.child_matrix = Transform::scale_about(&aabb.center(), scale.x, scale.y, scale.z)
            .then(&Transform::translation(-center.x, -center.y, 0.0))
            .then(&Transform::scale(xy_scale, xy_scale, 1.0));

        self.update_bounds_marker();

        // Next query must recompute.
        self.cache = None;
        Ok(())
    }

    /// Smallest enclosing circle over every projected vertex of the item's
    /// visible meshes.
    fn measure_enclosing_circle(&self) -> Result<(Point2, f64)> {
        let mut points = Vec::new();
        for inst in self.item.visible_meshes(&Transform::identity()) {
            points.extend(project_vertices(inst.mesh, &inst.world));
        }
        if points.is_empty() {
            return Err(FitError::DegenerateGeometry(
                "item has no visible mesh vertices".into(),
            ));
        }
        let circle = enclosing_circle(&points);
        if circle.radius < 1e-9 {
            return Err(FitError::DegenerateGeometry(
                "projected vertices have no radial extent".into(),
            ));
        }
        Ok((circle.center, circle.radius))
    }

    /// Visual center over the hole-filtered outer outlines of the item's
    /// projected silhouette.
    fn measure_visual_center(&self) -> Result<(Point2, f64)> {
        let mut triangles = Vec::new();
        for inst in self.item.visible_meshes(&Transform::identity()) {
            triangles.extend(project_to_xy(inst.mesh, &inst.world));
        }
        let outlines = filter_holes(outlines_from_triangles(&triangles));
        if outlines.is_empty() {
            return Err(FitError::DegenerateGeometry(
                "projection produced no outer outline".into(),
            ));
        }
        let vc = visual_center(&outlines)?;
        Ok((vc.center, vc.radius))
    }

    /// Rescale and re-center the bounds marker to the target cylinder's
    /// bounding size around the fitted item's center.
    fn update_bounds_marker(&mut self) {
        let Some(item_aabb) = self.item.bounding_box(&self.child_matrix) else {
            return;
        };
        let target_z = if self.params.stretch_z {
            self.params.height
        } else {
            item_aabb.z_size()
        };
        let target = Vec3::new(self.params.diameter, self.params.diameter, target_z);

        let Some(marker_aabb) = self.bounds_marker.bounding_box(&Transform::identity()) else {
            return;
        };
        let fit_size = marker_aabb.size();

        // Fast path: marker already at target size and sharing the item's
        // center.
        if self.bounds_size == target
            && (fit_size - target).norm() < self.tol.linear
            && self.tol.points_equal(&marker_aabb.center(), &item_aabb.center())
        {
            return;
        }
        if self.tol.is_zero(fit_size.x) || self.tol.is_zero(fit_size.y) || self.tol.is_zero(fit_size.z)
        {
            return;
        }

        self.bounds_marker.matrix = self.bounds_marker.matrix.then(&Transform::scale(
            target.x / fit_size.x,
            target.y / fit_size.y,
            target.z / fit_size.z,
        ));
        if let Some(rescaled) = self.bounds_marker.bounding_box(&Transform::identity()) {
            let delta = item_aabb.center() - rescaled.center();
            self.bounds_marker.matrix = self
                .bounds_marker
                .matrix
                .then(&Transform::translation_vec(&delta));
        }
        self.bounds_size = target;
    }

    /// Run `f`, then restore the item's world XY center and bottom Z so
    /// internal recomputation never drifts the object in its parent's
    /// frame. Only explicit parameter changes may move it; those act
    /// through the fitted size, not the resting position. The restore runs
    /// on the error path too (a failed fit has made no mutations, so the
    /// correction is the identity).
    fn with_center_and_height_maintained<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let before = self.item_world_box();
        let result = f(self);
        let after = self.item_world_box();
        if let (Some(before), Some(after)) = (before, after) {
            let delta = before.center() - after.center();
            let correction = Vec3::new(delta.x, delta.y, before.min.z - after.min.z);
            if correction.norm() > self.tol.linear {
                self.matrix = self.matrix.then(&Transform::translation_vec(&correction));
            }
        }
        result
    }

    /// The item's bounds in the parent's frame (marker excluded).
    fn item_world_box(&self) -> Option<Aabb3> {
        self.item
            .bounding_box(&self.child_matrix.then(&self.matrix))
    }

    // =========================================================================
    // Bounding-box cache
    // =========================================================================

    /// Bounds of this node's children under `matrix`, marker included only
    /// while it is visible.
    fn children_box(&self, matrix: &Transform) -> Option<Aabb3> {
        let combined = self.matrix.then(matrix);
        let mut aabb = Aabb3::empty();
        if let Some(item_box) = self.item.bounding_box(&self.child_matrix.then(&combined)) {
            aabb.union(&item_box);
        }
        if self.bounds_marker.visible {
            if let Some(marker_box) = self.bounds_marker.bounding_box(&combined) {
                aabb.union(&marker_box);
            }
        }
        if aabb.is_empty() {
            None
        } else {
            Some(aabb)
        }
    }

    /// Bounding box under `matrix`, including the target-size bounds
    /// marker, memoized on the `(query, local matrix, target size)` triple.
    ///
    /// Not thread-safe: single writer, single reader. A query racing an
    /// item mutation violates the caller contract (see crate docs); it is
    /// not a recoverable condition the cache detects.
    pub fn get_bounding_box(&mut self, matrix: &Transform) -> Option<Aabb3> {
        // Until the first successful rebuild has configured the marker,
        // fall back to a plain uncached computation.
        if self.bounds_size == Vec3::zeros() {
            return self.children_box(matrix);
        }

        if let Some(entry) = &self.cache {
            if entry.query == *matrix && entry.local == self.matrix && entry.target == self.bounds_size
            {
                return Some(entry.aabb);
            }
        }

        // The marker must end up hidden again no matter how the
        // computation exits.
        self.bounds_marker.visible = true;
        let computed = self.children_box(matrix);
        self.bounds_marker.visible = false;
        self.recompute_count += 1;

        match computed {
            Some(aabb) => {
                self.cache = Some(CacheEntry {
                    query: matrix.clone(),
                    local: self.matrix.clone(),
                    target: self.bounds_size,
                    aabb,
                });
                Some(aabb)
            }
            None => {
                self.cache = None;
                None
            }
        }
    }
}

/// A fit node is itself fittable, so engines nest and sit inside larger
/// node trees.
impl<I: FitItem> FitItem for FitToCylinder<I> {
    /// Uncached bounds including the target-size marker (queried directly,
    /// so the marker's hidden state does not exclude it). Matches what
    /// [`get_bounding_box`](Self::get_bounding_box) returns, without the
    /// memoization that needs `&mut self`.
    fn bounding_box(&self, transform: &Transform) -> Option<Aabb3> {
        let combined = self.matrix.then(transform);
        let mut aabb = Aabb3::empty();
        if let Some(item_box) = self.item.bounding_box(&self.child_matrix.then(&combined)) {
            aabb.union(&item_box);
        }
        if self.bounds_size != Vec3::zeros() {
            if let Some(marker_box) = self.bounds_marker.bounding_box(&combined) {
                aabb.union(&marker_box);
            }
        }
        if aabb.is_empty() {
            None
        } else {
            Some(aabb)
        }
    }

    fn visible_meshes(&self, to_ancestor: &Transform) -> Vec<MeshInstance<'_>> {
        let world = self.matrix.then(to_ancestor);
        let mut out = self.item.visible_meshes(&self.child_matrix.then(&world));
        if self.bounds_marker.visible {
            out.extend(self.bounds_marker.visible_meshes(&world));
        }
        out
    }

    fn matrix(&self) -> &Transform {
        &self.matrix
    }

    fn set_matrix(&mut self, matrix: Transform) {
        self.matrix = matrix;
        self.cache = None;
    }
}
