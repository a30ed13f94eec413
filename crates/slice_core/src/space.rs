//! The explicitly-owned aggregate tying bounds, basis, presets and
//! drag state together. All mutation goes through these methods; a
//! `SliceSpace` can never hold a basis or preset whose length differs
//! from its dimension count.

use nalgebra::DVector;
use serde::Serialize;

use crate::basis::{PlaneBasis, PlanePoint};
use crate::bounds::Bounds;
use crate::drag::{clamp_to_unit_cube, DragController, DragOutcome};
use crate::error::{Result, SliceError};
use crate::geometry;
use crate::store::{Focus, PresetStore, Rgb, Seed};

/// One preset as it appears on the current slice.
#[derive(Debug, Clone, Serialize)]
pub struct MarkerView {
    pub index: usize,
    pub name: String,
    pub color: Rgb,
    pub u: f64,
    pub v: f64,
    pub distance: f64,
    pub on_plane: bool,
    pub selected: bool,
}

/// The unsaved exploration point, when one is active.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ActiveMarker {
    pub u: f64,
    pub v: f64,
    pub distance: f64,
    pub on_plane: bool,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameView {
    pub polygon: Vec<PlanePoint>,
    pub markers: Vec<MarkerView>,
    pub unsaved: Option<ActiveMarker>,
}

#[derive(Debug, Clone)]
pub struct SliceSpace {
    bounds: Bounds,
    basis: PlaneBasis,
    store: PresetStore,
    drag: DragController,
}

impl SliceSpace {
    /// Default slice: the first two dimensions, when they exist.
    pub fn new(bounds: Bounds) -> Self {
        let basis = match bounds.len() {
            0 | 1 => PlaneBasis::zeroed(bounds.len()),
            dim => PlaneBasis::axis_aligned(dim, 0, 1)
                .unwrap_or_else(|_| PlaneBasis::zeroed(dim)),
        };
        Self {
            bounds,
            basis,
            store: PresetStore::new(),
            drag: DragController::default(),
        }
    }

    pub fn dim(&self) -> usize {
        self.bounds.len()
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn basis(&self) -> &PlaneBasis {
        &self.basis
    }

    pub fn store(&self) -> &PresetStore {
        &self.store
    }

    /// Appends a dimension in one atomic step: bounds grow, every
    /// preset (and any unsaved point) gains the midpoint value, the
    /// basis gains a zero column.
    pub fn add_dimension(&mut self, name: &str, min: f64, max: f64) -> Result<usize> {
        let index = self.bounds.add_dimension(name, min, max)?;
        self.store.extend_dimension((min + max) / 2.0);
        self.basis.grow();
        Ok(index)
    }

    pub fn add_preset(&mut self, name: &str, color: Option<Rgb>, seed: Seed) -> Result<usize> {
        self.store.add(&self.bounds, name, color, seed)
    }

    pub fn delete_presets(&mut self, names: &[&str]) {
        self.store.delete(names);
    }

    pub fn duplicate_preset(&mut self, name: &str) -> Result<usize> {
        self.store.duplicate(name)
    }

    pub fn rename_preset(&mut self, old: &str, new: &str) -> Result<()> {
        self.store.rename(old, new)
    }

    pub fn select(&mut self, index: usize, additive: bool) {
        self.store.select(index, additive);
    }

    pub fn clear_focus(&mut self) {
        self.store.clear_focus();
    }

    /// Focuses an unsaved point at (u, v) on the current plane, in raw
    /// parameter values.
    pub fn explore_at(&mut self, u: f64, v: f64) {
        let raw = self.bounds.from_unit(&self.basis.lift(u, v));
        self.store.set_unsaved(raw);
    }

    /// The vector a synth consumer would send right now: the unsaved
    /// exploration point, or the first selected preset's values.
    pub fn active_vector(&self) -> Option<&DVector<f64>> {
        match self.store.focus() {
            Focus::Unsaved(values) => Some(values),
            Focus::Selected(selected) => selected
                .iter()
                .next()
                .and_then(|&index| self.store.get(index))
                .map(|preset| &preset.values),
            Focus::None => None,
        }
    }

    /// Re-slices along two raw dimensions. On failure the previous
    /// basis stays in effect.
    pub fn assign_axis_basis(&mut self, x_axis: usize, y_axis: usize) -> Result<()> {
        self.basis = PlaneBasis::axis_aligned(self.bounds.len(), x_axis, y_axis)?;
        tracing::debug!(x_axis, y_axis, "assigned axis-aligned basis");
        Ok(())
    }

    /// Builds the plane through the three currently selected presets
    /// (in unit space). On failure the previous basis stays in effect.
    pub fn assign_basis_from_selection(&mut self) -> Result<()> {
        let triple = self.store.selected_triple().ok_or_else(|| {
            SliceError::SelectionArity(self.store.selected().map_or(0, |s| s.len()))
        })?;
        let unit = |index: usize| self.bounds.to_unit(&self.store.presets()[index].values);
        self.basis =
            PlaneBasis::from_three_points(&unit(triple[0]), &unit(triple[1]), &unit(triple[2]))?;
        tracing::debug!(?triple, "assigned three-point basis");
        Ok(())
    }

    pub fn slice_polygon(&self) -> Vec<PlanePoint> {
        geometry::slice_polygon(&self.basis)
    }

    pub fn is_point_valid(&self, u: f64, v: f64) -> bool {
        geometry::is_point_valid(&self.basis, u, v)
    }

    pub fn project_preset(&self, index: usize) -> Option<PlanePoint> {
        let preset = self.store.get(index)?;
        Some(self.basis.project(&self.bounds.to_unit(&preset.values)))
    }

    /// Arms a drag on a hit-tested preset, snapshotting its unit
    /// vector and plane coordinates.
    pub fn begin_drag(&mut self, index: usize, pointer_px: (f64, f64)) -> Result<()> {
        let preset = self
            .store
            .get(index)
            .ok_or(SliceError::PresetIndex(index))?;
        let unit = self.bounds.to_unit(&preset.values);
        let anchor = self.basis.project(&unit);
        self.drag.pointer_down(index, pointer_px, anchor, unit);
        Ok(())
    }

    /// Applies one pointer-move event. The plane delta becomes a full
    /// N-D unit-space movement from the anchor snapshot, ray-clamped
    /// to the hypercube, then written back as raw values. Returns true
    /// when the dragged preset was mutated.
    pub fn update_drag(&mut self, pointer_px: (f64, f64), pixels_per_unit: f64) -> bool {
        let Some((du, dv)) = self.drag.pointer_move(pointer_px, pixels_per_unit) else {
            return false;
        };
        let (Some(index), Some(anchor_unit)) = (self.drag.dragged_index(), self.drag.anchor_unit())
        else {
            return false;
        };
        let movement = self.basis.row_u() * du + self.basis.row_v() * dv;
        let target = anchor_unit + movement;
        let clamped = clamp_to_unit_cube(anchor_unit, &target);
        let raw = self.bounds.from_unit(&clamped);
        self.store.set_values(index, raw);
        true
    }

    /// Resolves the gesture. A plain click collapses to a selection
    /// replace; a finished drag retains no state.
    pub fn end_drag(&mut self) -> DragOutcome {
        let outcome = self.drag.pointer_up();
        if let DragOutcome::Click { index } = outcome {
            self.store.select(index, false);
        }
        outcome
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// The per-frame outbound contract: polygon vertices, per-preset
    /// plane coordinates with distance/on-plane classification, and
    /// the unsaved marker if one is focused. Computed after all of the
    /// frame's mutations so drawn positions reflect them.
    pub fn frame_view(&self) -> FrameView {
        let selected = self.store.selected();
        let markers = self
            .store
            .presets()
            .iter()
            .enumerate()
            .map(|(index, preset)| {
                let unit = self.bounds.to_unit(&preset.values);
                let point = self.basis.project(&unit);
                MarkerView {
                    index,
                    name: preset.name.clone(),
                    color: preset.color,
                    u: point.u,
                    v: point.v,
                    distance: geometry::distance_from_plane(&self.basis, &unit),
                    on_plane: geometry::on_plane(&self.basis, &unit),
                    selected: selected.is_some_and(|s| s.contains(&index)),
                }
            })
            .collect();

        let unsaved = match self.store.focus() {
            Focus::Unsaved(values) => {
                let unit = self.bounds.to_unit(values);
                let point = self.basis.project(&unit);
                Some(ActiveMarker {
                    u: point.u,
                    v: point.v,
                    distance: geometry::distance_from_plane(&self.basis, &unit),
                    on_plane: geometry::on_plane(&self.basis, &unit),
                })
            }
            _ => None,
        };

        FrameView {
            polygon: geometry::slice_polygon(&self.basis),
            markers,
            unsaved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube_space(dim: usize) -> SliceSpace {
        let mut bounds = Bounds::new();
        for i in 0..dim {
            bounds.add_dimension(&format!("freq{}", i + 1), 0.0, 1.0).unwrap();
        }
        SliceSpace::new(bounds)
    }

    #[test]
    fn drag_clamps_to_the_cube_end_to_end() {
        // Spec scenario: preset [0.2, 0.8, 0.5], axis basis on dims
        // 0/1, drag delta (0.9, 0) -> clamped to [1.0, 0.8, 0.5].
        let mut space = unit_cube_space(3);
        let index = space
            .add_preset(
                "probe",
                None,
                Seed::Values(DVector::from_vec(vec![0.2, 0.8, 0.5])),
            )
            .unwrap();

        let anchor = space.project_preset(index).unwrap();
        assert!((anchor.u - 0.2).abs() < 1e-12);
        assert!((anchor.v - 0.8).abs() < 1e-12);

        space.begin_drag(index, (0.0, 0.0)).unwrap();
        // 900 px right at 1000 px per plane unit = delta (0.9, 0).
        assert!(space.update_drag((900.0, 0.0), 1000.0));
        let values = &space.store().get(index).unwrap().values;
        assert!((values[0] - 1.0).abs() < 1e-12);
        assert!((values[1] - 0.8).abs() < 1e-12);
        assert!((values[2] - 0.5).abs() < 1e-12);
        assert_eq!(space.end_drag(), DragOutcome::Released { index });
    }

    #[test]
    fn drag_moves_through_unit_space_not_raw_space() {
        let mut bounds = Bounds::new();
        bounds.add_dimension("coarse", 0.0, 100.0).unwrap();
        bounds.add_dimension("fine", 0.0, 1.0).unwrap();
        let mut space = SliceSpace::new(bounds);
        let index = space
            .add_preset(
                "p",
                None,
                Seed::Values(DVector::from_vec(vec![50.0, 0.5])),
            )
            .unwrap();
        space.begin_drag(index, (0.0, 0.0)).unwrap();
        // 0.2 plane units along u move the raw value by 0.2 of its span.
        space.update_drag((20.0, 0.0), 100.0);
        let values = &space.store().get(index).unwrap().values;
        assert!((values[0] - 70.0).abs() < 1e-9);
        assert!((values[1] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn click_resolves_to_selection_replace() {
        let mut space = unit_cube_space(2);
        space.add_preset("a", None, Seed::Midpoint).unwrap();
        let b = space.add_preset("b", None, Seed::Midpoint).unwrap();
        space.select(0, false);
        space.begin_drag(b, (10.0, 10.0)).unwrap();
        space.update_drag((11.0, 10.0), 400.0); // below threshold
        assert_eq!(space.end_drag(), DragOutcome::Click { index: b });
        let selected: Vec<usize> = space.store().selected().unwrap().iter().copied().collect();
        assert_eq!(selected, vec![b]);
    }

    #[test]
    fn add_dimension_grows_everything_in_lockstep() {
        let mut space = unit_cube_space(2);
        space.add_preset("p", None, Seed::Midpoint).unwrap();
        space.explore_at(0.25, 0.75);
        let index = space.add_dimension("cutoff", 200.0, 2000.0).unwrap();
        assert_eq!(index, 2);
        assert_eq!(space.dim(), 3);
        assert_eq!(space.basis().dim(), 3);
        assert_eq!(space.basis().slope_of_dimension(2), (0.0, 0.0));
        assert_eq!(space.store().get(0).unwrap().values[2], 1100.0);
    }

    #[test]
    fn duplicate_dimension_leaves_space_untouched() {
        let mut space = unit_cube_space(2);
        space.add_preset("p", None, Seed::Midpoint).unwrap();
        assert!(space.add_dimension("freq1", 0.0, 1.0).is_err());
        assert_eq!(space.dim(), 2);
        assert_eq!(space.store().get(0).unwrap().values.len(), 2);
        assert_eq!(space.basis().dim(), 2);
    }

    #[test]
    fn basis_from_selection_requires_three_presets() {
        let mut space = unit_cube_space(3);
        space
            .add_preset("a", None, Seed::Values(DVector::from_vec(vec![0.1, 0.1, 0.1])))
            .unwrap();
        space
            .add_preset("b", None, Seed::Values(DVector::from_vec(vec![0.9, 0.2, 0.1])))
            .unwrap();
        space
            .add_preset("c", None, Seed::Values(DVector::from_vec(vec![0.2, 0.8, 0.4])))
            .unwrap();

        space.select(0, false);
        space.select(1, true);
        assert_eq!(
            space.assign_basis_from_selection().unwrap_err(),
            SliceError::SelectionArity(2)
        );

        space.select(2, true);
        space.assign_basis_from_selection().unwrap();
        let basis = space.basis();
        assert!((basis.row_u().norm() - 1.0).abs() < 1e-9);
        assert!((basis.row_v().norm() - 1.0).abs() < 1e-9);
        assert!(basis.row_u().dot(basis.row_v()).abs() < 1e-9);
    }

    #[test]
    fn failed_basis_assignment_keeps_previous_basis() {
        let mut space = unit_cube_space(3);
        // three collinear presets
        for (name, x) in [("a", 0.1), ("b", 0.5), ("c", 0.9)] {
            space
                .add_preset(name, None, Seed::Values(DVector::from_vec(vec![x, x, x])))
                .unwrap();
        }
        space.select(0, false);
        space.select(1, true);
        space.select(2, true);
        let before = space.basis().clone();
        assert_eq!(
            space.assign_basis_from_selection().unwrap_err(),
            SliceError::CollinearPoints
        );
        assert_eq!(*space.basis(), before);

        assert!(space.assign_axis_basis(1, 1).is_err());
        assert_eq!(*space.basis(), before);
    }

    #[test]
    fn explore_at_sets_unsaved_focus_and_active_vector() {
        let mut space = unit_cube_space(3);
        space.explore_at(0.3, 0.6);
        let active = space.active_vector().unwrap().clone();
        assert!((active[0] - 0.3).abs() < 1e-12);
        assert!((active[1] - 0.6).abs() < 1e-12);
        assert!((active[2]).abs() < 1e-12); // origin plane sits at 0 on dim 2
        let view = space.frame_view();
        let marker = view.unsaved.unwrap();
        assert!((marker.u - 0.3).abs() < 1e-12);
        assert!(marker.on_plane);
    }

    #[test]
    fn active_vector_follows_first_selected_preset() {
        let mut space = unit_cube_space(2);
        space
            .add_preset("a", None, Seed::Values(DVector::from_vec(vec![0.1, 0.9])))
            .unwrap();
        space
            .add_preset("b", None, Seed::Values(DVector::from_vec(vec![0.7, 0.3])))
            .unwrap();
        space.select(1, false);
        assert_eq!(space.active_vector().unwrap().as_slice(), &[0.7, 0.3]);
        space.clear_focus();
        assert!(space.active_vector().is_none());
    }

    #[test]
    fn frame_view_reports_the_outbound_contract() {
        let mut space = unit_cube_space(3);
        space
            .add_preset("near", None, Seed::Values(DVector::from_vec(vec![0.2, 0.8, 0.0])))
            .unwrap();
        space
            .add_preset("far", None, Seed::Values(DVector::from_vec(vec![0.2, 0.8, 0.9])))
            .unwrap();
        space.select(0, false);

        let view = space.frame_view();
        assert_eq!(view.polygon.len(), 4);
        assert_eq!(view.markers.len(), 2);

        let near = &view.markers[0];
        assert!(near.on_plane);
        assert!(near.distance < 1e-9);
        assert!(near.selected);
        assert!((near.u - 0.2).abs() < 1e-12);

        let far = &view.markers[1];
        assert!(!far.on_plane);
        assert!((far.distance - 0.9 / 3.0_f64.sqrt()).abs() < 1e-12);
        assert!(!far.selected);
    }
}
