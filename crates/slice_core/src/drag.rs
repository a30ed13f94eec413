//! Pointer-gesture state machine and hypercube-constrained movement.
//!
//! A gesture runs Idle -> Armed (pointer down on a point) -> Dragging
//! (travel past the click threshold) -> Idle (pointer up). A release
//! while still Armed is a plain click; the caller treats it as a
//! selection toggle instead of movement.

use nalgebra::DVector;

use crate::basis::PlanePoint;

/// Pointer travel (pixels) below which a press-release is a click.
pub const DRAG_THRESHOLD_PX: f64 = 3.0;

/// Direction components below this are ignored during ray clamping.
const DIRECTION_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
struct Gesture {
    index: usize,
    anchor_px: (f64, f64),
    anchor_plane: PlanePoint,
    anchor_unit: DVector<f64>,
}

#[derive(Debug, Clone, PartialEq)]
enum DragState {
    Idle,
    Armed(Gesture),
    Dragging(Gesture),
}

/// What a pointer-up resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    None,
    /// Press and release without crossing the threshold.
    Click { index: usize },
    /// A completed drag.
    Released { index: usize },
}

#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    threshold_px: f64,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(DRAG_THRESHOLD_PX)
    }
}

impl DragController {
    pub fn new(threshold_px: f64) -> Self {
        Self {
            state: DragState::Idle,
            threshold_px,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn dragged_index(&self) -> Option<usize> {
        match &self.state {
            DragState::Idle => None,
            DragState::Armed(g) | DragState::Dragging(g) => Some(g.index),
        }
    }

    /// Snapshot of the dragged point's unit vector at pointer-down.
    pub fn anchor_unit(&self) -> Option<&DVector<f64>> {
        match &self.state {
            DragState::Idle => None,
            DragState::Armed(g) | DragState::Dragging(g) => Some(&g.anchor_unit),
        }
    }

    pub fn anchor_plane(&self) -> Option<PlanePoint> {
        match &self.state {
            DragState::Idle => None,
            DragState::Armed(g) | DragState::Dragging(g) => Some(g.anchor_plane),
        }
    }

    /// Arms a gesture on the point under the pointer. The caller has
    /// already hit-tested and checked that no multi-select modifier is
    /// held.
    pub fn pointer_down(
        &mut self,
        index: usize,
        pointer_px: (f64, f64),
        anchor_plane: PlanePoint,
        anchor_unit: DVector<f64>,
    ) {
        self.state = DragState::Armed(Gesture {
            index,
            anchor_px: pointer_px,
            anchor_plane,
            anchor_unit,
        });
    }

    /// Feeds one pointer-move event. Once the gesture has crossed the
    /// click threshold this returns the cumulative plane-space delta
    /// since the anchor: screen delta divided by `pixels_per_unit`
    /// (pad inner size times zoom), with screen y inverted because
    /// plane v grows upward.
    pub fn pointer_move(
        &mut self,
        pointer_px: (f64, f64),
        pixels_per_unit: f64,
    ) -> Option<(f64, f64)> {
        if let DragState::Armed(gesture) = &self.state {
            let dx = pointer_px.0 - gesture.anchor_px.0;
            let dy = pointer_px.1 - gesture.anchor_px.1;
            if dx.hypot(dy) >= self.threshold_px {
                let gesture = gesture.clone();
                self.state = DragState::Dragging(gesture);
            }
        }
        let DragState::Dragging(gesture) = &self.state else {
            return None;
        };
        if pixels_per_unit.abs() < DIRECTION_EPSILON {
            return None;
        }
        Some((
            (pointer_px.0 - gesture.anchor_px.0) / pixels_per_unit,
            (gesture.anchor_px.1 - pointer_px.1) / pixels_per_unit,
        ))
    }

    pub fn pointer_up(&mut self) -> DragOutcome {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => DragOutcome::None,
            DragState::Armed(g) => DragOutcome::Click { index: g.index },
            DragState::Dragging(g) => DragOutcome::Released { index: g.index },
        }
    }
}

/// The point on the segment start -> target closest to target that
/// still lies within [0, 1]^D, assuming start itself is inside. For
/// each dimension whose direction component is non-negligible, the
/// parametric t at which that coordinate would cross its boundary caps
/// the movement; the smallest cap wins.
pub fn clamp_to_unit_cube(start: &DVector<f64>, target: &DVector<f64>) -> DVector<f64> {
    debug_assert_eq!(start.len(), target.len());
    let direction = target - start;
    let mut t_max = 1.0_f64;
    for i in 0..start.len() {
        let d = direction[i];
        if d.abs() < DIRECTION_EPSILON {
            continue;
        }
        let t = if d > 0.0 {
            (1.0 - start[i]) / d
        } else {
            -start[i] / d
        };
        if t >= 0.0 && t < t_max {
            t_max = t;
        }
    }
    let t_max = t_max.clamp(0.0, 1.0);
    if t_max == 1.0 {
        return target.clone();
    }
    start + direction * t_max
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(values: &[f64]) -> DVector<f64> {
        DVector::from_column_slice(values)
    }

    #[test]
    fn clamp_is_identity_for_inside_targets() {
        let start = unit(&[0.2, 0.5, 0.8]);
        let target = unit(&[0.9, 0.1, 0.3]);
        assert_eq!(clamp_to_unit_cube(&start, &target), target);
    }

    #[test]
    fn clamp_stops_exactly_on_the_violated_face() {
        let start = unit(&[0.2, 0.8]);
        let target = unit(&[1.1, 0.8]);
        let clamped = clamp_to_unit_cube(&start, &target);
        assert!((clamped[0] - 1.0).abs() < 1e-12);
        assert!((clamped[1] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn clamped_point_is_collinear_with_the_segment() {
        let start = unit(&[0.5, 0.5]);
        let target = unit(&[1.5, 1.0]);
        let clamped = clamp_to_unit_cube(&start, &target);
        // cross product of (clamped - start) and (target - start)
        let a = &clamped - &start;
        let b = &target - &start;
        assert!((a[0] * b[1] - a[1] * b[0]).abs() < 1e-12);
        assert!((clamped[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn clamp_caps_at_the_nearest_boundary_across_dimensions() {
        let start = unit(&[0.9, 0.5, 0.5]);
        let target = unit(&[1.3, 1.1, 0.5]);
        // dim 0 hits at t = 0.25, dim 1 at t ~ 0.833
        let clamped = clamp_to_unit_cube(&start, &target);
        assert!((clamped[0] - 1.0).abs() < 1e-12);
        assert!((clamped[1] - 0.65).abs() < 1e-12);
        assert!((clamped[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn clamp_handles_downward_overshoot() {
        let start = unit(&[0.1]);
        let target = unit(&[-0.4]);
        let clamped = clamp_to_unit_cube(&start, &target);
        assert!(clamped[0].abs() < 1e-12);
    }

    #[test]
    fn click_below_threshold_is_not_a_drag() {
        let mut drag = DragController::default();
        drag.pointer_down(2, (100.0, 100.0), PlanePoint::new(0.5, 0.5), unit(&[0.5]));
        assert_eq!(drag.pointer_move((101.0, 101.0), 400.0), None);
        assert!(!drag.is_dragging());
        assert_eq!(drag.pointer_up(), DragOutcome::Click { index: 2 });
        assert_eq!(drag.pointer_up(), DragOutcome::None);
    }

    #[test]
    fn crossing_threshold_starts_reporting_deltas() {
        let mut drag = DragController::default();
        drag.pointer_down(0, (100.0, 100.0), PlanePoint::new(0.2, 0.8), unit(&[0.2, 0.8]));
        let delta = drag.pointer_move((140.0, 80.0), 400.0).unwrap();
        assert!(drag.is_dragging());
        assert!((delta.0 - 0.1).abs() < 1e-12);
        assert!((delta.1 - 0.05).abs() < 1e-12);
        assert_eq!(drag.pointer_up(), DragOutcome::Released { index: 0 });
    }

    #[test]
    fn deltas_are_cumulative_from_the_anchor() {
        let mut drag = DragController::default();
        drag.pointer_down(1, (0.0, 0.0), PlanePoint::new(0.0, 0.0), unit(&[0.0]));
        drag.pointer_move((10.0, 0.0), 100.0);
        let delta = drag.pointer_move((20.0, 0.0), 100.0).unwrap();
        assert!((delta.0 - 0.2).abs() < 1e-12);
    }

    #[test]
    fn degenerate_scale_yields_no_delta() {
        let mut drag = DragController::default();
        drag.pointer_down(0, (0.0, 0.0), PlanePoint::new(0.0, 0.0), unit(&[0.0]));
        assert_eq!(drag.pointer_move((50.0, 0.0), 0.0), None);
    }
}
