//! Time-swept AABB candidate generation (§4.5): a conservative lower bound
//! on when two moving objects' bounding boxes could first overlap.

use std::cmp::Ordering;

use crate::geometry::Geometry;
use crate::handles::{ObjectHandle, RuleHandle};
use crate::trajectory::Trajectory;
use crate::vector::V2;

/// Componentwise min/max of world-space position and velocity over an
/// object's four AABB corners, at a given instant.
struct SweptBounds {
    x_min: f64,
    x_min_vel: f64,
    x_max: f64,
    x_max_vel: f64,
    y_min: f64,
    y_min_vel: f64,
    y_max: f64,
    y_max_vel: f64,
}

fn swept_bounds(geometry: &Geometry, trajectory: &Trajectory, now: f64) -> SweptBounds {
    let transform = trajectory.transform_at(now);
    let motion = trajectory.motion();
    let corners = geometry.bounds.corners();
    let positions: Vec<V2> = corners.iter().map(|&c| transform.apply_point(c)).collect();
    let velocities: Vec<V2> = corners.iter().map(|&c| motion.apply_point(c)).collect();

    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    let mut x_min_vel = f64::INFINITY;
    let mut x_max_vel = f64::NEG_INFINITY;
    let mut y_min_vel = f64::INFINITY;
    let mut y_max_vel = f64::NEG_INFINITY;

    for p in &positions {
        x_min = x_min.min(p.x());
        x_max = x_max.max(p.x());
        y_min = y_min.min(p.y());
        y_max = y_max.max(p.y());
    }
    for v in &velocities {
        x_min_vel = x_min_vel.min(v.x());
        x_max_vel = x_max_vel.max(v.x());
        y_min_vel = y_min_vel.min(v.y());
        y_max_vel = y_max_vel.max(v.y());
    }

    SweptBounds { x_min, x_min_vel, x_max, x_max_vel, y_min, y_min_vel, y_max, y_max_vel }
}

/// Intersects `lo + t*lo_vel <= hi + t*hi_vel` for `t >= 0` with the running
/// interval `[lo_t, hi_t]`. Returns `None` if the interval becomes empty.
fn constrain(lo: f64, lo_vel: f64, hi: f64, hi_vel: f64, lo_t: f64, hi_t: f64) -> Option<(f64, f64)> {
    let slack = hi - lo;
    let closing_rate = lo_vel - hi_vel;
    if closing_rate == 0.0 {
        return if slack >= 0.0 { Some((lo_t, hi_t)) } else { None };
    }
    let bound = slack / closing_rate;
    if closing_rate > 0.0 {
        // slack shrinks as t grows: t <= bound.
        let hi_t = hi_t.min(bound);
        if lo_t > hi_t { None } else { Some((lo_t, hi_t)) }
    } else {
        // slack grows as t grows: t >= bound (already satisfied for t >= 0 if bound <= 0).
        let lo_t = lo_t.max(bound);
        if lo_t > hi_t { None } else { Some((lo_t, hi_t)) }
    }
}

#[derive(Copy, Clone)]
pub struct CollisionCandidate {
    pub a: ObjectHandle,
    pub b: ObjectHandle,
    pub earliest_time: f64,
    pub rule: RuleHandle,
}

impl PartialEq for CollisionCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.earliest_time == other.earliest_time
    }
}
impl Eq for CollisionCandidate {}

impl Ord for CollisionCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so `BinaryHeap<CollisionCandidate>` is a min-heap on time.
        other.earliest_time.total_cmp(&self.earliest_time)
    }
}
impl PartialOrd for CollisionCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Produces the earliest instant `a`'s and `b`'s bounding boxes could first
/// overlap under their current linear motion, or `None` if they never would.
pub fn earliest_overlap(
    geom_a: &Geometry,
    traj_a: &Trajectory,
    geom_b: &Geometry,
    traj_b: &Trajectory,
    now: f64,
) -> Option<f64> {
    let a = swept_bounds(geom_a, traj_a, now);
    let b = swept_bounds(geom_b, traj_b, now);

    let (lo, hi) = (0.0, f64::INFINITY);
    let (lo, hi) = constrain(a.x_min, a.x_min_vel, b.x_max, b.x_max_vel, lo, hi)?;
    let (lo, hi) = constrain(b.x_min, b.x_min_vel, a.x_max, a.x_max_vel, lo, hi)?;
    let (lo, hi) = constrain(a.y_min, a.y_min_vel, b.y_max, b.y_max_vel, lo, hi)?;
    let (lo, _hi) = constrain(b.y_min, b.y_min_vel, a.y_max, a.y_max_vel, lo, hi)?;

    Some(now + lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::unit_square;
    use crate::transform::Transform;

    #[test]
    fn approaching_squares_overlap_at_expected_time() {
        let geom = unit_square(1.0);
        let traj_a = Trajectory::new(Transform::translate(V2::new(-3.0, 0.0)), Transform::translate(V2::new(1.0, 0.0)), 0.0);
        let traj_b = Trajectory::new(Transform::translate(V2::new(3.0, 0.0)), Transform::translate(V2::new(-1.0, 0.0)), 0.0);
        let t = earliest_overlap(&geom, &traj_a, &geom, &traj_b, 0.0).unwrap();
        assert!((t - 2.0).abs() < 1e-9);
    }

    #[test]
    fn diverging_squares_never_overlap() {
        let geom = unit_square(1.0);
        let traj_a = Trajectory::new(Transform::translate(V2::new(-3.0, 0.0)), Transform::translate(V2::new(-1.0, 0.0)), 0.0);
        let traj_b = Trajectory::new(Transform::translate(V2::new(3.0, 0.0)), Transform::translate(V2::new(1.0, 0.0)), 0.0);
        assert!(earliest_overlap(&geom, &traj_a, &geom, &traj_b, 0.0).is_none());
    }

    #[test]
    fn already_overlapping_returns_now() {
        let geom = unit_square(1.0);
        let traj = Trajectory::stationary(Transform::identity());
        let t = earliest_overlap(&geom, &traj, &geom, &traj, 5.0).unwrap();
        assert_eq!(t, 5.0);
    }
}
