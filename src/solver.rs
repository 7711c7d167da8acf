//! Exact vertex-edge root finding (§4.6): the numerical heart of the engine.
//!
//! Given a moving vertex and a moving edge, both affine in time, find the
//! earliest `t >= now` at which the vertex crosses the edge's line from its
//! solid side to its free side, subject to five acceptance tests.

use crate::geometry::{Edge, Vertex};
use crate::group::ToleranceProfile;
use crate::trajectory::Trajectory;
use crate::vector::V2;

pub struct VertexEdgeContact {
    pub time: f64,
    pub pos: V2,
    pub tangent: V2,
    /// World velocity of the colliding vertex at contact.
    pub vel: V2,
    pub rel_vel: V2,
}

/// Solves for the contact between `vertex` (on `vertex_traj`) and `edge` (on
/// `edge_traj`), or `None` if no admissible root exists at or after `now`.
pub fn solve(
    vertex: Vertex,
    vertex_traj: &Trajectory,
    edge: Edge,
    edge_traj: &Trajectory,
    now: f64,
    tolerance: ToleranceProfile,
) -> Option<VertexEdgeContact> {
    let vertex_transform = vertex_traj.transform_at(now);
    let edge_transform = edge_traj.transform_at(now);
    let vertex_motion = vertex_traj.motion();
    let edge_motion = edge_traj.motion();

    let e0 = edge_transform.apply_point(edge.p0);
    let e1 = edge_transform.apply_point(edge.p1);
    let vpos = vertex_transform.apply_point(vertex.p);

    let e0_vel = edge_motion.apply_point(edge.p0);
    let e1_vel = edge_motion.apply_point(edge.p1);
    let vertex_vel = vertex_motion.apply_point(vertex.p);

    let ep0 = e1.sub(e0);
    let ev = e1_vel.sub(e0_vel);
    let vp0 = vpos.sub(e0);
    let vv = vertex_vel.sub(e0_vel);

    let close = ep0.mag() > 0.0 && ep0.cross(vp0).abs() <= ep0.mag() * tolerance.close_collision_thresh;

    let tau = if close {
        0.0
    } else {
        let a = ev.cross(vv);
        let b = ep0.cross(vv) + ev.cross(vp0);
        let c = ep0.cross(vp0);
        let root = if a == 0.0 {
            if b <= 0.0 {
                None
            } else {
                Some(-c / b)
            }
        } else {
            let disc = b * b - 4.0 * a * c;
            if disc < 0.0 {
                None
            } else {
                Some(2.0 * c / (-b - disc.sqrt()))
            }
        };
        root?
    };

    if tau < 0.0 {
        return None;
    }
    let t = now + tau;

    let ep_t = ep0.add(ev.scale(tau));
    let vp_t = vp0.add(vv.scale(tau));
    let ep_len2 = ep_t.mag2();
    if ep_len2 == 0.0 {
        return None;
    }

    // 1. parameter-on-segment
    let s = ep_t.dot(vp_t) / ep_len2;
    if !(0.0..=1.0).contains(&s) {
        return None;
    }

    // 2. vertex convex
    if vertex.t0.cross(vertex.t1) <= 0.0 {
        return None;
    }

    // 3. direction in arc
    let lhs = vertex.t0.cross(ep_t) * vertex.t1.cross(ep_t);
    let rhs = ep_len2 * vertex.t0.mag() * vertex.t1.mag() * tolerance.directional_tolerance;
    if lhs > rhs {
        return None;
    }

    // 4. correct winding
    let mid = vertex.t0.scale(vertex.t1.mag()).add(vertex.t1.scale(vertex.t0.mag()));
    if mid.dot(ep_t) > 0.0 {
        return None;
    }

    // 5. approach, not separation
    let edge_vel_at_contact = e0_vel.lerp(e1_vel, s);
    let rel_vel = vertex_vel.sub(edge_vel_at_contact);
    if ep_t.cross(rel_vel) > 0.0 {
        return None;
    }

    let pos = e0.add(e0_vel.scale(tau)).add(ep_t.scale(s));

    Some(VertexEdgeContact { time: t, pos, tangent: ep_t, vel: vertex_vel, rel_vel })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    fn floor_edge() -> Edge {
        Edge { p0: V2::new(-10.0, 0.0), p1: V2::new(10.0, 0.0) }
    }

    fn falling_vertex() -> Vertex {
        Vertex { p: V2::ZERO, t0: V2::new(-1.0, 1.0), t1: V2::new(1.0, 1.0) }
    }

    #[test]
    fn vertex_falling_onto_static_edge_hits_at_expected_time() {
        let edge_traj = Trajectory::stationary(Transform::identity());
        let vertex_traj = Trajectory::new(Transform::translate(V2::new(0.0, 2.0)), Transform::translate(V2::new(0.0, -1.0)), 0.0);
        let contact = solve(falling_vertex(), &vertex_traj, floor_edge(), &edge_traj, 0.0, ToleranceProfile::default()).unwrap();
        assert!((contact.time - 2.0).abs() < 1e-6);
    }

    #[test]
    fn vertex_moving_away_never_contacts() {
        let edge_traj = Trajectory::stationary(Transform::identity());
        let vertex_traj = Trajectory::new(Transform::translate(V2::new(0.0, 2.0)), Transform::translate(V2::new(0.0, 1.0)), 0.0);
        assert!(solve(falling_vertex(), &vertex_traj, floor_edge(), &edge_traj, 0.0, ToleranceProfile::default()).is_none());
    }

    #[test]
    fn reflex_vertex_never_collides() {
        let edge_traj = Trajectory::stationary(Transform::identity());
        let vertex_traj = Trajectory::new(Transform::translate(V2::new(0.0, 2.0)), Transform::translate(V2::new(0.0, -1.0)), 0.0);
        let reflex = Vertex { p: V2::ZERO, t0: V2::new(1.0, 1.0), t1: V2::new(-1.0, 1.0) };
        assert!(solve(reflex, &vertex_traj, floor_edge(), &edge_traj, 0.0, ToleranceProfile::default()).is_none());
    }

    #[test]
    fn close_collision_shortcut_fires_at_now() {
        let edge_traj = Trajectory::stationary(Transform::identity());
        let vertex_traj = Trajectory::stationary(Transform::identity());
        let vertex = Vertex { p: V2::new(0.0, 1e-9), t0: V2::new(-1.0, 1.0), t1: V2::new(1.0, 1.0) };
        let tol = ToleranceProfile { close_collision_thresh: 1e-6, directional_tolerance: 0.0 };
        let contact = solve(vertex, &vertex_traj, floor_edge(), &edge_traj, 5.0, tol).unwrap();
        assert_eq!(contact.time, 5.0);
    }
}
