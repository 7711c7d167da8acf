//! Time-parameterized affine motion (§3, §4.2): `base + (t - anchor) * motion`.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::handles::{ObjectHandle, TrajectoryHandle};
use crate::transform::Transform;
use crate::vector::V2;

pub struct Trajectory {
    pub base: Transform,
    pub motion: Transform,
    pub anchor_time: f64,
    pub(crate) dependants: Vec<ObjectHandle>,
}

impl Trajectory {
    pub fn new(base: Transform, motion: Transform, anchor_time: f64) -> Self {
        Trajectory { base, motion, anchor_time, dependants: Vec::new() }
    }

    pub fn stationary(base: Transform) -> Self {
        Trajectory::new(base, Transform::zero(), 0.0)
    }

    /// The world transform at `now`. Does not mutate.
    pub fn transform_at(&self, now: f64) -> Transform {
        self.base.add_scaled(self.motion, now - self.anchor_time)
    }

    pub fn motion(&self) -> Transform {
        self.motion
    }

    /// `base <- base + (now - anchor) * motion; anchor <- now`. Keeps
    /// `motion` a velocity about the *current* instant.
    pub fn normalize(&mut self, now: f64) {
        self.base = self.transform_at(now);
        self.anchor_time = now;
    }

    pub fn pos_of(&self, now: f64, geometry_point: V2) -> V2 {
        self.transform_at(now).apply_point(geometry_point)
    }

    pub fn vel_of(&self, geometry_point: V2) -> V2 {
        self.motion.apply_point(geometry_point)
    }
}

impl Engine {
    /// Normalizes the trajectory to `now`, runs `f` over `base`/`motion`,
    /// then queues a recalculation for every dependant object (§4.2 `modify`).
    fn modify_trajectory(&mut self, handle: TrajectoryHandle, f: impl FnOnce(&mut Transform, &mut Transform)) {
        let now = self.time();
        let dependants = {
            let traj = &mut self.trajectories[handle];
            traj.normalize(now);
            f(&mut traj.base, &mut traj.motion);
            traj.dependants.clone()
        };
        for dep in dependants {
            self.queue_collision_recalculation(dep);
        }
    }

    pub fn trajectory_transform(&self, handle: TrajectoryHandle) -> Transform {
        self.trajectories[handle].transform_at(self.time())
    }

    pub fn trajectory_motion(&self, handle: TrajectoryHandle) -> Transform {
        self.trajectories[handle].motion()
    }

    pub fn pos_of(&self, handle: TrajectoryHandle, geometry_point: V2) -> V2 {
        self.trajectories[handle].pos_of(self.time(), geometry_point)
    }

    pub fn vel_of(&self, handle: TrajectoryHandle, geometry_point: V2) -> V2 {
        self.trajectories[handle].vel_of(geometry_point)
    }

    /// Replaces `base` outright (and `motion` if given) without normalizing
    /// first, so callers can set absolute state (§4.2).
    pub fn set_transform(&mut self, handle: TrajectoryHandle, base: Transform, motion: Option<Transform>) {
        let now = self.time();
        let dependants = {
            let traj = &mut self.trajectories[handle];
            traj.base = base;
            if let Some(m) = motion {
                traj.motion = m;
            }
            traj.anchor_time = now;
            traj.dependants.clone()
        };
        for dep in dependants {
            self.queue_collision_recalculation(dep);
        }
    }

    pub fn set_motion(&mut self, handle: TrajectoryHandle, motion: Transform) {
        self.modify_trajectory(handle, |_base, m| *m = motion);
    }

    pub fn translate(&mut self, handle: TrajectoryHandle, v: V2) {
        self.modify_trajectory(handle, |base, _m| base.p = base.p.add(v));
    }

    pub fn set_pos(&mut self, handle: TrajectoryHandle, v: V2) {
        self.modify_trajectory(handle, |base, _m| base.p = v);
    }

    pub fn impulse(&mut self, handle: TrajectoryHandle, v: V2) {
        self.modify_trajectory(handle, |_base, m| m.p = m.p.add(v));
    }

    pub fn set_vel(&mut self, handle: TrajectoryHandle, v: V2) {
        self.modify_trajectory(handle, |_base, m| m.p = v);
    }

    pub fn stop(&mut self, handle: TrajectoryHandle) {
        self.modify_trajectory(handle, |_base, m| *m = Transform::zero());
    }

    /// Sets `motion` so that `get_transform()` equals `target` exactly `dt`
    /// time units from now. `dt <= 0` is a programmer error (§4.2).
    pub fn transform_to(&mut self, handle: TrajectoryHandle, target: Transform, dt: f64) -> Result<(), EngineError> {
        if dt <= 0.0 {
            return Err(EngineError::UnsupportedArguments { reason: "transform_to: dt must be positive" });
        }
        let current = self.trajectory_transform(handle);
        let motion = target.sub(current).scale_by(1.0 / dt);
        self.set_motion(handle, motion);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_at_matches_pos_of() {
        let mut traj = Trajectory::new(Transform::identity(), Transform::translate(V2::new(1.0, 0.0)), 0.0);
        traj.normalize(0.0);
        let v = V2::new(2.0, 3.0);
        for t in [0.0, 1.0, 5.5] {
            assert_eq!(traj.pos_of(t, v), traj.transform_at(t).apply_point(v));
        }
    }

    #[test]
    fn normalize_preserves_world_transform() {
        let mut traj = Trajectory::new(Transform::identity(), Transform::translate(V2::new(1.0, 0.0)), 0.0);
        let before = traj.transform_at(3.0);
        traj.normalize(3.0);
        let after = traj.transform_at(3.0);
        assert_eq!(before, after);
        assert_eq!(traj.anchor_time, 3.0);
    }
}
