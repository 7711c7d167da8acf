//! Contact record and normal-impulse response (§4.8).

use crate::engine::Engine;
use crate::error::EngineError;
use crate::handles::{GeometryHandle, ObjectHandle, TrajectoryHandle};
use crate::vector::V2;

#[derive(Copy, Clone, Debug)]
pub struct Collision {
    pub pos: V2,
    pub tangent: V2,
    pub vel: V2,
    pub rel_vel: V2,
    pub time: f64,
    pub vertex_geometry: GeometryHandle,
    pub edge_geometry: GeometryHandle,
    pub obj_a: ObjectHandle,
    pub obj_b: ObjectHandle,
    pub(crate) trajectory_a: TrajectoryHandle,
    pub(crate) trajectory_b: TrajectoryHandle,
}

impl Collision {
    /// Post-contact velocity at the contact point if `A` and `B` merged
    /// inelastically with the given relative weights.
    pub fn weighted_vel(&self, weight_a: f64, weight_b: f64) -> V2 {
        self.vel.add(self.rel_vel.scale(weight_b / (weight_a + weight_b)))
    }

    /// Applies a normal impulse to `obj_a`'s and `obj_b`'s trajectories,
    /// split by relative weight. `weight_a == weight_b == 0` is rejected:
    /// the formula below divides by their sum.
    pub fn resolve(
        &self,
        engine: &mut Engine,
        additional_vel: f64,
        restitution: f64,
        weight_a: f64,
        weight_b: f64,
    ) -> Result<(), EngineError> {
        if weight_a == 0.0 && weight_b == 0.0 {
            return Err(EngineError::UnsupportedArguments {
                reason: "resolve: weight_a and weight_b cannot both be zero",
            });
        }
        let n = self.tangent.perp().normalize();
        let v_n = self.rel_vel.project(n) + additional_vel;
        let denom = weight_a + weight_b;
        if weight_b != 0.0 {
            let impulse = n.scale((1.0 + restitution) * weight_b / denom * v_n);
            engine.impulse(self.trajectory_a, impulse);
        }
        if weight_a != 0.0 {
            let impulse = n.scale(-(1.0 + restitution) * weight_a / denom * v_n);
            engine.impulse(self.trajectory_b, impulse);
        }
        Ok(())
    }
}
