//! chrona: a continuous-time 2D physics engine.
//!
//! World state is an affine transform per object, linear in time; the
//! engine schedules callbacks to fire at the exact instant two polygons
//! become tangent rather than advancing on a fixed step.

pub mod candidate;
pub mod clock;
pub mod collision;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod group;
pub mod handles;
pub mod object;
pub mod scheduling;
pub mod solver;
pub mod trajectory;
pub mod transform;
pub mod vector;

pub use crate::clock::{EventCallback, Preprocess};
pub use crate::collision::Collision;
pub use crate::engine::Engine;
pub use crate::error::EngineError;
pub use crate::geometry::{Aabb, Edge, Geometry, GeometryBuilder, Vertex};
pub use crate::group::{CollisionGroup, CollisionRule, RuleCallback, ToleranceProfile};
pub use crate::handles::{EventHandle, GeometryHandle, GroupHandle, ObjectHandle, RuleHandle, TrajectoryHandle};
pub use crate::object::PhysicsObject;
pub use crate::scheduling::LoopHandle;
pub use crate::trajectory::Trajectory;
pub use crate::transform::Transform;
pub use crate::vector::V2;
