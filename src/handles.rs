//! Generational handles into the engine's object arenas.
//!
//! A `PhysicsObject` subscribes to its geometry, trajectory, and groups as a
//! dependant; rather than a strong/weak `Rc` cycle, that subscription is just
//! one of these `Copy` keys stored in a `Vec`. Dropping the owner frees the
//! slot; stale handles to a reused slot are rejected by `slotmap`, not
//! silently aliased (see §9 / §5 of the design doc).

use slotmap::new_key_type;

new_key_type! {
    pub struct GeometryHandle;
    pub struct TrajectoryHandle;
    pub struct GroupHandle;
    pub struct RuleHandle;
    pub struct ObjectHandle;
    pub struct EventHandle;
}
