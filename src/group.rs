//! Collision groups and rules (§3, §4.4): the bipartite registry mapping
//! ordered group pairs to a callback and tolerance profile.

use crate::collision::Collision;
use crate::engine::Engine;
use crate::handles::{GroupHandle, ObjectHandle, RuleHandle};

#[derive(Copy, Clone, Debug)]
pub struct ToleranceProfile {
    pub close_collision_thresh: f64,
    pub directional_tolerance: f64,
}

impl Default for ToleranceProfile {
    fn default() -> Self {
        ToleranceProfile { close_collision_thresh: 1e-6, directional_tolerance: 0.0 }
    }
}

pub struct CollisionGroup {
    pub(crate) members: Vec<ObjectHandle>,
    pub(crate) rules_a: Vec<RuleHandle>,
    pub(crate) rules_b: Vec<RuleHandle>,
}

impl CollisionGroup {
    pub fn new() -> Self {
        CollisionGroup { members: Vec::new(), rules_a: Vec::new(), rules_b: Vec::new() }
    }

    pub fn members(&self) -> &[ObjectHandle] {
        &self.members
    }
}

impl Default for CollisionGroup {
    fn default() -> Self {
        CollisionGroup::new()
    }
}

pub type RuleCallback = Box<dyn FnMut(&mut Engine, Collision)>;

pub struct CollisionRule {
    pub group_a: GroupHandle,
    pub group_b: GroupHandle,
    pub tolerance: ToleranceProfile,
    pub(crate) callback: Option<RuleCallback>,
    pub recalculating: bool,
    pub(crate) enabled: bool,
}

impl CollisionRule {
    pub fn new(
        group_a: GroupHandle,
        group_b: GroupHandle,
        tolerance: ToleranceProfile,
        recalculating: bool,
        callback: RuleCallback,
    ) -> Self {
        CollisionRule { group_a, group_b, tolerance, callback: Some(callback), recalculating, enabled: true }
    }
}
