//! Central engine facade (§2, ambient): owns every collaborator in a
//! `slotmap` arena keyed by generational handles, so a `PhysicsObject`'s
//! subscription to its geometry, trajectory, and groups is a cheap `Copy`
//! handle rather than an owning reference.

use slotmap::SlotMap;

use crate::clock::Clock;
use crate::geometry::{Edge, Geometry, Vertex};
use crate::group::{CollisionGroup, CollisionRule};
use crate::handles::{GeometryHandle, GroupHandle, ObjectHandle, RuleHandle, TrajectoryHandle};
use crate::object::PhysicsObject;
use crate::trajectory::Trajectory;

pub struct Engine {
    pub(crate) clock: Clock,
    pub(crate) recalc_generation: u64,
    pub(crate) geometries: SlotMap<GeometryHandle, Geometry>,
    pub(crate) trajectories: SlotMap<TrajectoryHandle, Trajectory>,
    pub(crate) groups: SlotMap<GroupHandle, CollisionGroup>,
    pub(crate) rules: SlotMap<RuleHandle, CollisionRule>,
    pub(crate) objects: SlotMap<ObjectHandle, PhysicsObject>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            clock: Clock::default(),
            recalc_generation: 0,
            geometries: SlotMap::with_key(),
            trajectories: SlotMap::with_key(),
            groups: SlotMap::with_key(),
            rules: SlotMap::with_key(),
            objects: SlotMap::with_key(),
        }
    }

    /// Overrides the default `run_to` cycle limit (§4.10).
    pub fn with_cycle_limit(run_to_cycle_limit: u32) -> Self {
        Engine { clock: Clock::new(run_to_cycle_limit), ..Engine::new() }
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryHandle {
        self.geometries.insert(geometry)
    }

    pub fn add_trajectory(&mut self, trajectory: Trajectory) -> TrajectoryHandle {
        self.trajectories.insert(trajectory)
    }

    pub fn add_group(&mut self) -> GroupHandle {
        self.groups.insert(CollisionGroup::new())
    }

    /// Registers a rule and recalculates every member of `A` (§4.4);
    /// `B`-side members are visited transitively by those recalculations.
    pub fn add_rule(&mut self, rule: CollisionRule) -> RuleHandle {
        let group_a = rule.group_a;
        let group_b = rule.group_b;
        let handle = self.rules.insert(rule);
        self.groups[group_a].rules_a.push(handle);
        self.groups[group_b].rules_b.push(handle);
        let members = self.groups[group_a].members.clone();
        for m in members {
            self.queue_collision_recalculation(m);
        }
        handle
    }

    /// Removes the rule's influence without dropping it; recalculates both
    /// sides (§4.4).
    pub fn disable_rule(&mut self, rule: RuleHandle) {
        let Some(r) = self.rules.get_mut(rule) else {
            return;
        };
        if !r.enabled {
            return;
        }
        r.enabled = false;
        let (group_a, group_b) = (r.group_a, r.group_b);
        let mut members = self.groups[group_a].members.clone();
        members.extend(self.groups[group_b].members.clone());
        for m in members {
            self.queue_collision_recalculation(m);
        }
    }

    /// Re-enables a disabled rule; only the `A` side needs recalculation,
    /// `B`-side members are reached transitively (§4.4).
    pub fn enable_rule(&mut self, rule: RuleHandle) {
        let Some(r) = self.rules.get_mut(rule) else {
            return;
        };
        if r.enabled {
            return;
        }
        r.enabled = true;
        let group_a = r.group_a;
        let members = self.groups[group_a].members.clone();
        for m in members {
            self.queue_collision_recalculation(m);
        }
    }

    /// Creates an enabled object, subscribing it to its geometry, trajectory,
    /// and every listed group, then runs its initial recalculation.
    pub fn create_object(
        &mut self,
        geometry: GeometryHandle,
        trajectory: TrajectoryHandle,
        groups: Vec<GroupHandle>,
    ) -> ObjectHandle {
        let handle = self.objects.insert(PhysicsObject::new(geometry, trajectory, groups.clone()));
        self.geometries[geometry].dependants.push(handle);
        self.trajectories[trajectory].dependants.push(handle);
        for g in &groups {
            self.groups[*g].members.push(handle);
        }
        self.queue_collision_recalculation(handle);
        handle
    }

    /// Adding membership triggers a full recalculation of `obj` (§4.4).
    pub fn add_to_group(&mut self, obj: ObjectHandle, group: GroupHandle) {
        self.objects[obj].groups.push(group);
        self.groups[group].members.push(obj);
        self.queue_collision_recalculation(obj);
    }

    pub fn remove_from_group(&mut self, obj: ObjectHandle, group: GroupHandle) {
        self.objects[obj].groups.retain(|&g| g != group);
        self.groups[group].members.retain(|&m| m != obj);
        self.queue_collision_recalculation(obj);
    }

    /// Unsubscribes `obj` from its geometry, trajectory, and groups, and
    /// invalidates every event it owns (§5).
    pub fn disable_object(&mut self, obj: ObjectHandle) {
        let Some(data) = self.objects.get_mut(obj) else {
            return;
        };
        if data.disabled {
            return;
        }
        data.disabled = true;
        let geometry = data.geometry;
        let trajectory = data.trajectory;
        let groups = data.groups.clone();
        let events = std::mem::take(&mut data.events);

        self.geometries[geometry].dependants.retain(|&d| d != obj);
        self.trajectories[trajectory].dependants.retain(|&d| d != obj);
        for g in groups {
            self.groups[g].members.retain(|&m| m != obj);
        }
        for e in events {
            self.cancel_event(e);
        }
    }

    /// Frees the object's arena slot outright; a later `ObjectHandle` reusing
    /// this slot is a distinct generational key and cannot alias it (§5).
    pub fn remove_object(&mut self, obj: ObjectHandle) {
        self.disable_object(obj);
        self.objects.remove(obj);
    }

    pub fn object_disabled(&self, obj: ObjectHandle) -> bool {
        self.objects.get(obj).map(|o| o.disabled).unwrap_or(true)
    }

    pub fn object_geometry(&self, obj: ObjectHandle) -> GeometryHandle {
        self.objects[obj].geometry
    }

    pub fn object_trajectory(&self, obj: ObjectHandle) -> TrajectoryHandle {
        self.objects[obj].trajectory
    }

    /// In-place geometry edit; recomputes bounds and recalculates every
    /// dependant object (§4.3).
    pub fn modify_geometry(&mut self, handle: GeometryHandle, f: impl FnOnce(&mut Vec<Vertex>, &mut Vec<Edge>)) {
        let dependants = {
            let geometry = &mut self.geometries[handle];
            geometry.modify(f);
            geometry.dependants.clone()
        };
        for d in dependants {
            self.queue_collision_recalculation(d);
        }
    }
}
