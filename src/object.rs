//! Per-object recalculation engine (§4.7): candidate heaps, invalidation,
//! and batched contact-event emission.

use std::collections::BinaryHeap;

use crate::candidate::{self, CollisionCandidate};
use crate::collision::Collision;
use crate::engine::Engine;
use crate::handles::{EventHandle, GeometryHandle, GroupHandle, ObjectHandle, TrajectoryHandle};
use crate::solver;

pub struct PhysicsObject {
    pub geometry: GeometryHandle,
    pub trajectory: TrajectoryHandle,
    pub groups: Vec<GroupHandle>,
    pub disabled: bool,
    pub(crate) events: Vec<EventHandle>,
    pub(crate) last_recalculation_cycle_queued: Option<u64>,
    pub(crate) recalc_heap: BinaryHeap<CollisionCandidate>,
    pub(crate) other_heap: BinaryHeap<CollisionCandidate>,
    pub(crate) next_probable_recalculation: f64,
    pub(crate) last_recalculation: u64,
}

impl PhysicsObject {
    pub(crate) fn new(geometry: GeometryHandle, trajectory: TrajectoryHandle, groups: Vec<GroupHandle>) -> Self {
        PhysicsObject {
            geometry,
            trajectory,
            groups,
            disabled: false,
            events: Vec::new(),
            last_recalculation_cycle_queued: None,
            recalc_heap: BinaryHeap::new(),
            other_heap: BinaryHeap::new(),
            next_probable_recalculation: f64::INFINITY,
            last_recalculation: 0,
        }
    }
}

impl Engine {
    /// Idempotent within a cycle: schedules `recalculate_collisions` as a
    /// preprocess for the *next* cycle, once per object per cycle (§4.7).
    pub fn queue_collision_recalculation(&mut self, obj: ObjectHandle) {
        let cycle = self.cycle();
        let already_queued = {
            let data = &mut self.objects[obj];
            if data.last_recalculation_cycle_queued == Some(cycle) {
                true
            } else {
                data.last_recalculation_cycle_queued = Some(cycle);
                false
            }
        };
        if already_queued {
            return;
        }
        self.add_preprocess(Box::new(move |eng| eng.recalculate_collisions(obj)));
    }

    pub fn recalculate_collisions(&mut self, obj: ObjectHandle) {
        if self.objects[obj].disabled {
            return;
        }
        let prior_events = std::mem::take(&mut self.objects[obj].events);
        for e in prior_events {
            self.cancel_event(e);
        }
        self.objects[obj].recalc_heap.clear();
        self.objects[obj].other_heap.clear();

        self.recalc_generation += 1;
        let generation = self.recalc_generation;
        self.objects[obj].last_recalculation = generation;

        let now = self.time();
        let groups = self.objects[obj].groups.clone();
        let mut recalc_candidates = Vec::new();
        let mut other_candidates = Vec::new();

        for g in groups {
            let (rules_a, rules_b) = {
                let group = &self.groups[g];
                (group.rules_a.clone(), group.rules_b.clone())
            };

            for rule_h in rules_a {
                let (enabled, recalculating, group_b) = {
                    let rule = &self.rules[rule_h];
                    (rule.enabled, rule.recalculating, rule.group_b)
                };
                if !enabled {
                    continue;
                }
                let other_members = self.groups[group_b].members.clone();
                let (geom_self, traj_self) = (self.objects[obj].geometry, self.objects[obj].trajectory);
                for other in other_members {
                    if other == obj {
                        continue;
                    }
                    let (geom_other, traj_other) = (self.objects[other].geometry, self.objects[other].trajectory);
                    if let Some(t) = candidate::earliest_overlap(
                        &self.geometries[geom_self],
                        &self.trajectories[traj_self],
                        &self.geometries[geom_other],
                        &self.trajectories[traj_other],
                        now,
                    ) {
                        let c = CollisionCandidate { a: obj, b: other, earliest_time: t, rule: rule_h };
                        if recalculating {
                            recalc_candidates.push(c);
                        } else {
                            other_candidates.push(c);
                        }
                    }
                }
            }

            for rule_h in rules_b {
                let (enabled, recalculating, group_a) = {
                    let rule = &self.rules[rule_h];
                    (rule.enabled, rule.recalculating, rule.group_a)
                };
                if !enabled {
                    continue;
                }
                let other_members = self.groups[group_a].members.clone();
                let (geom_self, traj_self) = (self.objects[obj].geometry, self.objects[obj].trajectory);
                for other in other_members {
                    if other == obj {
                        continue;
                    }
                    let (geom_other, traj_other) = (self.objects[other].geometry, self.objects[other].trajectory);
                    if let Some(t) = candidate::earliest_overlap(
                        &self.geometries[geom_other],
                        &self.trajectories[traj_other],
                        &self.geometries[geom_self],
                        &self.trajectories[traj_self],
                        now,
                    ) {
                        let c = CollisionCandidate { a: other, b: obj, earliest_time: t, rule: rule_h };
                        if recalculating {
                            recalc_candidates.push(c);
                        } else {
                            other_candidates.push(c);
                        }
                    }
                }
            }
        }

        for c in recalc_candidates {
            self.objects[obj].recalc_heap.push(c);
        }
        for c in other_candidates {
            self.objects[obj].other_heap.push(c);
        }

        tracing::trace!(
            recalc = self.objects[obj].recalc_heap.len(),
            other = self.objects[obj].other_heap.len(),
            "recalculated collisions"
        );

        self.add_collisions(obj);
    }

    /// Batched contact emission (§4.7): drains `recalc_heap` up to the
    /// earliest known future mutation, then `other_heap` up to that same
    /// bound, solving each surviving candidate exactly.
    pub(crate) fn add_collisions(&mut self, obj: ObjectHandle) {
        let now = self.time();
        let this_generation = self.objects[obj].last_recalculation;
        let mut earliest = self.objects[obj].next_probable_recalculation;
        self.objects[obj].next_probable_recalculation = f64::INFINITY;

        loop {
            let Some(k) = self.objects[obj].recalc_heap.peek().copied() else {
                break;
            };
            if earliest < k.earliest_time {
                let wake_time = k.earliest_time;
                if let Some(h) = self.schedule(wake_time, Box::new(move |eng| eng.add_collisions(obj))) {
                    self.objects[obj].events.push(h);
                }
                break;
            }
            self.objects[obj].recalc_heap.pop();
            let other = if k.a == obj { k.b } else { k.a };
            if self.objects[other].last_recalculation > this_generation {
                continue;
            }
            let contacts = self.solve_candidate(&k);
            for c in contacts {
                if c.time < now {
                    continue;
                }
                earliest = earliest.min(c.time);
                self.emit_contact(k.rule, c);
                if self.rules[k.rule].recalculating {
                    self.objects[k.a].next_probable_recalculation = self.objects[k.a].next_probable_recalculation.min(c.time);
                    self.objects[k.b].next_probable_recalculation = self.objects[k.b].next_probable_recalculation.min(c.time);
                }
            }
        }

        loop {
            let Some(k) = self.objects[obj].other_heap.peek().copied() else {
                break;
            };
            if k.earliest_time > earliest {
                break;
            }
            self.objects[obj].other_heap.pop();
            let contacts = self.solve_candidate(&k);
            for c in contacts {
                if c.time < now {
                    continue;
                }
                self.emit_contact(k.rule, c);
            }
        }
    }

    fn emit_contact(&mut self, rule: crate::handles::RuleHandle, collision: Collision) {
        let obj_a = collision.obj_a;
        let obj_b = collision.obj_b;
        let time = collision.time;
        tracing::trace!(?obj_a, ?obj_b, time, "emitting contact event");
        if let Some(h) = self.schedule(time, Box::new(move |eng| eng.fire_rule(rule, collision))) {
            self.objects[obj_a].events.push(h);
            self.objects[obj_b].events.push(h);
        }
    }

    fn fire_rule(&mut self, rule: crate::handles::RuleHandle, collision: Collision) {
        let mut callback = self.rules[rule].callback.take();
        if let Some(cb) = &mut callback {
            cb(self, collision);
        }
        if let Some(r) = self.rules.get_mut(rule) {
            r.callback = callback;
        }
    }

    fn solve_candidate(&self, k: &CollisionCandidate) -> Vec<Collision> {
        let now = self.time();
        let tolerance = self.rules[k.rule].tolerance;
        let obj_a = &self.objects[k.a];
        let obj_b = &self.objects[k.b];
        let geom_a = &self.geometries[obj_a.geometry];
        let geom_b = &self.geometries[obj_b.geometry];
        let traj_a = &self.trajectories[obj_a.trajectory];
        let traj_b = &self.trajectories[obj_b.trajectory];

        let mut out = Vec::new();
        for v in &geom_a.vertices {
            for e in &geom_b.edges {
                if let Some(c) = solver::solve(*v, traj_a, *e, traj_b, now, tolerance) {
                    out.push(Collision {
                        pos: c.pos,
                        tangent: c.tangent,
                        vel: c.vel,
                        rel_vel: c.rel_vel,
                        time: c.time,
                        vertex_geometry: obj_a.geometry,
                        edge_geometry: obj_b.geometry,
                        obj_a: k.a,
                        obj_b: k.b,
                        trajectory_a: obj_a.trajectory,
                        trajectory_b: obj_b.trajectory,
                    });
                }
            }
        }
        for v in &geom_b.vertices {
            for e in &geom_a.edges {
                if let Some(c) = solver::solve(*v, traj_b, *e, traj_a, now, tolerance) {
                    out.push(Collision {
                        pos: c.pos,
                        tangent: c.tangent.scale(-1.0),
                        vel: c.vel,
                        rel_vel: c.rel_vel.scale(-1.0),
                        time: c.time,
                        vertex_geometry: obj_b.geometry,
                        edge_geometry: obj_a.geometry,
                        obj_a: k.a,
                        obj_b: k.b,
                        trajectory_a: obj_a.trajectory,
                        trajectory_b: obj_b.trajectory,
                    });
                }
            }
        }
        out
    }
}
