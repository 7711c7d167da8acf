//! Oriented vertex/edge geometry and its path-builder (§3, §4.3).

use crate::handles::ObjectHandle;
use crate::vector::V2;

#[derive(Copy, Clone, Debug)]
pub struct Vertex {
    pub p: V2,
    /// Incoming tangent: direction of the previous edge arriving at `p`.
    pub t0: V2,
    /// Outgoing tangent: direction of the next edge leaving `p`.
    pub t1: V2,
}

#[derive(Copy, Clone, Debug)]
pub struct Edge {
    pub p0: V2,
    pub p1: V2,
}

impl Edge {
    pub fn direction(&self) -> V2 {
        self.p1.sub(self.p0)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Aabb {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Aabb {
    pub fn corners(&self) -> [V2; 4] {
        [
            V2::new(self.min_x, self.min_y),
            V2::new(self.min_x, self.max_y),
            V2::new(self.max_x, self.min_y),
            V2::new(self.max_x, self.max_y),
        ]
    }
}

pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub bounds: Aabb,
    pub(crate) dependants: Vec<ObjectHandle>,
}

impl Geometry {
    fn compute_bounds(vertices: &[Vertex], edges: &[Edge]) -> Aabb {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        let mut visit = |p: V2| {
            min_x = min_x.min(p.x());
            max_x = max_x.max(p.x());
            min_y = min_y.min(p.y());
            max_y = max_y.max(p.y());
        };
        for v in vertices {
            visit(v.p);
        }
        for e in edges {
            visit(e.p0);
            visit(e.p1);
        }
        if vertices.is_empty() && edges.is_empty() {
            Aabb { min_x: 0.0, max_x: 0.0, min_y: 0.0, max_y: 0.0 }
        } else {
            Aabb { min_x, max_x, min_y, max_y }
        }
    }

    /// Escape hatch for in-place edits; recomputes bounds. Callers are
    /// responsible for notifying dependants through the owning `Engine`.
    pub fn modify(&mut self, f: impl FnOnce(&mut Vec<Vertex>, &mut Vec<Edge>)) {
        f(&mut self.vertices, &mut self.edges);
        self.bounds = Self::compute_bounds(&self.vertices, &self.edges);
    }
}

/// Path-construction state machine (§4.3).
#[derive(Default)]
pub struct GeometryBuilder {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    path: Vec<V2>,
}

impl GeometryBuilder {
    pub fn new() -> Self {
        GeometryBuilder::default()
    }

    pub fn to(mut self, v: V2) -> Self {
        self.path.push(v);
        let n = self.path.len();
        if n >= 2 {
            let prev = self.path[n - 2];
            self.edges.push(Edge { p0: prev, p1: v });
        }
        if n >= 3 {
            let prev = self.path[n - 2];
            let prev_prev = self.path[n - 3];
            self.vertices.push(Vertex { p: prev, t0: prev.sub(prev_prev), t1: v.sub(prev) });
        }
        self
    }

    /// Abandons the current path without closing it.
    pub fn break_path(mut self) -> Self {
        self.path.clear();
        self
    }

    /// Closes the path back to its first vertex. A no-op (builder
    /// underflow, §7) when fewer than two vertices are pending.
    pub fn close(mut self) -> Self {
        let n = self.path.len();
        if n < 2 {
            self.path.clear();
            return self;
        }
        let pos0 = self.path[0];
        let pos1 = self.path[1];
        let prev = self.path[n - 1];
        let prev_prev = self.path[n - 2];
        self.edges.push(Edge { p0: prev, p1: pos0 });
        self.vertices.push(Vertex { p: prev, t0: prev.sub(prev_prev), t1: pos0.sub(prev) });
        self.vertices.push(Vertex { p: pos0, t0: pos0.sub(prev), t1: pos1.sub(pos0) });
        self.path.clear();
        self
    }

    pub fn polygon(self, verts: impl IntoIterator<Item = V2>) -> Self {
        let mut b = self.break_path();
        for v in verts {
            b = b.to(v);
        }
        b.close()
    }

    pub fn finish(self) -> Geometry {
        let bounds = Geometry::compute_bounds(&self.vertices, &self.edges);
        Geometry { vertices: self.vertices, edges: self.edges, bounds, dependants: Vec::new() }
    }
}

/// Builds the geometry for an axis-aligned square centered at the origin
/// with the given half-extent, wound counter-clockwise (solid interior).
pub fn unit_square(half_extent: f64) -> Geometry {
    let h = half_extent;
    GeometryBuilder::new()
        .polygon([
            V2::new(-h, -h),
            V2::new(h, -h),
            V2::new(h, h),
            V2::new(-h, h),
        ])
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_closes_with_matching_vertex_and_edge_count() {
        let g = unit_square(1.0);
        assert_eq!(g.edges.len(), 4);
        assert_eq!(g.vertices.len(), 4);
    }

    #[test]
    fn bounds_contain_every_vertex_and_edge_endpoint() {
        let g = unit_square(1.0);
        for v in &g.vertices {
            assert!(v.p.x() >= g.bounds.min_x && v.p.x() <= g.bounds.max_x);
            assert!(v.p.y() >= g.bounds.min_y && v.p.y() <= g.bounds.max_y);
        }
        for e in &g.edges {
            for p in [e.p0, e.p1] {
                assert!(p.x() >= g.bounds.min_x && p.x() <= g.bounds.max_x);
                assert!(p.y() >= g.bounds.min_y && p.y() <= g.bounds.max_y);
            }
        }
    }

    #[test]
    fn convex_square_vertices_are_all_convex() {
        let g = unit_square(1.0);
        for v in &g.vertices {
            assert!(v.t0.cross(v.t1) > 0.0);
        }
    }

    #[test]
    fn close_with_fewer_than_two_vertices_is_a_silent_noop() {
        let g = GeometryBuilder::new().to(V2::ZERO).close().finish();
        assert!(g.vertices.is_empty());
        assert!(g.edges.is_empty());
    }
}
