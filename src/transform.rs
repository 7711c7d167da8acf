//! 2x3 affine transform: linear columns `a`, `b` plus translation `p`.

use crate::vector::V2;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub a: V2,
    pub b: V2,
    pub p: V2,
}

impl Transform {
    pub const fn new(a: V2, b: V2, p: V2) -> Self {
        Transform { a, b, p }
    }

    pub fn identity() -> Self {
        Transform::new(V2::new(1.0, 0.0), V2::new(0.0, 1.0), V2::ZERO)
    }

    pub fn zero() -> Self {
        Transform::new(V2::ZERO, V2::ZERO, V2::ZERO)
    }

    pub fn translate(v: V2) -> Self {
        Transform::new(V2::new(1.0, 0.0), V2::new(0.0, 1.0), v)
    }

    pub fn scale(factor: f64) -> Self {
        Transform::new(V2::new(factor, 0.0), V2::new(0.0, factor), V2::ZERO)
    }

    pub fn rotate(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Transform::new(V2::new(c, s), V2::new(-s, c), V2::ZERO)
    }

    /// Applies the full affine map: `a*vx + b*vy + p`.
    pub fn apply_point(self, v: V2) -> V2 {
        self.a.scale(v.x()).add(self.b.scale(v.y())).add(self.p)
    }

    /// Applies only the linear part (no translation) — for directions/velocities.
    pub fn apply_affine(self, v: V2) -> V2 {
        self.a.scale(v.x()).add(self.b.scale(v.y()))
    }

    pub fn add(self, other: Transform) -> Transform {
        Transform::new(self.a.add(other.a), self.b.add(other.b), self.p.add(other.p))
    }

    pub fn sub(self, other: Transform) -> Transform {
        Transform::new(self.a.sub(other.a), self.b.sub(other.b), self.p.sub(other.p))
    }

    pub fn scale_by(self, s: f64) -> Transform {
        Transform::new(self.a.scale(s), self.b.scale(s), self.p.scale(s))
    }

    pub fn add_scaled(self, other: Transform, s: f64) -> Transform {
        self.add(other.scale_by(s))
    }

    /// `self.append(other) == other ∘ self` — `self` is applied first.
    pub fn append(self, other: Transform) -> Transform {
        Transform::new(
            other.apply_affine(self.a),
            other.apply_affine(self.b),
            other.apply_point(self.p),
        )
    }

    /// Inverse affine map, or `None` when the linear part is singular.
    pub fn invert(self) -> Option<Transform> {
        let det = self.a.x() * self.b.y() - self.a.y() * self.b.x();
        if det == 0.0 {
            return None;
        }
        let inv_det = 1.0 / det;
        let inv_a = V2::new(self.b.y() * inv_det, -self.a.y() * inv_det);
        let inv_b = V2::new(-self.b.x() * inv_det, self.a.x() * inv_det);
        let inv_p = inv_a.scale(-self.p.x()).add(inv_b.scale(-self.p.y()));
        Some(Transform::new(inv_a, inv_b, inv_p))
    }

    pub fn lerp(self, other: Transform, t: f64) -> Transform {
        Transform::new(self.a.lerp(other.a, t), self.b.lerp(other.b, t), self.p.lerp(other.p, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn identity_is_noop() {
        let v = V2::new(3.0, -2.0);
        assert_eq!(Transform::identity().apply_point(v), v);
    }

    #[test]
    fn translate_moves_points_not_directions() {
        let t = Transform::translate(V2::new(5.0, 5.0));
        assert_eq!(t.apply_point(V2::ZERO), V2::new(5.0, 5.0));
        assert_eq!(t.apply_affine(V2::ZERO), V2::ZERO);
    }

    #[test]
    fn rotate_quarter_turn() {
        let t = Transform::rotate(FRAC_PI_2);
        let v = t.apply_point(V2::new(1.0, 0.0));
        assert!((v.x()).abs() < 1e-9);
        assert!((v.y() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn invert_round_trips() {
        let t = Transform::rotate(0.7).append(Transform::translate(V2::new(2.0, -3.0)));
        let inv = t.invert().unwrap();
        let v = V2::new(1.5, -0.5);
        let round_tripped = inv.apply_point(t.apply_point(v));
        assert!((round_tripped.x() - v.x()).abs() < 1e-9);
        assert!((round_tripped.y() - v.y()).abs() < 1e-9);
    }

    #[test]
    fn invert_singular_is_none() {
        let t = Transform::new(V2::ZERO, V2::ZERO, V2::ZERO);
        assert!(t.invert().is_none());
    }

    #[test]
    fn append_order_self_first() {
        let rotate = Transform::rotate(FRAC_PI_2);
        let translate = Transform::translate(V2::new(10.0, 0.0));
        let combined = rotate.append(translate);
        let v = combined.apply_point(V2::new(1.0, 0.0));
        // rotate first: (1,0) -> (0,1); then translate: (10,1)
        assert!((v.x() - 10.0).abs() < 1e-9);
        assert!((v.y() - 1.0).abs() < 1e-9);
    }
}
