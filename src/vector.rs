//! 2D double-precision vector primitive.
//!
//! The engine works exclusively in IEEE-754 doubles, so this wraps
//! `glam::DVec2` rather than a single-precision vector, and adds the handful
//! of operations the solver and candidate generator lean on (`cross`,
//! `perp`, `project`).

use glam::DVec2;
use std::ops::{Add, Mul, Neg, Sub};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct V2(pub DVec2);

impl V2 {
    pub const ZERO: V2 = V2(DVec2::ZERO);

    pub fn new(x: f64, y: f64) -> Self {
        V2(DVec2::new(x, y))
    }

    pub fn x(self) -> f64 {
        self.0.x
    }

    pub fn y(self) -> f64 {
        self.0.y
    }

    pub fn add(self, other: V2) -> V2 {
        V2(self.0 + other.0)
    }

    pub fn sub(self, other: V2) -> V2 {
        V2(self.0 - other.0)
    }

    pub fn scale(self, s: f64) -> V2 {
        V2(self.0 * s)
    }

    pub fn dot(self, other: V2) -> f64 {
        self.0.dot(other.0)
    }

    /// Scalar 2D cross product `x1*y2 - y1*x2`.
    pub fn cross(self, other: V2) -> f64 {
        self.0.x * other.0.y - self.0.y * other.0.x
    }

    pub fn mag(self) -> f64 {
        self.0.length()
    }

    pub fn mag2(self) -> f64 {
        self.0.length_squared()
    }

    /// Returns `V2::ZERO` for a zero-length input rather than NaN.
    pub fn normalize(self) -> V2 {
        let m = self.mag();
        if m == 0.0 {
            V2::ZERO
        } else {
            V2(self.0 / m)
        }
    }

    /// Counter-clockwise 90-degree rotation.
    pub fn perp(self) -> V2 {
        V2::new(-self.0.y, self.0.x)
    }

    /// Clockwise 90-degree rotation.
    pub fn anti_perp(self) -> V2 {
        V2::new(self.0.y, -self.0.x)
    }

    /// Scalar projection length of `self` onto `axis` (`axis` need not be unit).
    pub fn project(self, axis: V2) -> f64 {
        let m2 = axis.mag2();
        if m2 == 0.0 {
            0.0
        } else {
            self.dot(axis) / m2.sqrt()
        }
    }

    pub fn lerp(self, other: V2, t: f64) -> V2 {
        V2(self.0.lerp(other.0, t))
    }
}

impl Add for V2 {
    type Output = V2;
    fn add(self, rhs: V2) -> V2 {
        V2::add(self, rhs)
    }
}

impl Sub for V2 {
    type Output = V2;
    fn sub(self, rhs: V2) -> V2 {
        V2::sub(self, rhs)
    }
}

impl Mul<f64> for V2 {
    type Output = V2;
    fn mul(self, rhs: f64) -> V2 {
        V2::scale(self, rhs)
    }
}

impl Neg for V2 {
    type Output = V2;
    fn neg(self) -> V2 {
        V2::scale(self, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_is_antisymmetric() {
        let a = V2::new(1.0, 0.0);
        let b = V2::new(0.0, 1.0);
        assert_eq!(a.cross(b), 1.0);
        assert_eq!(b.cross(a), -1.0);
    }

    #[test]
    fn perp_is_ccw_quarter_turn() {
        let a = V2::new(1.0, 0.0);
        assert_eq!(a.perp(), V2::new(0.0, 1.0));
        assert_eq!(a.anti_perp(), V2::new(0.0, -1.0));
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(V2::ZERO.normalize(), V2::ZERO);
    }

    #[test]
    fn project_onto_axis() {
        let v = V2::new(3.0, 4.0);
        let axis = V2::new(1.0, 0.0);
        assert_eq!(v.project(axis), 3.0);
    }

    #[test]
    fn lerp_midpoint() {
        let a = V2::new(0.0, 0.0);
        let b = V2::new(2.0, 4.0);
        assert_eq!(a.lerp(b, 0.5), V2::new(1.0, 2.0));
    }
}
